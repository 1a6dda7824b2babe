//! Pipeline definition and execution.
//!
//! This module provides:
//! - The fixed stage table and its job wiring
//! - Per-stage job parameters
//! - Job status polling and 2D class selection
//! - The workflow that runs setup and every stage in order

mod params;
mod runner;
mod selection;
mod stage;
mod wait;
mod workflow;


pub use params::job_params;
pub use runner::{run_stage, StageRun};
pub use selection::{
    is_class_selected, select_classes, SelectionSummary, MAX_RESOLUTION_A, MIN_PARTICLES,
    MIN_RESOLUTION_A,
};
pub use stage::{
    build_request, validate_pipeline, Execution, InputSpec, StageId, StageJobs, StageSpec,
    PIPELINE,
};
pub use wait::{wait_for_done, wait_for_status, WaitOptions};
pub use workflow::{Workflow, WorkflowReport, WorkspaceContext, SETUP_STEP, TOTAL_STEPS};
