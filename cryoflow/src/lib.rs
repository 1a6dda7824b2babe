//! # Cryoflow
//!
//! Drives a CryoSPARC instance from a folder of summed micrographs to a
//! homogeneously refined 3D map without manual intervention.
//!
//! A run:
//!
//! - **Settings**: merges defaults, the previous run's saved settings and
//!   command-line flags, then saves the result for the next run
//! - **Workspace setup**: logs in, opens the project, creates a workspace and
//!   picks a compute lane
//! - **Eight stages**: import, CTF estimation, Topaz picking, extraction,
//!   2D classification, automatic 2D class selection, ab-initio
//!   reconstruction and homogeneous refinement, each waited on in turn
//! - **Progress**: prints `progress: N/9` lines a GUI host can parse
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cryoflow::prelude::*;
//!
//! let settings = Settings::default().merged_with(&overrides);
//! settings.ensure_required()?;
//!
//! let client = CommandClient::new(&ClientConfig::new(&settings.host, settings.port), &settings.license)?;
//! let sink = TextSink::stdout();
//! let report = Workflow::new(&client, &settings, &sink).run().await?;
//! println!("Refined map in job {}", report.refinement_job().unwrap().uid);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod errors;
pub mod events;
pub mod pipeline;
pub mod remote;
pub mod settings;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::{CryoflowError, RemoteError, Result, SettingsError};
    pub use crate::events::{
        CollectingSink, FanoutSink, LoggingSink, NoOpSink, Progress, ProgressEvent,
        ProgressSink, TextSink,
    };
    pub use crate::pipeline::{
        SelectionSummary, StageId, WaitOptions, Workflow, WorkflowReport, PIPELINE, TOTAL_STEPS,
    };
    #[cfg(feature = "http")]
    pub use crate::remote::CommandClient;
    pub use crate::remote::{ClientConfig, ComputeService, JobHandle, JobStatus};
    pub use crate::settings::{FormSchema, Settings, SettingsOverrides, SettingsStore};
    pub use crate::utils::{generate_run_id, now_local, Timestamp};
}
