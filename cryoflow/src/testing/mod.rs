//! Testing utilities for cryoflow workflows.
//!
//! This module provides:
//! - An in-memory compute service that records calls
//! - Settings and class fixtures

mod fixtures;
mod mocks;

pub use fixtures::{class_info, complete_settings};
pub use mocks::{MockCall, MockComputeService};
