//! Error types for cryoflow.
//!
//! Errors wrap whatever the settings layer or the remote service reported and
//! keep its message intact, so the top level can print it unmodified.

use crate::remote::JobStatus;
use thiserror::Error;

/// The main error type for cryoflow operations.
#[derive(Debug, Error)]
pub enum CryoflowError {
    /// Reading, writing or completing the settings failed.
    #[error("{0}")]
    Settings(#[from] SettingsError),

    /// The remote compute service reported an error.
    #[error("{0}")]
    Remote(#[from] RemoteError),

    /// A job reached a terminal state other than the one being awaited.
    #[error("Job {job_uid} ({job_type}) ended with status '{status}' while waiting for '{expected}'")]
    JobFailed {
        /// The remote job uid.
        job_uid: String,
        /// The remote job type.
        job_type: String,
        /// The terminal status observed.
        status: JobStatus,
        /// The status that was being awaited.
        expected: JobStatus,
    },

    /// The remote service has no compute lanes.
    #[error("No compute lanes are available on the remote service")]
    NoLanes,

    /// A stage declares an input that no earlier stage produces.
    #[error("Invalid pipeline at stage '{stage}': {message}")]
    InvalidPipeline {
        /// The offending stage.
        stage: String,
        /// What is wrong with it.
        message: String,
    },
}

impl CryoflowError {
    /// Creates an invalid pipeline error.
    #[must_use]
    pub fn invalid_pipeline(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPipeline {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

/// Errors from loading, saving or completing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Required form fields were left empty.
    #[error("Missing required settings: {}", .fields.join(", "))]
    MissingRequired {
        /// The names of the empty fields.
        fields: Vec<String>,
    },
}

/// Errors reported by, or while talking to, the remote compute service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The HTTP transport failed.
    #[cfg(feature = "http")]
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered a call with an error.
    #[error("{method}: {message}")]
    Rpc {
        /// The remote method name.
        method: String,
        /// The error code, when the service sent one.
        code: Option<i64>,
        /// The service's error message.
        message: String,
    },

    /// The client configuration cannot be used.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// The service answered with something that could not be decoded.
    #[error("Unexpected response from {method}: {message}")]
    UnexpectedResponse {
        /// The remote method name.
        method: String,
        /// What could not be decoded.
        message: String,
    },
}

impl RemoteError {
    /// Creates an RPC error.
    #[must_use]
    pub fn rpc(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rpc {
            method: method.into(),
            code: None,
            message: message.into(),
        }
    }

    /// Creates an unexpected response error.
    #[must_use]
    pub fn unexpected(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            method: method.into(),
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = CryoflowError> = std::result::Result<T, E>;
