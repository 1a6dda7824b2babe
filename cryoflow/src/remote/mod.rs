//! The remote compute service boundary.
//!
//! Everything the workflow needs from the job-management service goes through
//! [`ComputeService`]. The production implementation speaks JSON-RPC over
//! HTTP ([`CommandClient`]); tests use [`crate::testing::MockComputeService`].

#[cfg(feature = "http")]
mod client;
mod config;
mod status;
mod types;

#[cfg(feature = "http")]
pub use client::CommandClient;
pub use config::ClientConfig;
pub use status::JobStatus;
pub use types::{
    ClassInfo, Connection, Credentials, JobHandle, JobRequest, Lane, ProjectInfo, Session,
    Workspace,
};

use crate::errors::RemoteError;
use async_trait::async_trait;

/// Operations the workflow invokes on the job-management service.
///
/// Implementations only forward calls; they never retry or reinterpret
/// the service's answers.
#[async_trait]
pub trait ComputeService: Send + Sync {
    /// Authenticates and returns the remote user id.
    async fn login(&self, credentials: &Credentials) -> Result<String, RemoteError>;

    /// Looks up a project by uid.
    async fn find_project(&self, project_uid: &str) -> Result<ProjectInfo, RemoteError>;

    /// Creates an empty workspace in the session's project.
    async fn create_workspace(
        &self,
        session: &Session,
        title: &str,
        description: &str,
    ) -> Result<Workspace, RemoteError>;

    /// Lists the scheduler lanes in the order the service reports them.
    async fn lanes(&self) -> Result<Vec<Lane>, RemoteError>;

    /// Creates a job in a workspace.
    async fn create_job(
        &self,
        session: &Session,
        workspace: &Workspace,
        request: &JobRequest,
    ) -> Result<JobHandle, RemoteError>;

    /// Queues a job on a lane, or runs it directly when `lane` is `None`.
    async fn queue_job(
        &self,
        session: &Session,
        job: &JobHandle,
        lane: Option<&str>,
    ) -> Result<(), RemoteError>;

    /// Returns the job's current status.
    async fn job_status(&self, job: &JobHandle) -> Result<JobStatus, RemoteError>;

    /// Sends an action to an interactive job and returns its answer.
    async fn interact(
        &self,
        job: &JobHandle,
        action: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, RemoteError>;
}
