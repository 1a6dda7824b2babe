//! In-memory compute service for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::errors::RemoteError;
use crate::remote::{
    ClassInfo, ComputeService, Credentials, JobHandle, JobRequest, JobStatus, Lane, ProjectInfo,
    Session, Workspace,
};

/// A call the mock received.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    /// `login`.
    Login {
        /// Email used.
        email: String,
    },
    /// `find_project`.
    FindProject(String),
    /// `create_workspace`.
    CreateWorkspace {
        /// Workspace title.
        title: String,
    },
    /// `lanes`.
    Lanes,
    /// `create_job`.
    CreateJob(JobRequest),
    /// `queue_job`.
    QueueJob {
        /// Job uid.
        job_uid: String,
        /// Lane, if any.
        lane: Option<String>,
    },
    /// `job_status`.
    JobStatus(String),
    /// `interact`.
    Interact {
        /// Job uid.
        job_uid: String,
        /// Action name.
        action: String,
        /// Request body.
        body: serde_json::Value,
    },
}

#[derive(Debug)]
struct MockJob {
    handle: JobHandle,
    queued: bool,
    polls: usize,
    finished_interaction: bool,
}

/// A compute service that records every call and simulates job progress.
///
/// Queued jobs report `queued` on their first poll and then their outcome
/// (`completed` unless overridden). Jobs of type `select_2D` report
/// `waiting` until they receive a `finish` interaction.
#[derive(Debug)]
pub struct MockComputeService {
    calls: Mutex<Vec<MockCall>>,
    jobs: Mutex<Vec<MockJob>>,
    lanes: Mutex<Vec<Lane>>,
    classes: Mutex<Vec<ClassInfo>>,
    outcomes: Mutex<HashMap<String, JobStatus>>,
    failing_methods: Mutex<HashMap<String, String>>,
    failing_job_types: Mutex<HashMap<String, String>>,
    failing_polls: Mutex<HashMap<String, String>>,
    failing_actions: Mutex<HashMap<String, String>>,
}

impl Default for MockComputeService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockComputeService {
    /// Creates a mock with one lane named `default` and no classes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            jobs: Mutex::new(Vec::new()),
            lanes: Mutex::new(vec![Lane {
                name: "default".to_string(),
                title: "Default lane".to_string(),
                lane_type: "node".to_string(),
            }]),
            classes: Mutex::new(Vec::new()),
            outcomes: Mutex::new(HashMap::new()),
            failing_methods: Mutex::new(HashMap::new()),
            failing_job_types: Mutex::new(HashMap::new()),
            failing_polls: Mutex::new(HashMap::new()),
            failing_actions: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the lanes the service reports.
    pub fn set_lanes(&self, lanes: Vec<Lane>) {
        *self.lanes.lock() = lanes;
    }

    /// Sets the class statistics a selection job reports.
    pub fn set_classes(&self, classes: Vec<ClassInfo>) {
        *self.classes.lock() = classes;
    }

    /// Sets the terminal status jobs of `job_type` end in.
    pub fn set_job_outcome(&self, job_type: &str, status: JobStatus) {
        self.outcomes.lock().insert(job_type.to_string(), status);
    }

    /// Makes every call to `method` fail with `message`.
    pub fn fail_method(&self, method: &str, message: &str) {
        self.failing_methods
            .lock()
            .insert(method.to_string(), message.to_string());
    }

    /// Makes creating a job of `job_type` fail with `message`.
    pub fn fail_job_creation(&self, job_type: &str, message: &str) {
        self.failing_job_types
            .lock()
            .insert(job_type.to_string(), message.to_string());
    }

    /// Makes status polls of `job_type` jobs fail with `message` once the
    /// first poll has answered.
    pub fn fail_status_polls(&self, job_type: &str, message: &str) {
        self.failing_polls
            .lock()
            .insert(job_type.to_string(), message.to_string());
    }

    /// Makes the interaction `action` fail with `message`.
    pub fn fail_interaction(&self, action: &str, message: &str) {
        self.failing_actions
            .lock()
            .insert(action.to_string(), message.to_string());
    }

    /// Returns every recorded call.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Returns the requests of created jobs, in creation order.
    #[must_use]
    pub fn created_jobs(&self) -> Vec<JobRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                MockCall::CreateJob(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the job types created, in order.
    #[must_use]
    pub fn created_job_types(&self) -> Vec<String> {
        self.created_jobs().into_iter().map(|r| r.job_type).collect()
    }

    /// Returns `(action, body)` for every interaction, in order.
    #[must_use]
    pub fn interactions(&self) -> Vec<(String, serde_json::Value)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                MockCall::Interact { action, body, .. } => Some((action.clone(), body.clone())),
                _ => None,
            })
            .collect()
    }

    /// Returns how often a job's status was polled.
    #[must_use]
    pub fn status_polls(&self, job_uid: &str) -> usize {
        self.jobs
            .lock()
            .iter()
            .find(|job| job.handle.uid == job_uid)
            .map_or(0, |job| job.polls)
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().push(call);
    }

    fn check(&self, method: &str) -> Result<(), RemoteError> {
        match self.failing_methods.lock().get(method) {
            Some(message) => Err(RemoteError::rpc(method, message.clone())),
            None => Ok(()),
        }
    }

    fn unknown_job(method: &str, job: &JobHandle) -> RemoteError {
        RemoteError::rpc(method, format!("Job {} does not exist", job.uid))
    }
}

#[async_trait]
impl ComputeService for MockComputeService {
    async fn login(&self, credentials: &Credentials) -> Result<String, RemoteError> {
        self.record(MockCall::Login {
            email: credentials.email.clone(),
        });
        self.check("login")?;
        Ok("user-1".to_string())
    }

    async fn find_project(&self, project_uid: &str) -> Result<ProjectInfo, RemoteError> {
        self.record(MockCall::FindProject(project_uid.to_string()));
        self.check("find_project")?;
        Ok(ProjectInfo {
            uid: project_uid.to_string(),
            title: format!("Project {project_uid}"),
        })
    }

    async fn create_workspace(
        &self,
        session: &Session,
        title: &str,
        _description: &str,
    ) -> Result<Workspace, RemoteError> {
        self.record(MockCall::CreateWorkspace {
            title: title.to_string(),
        });
        self.check("create_workspace")?;
        Ok(Workspace {
            project_uid: session.project_uid.clone(),
            uid: "W1".to_string(),
        })
    }

    async fn lanes(&self) -> Result<Vec<Lane>, RemoteError> {
        self.record(MockCall::Lanes);
        self.check("lanes")?;
        Ok(self.lanes.lock().clone())
    }

    async fn create_job(
        &self,
        _session: &Session,
        workspace: &Workspace,
        request: &JobRequest,
    ) -> Result<JobHandle, RemoteError> {
        self.record(MockCall::CreateJob(request.clone()));
        self.check("create_job")?;
        if let Some(message) = self.failing_job_types.lock().get(&request.job_type) {
            return Err(RemoteError::rpc("create_job", message.clone()));
        }

        let mut jobs = self.jobs.lock();
        let handle = JobHandle {
            project_uid: workspace.project_uid.clone(),
            uid: format!("J{}", jobs.len() + 1),
            job_type: request.job_type.clone(),
        };
        jobs.push(MockJob {
            handle: handle.clone(),
            queued: false,
            polls: 0,
            finished_interaction: false,
        });
        Ok(handle)
    }

    async fn queue_job(
        &self,
        _session: &Session,
        job: &JobHandle,
        lane: Option<&str>,
    ) -> Result<(), RemoteError> {
        self.record(MockCall::QueueJob {
            job_uid: job.uid.clone(),
            lane: lane.map(str::to_string),
        });
        self.check("queue_job")?;

        let mut jobs = self.jobs.lock();
        let entry = jobs
            .iter_mut()
            .find(|j| j.handle == *job)
            .ok_or_else(|| Self::unknown_job("queue_job", job))?;
        entry.queued = true;
        Ok(())
    }

    async fn job_status(&self, job: &JobHandle) -> Result<JobStatus, RemoteError> {
        self.record(MockCall::JobStatus(job.uid.clone()));
        self.check("job_status")?;

        let outcome = self
            .outcomes
            .lock()
            .get(&job.job_type)
            .copied()
            .unwrap_or(JobStatus::Completed);

        let mut jobs = self.jobs.lock();
        let entry = jobs
            .iter_mut()
            .find(|j| j.handle == *job)
            .ok_or_else(|| Self::unknown_job("job_status", job))?;
        entry.polls += 1;
        if entry.polls > 1 {
            if let Some(message) = self.failing_polls.lock().get(&entry.handle.job_type) {
                return Err(RemoteError::rpc("job_status", message.clone()));
            }
        }

        let status = if !entry.queued {
            JobStatus::Building
        } else if entry.polls == 1 {
            JobStatus::Queued
        } else if entry.handle.job_type == "select_2D" && !entry.finished_interaction {
            JobStatus::Waiting
        } else {
            outcome
        };
        Ok(status)
    }

    async fn interact(
        &self,
        job: &JobHandle,
        action: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, RemoteError> {
        self.record(MockCall::Interact {
            job_uid: job.uid.clone(),
            action: action.to_string(),
            body,
        });
        self.check("interact")?;
        if let Some(message) = self.failing_actions.lock().get(action) {
            return Err(RemoteError::rpc("interact", message.clone()));
        }

        match action {
            "get_class_info" => serde_json::to_value(self.classes.lock().clone())
                .map_err(|e| RemoteError::unexpected(action, e.to_string())),
            "finish" => {
                let mut jobs = self.jobs.lock();
                if let Some(entry) = jobs.iter_mut().find(|j| j.handle == *job) {
                    entry.finished_interaction = true;
                }
                Ok(serde_json::json!({ "success": true }))
            }
            _ => Ok(serde_json::json!({ "success": true })),
        }
    }
}
