//! JSON-RPC client for the command service.

use super::{
    ClientConfig, ComputeService, Credentials, JobHandle, JobRequest, JobStatus, Lane,
    ProjectInfo, Session, Workspace,
};
use crate::errors::RemoteError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const LICENSE_HEADER: &str = "License-ID";

/// Talks to the command service with JSON-RPC 2.0 over HTTP.
#[derive(Debug)]
pub struct CommandClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl CommandClient {
    /// Builds a client for the configured installation. No request is sent.
    pub fn new(config: &ClientConfig, license: &str) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            LICENSE_HEADER,
            HeaderValue::from_str(license)
                .map_err(|e| RemoteError::unexpected("connect", format!("invalid license id: {e}")))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout()?)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            url: config.api_url(),
            next_id: AtomicU64::new(0),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RemoteError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method = %method, id, url = %self.url, "Calling command service");

        let response = self
            .http
            .post(&self.url)
            .json(&rpc_request(method, params, id))
            .send()
            .await?
            .error_for_status()?;

        let payload: Value = response.json().await?;
        decode_response(method, payload)
    }
}

fn rpc_request(method: &str, params: Value, id: u64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": id,
    })
}

fn decode_response<T: DeserializeOwned>(method: &str, mut payload: Value) -> Result<T, RemoteError> {
    if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_string);
        return Err(RemoteError::Rpc {
            method: method.to_string(),
            code: error.get("code").and_then(Value::as_i64),
            message,
        });
    }

    let result = payload
        .get_mut("result")
        .map(Value::take)
        .unwrap_or(Value::Null);
    serde_json::from_value(result).map_err(|e| RemoteError::unexpected(method, e.to_string()))
}

fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[async_trait]
impl ComputeService for CommandClient {
    async fn login(&self, credentials: &Credentials) -> Result<String, RemoteError> {
        self.call(
            "get_id_by_email_password",
            json!({
                "email": credentials.email,
                "password": password_digest(&credentials.password),
            }),
        )
        .await
    }

    async fn find_project(&self, project_uid: &str) -> Result<ProjectInfo, RemoteError> {
        self.call("get_project", json!({ "project_uid": project_uid }))
            .await
    }

    async fn create_workspace(
        &self,
        session: &Session,
        title: &str,
        description: &str,
    ) -> Result<Workspace, RemoteError> {
        let uid: String = self
            .call(
                "create_empty_workspace",
                json!({
                    "project_uid": session.project_uid,
                    "created_by_user_id": session.user_id,
                    "title": title,
                    "desc": description,
                }),
            )
            .await?;

        Ok(Workspace {
            project_uid: session.project_uid.clone(),
            uid,
        })
    }

    async fn lanes(&self) -> Result<Vec<Lane>, RemoteError> {
        self.call("get_scheduler_lanes", json!({})).await
    }

    async fn create_job(
        &self,
        session: &Session,
        workspace: &Workspace,
        request: &JobRequest,
    ) -> Result<JobHandle, RemoteError> {
        let uid: String = self
            .call(
                "make_job",
                json!({
                    "job_type": request.job_type,
                    "project_uid": workspace.project_uid,
                    "workspace_uid": workspace.uid,
                    "user_id": session.user_id,
                    "params": request.params,
                    "input_group_connects": request.input_groups(),
                }),
            )
            .await?;

        Ok(JobHandle {
            project_uid: workspace.project_uid.clone(),
            uid,
            job_type: request.job_type.clone(),
        })
    }

    async fn queue_job(
        &self,
        session: &Session,
        job: &JobHandle,
        lane: Option<&str>,
    ) -> Result<(), RemoteError> {
        let _: Value = self
            .call(
                "enqueue_job",
                json!({
                    "project_uid": job.project_uid,
                    "job_uid": job.uid,
                    "lane": lane,
                    "user_id": session.user_id,
                    "hostname": Value::Null,
                    "gpus": false,
                }),
            )
            .await?;
        Ok(())
    }

    async fn job_status(&self, job: &JobHandle) -> Result<JobStatus, RemoteError> {
        self.call(
            "get_job_status",
            json!({ "project_uid": job.project_uid, "job_uid": job.uid }),
        )
        .await
    }

    async fn interact(
        &self,
        job: &JobHandle,
        action: &str,
        body: Value,
    ) -> Result<Value, RemoteError> {
        self.call(
            "interactive_post",
            json!({
                "project_uid": job.project_uid,
                "job_uid": job.uid,
                "endpoint": action,
                "data": body,
            }),
        )
        .await
    }
}
