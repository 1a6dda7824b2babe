//! Value types exchanged with the remote compute service.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Login details for the remote service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// License id sent with every request.
    pub license: String,
    /// Account email.
    pub email: String,
    /// Account password in clear text; only its digest leaves the process.
    pub password: String,
    /// Service host name or address.
    pub host: String,
    /// Base port of the service.
    pub port: u16,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

/// An authenticated session bound to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The remote user id returned by login.
    pub user_id: String,
    /// The project every call in this session targets.
    pub project_uid: String,
}

/// Project details returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Project uid, e.g. `P3`.
    pub uid: String,
    /// Human readable title.
    #[serde(default)]
    pub title: String,
}

/// A workspace created inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Owning project uid.
    pub project_uid: String,
    /// Workspace uid, e.g. `W2`.
    pub uid: String,
}

/// A compute lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    /// Lane name used when queueing.
    pub name: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Lane type, e.g. `node` or `cluster`.
    #[serde(default, rename = "type")]
    pub lane_type: String,
}

/// Identifies a job created on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle {
    /// Owning project uid.
    pub project_uid: String,
    /// Job uid, e.g. `J12`.
    pub uid: String,
    /// The remote job type it was created with.
    pub job_type: String,
}

impl JobHandle {
    /// Returns the fully qualified name of one of this job's output groups.
    #[must_use]
    pub fn output(&self, name: &str) -> String {
        format!("{}.{name}", self.uid)
    }
}

/// Connects a job input to an output group of an existing job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Input slot on the job being created.
    pub input: String,
    /// Uid of the job that produced the output.
    pub source_job: String,
    /// Output group name on the source job.
    pub output: String,
}

impl Connection {
    /// The `J<n>.<output>` group reference the service expects.
    #[must_use]
    pub fn group(&self) -> String {
        format!("{}.{}", self.source_job, self.output)
    }
}

/// Everything needed to create a job.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobRequest {
    /// Remote job type, e.g. `class_2D`.
    pub job_type: String,
    /// Job parameters, keyed by the service's parameter names.
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
    /// Input connections.
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl JobRequest {
    /// Creates an empty request for a job type.
    #[must_use]
    pub fn new(job_type: impl Into<String>) -> Self {
        Self {
            job_type: job_type.into(),
            ..Self::default()
        }
    }

    /// Sets the parameters.
    #[must_use]
    pub fn with_params(mut self, params: serde_json::Map<String, serde_json::Value>) -> Self {
        self.params = params;
        self
    }

    /// Adds an input connection.
    #[must_use]
    pub fn connect(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }

    /// Groups connections by input slot, as `input -> [J<n>.<output>, ...]`.
    #[must_use]
    pub fn input_groups(&self) -> BTreeMap<String, Vec<String>> {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for connection in &self.connections {
            groups
                .entry(connection.input.clone())
                .or_default()
                .push(connection.group());
        }
        groups
    }
}

/// Per-class statistics reported by an interactive 2D selection job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Class index.
    pub class_idx: u32,
    /// Estimated resolution in Angstroms.
    #[serde(rename = "res_A")]
    pub res_a: f64,
    /// Number of particles assigned to the class.
    pub num_particles_total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_groups_collects_by_slot() {
        let request = JobRequest::new("homo_refine_new")
            .connect(Connection {
                input: "particles".to_string(),
                source_job: "J7".to_string(),
                output: "particles_all_classes".to_string(),
            })
            .connect(Connection {
                input: "volume".to_string(),
                source_job: "J7".to_string(),
                output: "volume_class_0".to_string(),
            });

        let groups = request.input_groups();
        assert_eq!(groups["particles"], vec!["J7.particles_all_classes"]);
        assert_eq!(groups["volume"], vec!["J7.volume_class_0"]);
    }

    #[test]
    fn test_class_info_ignores_extra_fields() {
        let info: ClassInfo = serde_json::from_value(json!({
            "class_idx": 3,
            "res_A": 7.5,
            "num_particles_total": 420,
            "selected": false,
        }))
        .unwrap();
        assert_eq!(info.class_idx, 3);
        assert!((info.res_a - 7.5).abs() < f64::EPSILON);
        assert_eq!(info.num_particles_total, 420);
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let creds = Credentials {
            license: "lic-123".to_string(),
            email: "a@b.c".to_string(),
            password: "hunter2".to_string(),
            host: "localhost".to_string(),
            port: 39000,
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("lic-123"));
    }
}
