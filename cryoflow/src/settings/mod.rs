//! User settings for a workflow run.
//!
//! Settings are a flat record keyed by the names the form layer uses
//! (`License`, `Pize_A`, ...). Values come from three places, later ones
//! winning: built-in defaults, the previously saved settings file, and
//! command-line overrides.

mod coerce;
mod form;
mod overrides;
mod store;

pub use form::{FieldSpec, FormField, FormGroup, FormSchema, Widget, FIELDS};
pub use overrides::SettingsOverrides;
pub use store::{SavedSettings, SettingsStore, LATEST_FILE};

use crate::errors::SettingsError;
use crate::remote::Credentials;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pretrained Topaz picking models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PretrainedModel {
    /// ResNet8 with 32 units.
    #[default]
    #[serde(rename = "ResNet8 (32 units)")]
    ResNet8x32,
    /// ResNet8 with 64 units.
    #[serde(rename = "ResNet8 (64 units)")]
    ResNet8x64,
    /// ResNet16 with 32 units.
    #[serde(rename = "ResNet16 (32 units)")]
    ResNet16x32,
    /// ResNet16 with 64 units.
    #[serde(rename = "ResNet16 (64 units)")]
    ResNet16x64,
}

impl PretrainedModel {
    /// Every model, in the order the form lists them.
    pub const ALL: [Self; 4] = [
        Self::ResNet8x32,
        Self::ResNet8x64,
        Self::ResNet16x32,
        Self::ResNet16x64,
    ];

    /// The label the remote service expects.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ResNet8x32 => "ResNet8 (32 units)",
            Self::ResNet8x64 => "ResNet8 (64 units)",
            Self::ResNet16x32 => "ResNet16 (32 units)",
            Self::ResNet16x64 => "ResNet16 (64 units)",
        }
    }
}

impl fmt::Display for PretrainedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PretrainedModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.label() == s.trim())
            .ok_or_else(|| {
                let choices: Vec<_> = Self::ALL.iter().map(PretrainedModel::label).collect();
                format!("unknown pretrained model '{s}', expected one of: {}", choices.join(", "))
            })
    }
}

/// Every setting the workflow reads.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// License id.
    #[serde(rename = "License")]
    pub license: String,
    /// CPUs to use for CPU-bound jobs.
    #[serde(rename = "Compute_num_cpus", deserialize_with = "coerce::number")]
    pub compute_num_cpus: u32,
    /// Account email.
    #[serde(rename = "Email")]
    pub email: String,
    /// Account password.
    #[serde(rename = "Password")]
    pub password: String,
    /// Service host.
    #[serde(rename = "Host")]
    pub host: String,
    /// Service base port.
    #[serde(rename = "Port", deserialize_with = "coerce::number")]
    pub port: u16,
    /// Project uid.
    #[serde(rename = "Project_ID")]
    pub project_id: String,
    /// Title of the workspace to create.
    #[serde(rename = "Workspace_title")]
    pub workspace_title: String,
    /// Description of the workspace to create.
    #[serde(rename = "Workspace_desc")]
    pub workspace_desc: String,

    /// Path or wildcard expression of the micrographs to import.
    #[serde(rename = "Micrographs_data_path")]
    pub micrographs_data_path: String,
    /// Pixel size in Angstroms.
    #[serde(rename = "Pize_A", deserialize_with = "coerce::optional_number")]
    pub psize_a: Option<f64>,
    /// Acceleration voltage in kV.
    #[serde(rename = "Accel_kv", deserialize_with = "coerce::number")]
    pub accel_kv: f64,
    /// Spherical aberration in mm.
    #[serde(rename = "Cs_mm", deserialize_with = "coerce::number")]
    pub cs_mm: f64,
    /// Total dose per exposure in e/A^2.
    #[serde(rename = "Dose_eA2", deserialize_with = "coerce::number")]
    pub dose_e_a2: f64,

    /// Path to the Topaz executable.
    #[serde(rename = "Exec_path")]
    pub exec_path: String,
    /// Pretrained picking model.
    #[serde(rename = "Pretrained")]
    pub pretrained: PretrainedModel,
    /// Downsampling factor applied before picking.
    #[serde(rename = "Downsample_scale", deserialize_with = "coerce::number")]
    pub downsample_scale: u32,
    /// Extraction radius; negative asks the service to derive one.
    #[serde(rename = "Extract_radius", deserialize_with = "coerce::number")]
    pub extract_radius: i32,
    /// Particle box size in pixels.
    #[serde(rename = "Box_size_pix", deserialize_with = "coerce::number")]
    pub box_size_pix: u32,

    /// Number of 2D classes.
    #[serde(rename = "Class2D_K", deserialize_with = "coerce::number")]
    pub class2d_k: u32,

    /// Symmetry string (C1, D7, ...).
    #[serde(rename = "Refine_symmetry")]
    pub refine_symmetry: String,
    /// Refine per-particle defocus.
    #[serde(rename = "Refine_defocus_refine", deserialize_with = "coerce::flag")]
    pub refine_defocus_refine: bool,
    /// Refine per-exposure-group CTF parameters.
    #[serde(rename = "Refine_ctf_global_refine", deserialize_with = "coerce::flag")]
    pub refine_ctf_global_refine: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            license: String::new(),
            compute_num_cpus: 8,
            email: String::new(),
            password: String::new(),
            host: "localhost".to_string(),
            port: 39000,
            project_id: String::new(),
            workspace_title: String::new(),
            workspace_desc: "No description.".to_string(),
            micrographs_data_path: String::new(),
            psize_a: None,
            accel_kv: 300.0,
            cs_mm: 2.7,
            dose_e_a2: 20.0,
            exec_path: String::new(),
            pretrained: PretrainedModel::default(),
            downsample_scale: 8,
            extract_radius: 12,
            box_size_pix: 360,
            class2d_k: 50,
            refine_symmetry: "C1".to_string(),
            refine_defocus_refine: true,
            refine_ctf_global_refine: true,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("email", &self.email)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("project_id", &self.project_id)
            .field("workspace_title", &self.workspace_title)
            .field("micrographs_data_path", &self.micrographs_data_path)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Applies command-line overrides on top of these settings.
    #[must_use]
    pub fn merged_with(mut self, overrides: &SettingsOverrides) -> Self {
        overrides.apply_to(&mut self);
        self
    }

    /// Names of required fields that are still empty.
    #[must_use]
    pub fn missing_required(&self) -> Vec<String> {
        let values = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => return Vec::new(),
        };

        FIELDS
            .iter()
            .filter(|field| field.required)
            .filter(|field| values.get(field.name).map_or(true, is_blank))
            .map(|field| field.name.to_string())
            .collect()
    }

    /// Fails if any required field is empty.
    pub fn ensure_required(&self) -> Result<(), SettingsError> {
        let fields = self.missing_required();
        if fields.is_empty() {
            Ok(())
        } else {
            Err(SettingsError::MissingRequired { fields })
        }
    }

    /// Login details for the remote service.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            license: self.license.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::complete_settings;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.compute_num_cpus, 8);
        assert_eq!(settings.port, 39000);
        assert_eq!(settings.workspace_desc, "No description.");
        assert_eq!(settings.pretrained, PretrainedModel::ResNet8x32);
        assert_eq!(settings.class2d_k, 50);
        assert!(settings.refine_defocus_refine);
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let settings: Settings = serde_json::from_value(json!({
            "License": "abc",
            "Compute_num_cpus": "16",
            "Port": 61000,
            "Pize_A": "1.06",
            "Pretrained": "ResNet16 (64 units)",
        }))
        .unwrap();

        assert_eq!(settings.license, "abc");
        assert_eq!(settings.compute_num_cpus, 16);
        assert_eq!(settings.port, 61000);
        assert_eq!(settings.psize_a, Some(1.06));
        assert_eq!(settings.pretrained, PretrainedModel::ResNet16x64);
        assert_eq!(settings.box_size_pix, 360);
        assert_eq!(settings.refine_symmetry, "C1");
    }

    #[test]
    fn test_serializes_with_form_keys() {
        let value = serde_json::to_value(complete_settings()).unwrap();
        assert_eq!(value["Project_ID"], "P12");
        assert_eq!(value["Pize_A"], 0.83);
        assert_eq!(value["Pretrained"], "ResNet8 (32 units)");
        assert_eq!(value["Refine_ctf_global_refine"], true);
    }

    #[test]
    fn test_missing_required() {
        assert_eq!(
            Settings::default().missing_required(),
            vec![
                "License",
                "Email",
                "Password",
                "Project_ID",
                "Workspace_title",
                "Micrographs_data_path",
                "Pize_A",
                "Exec_path",
            ]
        );
        assert!(complete_settings().ensure_required().is_ok());
    }

    #[test]
    fn test_blank_string_counts_as_missing() {
        let settings = Settings {
            workspace_title: "   ".to_string(),
            ..complete_settings()
        };
        assert_eq!(settings.missing_required(), vec!["Workspace_title"]);
    }

    #[test]
    fn test_pretrained_from_str() {
        assert_eq!(
            "ResNet16 (32 units)".parse::<PretrainedModel>().unwrap(),
            PretrainedModel::ResNet16x32
        );
        assert!("ResNet99".parse::<PretrainedModel>().is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let debug = format!("{:?}", complete_settings());
        assert!(!debug.contains("secret"));
        assert!(!debug.contains("lic-0001"));
    }

    #[test]
    fn test_credentials() {
        let creds = complete_settings().credentials();
        assert_eq!(creds.email, "ops@example.org");
        assert_eq!(creds.port, 39000);
    }
}
