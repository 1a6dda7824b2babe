//! Declarative form schema for GUI hosts.
//!
//! The schema lists every settings field with its widget, help text and the
//! current value as default, so a host can render the form and call back
//! with `--<Key> <value>` flags.

use super::{PretrainedModel, Settings};
use crate::events::PROGRESS_REGEX;
use serde::Serialize;

/// How a field should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Widget {
    /// Free text.
    TextField,
    /// Masked text.
    PasswordField,
    /// Whole number.
    IntegerField,
    /// Decimal number.
    DecimalField,
    /// One of a fixed set of choices.
    Dropdown,
    /// Boolean toggle.
    CheckBox,
}

/// Static description of one settings field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Group (tab) title.
    pub group: &'static str,
    /// Settings key and flag name.
    pub name: &'static str,
    /// Widget hint.
    pub widget: Widget,
    /// Whether the run refuses to start while the field is empty.
    pub required: bool,
    /// Help text.
    pub help: &'static str,
}

const USER_INFO: &str = "User Info";
const IMPORT: &str = "Import Micrographs";
const TOPAZ: &str = "Topaz Extract";
const CLASS_2D: &str = "2D Classification";
const REFINE: &str = "Homogeneous Refinement";

const fn field(
    group: &'static str,
    name: &'static str,
    widget: Widget,
    required: bool,
    help: &'static str,
) -> FieldSpec {
    FieldSpec {
        group,
        name,
        widget,
        required,
        help,
    }
}

/// Every settings field, in form order.
pub const FIELDS: &[FieldSpec] = &[
    field(USER_INFO, "License", Widget::PasswordField, true, "CryoSPARC license ID"),
    field(USER_INFO, "Compute_num_cpus", Widget::IntegerField, true, "Number of CPUs to use for computation"),
    field(USER_INFO, "Email", Widget::TextField, true, "CryoSPARC account"),
    field(USER_INFO, "Password", Widget::PasswordField, true, "CryoSPARC password"),
    field(USER_INFO, "Host", Widget::TextField, true, "CryoSPARC host address"),
    field(USER_INFO, "Port", Widget::IntegerField, true, "CryoSPARC base port number"),
    field(USER_INFO, "Project_ID", Widget::TextField, true, "CryoSPARC project ID"),
    field(USER_INFO, "Workspace_title", Widget::TextField, true, "CryoSPARC workspace title"),
    field(USER_INFO, "Workspace_desc", Widget::TextField, false, "CryoSPARC workspace description"),
    field(
        IMPORT,
        "Micrographs_data_path",
        Widget::TextField,
        true,
        "Absolute path or wildcard expression (e.g. /mount/data/somewhere/*.mrc) of the micrographs to import. MRC format supported.",
    ),
    field(IMPORT, "Pize_A", Widget::DecimalField, true, "Pixel size of the micrograph data in Angstroms"),
    field(IMPORT, "Accel_kv", Widget::DecimalField, true, "Acceleration voltage in kV"),
    field(IMPORT, "Cs_mm", Widget::DecimalField, false, "Spherical aberration in mm"),
    field(IMPORT, "Dose_eA2", Widget::DecimalField, false, "Dose per exposure in e/A^2"),
    field(
        TOPAZ,
        "Exec_path",
        Widget::TextField,
        true,
        "Absolute path to a Topaz executable compiled for the correct CUDA version.",
    ),
    field(TOPAZ, "Pretrained", Widget::Dropdown, false, "Pretrained model to use for extraction."),
    field(
        TOPAZ,
        "Downsample_scale",
        Widget::IntegerField,
        false,
        "Rescaling factor to downsample images by. Only required when using a provided pretrained model.",
    ),
    field(
        TOPAZ,
        "Extract_radius",
        Widget::IntegerField,
        false,
        "Radius of regions to extract from micrograph. If negative, a radius is calculated from the other radius parameters.",
    ),
    field(TOPAZ, "Box_size_pix", Widget::IntegerField, false, "Size of box to be extracted from micrograph."),
    field(CLASS_2D, "Class2D_K", Widget::IntegerField, false, "Number of 2D classes."),
    field(REFINE, "Refine_symmetry", Widget::TextField, false, "Symmetry string (C, D, I, O, T). E.g. C1, D7, C4, etc"),
    field(
        REFINE,
        "Refine_defocus_refine",
        Widget::CheckBox,
        false,
        "Minimize over per-particle defocus at each iteration of refinement. Starts once refinement with current defocus values converges.",
    ),
    field(
        REFINE,
        "Refine_ctf_global_refine",
        Widget::CheckBox,
        false,
        "Optimize the per-exposure-group CTF parameters (higher-order aberrations) at each iteration of refinement. Starts once refinement with current CTF values converges.",
    ),
];

/// One rendered form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    /// Settings key and flag name.
    pub name: &'static str,
    /// Widget hint.
    pub widget: Widget,
    /// Whether the field is required.
    pub required: bool,
    /// Help text.
    pub help: &'static str,
    /// Current value.
    pub default: serde_json::Value,
    /// Allowed values for dropdowns.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<&'static str>,
}

/// A titled group of fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormGroup {
    /// Group title.
    pub title: &'static str,
    /// Fields in form order.
    pub fields: Vec<FormField>,
}

/// The full form a GUI host renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSchema {
    /// Program name.
    pub program_name: &'static str,
    /// One-line description.
    pub program_description: &'static str,
    /// Regex matching progress lines on stdout.
    pub progress_regex: &'static str,
    /// Expression turning the regex groups into a percentage.
    pub progress_expr: &'static str,
    /// Field groups.
    pub groups: Vec<FormGroup>,
}

impl FormSchema {
    /// Builds the schema with `settings` supplying each field's default.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let values = match serde_json::to_value(settings) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };

        let mut groups: Vec<FormGroup> = Vec::new();
        for spec in FIELDS {
            let field = FormField {
                name: spec.name,
                widget: spec.widget,
                required: spec.required,
                help: spec.help,
                default: values.get(spec.name).cloned().unwrap_or_default(),
                choices: if spec.widget == Widget::Dropdown {
                    PretrainedModel::ALL.iter().map(PretrainedModel::label).collect()
                } else {
                    Vec::new()
                },
            };

            match groups.last_mut() {
                Some(group) if group.title == spec.group => group.fields.push(field),
                _ => groups.push(FormGroup {
                    title: spec.group,
                    fields: vec![field],
                }),
            }
        }

        Self {
            program_name: "Fully Automatic CryoSPARC Workflow Tool",
            program_description: "Summed Micrographs -> Homogeneous Refined Map",
            progress_regex: PROGRESS_REGEX,
            progress_expr: "current / total * 100",
            groups,
        }
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.groups
            .iter()
            .flat_map(|group| group.fields.iter())
            .find(|field| field.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_every_settings_key_has_a_field() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        let keys: HashSet<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        let names: HashSet<&str> = FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(keys, names);
    }

    #[test]
    fn test_groups_keep_form_order() {
        let schema = FormSchema::new(&Settings::default());
        let titles: Vec<_> = schema.groups.iter().map(|g| g.title).collect();
        assert_eq!(
            titles,
            vec![USER_INFO, IMPORT, TOPAZ, CLASS_2D, REFINE]
        );
    }

    #[test]
    fn test_defaults_come_from_settings() {
        let settings = Settings {
            host: "cs-master".to_string(),
            box_size_pix: 256,
            ..Settings::default()
        };
        let schema = FormSchema::new(&settings);

        assert_eq!(schema.field("Host").unwrap().default, "cs-master");
        assert_eq!(schema.field("Box_size_pix").unwrap().default, 256);
        assert_eq!(schema.field("Pize_A").unwrap().default, serde_json::Value::Null);
    }

    #[test]
    fn test_dropdown_lists_models() {
        let schema = FormSchema::new(&Settings::default());
        let pretrained = schema.field("Pretrained").unwrap();
        assert_eq!(pretrained.choices.len(), 4);
        assert_eq!(pretrained.choices[0], "ResNet8 (32 units)");
        assert!(schema.field("Host").unwrap().choices.is_empty());
    }

    #[test]
    fn test_schema_carries_progress_contract() {
        let json = serde_json::to_value(FormSchema::new(&Settings::default())).unwrap();
        assert_eq!(json["progress_regex"], PROGRESS_REGEX);
        assert_eq!(json["groups"][0]["fields"][0]["widget"], "PasswordField");
    }
}
