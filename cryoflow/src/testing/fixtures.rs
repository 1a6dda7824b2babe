//! Test fixtures.

use crate::remote::ClassInfo;
use crate::settings::Settings;

/// Settings with every required field filled in.
#[must_use]
pub fn complete_settings() -> Settings {
    Settings {
        license: "lic-0001".to_string(),
        email: "ops@example.org".to_string(),
        password: "secret".to_string(),
        project_id: "P12".to_string(),
        workspace_title: "auto run".to_string(),
        micrographs_data_path: "/data/session1/*.mrc".to_string(),
        psize_a: Some(0.83),
        exec_path: "/opt/topaz/bin/topaz".to_string(),
        ..Settings::default()
    }
}

/// A class record.
#[must_use]
pub fn class_info(class_idx: u32, res_a: f64, num_particles_total: u64) -> ClassInfo {
    ClassInfo {
        class_idx,
        res_a,
        num_particles_total,
    }
}
