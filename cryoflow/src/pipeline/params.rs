//! Job parameters for each stage, taken from the settings.

use super::StageId;
use crate::errors::{Result, SettingsError};
use crate::settings::Settings;
use serde_json::{json, Map, Value};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Returns the parameter set the remote job for `stage` is created with.
pub fn job_params(stage: StageId, settings: &Settings) -> Result<Map<String, Value>> {
    let cpus = settings.compute_num_cpus;

    let params = match stage {
        StageId::ImportMicrographs => {
            let psize_a = settings.psize_a.ok_or_else(|| SettingsError::MissingRequired {
                fields: vec!["Pize_A".to_string()],
            })?;
            json!({
                "blob_paths": settings.micrographs_data_path,
                "psize_A": psize_a,
                "accel_kv": settings.accel_kv,
                "cs_mm": settings.cs_mm,
                "total_dose_e_per_A2": settings.dose_e_a2,
                "compute_num_cpus": cpus,
            })
        }
        StageId::CtfEstimation => json!({ "compute_num_cpus": cpus }),
        StageId::TopazExtract => json!({
            "exec_path": settings.exec_path,
            "num_distribute": cpus,
            "num_workers": cpus,
            "pretrained": settings.pretrained.label(),
            "scale": settings.downsample_scale,
            "radius": settings.extract_radius,
        }),
        StageId::ExtractParticles => json!({
            "box_size_pix": settings.box_size_pix,
            "compute_num_cores": cpus,
        }),
        StageId::Classify2D => json!({ "class2D_K": settings.class2d_k }),
        StageId::Select2D | StageId::AbinitReconstruction => json!({}),
        StageId::HomoRefinement => json!({
            "refine_symmetry": settings.refine_symmetry,
            "refine_defocus_refine": settings.refine_defocus_refine,
            "refine_ctf_global_refine": settings.refine_ctf_global_refine,
        }),
    };

    Ok(object(params))
}
