//! 2D class selection.
//!
//! A class is kept when its resolution lies strictly between 1 and 15 A and
//! it holds more than 100 particles.

use crate::errors::{RemoteError, Result};
use crate::remote::{ClassInfo, ComputeService, JobHandle};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

/// Lower resolution bound in Angstroms, exclusive.
pub const MIN_RESOLUTION_A: f64 = 1.0;
/// Upper resolution bound in Angstroms, exclusive.
pub const MAX_RESOLUTION_A: f64 = 15.0;
/// Particle count a class must exceed.
pub const MIN_PARTICLES: u64 = 100;

/// Returns true if the class should be selected.
#[must_use]
pub fn is_class_selected(class: &ClassInfo) -> bool {
    class.res_a > MIN_RESOLUTION_A
        && class.res_a < MAX_RESOLUTION_A
        && class.num_particles_total > MIN_PARTICLES
}

/// Outcome of an interactive selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionSummary {
    /// Number of classes the job reported.
    pub total_classes: usize,
    /// Indices of the classes marked selected.
    pub selected: Vec<u32>,
}

/// Drives a waiting selection job: reads class statistics, marks every class
/// passing [`is_class_selected`], then tells the job to finish.
pub async fn select_classes<S>(service: &S, job: &JobHandle) -> Result<SelectionSummary>
where
    S: ComputeService + ?Sized,
{
    let raw = service.interact(job, "get_class_info", json!({})).await?;
    let classes: Vec<ClassInfo> = serde_json::from_value(raw)
        .map_err(|e| RemoteError::unexpected("get_class_info", e.to_string()))?;

    let mut selected = Vec::new();
    for class in classes.iter().filter(|class| is_class_selected(class)) {
        debug!(
            class_idx = class.class_idx,
            res_a = class.res_a,
            particles = class.num_particles_total,
            "Selecting class"
        );
        service
            .interact(
                job,
                "set_class_selected",
                json!({ "class_idx": class.class_idx, "selected": true }),
            )
            .await?;
        selected.push(class.class_idx);
    }

    service.interact(job, "finish", json!({})).await?;

    info!(
        job = %job.uid,
        total = classes.len(),
        selected = selected.len(),
        "Class selection finished"
    );

    Ok(SelectionSummary {
        total_classes: classes.len(),
        selected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(res_a: f64, num_particles_total: u64) -> ClassInfo {
        ClassInfo {
            class_idx: 0,
            res_a,
            num_particles_total,
        }
    }

    #[test]
    fn test_typical_class_is_selected() {
        assert!(is_class_selected(&class(6.5, 2_000)));
    }

    #[test]
    fn test_resolution_bounds_are_exclusive() {
        assert!(!is_class_selected(&class(1.0, 500)));
        assert!(!is_class_selected(&class(15.0, 500)));
        assert!(is_class_selected(&class(1.000_001, 500)));
        assert!(is_class_selected(&class(14.999, 500)));
        assert!(!is_class_selected(&class(0.5, 500)));
        assert!(!is_class_selected(&class(30.0, 500)));
    }

    #[test]
    fn test_particle_count_must_exceed_100() {
        assert!(!is_class_selected(&class(8.0, 100)));
        assert!(is_class_selected(&class(8.0, 101)));
        assert!(!is_class_selected(&class(8.0, 0)));
    }
}
