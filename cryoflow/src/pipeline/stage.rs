//! The fixed stage table.

use super::params::job_params;
use crate::errors::{CryoflowError, Result};
use crate::remote::{Connection, JobHandle, JobRequest};
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies one of the eight processing stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    /// Import summed micrographs.
    ImportMicrographs,
    /// Per-micrograph CTF estimation.
    CtfEstimation,
    /// Topaz particle picking.
    TopazExtract,
    /// Particle extraction.
    ExtractParticles,
    /// 2D classification.
    Classify2D,
    /// Interactive 2D class selection.
    Select2D,
    /// Ab-initio reconstruction.
    AbinitReconstruction,
    /// Homogeneous refinement.
    HomoRefinement,
}

impl StageId {
    /// The name used in progress lines and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ImportMicrographs => "import_micrographs",
            Self::CtfEstimation => "ctf_estimation",
            Self::TopazExtract => "topaz_extract",
            Self::ExtractParticles => "extract_particles",
            Self::Classify2D => "twoD_classify",
            Self::Select2D => "select_2D",
            Self::AbinitReconstruction => "abinit_reconstruction",
            Self::HomoRefinement => "homo_refinement",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a stage's job is run once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// Queue on the workspace lane and wait for completion.
    Lane,
    /// Run directly, wait until it asks for input, select classes, then wait
    /// for completion.
    InteractiveSelection,
}

/// Connects an input slot to an output of an earlier stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpec {
    /// Input slot name on this stage's job.
    pub name: &'static str,
    /// The stage producing the output.
    pub source: StageId,
    /// Output group name on the source job.
    pub output: &'static str,
}

const fn input(name: &'static str, source: StageId, output: &'static str) -> InputSpec {
    InputSpec {
        name,
        source,
        output,
    }
}

/// Static description of one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSpec {
    /// Stage id.
    pub id: StageId,
    /// Remote job type.
    pub job_type: &'static str,
    /// Input connections.
    pub inputs: &'static [InputSpec],
    /// Output groups later stages may connect to.
    pub outputs: &'static [&'static str],
    /// How the job runs.
    pub execution: Execution,
}

/// The eight stages, in execution order.
pub const PIPELINE: [StageSpec; 8] = [
    StageSpec {
        id: StageId::ImportMicrographs,
        job_type: "import_micrographs",
        inputs: &[],
        outputs: &["imported_micrographs"],
        execution: Execution::Lane,
    },
    StageSpec {
        id: StageId::CtfEstimation,
        job_type: "ctf_estimation",
        inputs: &[input("exposures", StageId::ImportMicrographs, "imported_micrographs")],
        outputs: &["exposures_success"],
        execution: Execution::Lane,
    },
    StageSpec {
        id: StageId::TopazExtract,
        job_type: "topaz_extract",
        inputs: &[input("micrographs", StageId::CtfEstimation, "exposures_success")],
        outputs: &["micrographs", "particles"],
        execution: Execution::Lane,
    },
    StageSpec {
        id: StageId::ExtractParticles,
        job_type: "extract_micrographs_cpu_parallel",
        inputs: &[
            input("micrographs", StageId::TopazExtract, "micrographs"),
            input("particles", StageId::TopazExtract, "particles"),
        ],
        outputs: &["particles"],
        execution: Execution::Lane,
    },
    StageSpec {
        id: StageId::Classify2D,
        job_type: "class_2D",
        inputs: &[input("particles", StageId::ExtractParticles, "particles")],
        outputs: &["particles", "class_averages"],
        execution: Execution::Lane,
    },
    StageSpec {
        id: StageId::Select2D,
        job_type: "select_2D",
        inputs: &[
            input("particles", StageId::Classify2D, "particles"),
            input("templates", StageId::Classify2D, "class_averages"),
        ],
        outputs: &["particles_selected"],
        execution: Execution::InteractiveSelection,
    },
    StageSpec {
        id: StageId::AbinitReconstruction,
        job_type: "homo_abinit",
        inputs: &[input("particles", StageId::Select2D, "particles_selected")],
        outputs: &["particles_all_classes", "volume_class_0"],
        execution: Execution::Lane,
    },
    StageSpec {
        id: StageId::HomoRefinement,
        job_type: "homo_refine_new",
        inputs: &[
            input("particles", StageId::AbinitReconstruction, "particles_all_classes"),
            input("volume", StageId::AbinitReconstruction, "volume_class_0"),
        ],
        outputs: &["particles", "volume"],
        execution: Execution::Lane,
    },
];

/// Jobs created so far, by the stage that created them.
pub type StageJobs = BTreeMap<StageId, JobHandle>;

/// Checks that every input reads an output a strictly earlier stage declares.
pub fn validate_pipeline(stages: &[StageSpec]) -> Result<()> {
    for (position, stage) in stages.iter().enumerate() {
        for input in stage.inputs {
            let source = stages[..position]
                .iter()
                .find(|earlier| earlier.id == input.source)
                .ok_or_else(|| {
                    CryoflowError::invalid_pipeline(
                        stage.id.name(),
                        format!(
                            "input '{}' reads from '{}', which does not run earlier",
                            input.name, input.source
                        ),
                    )
                })?;

            if !source.outputs.contains(&input.output) {
                return Err(CryoflowError::invalid_pipeline(
                    stage.id.name(),
                    format!(
                        "input '{}' reads '{}', which '{}' does not produce",
                        input.name, input.output, input.source
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Builds the job request for `spec`, wiring inputs to the jobs in `jobs`.
pub fn build_request(spec: &StageSpec, settings: &Settings, jobs: &StageJobs) -> Result<JobRequest> {
    let mut request = JobRequest::new(spec.job_type).with_params(job_params(spec.id, settings)?);

    for input in spec.inputs {
        let source = jobs.get(&input.source).ok_or_else(|| {
            CryoflowError::invalid_pipeline(
                spec.id.name(),
                format!("no job from '{}' to connect '{}' to", input.source, input.name),
            )
        })?;
        request = request.connect(Connection {
            input: input.name.to_string(),
            source_job: source.uid.clone(),
            output: input.output.to_string(),
        });
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::complete_settings;

    fn job(uid: &str, job_type: &str) -> JobHandle {
        JobHandle {
            project_uid: "P12".to_string(),
            uid: uid.to_string(),
            job_type: job_type.to_string(),
        }
    }

    #[test]
    fn test_stage_names_match_log_names() {
        let names: Vec<_> = PIPELINE.iter().map(|s| s.id.name()).collect();
        assert_eq!(
            names,
            vec![
                "import_micrographs",
                "ctf_estimation",
                "topaz_extract",
                "extract_particles",
                "twoD_classify",
                "select_2D",
                "abinit_reconstruction",
                "homo_refinement",
            ]
        );
    }

    #[test]
    fn test_pipeline_is_valid() {
        assert!(validate_pipeline(&PIPELINE).is_ok());
    }

    #[test]
    fn test_pipeline_order() {
        let types: Vec<_> = PIPELINE.iter().map(|s| s.job_type).collect();
        assert_eq!(
            types,
            vec![
                "import_micrographs",
                "ctf_estimation",
                "topaz_extract",
                "extract_micrographs_cpu_parallel",
                "class_2D",
                "select_2D",
                "homo_abinit",
                "homo_refine_new",
            ]
        );
    }

    #[test]
    fn test_only_selection_is_interactive() {
        let interactive: Vec<_> = PIPELINE
            .iter()
            .filter(|s| s.execution == Execution::InteractiveSelection)
            .map(|s| s.id)
            .collect();
        assert_eq!(interactive, vec![StageId::Select2D]);
    }

    #[test]
    fn test_validate_rejects_forward_reference() {
        let mut stages = PIPELINE;
        stages.swap(1, 2);
        let err = validate_pipeline(&stages).unwrap_err();
        assert!(err.to_string().contains("topaz_extract"));
        assert!(err.to_string().contains("does not run earlier"));
    }

    #[test]
    fn test_validate_rejects_unknown_output() {
        const BAD_INPUTS: &[InputSpec] =
            &[input("exposures", StageId::ImportMicrographs, "movies")];
        let mut stages = PIPELINE;
        stages[1].inputs = BAD_INPUTS;
        let err = validate_pipeline(&stages).unwrap_err();
        assert!(err.to_string().contains("does not produce"));
    }

    #[test]
    fn test_build_request_wires_earlier_jobs() {
        let mut jobs = StageJobs::new();
        jobs.insert(StageId::AbinitReconstruction, job("J7", "homo_abinit"));

        let request = build_request(&PIPELINE[7], &complete_settings(), &jobs).unwrap();
        let groups = request.input_groups();
        assert_eq!(request.job_type, "homo_refine_new");
        assert_eq!(groups["particles"], vec!["J7.particles_all_classes"]);
        assert_eq!(groups["volume"], vec!["J7.volume_class_0"]);
    }

    #[test]
    fn test_build_request_without_source_job_fails() {
        let err = build_request(&PIPELINE[1], &complete_settings(), &StageJobs::new()).unwrap_err();
        assert!(matches!(err, CryoflowError::InvalidPipeline { .. }));
    }
}
