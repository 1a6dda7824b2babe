//! The end-to-end run: workspace setup followed by the eight stages.

use super::runner::run_stage;
use super::selection::{select_classes, SelectionSummary};
use super::stage::{build_request, validate_pipeline, Execution, StageId, StageJobs, StageSpec, PIPELINE};
use super::wait::{wait_for_done, wait_for_status, WaitOptions};
use crate::errors::{CryoflowError, Result};
use crate::events::{Progress, ProgressSink, StageTiming};
use crate::remote::{ComputeService, JobHandle, JobStatus, Lane, ProjectInfo, Session, Workspace};
use crate::settings::Settings;
use crate::utils::generate_run_id;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Steps reported to the progress bar: workspace setup plus every stage.
pub const TOTAL_STEPS: usize = PIPELINE.len() + 1;

/// Name reported for the login and workspace setup step.
pub const SETUP_STEP: &str = "create_cryosparc_workspace";

/// Where the run's jobs live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceContext {
    /// The authenticated session.
    pub session: Session,
    /// The project jobs are created in.
    pub project: ProjectInfo,
    /// The workspace created for this run.
    pub workspace: Workspace,
    /// The lane jobs are queued on.
    pub lane: Lane,
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct WorkflowReport {
    /// Id correlating this run's log lines.
    pub run_id: Uuid,
    /// Workspace details.
    pub context: WorkspaceContext,
    /// Jobs by stage.
    pub jobs: StageJobs,
    /// Timing of every step, setup first.
    pub timings: Vec<StageTiming>,
    /// Final progress count.
    pub progress: Progress,
    /// Result of the 2D class selection.
    pub selection: SelectionSummary,
}

impl WorkflowReport {
    /// The final refinement job.
    #[must_use]
    pub fn refinement_job(&self) -> Option<&JobHandle> {
        self.jobs.get(&StageId::HomoRefinement)
    }
}

struct StageOutcome {
    job: JobHandle,
    selection: Option<SelectionSummary>,
}

/// Runs the fixed pipeline against a compute service.
pub struct Workflow<'a, S: ComputeService + ?Sized> {
    service: &'a S,
    settings: &'a Settings,
    sink: &'a dyn ProgressSink,
    wait: WaitOptions,
}

impl<'a, S: ComputeService + ?Sized> Workflow<'a, S> {
    /// Creates a workflow with default polling.
    pub fn new(service: &'a S, settings: &'a Settings, sink: &'a dyn ProgressSink) -> Self {
        Self {
            service,
            settings,
            sink,
            wait: WaitOptions::default(),
        }
    }

    /// Sets how job status is polled.
    #[must_use]
    pub fn with_wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Runs setup and all stages in order. The first error aborts the run;
    /// jobs and the workspace already created are left as they are.
    pub async fn run(&self) -> Result<WorkflowReport> {
        validate_pipeline(&PIPELINE)?;

        let run_id = generate_run_id();
        let span = info_span!(
            "workflow",
            run_id = %run_id,
            project = %self.settings.project_id
        );
        self.run_steps(run_id).instrument(span).await
    }

    async fn run_steps(&self, run_id: Uuid) -> Result<WorkflowReport> {
        let mut timings = Vec::with_capacity(TOTAL_STEPS);

        let setup = run_stage(SETUP_STEP, Progress::new(TOTAL_STEPS), self.sink, || {
            self.create_workspace()
        })
        .await?;
        let context = setup.value;
        let mut progress = setup.progress;
        timings.push(setup.timing);

        let mut jobs = StageJobs::new();
        let mut selection = SelectionSummary::default();
        for spec in &PIPELINE {
            let run = run_stage(spec.id.name(), progress, self.sink, || {
                self.run_pipeline_stage(spec, &context, &jobs)
            })
            .await?;

            progress = run.progress;
            timings.push(run.timing);
            if let Some(summary) = run.value.selection {
                selection = summary;
            }
            jobs.insert(spec.id, run.value.job);
        }

        info!(
            workspace = %context.workspace.uid,
            jobs = jobs.len(),
            "Workflow finished"
        );

        Ok(WorkflowReport {
            run_id,
            context,
            jobs,
            timings,
            progress,
            selection,
        })
    }

    async fn create_workspace(&self) -> Result<WorkspaceContext> {
        let settings = self.settings;
        let user_id = self.service.login(&settings.credentials()).await?;
        let project = self.service.find_project(&settings.project_id).await?;

        let session = Session {
            user_id,
            project_uid: settings.project_id.clone(),
        };
        let workspace = self
            .service
            .create_workspace(&session, &settings.workspace_title, &settings.workspace_desc)
            .await?;
        let lane = self
            .service
            .lanes()
            .await?
            .into_iter()
            .next()
            .ok_or(CryoflowError::NoLanes)?;

        info!(
            project = %project.uid,
            workspace = %workspace.uid,
            lane = %lane.name,
            "Workspace ready"
        );

        Ok(WorkspaceContext {
            session,
            project,
            workspace,
            lane,
        })
    }

    async fn run_pipeline_stage(
        &self,
        spec: &StageSpec,
        context: &WorkspaceContext,
        jobs: &StageJobs,
    ) -> Result<StageOutcome> {
        let request = build_request(spec, self.settings, jobs)?;
        let job = self
            .service
            .create_job(&context.session, &context.workspace, &request)
            .await?;
        info!(job = %job.uid, job_type = %job.job_type, "Job created");

        match spec.execution {
            Execution::Lane => {
                self.service
                    .queue_job(&context.session, &job, Some(context.lane.name.as_str()))
                    .await?;
                wait_for_done(self.service, &job, self.wait).await?;
                Ok(StageOutcome {
                    job,
                    selection: None,
                })
            }
            Execution::InteractiveSelection => {
                self.service.queue_job(&context.session, &job, None).await?;
                wait_for_status(self.service, &job, JobStatus::Waiting, self.wait).await?;
                let summary = select_classes(self.service, &job).await?;
                wait_for_done(self.service, &job, self.wait).await?;
                Ok(StageOutcome {
                    job,
                    selection: Some(summary),
                })
            }
        }
    }
}
