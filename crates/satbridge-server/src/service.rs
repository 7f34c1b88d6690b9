//! SolveService: the single coordinator between HTTP handlers and the solver
//! pipeline.
//!
//! All business logic flows through [`SolveService`]. Handlers are thin
//! wrappers that delegate to these methods.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::Instrument;
use uuid::Uuid;

use satbridge_solver::{FormulaRequest, SolvePipeline, SolverConfig, SolverLauncher, Stager, Verdict};

use crate::error::ApiError;
use crate::schema::health::HealthResponse;
use crate::schema::solve::{SolveRequest, SolveResponse};

/// Runs solver requests under a concurrency cap and maps verdicts to
/// responses.
pub struct SolveService {
    pipeline: SolvePipeline,
    solver: SolverConfig,
    slots: Arc<Semaphore>,
    legacy_verdicts: bool,
}

impl SolveService {
    pub fn new(solver: SolverConfig, max_concurrent: usize, legacy_verdicts: bool) -> Self {
        let pipeline = SolvePipeline::from_config(&solver);
        Self::with_pipeline(pipeline, solver, max_concurrent, legacy_verdicts)
    }

    /// Creates a service whose processes are started by `launcher` instead of
    /// the configured executable.
    pub fn with_launcher(
        solver: SolverConfig,
        launcher: Arc<dyn SolverLauncher>,
        max_concurrent: usize,
        legacy_verdicts: bool,
    ) -> Self {
        let pipeline = SolvePipeline::new(
            Stager::from_config(&solver),
            launcher,
            solver.timeout(),
            solver.success_exit_code,
        );
        Self::with_pipeline(pipeline, solver, max_concurrent, legacy_verdicts)
    }

    fn with_pipeline(
        pipeline: SolvePipeline,
        solver: SolverConfig,
        max_concurrent: usize,
        legacy_verdicts: bool,
    ) -> Self {
        SolveService {
            pipeline,
            solver,
            slots: Arc::new(Semaphore::new(max_concurrent.min(Semaphore::MAX_PERMITS))),
            legacy_verdicts,
        }
    }

    /// Solves one formula.
    ///
    /// The run happens on its own task that holds the solver slot, so a
    /// client disconnect cannot abandon a half-finished process: the run
    /// still ends by completion or timeout and cleans up after itself.
    pub async fn solve(&self, request: SolveRequest) -> Result<SolveResponse, ApiError> {
        let permit = self.slots.clone().try_acquire_owned().map_err(|_| {
            ApiError::Busy("too many concurrent solver runs".to_string())
        })?;

        let mut formula = FormulaRequest::new(request.input_text);
        formula.request_id = request.request_id.clone();

        let span = tracing::info_span!(
            "solve",
            request_id = request.request_id.as_deref().unwrap_or("-"),
            bytes = formula.text.len(),
        );
        let pipeline = self.pipeline.clone();
        let task = tokio::spawn(
            async move {
                let report = pipeline.solve(&formula).await;
                drop(permit);
                report
            }
            .instrument(span),
        );
        let report = task
            .await
            .map_err(|e| ApiError::InternalError(format!("solver task failed: {}", e)))?;

        let request_id = request
            .request_id
            .or(report.artifact_id)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        match report.verdict {
            Verdict::Satisfiable | Verdict::Unsatisfiable => Ok(SolveResponse {
                output_text: report.verdict.label().to_string(),
                request_id,
                elapsed_ms: report.elapsed_ms,
                error: None,
            }),
            Verdict::Error(reason) => {
                let err = ApiError::from(reason);
                if self.legacy_verdicts {
                    Ok(SolveResponse {
                        output_text: Verdict::Unsatisfiable.label().to_string(),
                        request_id,
                        elapsed_ms: report.elapsed_ms,
                        error: Some(err.detail()),
                    })
                } else {
                    Err(err)
                }
            }
        }
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            ok: true,
            solver: self.solver.executable.display().to_string(),
            solver_present: executable_present(&self.solver.executable),
            input_mode: self.solver.input_mode.as_str().to_string(),
            timeout_ms: self.solver.timeout_ms,
            legacy_verdicts: self.legacy_verdicts,
            available_slots: self.slots.available_permits(),
        }
    }
}

/// Resolves `executable` the way a spawn would: paths are checked directly,
/// bare names are searched on `PATH`.
fn executable_present(executable: &Path) -> bool {
    if executable.components().count() > 1 {
        return executable.is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(executable).is_file()))
        .unwrap_or(false)
}
