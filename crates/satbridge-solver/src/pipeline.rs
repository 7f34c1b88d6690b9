//! The stage → invoke → interpret → release pipeline for one formula.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::SolverConfig;
use crate::launcher::{ProcessLauncher, SolverLauncher};
use crate::stage::{FormulaRequest, Stager};
use crate::verdict::{interpret, ErrorReason, SolverOutcome, Verdict};

/// Result of solving one formula, with bookkeeping for logs and responses.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub verdict: Verdict,
    /// Identity of the staged artifact, or `None` if staging failed.
    pub artifact_id: Option<String>,
    /// Raw process outcome, when the solver actually ran.
    pub outcome: Option<SolverOutcome>,
    pub elapsed_ms: u64,
}

/// Orchestrates staging, solver invocation and interpretation.
///
/// Holds no per-request state; one instance serves any number of concurrent
/// `solve` calls.
#[derive(Clone)]
pub struct SolvePipeline {
    stager: Stager,
    launcher: Arc<dyn SolverLauncher>,
    timeout: Duration,
    success_exit_code: i32,
}

impl SolvePipeline {
    pub fn new(
        stager: Stager,
        launcher: Arc<dyn SolverLauncher>,
        timeout: Duration,
        success_exit_code: i32,
    ) -> Self {
        SolvePipeline {
            stager,
            launcher,
            timeout,
            success_exit_code,
        }
    }

    /// Builds a pipeline around a real [`ProcessLauncher`].
    pub fn from_config(config: &SolverConfig) -> Self {
        SolvePipeline::new(
            Stager::from_config(config),
            Arc::new(ProcessLauncher::from_config(config)),
            config.timeout(),
            config.success_exit_code,
        )
    }

    /// Solves one formula. Never fails: every fault becomes [`Verdict::Error`].
    ///
    /// The staged artifact is released before returning on every path; if
    /// the future is dropped mid-run, the artifact's `Drop` releases it.
    pub async fn solve(&self, request: &FormulaRequest) -> SolveReport {
        let start = Instant::now();
        let timeout_ms = self.timeout.as_millis() as u64;

        let mut staged = match self.stager.stage(request) {
            Ok(staged) => staged,
            Err(err) => {
                tracing::error!(error = %err, "staging failed; solver not launched");
                return SolveReport {
                    verdict: Verdict::Error(ErrorReason::Staging {
                        message: err.to_string(),
                    }),
                    artifact_id: None,
                    outcome: None,
                    elapsed_ms: start.elapsed().as_millis() as u64,
                };
            }
        };
        let artifact_id = staged.id().to_string();

        let launched = self.launcher.launch(&staged, self.timeout).await;
        staged.release();

        let (verdict, outcome) = match launched {
            Ok(outcome) => (
                interpret(&outcome, self.success_exit_code, timeout_ms),
                Some(outcome),
            ),
            Err(err) => {
                tracing::error!(artifact = %artifact_id, error = %err, "solver launch failed");
                (
                    Verdict::Error(ErrorReason::Launch {
                        message: err.to_string(),
                    }),
                    None,
                )
            }
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &verdict {
            Verdict::Error(reason) => {
                tracing::warn!(artifact = %artifact_id, elapsed_ms, %reason, "solve failed");
            }
            verdict => {
                tracing::info!(
                    artifact = %artifact_id,
                    elapsed_ms,
                    verdict = verdict.label(),
                    "solve finished"
                );
            }
        }

        SolveReport {
            verdict,
            artifact_id: Some(artifact_id),
            outcome,
            elapsed_ms,
        }
    }
}
