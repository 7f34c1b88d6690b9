//! Raw solver outcomes and their interpretation into verdicts.
//!
//! [`interpret`] is the single mapping rule from a captured [`SolverOutcome`]
//! to a [`Verdict`]. It deliberately treats every run that completed with the
//! success exit status but did not print `SAT` as [`Verdict::Unsatisfiable`]:
//! empty output, `UNSAT`, and unrecognised text all land there. Operational
//! failures (staging, launch, timeout, non-success exit) are kept apart as
//! [`Verdict::Error`] so callers can tell a negative answer from a fault.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The token a solver prints on stdout for a satisfiable formula.
pub const SAT_TOKEN: &str = "SAT";

const STDERR_EXCERPT_LEN: usize = 512;

/// Captured result of one solver run. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverOutcome {
    /// Exit status, or `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
}

impl SolverOutcome {
    pub fn completed(exit_code: i32, stdout: impl Into<Vec<u8>>) -> Self {
        SolverOutcome {
            exit_code: Some(exit_code),
            stdout: stdout.into(),
            stderr: Vec::new(),
            timed_out: false,
        }
    }

    pub fn timed_out() -> Self {
        SolverOutcome {
            exit_code: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            timed_out: true,
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<Vec<u8>>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Stdout as text with surrounding whitespace removed.
    pub fn trimmed_stdout(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }

    /// Leading part of stderr, lossily decoded, for diagnostics.
    pub fn stderr_excerpt(&self) -> String {
        let text = String::from_utf8_lossy(&self.stderr);
        let text = text.trim();
        match text.char_indices().nth(STDERR_EXCERPT_LEN) {
            Some((idx, _)) => format!("{}...", &text[..idx]),
            None => text.to_string(),
        }
    }
}

/// Why a run produced no satisfiability answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorReason {
    /// The formula could not be staged; no process was launched.
    Staging { message: String },
    /// The solver executable could not be started.
    Launch { message: String },
    /// The solver exceeded its time bound and was killed.
    Timeout { timeout_ms: u64 },
    /// The solver exited with a status other than the designated success one.
    SolverFailed {
        exit_code: Option<i32>,
        stderr: String,
    },
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorReason::Staging { message } => write!(f, "staging failed: {}", message),
            ErrorReason::Launch { message } => write!(f, "solver launch failed: {}", message),
            ErrorReason::Timeout { timeout_ms } => {
                write!(f, "solver timed out after {} ms", timeout_ms)
            }
            ErrorReason::SolverFailed { exit_code, stderr } => {
                match exit_code {
                    Some(code) => write!(f, "solver exited with status {}", code)?,
                    None => write!(f, "solver terminated by signal")?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
        }
    }
}

/// Final answer for one formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Satisfiable,
    Unsatisfiable,
    Error(ErrorReason),
}

impl Verdict {
    /// Caller-facing label. Errors collapse to `"Unsatisfiable"`, matching
    /// what legacy callers expect.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Satisfiable => "Satisfiable",
            Verdict::Unsatisfiable | Verdict::Error(_) => "Unsatisfiable",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Verdict::Error(_))
    }
}

/// Maps a captured outcome to a verdict.
///
/// Order of checks: timeout, then exit status, then the stdout token.
/// `Satisfiable` requires a completed run with `success_exit_code` and a
/// trimmed stdout equal to [`SAT_TOKEN`].
pub fn interpret(outcome: &SolverOutcome, success_exit_code: i32, timeout_ms: u64) -> Verdict {
    if outcome.timed_out {
        return Verdict::Error(ErrorReason::Timeout { timeout_ms });
    }
    if outcome.exit_code != Some(success_exit_code) {
        return Verdict::Error(ErrorReason::SolverFailed {
            exit_code: outcome.exit_code,
            stderr: outcome.stderr_excerpt(),
        });
    }
    if outcome.trimmed_stdout() == SAT_TOKEN {
        Verdict::Satisfiable
    } else {
        Verdict::Unsatisfiable
    }
}
