//! Orchestration of an external SAT/LTL solver executable.
//!
//! A formula is staged into a request-scoped file, the configured solver is
//! run against it under a wall-clock bound, and the captured outcome is mapped
//! to a [`Verdict`]. The solver itself is opaque: it reads a formula and
//! prints `SAT` (or anything else) on stdout.
//!
//! # Modules
//!
//! - [`config`] -- Solver path, arguments, input mode, timeout and staging directory
//! - [`stage`] -- Collision-free artifact staging and idempotent release
//! - [`launcher`] -- The [`SolverLauncher`] seam and the real process launcher
//! - [`verdict`] -- Outcome capture and the outcome-to-verdict mapping rule
//! - [`pipeline`] -- Stage, invoke, interpret, release
//! - [`error`] -- Staging and launch error types

pub mod config;
pub mod error;
pub mod launcher;
pub mod pipeline;
pub mod stage;
pub mod verdict;

pub use config::{InputMode, SolverConfig};
pub use error::{LaunchError, StageError};
pub use launcher::{ProcessLauncher, SolverLauncher};
pub use pipeline::{SolvePipeline, SolveReport};
pub use stage::{FormulaRequest, StagedInput, Stager};
pub use verdict::{interpret, ErrorReason, SolverOutcome, Verdict, SAT_TOKEN};
