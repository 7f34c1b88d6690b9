//! Solver configuration shared by the server and the CLI.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the staged formula is handed to the solver process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Pass the staged artifact's path as the final command-line argument.
    #[default]
    Argument,
    /// Stream the staged artifact's bytes on the solver's stdin.
    Stdin,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Argument => "argument",
            InputMode::Stdin => "stdin",
        }
    }
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "argument" | "arg" | "path" => Ok(InputMode::Argument),
            "stdin" => Ok(InputMode::Stdin),
            other => Err(format!(
                "invalid input mode '{}': expected 'argument' or 'stdin'",
                other
            )),
        }
    }
}

/// Everything needed to stage a formula and run one external solver build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Path (or `PATH`-resolved name) of the solver executable.
    pub executable: PathBuf,

    /// Extra arguments placed before the staged input path.
    pub args: Vec<String>,

    /// How the staged input reaches the solver.
    pub input_mode: InputMode,

    /// Wall-clock bound for a single solver run, in milliseconds.
    pub timeout_ms: u64,

    /// Directory holding request-scoped artifacts.
    pub staging_dir: PathBuf,

    /// Exit status the solver uses when it ran to completion.
    pub success_exit_code: i32,

    /// File extension given to staged artifacts (without the dot).
    pub artifact_extension: String,
}

impl SolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            executable: PathBuf::from("LTLSolver"),
            args: Vec::new(),
            input_mode: InputMode::Argument,
            timeout_ms: 30_000,
            staging_dir: std::env::temp_dir().join("satbridge"),
            success_exit_code: 0,
            artifact_extension: "cnf".to_string(),
        }
    }
}
