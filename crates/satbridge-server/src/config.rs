//! Server configuration loaded from `SATBRIDGE_*` environment variables.
//!
//! Every value has a default so the server starts with no environment set.
//! Unparseable values fall back to the default.

use std::path::PathBuf;

use satbridge_solver::{InputMode, SolverConfig};
use tokio::sync::Semaphore;

/// Settings for the HTTP server and the solver it drives.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on concurrently running solver processes.
    pub max_concurrent_solvers: usize,
    /// Request body size limit in bytes.
    pub max_request_bytes: usize,
    /// Collapse operational errors into `"Unsatisfiable"` with HTTP 200.
    pub legacy_verdicts: bool,
    pub solver: SolverConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_concurrent_solvers: 4,
            max_request_bytes: 1_048_576,
            legacy_verdicts: false,
            solver: SolverConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
            raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
        }

        let defaults = ServerConfig::default();
        let solver_defaults = defaults.solver;

        let solver = SolverConfig {
            executable: get("SATBRIDGE_SOLVER_PATH")
                .map(PathBuf::from)
                .unwrap_or(solver_defaults.executable),
            args: get("SATBRIDGE_SOLVER_ARGS")
                .map(|raw| raw.split_whitespace().map(str::to_string).collect())
                .unwrap_or(solver_defaults.args),
            input_mode: parse_or::<InputMode>(
                get("SATBRIDGE_INPUT_MODE"),
                solver_defaults.input_mode,
            ),
            timeout_ms: parse_or(get("SATBRIDGE_TIMEOUT_MS"), solver_defaults.timeout_ms),
            staging_dir: get("SATBRIDGE_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or(solver_defaults.staging_dir),
            success_exit_code: parse_or(
                get("SATBRIDGE_SUCCESS_EXIT_CODE"),
                solver_defaults.success_exit_code,
            ),
            artifact_extension: get("SATBRIDGE_ARTIFACT_EXTENSION")
                .unwrap_or(solver_defaults.artifact_extension),
        };

        ServerConfig {
            host: get("SATBRIDGE_HOST").unwrap_or(defaults.host),
            port: parse_or(get("SATBRIDGE_PORT"), defaults.port),
            max_concurrent_solvers: parse_or(
                get("SATBRIDGE_MAX_CONCURRENT_SOLVERS"),
                defaults.max_concurrent_solvers,
            )
            .clamp(1, Semaphore::MAX_PERMITS),
            max_request_bytes: parse_or(
                get("SATBRIDGE_MAX_REQUEST_BYTES"),
                defaults.max_request_bytes,
            ),
            legacy_verdicts: get("SATBRIDGE_LEGACY_VERDICTS")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.legacy_verdicts),
            solver,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
