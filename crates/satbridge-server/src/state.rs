//! Application state shared by all handlers.
//!
//! [`AppState`] holds the [`SolveService`] behind an `Arc`. The service keeps
//! no per-request mutable state, so no lock is needed: concurrent requests
//! only contend for solver slots, which the service's semaphore hands out.

use std::sync::Arc;

use satbridge_solver::SolverLauncher;

use crate::config::ServerConfig;
use crate::service::SolveService;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// The shared solve service.
    pub service: Arc<SolveService>,
    /// Configuration the server was started with.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Creates state that launches the configured solver executable.
    pub fn new(config: ServerConfig) -> Self {
        let service = SolveService::new(
            config.solver.clone(),
            config.max_concurrent_solvers,
            config.legacy_verdicts,
        );
        AppState {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }

    /// Creates state whose solver runs go through `launcher` (for testing).
    pub fn with_launcher(config: ServerConfig, launcher: Arc<dyn SolverLauncher>) -> Self {
        let service = SolveService::with_launcher(
            config.solver.clone(),
            launcher,
            config.max_concurrent_solvers,
            config.legacy_verdicts,
        );
        AppState {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}
