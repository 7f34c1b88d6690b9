//! Binary entrypoint for the satbridge HTTP server.
//!
//! Reads configuration from `SATBRIDGE_*` environment variables (see
//! [`ServerConfig`]); logging verbosity follows `RUST_LOG`.

use satbridge_server::config::ServerConfig;
use satbridge_server::router::build_router;
use satbridge_server::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "satbridge_server=info,satbridge_solver=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        solver = %config.solver.executable.display(),
        input_mode = config.solver.input_mode.as_str(),
        timeout_ms = config.solver.timeout_ms,
        staging_dir = %config.solver.staging_dir.display(),
        max_concurrent_solvers = config.max_concurrent_solvers,
        legacy_verdicts = config.legacy_verdicts,
        "server config loaded"
    );

    // Staging failures are reported per request; this only warns early.
    if let Err(err) = std::fs::create_dir_all(&config.solver.staging_dir) {
        tracing::warn!(
            staging_dir = %config.solver.staging_dir.display(),
            error = %err,
            "staging directory is not usable"
        );
    }

    let addr = config.bind_addr();
    let state = AppState::new(config);
    if !state.service.health().solver_present {
        tracing::warn!("solver executable not found; requests will fail until it is installed");
    }
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind server address");
    tracing::info!("satbridge server listening on {}", addr);
    axum::serve(listener, app).await.expect("server failed");
}
