//! Error types for staging and solver invocation failure modes.

use std::path::PathBuf;

/// Errors that can occur while staging a formula for the solver.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// The staging directory could not be created or is not a directory.
    #[error("staging directory {} unavailable: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request-scoped artifact could not be created or written.
    #[error("failed to write staged artifact {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that prevent the solver from running to completion or timeout.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The executable does not exist or could not be spawned.
    #[error("failed to launch solver '{}': {source}", executable.display())]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The staged input could not be opened for streaming on stdin.
    #[error("failed to open staged input {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the spawned process failed.
    #[error("failed waiting on solver process: {0}")]
    Wait(#[source] std::io::Error),
}
