//! External solver process launching.
//!
//! [`SolverLauncher`] is the capability seam between the pipeline and the
//! operating system: production code uses [`ProcessLauncher`], tests swap in
//! doubles. A launcher either returns a captured [`SolverOutcome`] (completed
//! or timed out) or a [`LaunchError`] when no run could take place.
//!
//! [`ProcessLauncher`] spawns the solver as the leader of a fresh process
//! group. Once the solver exits or times out, the whole group receives
//! `SIGKILL`, so helpers forked by the solver die with it and release the
//! output pipes.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

use crate::config::{InputMode, SolverConfig};
use crate::error::LaunchError;
use crate::stage::StagedInput;
use crate::verdict::SolverOutcome;

/// How long to keep draining stdout/stderr after the process has exited.
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Runs a solver against a staged input within a time bound.
#[async_trait]
pub trait SolverLauncher: Send + Sync {
    async fn launch(
        &self,
        staged: &StagedInput,
        timeout: Duration,
    ) -> Result<SolverOutcome, LaunchError>;
}

/// Launches a real executable via `tokio::process`.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    executable: PathBuf,
    args: Vec<String>,
    input_mode: InputMode,
}

impl ProcessLauncher {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        ProcessLauncher {
            executable: executable.into(),
            args: Vec::new(),
            input_mode: InputMode::Argument,
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        ProcessLauncher {
            executable: config.executable.clone(),
            args: config.args.clone(),
            input_mode: config.input_mode,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_input_mode(mut self, mode: InputMode) -> Self {
        self.input_mode = mode;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Builds the command line for `staged` without spawning it.
    pub fn command(&self, staged: &StagedInput) -> Result<tokio::process::Command, LaunchError> {
        let mut std_cmd = std::process::Command::new(&self.executable);
        std_cmd.args(&self.args);

        match self.input_mode {
            InputMode::Argument => {
                std_cmd.arg(staged.path());
                std_cmd.stdin(Stdio::null());
            }
            InputMode::Stdin => {
                let file =
                    std::fs::File::open(staged.path()).map_err(|source| LaunchError::Input {
                        path: staged.path().to_path_buf(),
                        source,
                    })?;
                std_cmd.stdin(Stdio::from(file));
            }
        }
        std_cmd.stdout(Stdio::piped());
        std_cmd.stderr(Stdio::piped());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            std_cmd.process_group(0);
        }

        let mut cmd = tokio::process::Command::from(std_cmd);
        cmd.kill_on_drop(true);
        Ok(cmd)
    }
}

#[async_trait]
impl SolverLauncher for ProcessLauncher {
    async fn launch(
        &self,
        staged: &StagedInput,
        timeout: Duration,
    ) -> Result<SolverOutcome, LaunchError> {
        let mut cmd = self.command(staged)?;
        let start = Instant::now();

        let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            executable: self.executable.clone(),
            source,
        })?;
        let pid = child.id();
        tracing::debug!(
            solver = %self.executable.display(),
            pid,
            artifact = staged.id(),
            "solver launched"
        );

        let stdout = PipeCapture::spawn(child.stdout.take());
        let stderr = PipeCapture::spawn(child.stderr.take());

        let (exit_code, timed_out) = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => {
                let status = status.map_err(LaunchError::Wait)?;
                // Background helpers may still hold stdout open.
                kill_process_group(pid);
                (status.code(), false)
            }
            Err(_) => {
                kill_process_group(pid);
                if let Err(err) = child.kill().await {
                    tracing::debug!(pid, error = %err, "solver already gone after group kill");
                }
                (None, true)
            }
        };

        let stdout = stdout.finish().await;
        let stderr = stderr.finish().await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if timed_out {
            tracing::warn!(
                solver = %self.executable.display(),
                pid,
                elapsed_ms,
                "solver timed out; process group killed"
            );
        } else {
            tracing::debug!(pid, exit_code, elapsed_ms, "solver exited");
        }

        Ok(SolverOutcome {
            exit_code,
            stdout,
            stderr,
            timed_out,
        })
    }
}

/// Reads one solver pipe on its own task into a buffer shared with the
/// launcher, so bytes already read survive if the reader is abandoned.
struct PipeCapture {
    bytes: Arc<Mutex<Vec<u8>>>,
    task: JoinHandle<()>,
}

impl PipeCapture {
    fn spawn<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let bytes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&bytes);
        let task = tokio::spawn(async move {
            let Some(mut pipe) = pipe else {
                return;
            };
            let mut chunk = [0u8; 4096];
            loop {
                match pipe.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => sink
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend_from_slice(&chunk[..n]),
                    Err(err) => {
                        tracing::debug!(error = %err, "solver pipe read ended early");
                        break;
                    }
                }
            }
        });
        PipeCapture { bytes, task }
    }

    /// Waits up to [`PIPE_DRAIN_GRACE`] for end of stream, then returns
    /// everything read so far.
    async fn finish(mut self) -> Vec<u8> {
        if tokio::time::timeout(PIPE_DRAIN_GRACE, &mut self.task)
            .await
            .is_err()
        {
            self.task.abort();
            tracing::debug!("solver pipe still open after exit; keeping partial output");
        }
        let mut bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *bytes)
    }
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pid) = pid else {
        return;
    };
    // The solver leads its own group, so its pid is the group id.
    let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        tracing::debug!(pid, error = %err, "killpg failed");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
