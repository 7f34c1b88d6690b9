//! Request-scoped staging of formula text for the external solver.
//!
//! Every call to [`Stager::stage`] writes a fresh artifact whose name embeds a
//! UUID v4, opened with create-new semantics so a staged file can never be
//! shared with or overwritten by another request. The returned
//! [`StagedInput`] owns the artifact and removes it on [`StagedInput::release`]
//! or on drop, whichever happens first.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::SolverConfig;
use crate::error::StageError;

const MAX_LABEL_LEN: usize = 32;
const DEFAULT_LABEL: &str = "formula";

/// A formula submitted for solving.
///
/// `text` is opaque bytes: it is staged byte-for-byte and never checked for
/// encoding or well-formedness here.
#[derive(Debug, Clone, Default)]
pub struct FormulaRequest {
    pub text: Vec<u8>,
    /// Caller-supplied identifier, used as a readable prefix of the artifact name.
    pub request_id: Option<String>,
}

impl FormulaRequest {
    pub fn new(text: impl Into<Vec<u8>>) -> Self {
        FormulaRequest {
            text: text.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }
}

/// Writes formulas into a staging directory.
#[derive(Debug, Clone)]
pub struct Stager {
    dir: PathBuf,
    extension: String,
}

impl Stager {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Stager {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Stager::new(&config.staging_dir, &config.artifact_extension)
    }

    /// Stages `request.text` into a new uniquely named artifact.
    ///
    /// The staging directory is created if missing. If the artifact is created
    /// but cannot be fully written, it is removed before the error is returned.
    pub fn stage(&self, request: &FormulaRequest) -> Result<StagedInput, StageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StageError::Directory {
            path: self.dir.clone(),
            source,
        })?;

        let label = artifact_label(request.request_id.as_deref());
        let id = format!("{}-{}", label, Uuid::new_v4().simple());
        let file_name = if self.extension.is_empty() {
            id.clone()
        } else {
            format!("{}.{}", id, self.extension)
        };
        let path = self.dir.join(file_name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| StageError::Write {
                path: path.clone(),
                source,
            })?;

        // From here on the artifact exists, so ownership passes to the handle
        // and an early return drops (and removes) it.
        let staged = StagedInput {
            id,
            path,
            len: request.text.len() as u64,
            released: false,
        };

        file.write_all(&request.text)
            .and_then(|_| file.flush())
            .map_err(|source| StageError::Write {
                path: staged.path.clone(),
                source,
            })?;

        tracing::debug!(
            artifact = %staged.path.display(),
            bytes = staged.len,
            "staged formula"
        );
        Ok(staged)
    }
}

/// Handle to one staged artifact, owned by the request that created it.
#[derive(Debug)]
pub struct StagedInput {
    id: String,
    path: PathBuf,
    len: u64,
    released: bool,
}

impl StagedInput {
    /// Unique artifact identity (the file stem).
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of formula bytes staged.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Removes the artifact. Safe to call any number of times.
    ///
    /// An artifact that is already gone counts as released. Other removal
    /// failures are logged and swallowed: cleanup never fails a request.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(artifact = %self.path.display(), "released staged artifact");
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(
                    artifact = %self.path.display(),
                    error = %err,
                    "failed to remove staged artifact"
                );
            }
        }
    }
}

impl Drop for StagedInput {
    fn drop(&mut self) {
        self.release();
    }
}

/// Reduces a caller-supplied id to a short filesystem-safe label.
fn artifact_label(request_id: Option<&str>) -> String {
    let label: String = request_id
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(MAX_LABEL_LEN)
        .collect();
    if label.is_empty() {
        DEFAULT_LABEL.to_string()
    } else {
        label
    }
}
