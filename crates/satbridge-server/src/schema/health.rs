//! API schema types for `GET /health`.

use serde::Serialize;

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    /// Configured solver executable.
    pub solver: String,
    /// Whether the executable resolves to an existing file.
    pub solver_present: bool,
    /// `"argument"` or `"stdin"`.
    pub input_mode: String,
    pub timeout_ms: u64,
    pub legacy_verdicts: bool,
    /// Solver slots currently free.
    pub available_slots: usize,
}
