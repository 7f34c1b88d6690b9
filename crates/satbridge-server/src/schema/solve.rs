//! API schema types for `POST /process_text`.

use serde::{Deserialize, Serialize};

use crate::error::ApiErrorDetail;

/// Request body for `POST /process_text`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    /// Formula text, passed to the solver byte-for-byte. May be empty.
    pub input_text: String,

    /// Optional caller-chosen identifier, echoed back and used to label the
    /// staged artifact.
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Response body for `POST /process_text`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResponse {
    /// `"Satisfiable"` or `"Unsatisfiable"`.
    pub output_text: String,

    /// Caller-supplied id, or the staged artifact's identity.
    pub request_id: String,

    /// Wall-clock time spent staging, solving and cleaning up.
    pub elapsed_ms: u64,

    /// Present only in legacy verdict mode when the solver did not produce an
    /// answer; `output_text` is then `"Unsatisfiable"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorDetail>,
}
