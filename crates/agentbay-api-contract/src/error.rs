//! Error types for API contract validation and parsing

use thiserror::Error;

/// Errors that can occur during API contract validation and parsing
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid uploadMode value: {0}. Valid values are: \"File\", \"Archive\"")]
    InvalidUploadMode(String),

    #[error("invalid session status '{0}'")]
    InvalidSessionStatus(String),

    #[error("invalid task type '{0}'")]
    InvalidTaskType(String),

    #[error("page must be >= 1, got {0}")]
    InvalidPage(i64),

    #[error("poll interval must be a positive number of seconds, got {0}")]
    InvalidPollInterval(f64),

    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
}

/// Problem+JSON error response format as per RFC 7807
///
/// The service attaches its tracing token as `requestId` so that failed
/// round trips are still diagnosable.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}
