//! Client error types
//!
//! The error channel carries only client-side validation failures and
//! transport problems. Expected server outcomes (not found, context in-use,
//! poll timeout) are structured results with `success == false`; see the
//! result types in `session` and `context`.

use agentbay_api_contract::ContractError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentBayError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("unexpected response from server: {0}")]
    UnexpectedResponse(String),
}

pub type AgentBayResult<T> = Result<T, AgentBayError>;
