//! Client-facing result shapes
//!
//! Every operation returns a struct carrying the server's `request_id`
//! tracing token plus `success`/`error_message`. A `success == false`
//! result always has a non-empty message.

use agentbay_api_contract::{ApiResponse, ContractError};
use std::collections::HashMap;

use crate::error::{AgentBayError, AgentBayResult};

/// Result for operations that return no payload (delete, sync, update,
/// clear-async, set-labels).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    pub request_id: String,
    pub success: bool,
    pub error_message: Option<String>,
}

impl OperationResult {
    pub(crate) fn from_envelope<T>(envelope: ApiResponse<T>) -> Self {
        Self {
            request_id: envelope.request_id,
            success: envelope.success,
            error_message: fill_message(envelope.success, envelope.error_message),
        }
    }
}

/// Result for operations that resolve to a URL (session link, browser
/// endpoint, screenshots).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResult {
    pub request_id: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub url: Option<String>,
}

/// Result of reading a session's labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelsResult {
    pub request_id: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub labels: HashMap<String, String>,
}

/// A failed result must never be silent; backfill a generic message when
/// the server omitted one.
pub(crate) fn fill_message(success: bool, message: Option<String>) -> Option<String> {
    if success {
        message
    } else {
        match message {
            Some(m) if !m.is_empty() => Some(m),
            _ => Some("request failed without an error message".to_string()),
        }
    }
}

pub(crate) fn ensure_not_empty(value: &str, field: &'static str) -> AgentBayResult<()> {
    if value.is_empty() {
        Err(AgentBayError::Contract(ContractError::EmptyField(field)))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_results_always_carry_a_message() {
        assert_eq!(
            fill_message(false, None).unwrap(),
            "request failed without an error message"
        );
        assert_eq!(
            fill_message(false, Some("context is in-use".to_string())).unwrap(),
            "context is in-use"
        );
        assert!(fill_message(true, None).is_none());
    }

    #[test]
    fn empty_identifiers_are_rejected_client_side() {
        let err = ensure_not_empty("", "sessionId").unwrap_err();
        assert_eq!(err.to_string(), "sessionId cannot be empty");
        assert!(ensure_not_empty("sess-1", "sessionId").is_ok());
    }
}
