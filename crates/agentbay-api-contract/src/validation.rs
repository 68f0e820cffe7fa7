//! Validation helpers for API contract types
//!
//! These run client-side, before any request reaches the network. Rules the
//! `validator` derive cannot express (enumerated string values, page
//! bounds) are checked by hand here.

use crate::error::ContractError;
use crate::types::*;
use validator::Validate;

/// Validate a context sync binding: non-empty identity plus a legal
/// upload mode wherever a policy is attached.
pub fn validate_context_sync(sync: &ContextSync) -> Result<(), ContractError> {
    sync.validate()?;
    if let Some(policy) = sync.policy.as_ref() {
        UploadMode::parse(&policy.upload_policy.upload_mode)?;
    }
    Ok(())
}

/// Validate a session creation request, including every attached mount.
pub fn validate_create_session_request(
    request: &CreateSessionRequest,
) -> Result<(), ContractError> {
    request.validate()?;
    for sync in &request.context_syncs {
        validate_context_sync(sync)?;
    }
    Ok(())
}

/// Validate a status filter string against the fixed status set.
pub fn validate_status_filter(status: &str) -> Result<SessionStatus, ContractError> {
    SessionStatus::parse(status)
}

/// Reject non-positive page numbers; the server never sees them.
pub fn validate_page(page: Option<i64>) -> Result<(), ContractError> {
    match page {
        Some(p) if p < 1 => Err(ContractError::InvalidPage(p)),
        _ => Ok(()),
    }
}

/// Validate session list parameters: page bounds and the status filter.
pub fn validate_list_sessions_params(params: &ListSessionsParams) -> Result<(), ContractError> {
    validate_page(params.page)?;
    if let Some(status) = params.status.as_deref() {
        validate_status_filter(status)?;
    }
    Ok(())
}
