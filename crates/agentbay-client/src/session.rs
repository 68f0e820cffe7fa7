//! Session lifecycle client
//!
//! The session state machine lives server-side; this client issues
//! commands and observes the reported status, polling to a terminal state
//! for `pause` and `resume`.

use agentbay_api_contract::{
    validation::validate_create_session_request, ApiResponse, CreateSessionRequest,
    LabelsData, LinkData, ListSessionsParams, SessionInfo, SessionListData, SessionStatus,
    StatusData,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::capability::{Browser, Command, Computer, FileSystem, Mobile};
use crate::client::AgentBayClient;
use crate::error::AgentBayResult;
use crate::poll::{interval_from_secs, poll_until};
use crate::result::{ensure_not_empty, fill_message, LabelsResult, LinkResult, OperationResult};

/// Capability names the service advertises on a created session.
mod capability_names {
    pub const FILE_SYSTEM: &str = "fileSystem";
    pub const COMMAND: &str = "command";
    pub const BROWSER: &str = "browser";
    pub const COMPUTER: &str = "computer";
    pub const MOBILE: &str = "mobile";
}

/// Handle to a remote session
///
/// Capability sub-clients are `None` when the session's image does not
/// provide them; each holds only the session id and the shared transport.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub status: SessionStatus,
    pub image_id: Option<String>,
    pub labels: HashMap<String, String>,
    pub file_system: Option<FileSystem>,
    pub command: Option<Command>,
    pub browser: Option<Browser>,
    pub computer: Option<Computer>,
    pub mobile: Option<Mobile>,
}

impl Session {
    fn from_info(info: SessionInfo, client: &Arc<AgentBayClient>) -> Self {
        let has = |name: &str| info.capabilities.iter().any(|c| c == name);
        Self {
            file_system: has(capability_names::FILE_SYSTEM)
                .then(|| FileSystem::new(info.session_id.clone(), Arc::clone(client))),
            command: has(capability_names::COMMAND)
                .then(|| Command::new(info.session_id.clone(), Arc::clone(client))),
            browser: has(capability_names::BROWSER)
                .then(|| Browser::new(info.session_id.clone(), Arc::clone(client))),
            computer: has(capability_names::COMPUTER)
                .then(|| Computer::new(info.session_id.clone(), Arc::clone(client))),
            mobile: has(capability_names::MOBILE)
                .then(|| Mobile::new(info.session_id.clone(), Arc::clone(client))),
            id: info.session_id,
            status: info.status,
            image_id: info.image_id,
            labels: info.labels,
        }
    }
}

/// Result of `create` and `get`
#[derive(Debug, Clone)]
pub struct SessionResult {
    pub request_id: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub session: Option<Session>,
}

pub type GetSessionResult = SessionResult;

/// One page of session ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionListResult {
    pub request_id: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub session_ids: Vec<String>,
    pub total_count: u32,
    pub next_token: Option<String>,
    pub max_results: u32,
}

/// Best-effort status read; `Unknown` signals an unreadable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResult {
    pub request_id: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub status: SessionStatus,
}

/// Outcome of a pause/resume command plus its poll loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub request_id: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub status: SessionStatus,
}

pub type PauseResult = TransitionResult;
pub type ResumeResult = TransitionResult;

/// Operations on the session collection
#[derive(Debug, Clone)]
pub struct SessionClient {
    client: Arc<AgentBayClient>,
}

impl SessionClient {
    pub(crate) fn new(client: Arc<AgentBayClient>) -> Self {
        Self { client }
    }

    /// Create a session, mounting any attached context syncs.
    ///
    /// Parameters are validated client-side before the request is sent; a
    /// context already held by another session is an expected server
    /// rejection surfaced as `success == false`.
    pub async fn create(&self, params: &CreateSessionRequest) -> AgentBayResult<SessionResult> {
        validate_create_session_request(params)?;
        let envelope: ApiResponse<SessionInfo> =
            self.client.post("/api/v1/sessions", params).await?;
        Ok(self.session_result(envelope))
    }

    /// Fetch one session. A missing session is a structured failure, not an
    /// error.
    pub async fn get(&self, session_id: &str) -> AgentBayResult<GetSessionResult> {
        ensure_not_empty(session_id, "sessionId")?;
        let envelope: ApiResponse<SessionInfo> =
            self.client.get(&format!("/api/v1/sessions/{}", session_id)).await?;
        Ok(self.session_result(envelope))
    }

    /// List session ids, cursor-paginated via `next_token`.
    pub async fn list(&self, params: &ListSessionsParams) -> AgentBayResult<SessionListResult> {
        params.validate()?;
        let query = AgentBayClient::build_query_params(params)?;
        let path = if query.is_empty() {
            "/api/v1/sessions".to_string()
        } else {
            format!("/api/v1/sessions?{}", query)
        };
        let envelope: ApiResponse<SessionListData> = self.client.get(&path).await?;

        let data = envelope.data.unwrap_or(SessionListData {
            session_ids: Vec::new(),
            total_count: 0,
            next_token: None,
            max_results: 0,
        });
        Ok(SessionListResult {
            request_id: envelope.request_id,
            success: envelope.success,
            error_message: fill_message(envelope.success, envelope.error_message),
            session_ids: data.session_ids,
            total_count: data.total_count,
            next_token: data.next_token,
            max_results: data.max_results,
        })
    }

    /// Delete a session, optionally flushing context syncs first.
    ///
    /// A session in a non-deletable state is rejected by the server; the
    /// rejection text is surfaced verbatim.
    pub async fn delete(
        &self,
        session_id: &str,
        sync_context: bool,
    ) -> AgentBayResult<OperationResult> {
        ensure_not_empty(session_id, "sessionId")?;
        let envelope: ApiResponse<serde_json::Value> = self
            .client
            .delete(&format!(
                "/api/v1/sessions/{}?syncContext={}",
                session_id, sync_context
            ))
            .await?;
        Ok(OperationResult::from_envelope(envelope))
    }

    /// Read the current lifecycle status.
    pub async fn get_status(&self, session_id: &str) -> AgentBayResult<StatusResult> {
        ensure_not_empty(session_id, "sessionId")?;
        let envelope: ApiResponse<StatusData> = self
            .client
            .get(&format!("/api/v1/sessions/{}/status", session_id))
            .await?;
        Ok(StatusResult {
            status: envelope.data.map(|d| d.status).unwrap_or(SessionStatus::Unknown),
            request_id: envelope.request_id,
            success: envelope.success,
            error_message: fill_message(envelope.success, envelope.error_message),
        })
    }

    /// Pause a session and wait for `PAUSED`.
    ///
    /// Timeout is reported as `success == false`, never as an error, so
    /// callers can distinguish "still in progress" from "rejected".
    pub async fn pause(
        &self,
        session_id: &str,
        timeout_secs: u64,
        poll_interval_secs: f64,
    ) -> AgentBayResult<PauseResult> {
        self.transition(
            session_id,
            "pause",
            SessionStatus::Paused,
            timeout_secs,
            poll_interval_secs,
        )
        .await
    }

    /// Resume a paused session and wait for `RUNNING`.
    pub async fn resume(
        &self,
        session_id: &str,
        timeout_secs: u64,
        poll_interval_secs: f64,
    ) -> AgentBayResult<ResumeResult> {
        self.transition(
            session_id,
            "resume",
            SessionStatus::Running,
            timeout_secs,
            poll_interval_secs,
        )
        .await
    }

    /// Replace the labels on a live session.
    pub async fn set_labels(
        &self,
        session_id: &str,
        labels: &HashMap<String, String>,
    ) -> AgentBayResult<OperationResult> {
        ensure_not_empty(session_id, "sessionId")?;
        let body = LabelsData {
            labels: labels.clone(),
        };
        let envelope: ApiResponse<serde_json::Value> = self
            .client
            .put(&format!("/api/v1/sessions/{}/labels", session_id), &body)
            .await?;
        Ok(OperationResult::from_envelope(envelope))
    }

    /// Read the labels attached to a session.
    pub async fn get_labels(&self, session_id: &str) -> AgentBayResult<LabelsResult> {
        ensure_not_empty(session_id, "sessionId")?;
        let envelope: ApiResponse<LabelsData> = self
            .client
            .get(&format!("/api/v1/sessions/{}/labels", session_id))
            .await?;
        Ok(LabelsResult {
            labels: envelope.data.map(|d| d.labels).unwrap_or_default(),
            request_id: envelope.request_id,
            success: envelope.success,
            error_message: fill_message(envelope.success, envelope.error_message),
        })
    }

    /// Resolve the resource access link for a session, optionally for a
    /// specific forwarded port.
    pub async fn get_link(
        &self,
        session_id: &str,
        port: Option<u16>,
    ) -> AgentBayResult<LinkResult> {
        ensure_not_empty(session_id, "sessionId")?;
        let path = match port {
            Some(port) => format!("/api/v1/sessions/{}/link?port={}", session_id, port),
            None => format!("/api/v1/sessions/{}/link", session_id),
        };
        let envelope: ApiResponse<LinkData> = self.client.get(&path).await?;
        Ok(LinkResult {
            url: envelope.data.map(|d| d.url),
            request_id: envelope.request_id,
            success: envelope.success,
            error_message: fill_message(envelope.success, envelope.error_message),
        })
    }

    fn session_result(&self, envelope: ApiResponse<SessionInfo>) -> SessionResult {
        SessionResult {
            session: envelope.data.map(|info| Session::from_info(info, &self.client)),
            request_id: envelope.request_id,
            success: envelope.success,
            error_message: fill_message(envelope.success, envelope.error_message),
        }
    }

    async fn transition(
        &self,
        session_id: &str,
        command: &str,
        target: SessionStatus,
        timeout_secs: u64,
        poll_interval_secs: f64,
    ) -> AgentBayResult<TransitionResult> {
        ensure_not_empty(session_id, "sessionId")?;
        let interval = interval_from_secs(poll_interval_secs)?;
        let envelope: ApiResponse<StatusData> = self
            .client
            .post_empty(&format!("/api/v1/sessions/{}/{}", session_id, command))
            .await?;
        if !envelope.success {
            return Ok(TransitionResult {
                request_id: envelope.request_id,
                success: false,
                error_message: fill_message(false, envelope.error_message),
                status: envelope.data.map(|d| d.status).unwrap_or(SessionStatus::Unknown),
            });
        }

        tracing::debug!(session_id, command, target = %target, "command accepted, polling status");
        let outcome = poll_until(
            || self.probe_transition(session_id, target),
            Duration::from_secs(timeout_secs),
            interval,
        )
        .await?;

        match outcome {
            Some(observed) if observed.status == target => Ok(TransitionResult {
                request_id: observed.request_id,
                success: true,
                error_message: None,
                status: observed.status,
            }),
            Some(observed) => Ok(TransitionResult {
                request_id: observed.request_id,
                success: false,
                error_message: Some(format!(
                    "session {} entered state {} while waiting for {}",
                    session_id, observed.status, target
                )),
                status: observed.status,
            }),
            None => {
                let last = self.get_status(session_id).await?;
                Ok(TransitionResult {
                    request_id: last.request_id,
                    success: false,
                    error_message: Some(format!(
                        "timed out after {}s waiting for session {} to reach {}",
                        timeout_secs, session_id, target
                    )),
                    status: last.status,
                })
            }
        }
    }

    /// One poll tick: terminal on the target state, or on a deletion state
    /// the session cannot come back from. Unreadable ticks keep polling;
    /// the server may report intermediate states out of order.
    async fn probe_transition(
        &self,
        session_id: &str,
        target: SessionStatus,
    ) -> AgentBayResult<Option<StatusResult>> {
        let observed = self.get_status(session_id).await?;
        if !observed.success {
            return Ok(None);
        }
        match observed.status {
            s if s == target => Ok(Some(observed)),
            SessionStatus::Deleting | SessionStatus::Deleted => Ok(Some(observed)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use agentbay_api_contract::ContractError;
    use crate::error::AgentBayError;

    fn test_client() -> SessionClient {
        let config = Config {
            api_key: "test-key".to_string(),
            endpoint: "http://localhost:3001".to_string(),
            timeout_ms: 5000,
        };
        SessionClient::new(Arc::new(AgentBayClient::new(&config).unwrap()))
    }

    #[tokio::test]
    async fn empty_session_id_fails_before_the_network() {
        let client = test_client();
        let err = client.get("").await.unwrap_err();
        assert!(matches!(
            err,
            AgentBayError::Contract(ContractError::EmptyField("sessionId"))
        ));
    }

    #[tokio::test]
    async fn invalid_status_filter_fails_before_the_network() {
        let client = test_client();
        let params = ListSessionsParams {
            status: Some("INVALID_STATUS".to_string()),
            ..Default::default()
        };
        let err = client.list(&params).await.unwrap_err();
        assert!(err.to_string().contains("invalid session status 'INVALID_STATUS'"));
    }

    #[tokio::test]
    async fn zero_page_fails_before_the_network() {
        let client = test_client();
        let params = ListSessionsParams {
            page: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            client.list(&params).await.unwrap_err(),
            AgentBayError::Contract(ContractError::InvalidPage(0))
        ));
    }

    #[tokio::test]
    async fn bad_poll_interval_fails_before_the_network() {
        let client = test_client();
        for bad in [0.0, -1.0, f64::NAN] {
            let err = client.pause("sess-1", 600, bad).await.unwrap_err();
            assert!(matches!(
                err,
                AgentBayError::Contract(ContractError::InvalidPollInterval(_))
            ));
        }
        let err = client.resume("sess-1", 600, 0.0).await.unwrap_err();
        assert!(matches!(
            err,
            AgentBayError::Contract(ContractError::InvalidPollInterval(_))
        ));
    }

    #[test]
    fn capabilities_gate_the_sub_clients() {
        let config = Config {
            api_key: String::new(),
            endpoint: "http://localhost:3001".to_string(),
            timeout_ms: 5000,
        };
        let transport = Arc::new(AgentBayClient::new(&config).unwrap());

        let info = SessionInfo {
            session_id: "sess-1".to_string(),
            status: SessionStatus::Running,
            image_id: Some("linux_latest".to_string()),
            labels: HashMap::new(),
            capabilities: vec!["fileSystem".to_string(), "command".to_string()],
            created_at: None,
        };
        let session = Session::from_info(info, &transport);
        assert!(session.file_system.is_some());
        assert!(session.command.is_some());
        assert!(session.browser.is_none());
        assert!(session.computer.is_none());
        assert!(session.mobile.is_none());
    }
}
