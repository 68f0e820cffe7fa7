//! Capability sub-clients attached to a session handle
//!
//! Each capability is an explicit struct holding the session id and the
//! shared transport; a session whose image lacks a capability simply has
//! `None` in the corresponding slot. Full automation surfaces (Playwright
//! driving, UI event synthesis) are out of scope; these clients cover the
//! thin marshal-and-call operations only.

use agentbay_api_contract::{ApiResponse, LinkData};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::client::AgentBayClient;
use crate::error::AgentBayResult;
use crate::result::{fill_message, LinkResult, OperationResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadFileRequest<'a> {
    path: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteFileRequest<'a> {
    path: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileContentData {
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteCommandRequest<'a> {
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandOutputData {
    output: String,
    exit_code: i32,
}

/// Result of reading a file inside the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContentResult {
    pub request_id: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub content: Option<String>,
}

/// Result of executing a command inside the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub request_id: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub output: Option<String>,
    pub exit_code: Option<i32>,
}

/// File access within the session's filesystem
#[derive(Debug, Clone)]
pub struct FileSystem {
    session_id: String,
    client: Arc<AgentBayClient>,
}

impl FileSystem {
    pub(crate) fn new(session_id: String, client: Arc<AgentBayClient>) -> Self {
        Self { session_id, client }
    }

    pub async fn read_file(&self, path: &str) -> AgentBayResult<FileContentResult> {
        let envelope: ApiResponse<FileContentData> = self
            .client
            .post(
                &format!("/api/v1/sessions/{}/filesystem/read", self.session_id),
                &ReadFileRequest { path },
            )
            .await?;
        Ok(FileContentResult {
            content: envelope.data.map(|d| d.content),
            request_id: envelope.request_id,
            success: envelope.success,
            error_message: fill_message(envelope.success, envelope.error_message),
        })
    }

    pub async fn write_file(&self, path: &str, content: &str) -> AgentBayResult<OperationResult> {
        let envelope: ApiResponse<serde_json::Value> = self
            .client
            .post(
                &format!("/api/v1/sessions/{}/filesystem/write", self.session_id),
                &WriteFileRequest { path, content },
            )
            .await?;
        Ok(OperationResult::from_envelope(envelope))
    }
}

/// Shell command execution within the session
#[derive(Debug, Clone)]
pub struct Command {
    session_id: String,
    client: Arc<AgentBayClient>,
}

impl Command {
    pub(crate) fn new(session_id: String, client: Arc<AgentBayClient>) -> Self {
        Self { session_id, client }
    }

    pub async fn execute(
        &self,
        command: &str,
        timeout_ms: Option<u64>,
    ) -> AgentBayResult<CommandResult> {
        let envelope: ApiResponse<CommandOutputData> = self
            .client
            .post(
                &format!("/api/v1/sessions/{}/command", self.session_id),
                &ExecuteCommandRequest { command, timeout_ms },
            )
            .await?;
        let (output, exit_code) = match envelope.data {
            Some(data) => (Some(data.output), Some(data.exit_code)),
            None => (None, None),
        };
        Ok(CommandResult {
            output,
            exit_code,
            request_id: envelope.request_id,
            success: envelope.success,
            error_message: fill_message(envelope.success, envelope.error_message),
        })
    }
}

/// Browser endpoint access for the session
#[derive(Debug, Clone)]
pub struct Browser {
    session_id: String,
    client: Arc<AgentBayClient>,
}

impl Browser {
    pub(crate) fn new(session_id: String, client: Arc<AgentBayClient>) -> Self {
        Self { session_id, client }
    }

    /// CDP endpoint URL external automation tooling can connect to.
    pub async fn endpoint_url(&self) -> AgentBayResult<LinkResult> {
        self.link(&format!("/api/v1/sessions/{}/browser/endpoint", self.session_id)).await
    }

    async fn link(&self, path: &str) -> AgentBayResult<LinkResult> {
        let envelope: ApiResponse<LinkData> = self.client.get(path).await?;
        Ok(LinkResult {
            url: envelope.data.map(|d| d.url),
            request_id: envelope.request_id,
            success: envelope.success,
            error_message: fill_message(envelope.success, envelope.error_message),
        })
    }
}

/// Desktop automation surface
#[derive(Debug, Clone)]
pub struct Computer {
    session_id: String,
    client: Arc<AgentBayClient>,
}

impl Computer {
    pub(crate) fn new(session_id: String, client: Arc<AgentBayClient>) -> Self {
        Self { session_id, client }
    }

    pub async fn screenshot(&self) -> AgentBayResult<LinkResult> {
        screenshot(
            &self.client,
            &format!("/api/v1/sessions/{}/computer/screenshot", self.session_id),
        )
        .await
    }
}

/// Mobile automation surface
#[derive(Debug, Clone)]
pub struct Mobile {
    session_id: String,
    client: Arc<AgentBayClient>,
}

impl Mobile {
    pub(crate) fn new(session_id: String, client: Arc<AgentBayClient>) -> Self {
        Self { session_id, client }
    }

    pub async fn screenshot(&self) -> AgentBayResult<LinkResult> {
        screenshot(
            &self.client,
            &format!("/api/v1/sessions/{}/mobile/screenshot", self.session_id),
        )
        .await
    }
}

async fn screenshot(client: &AgentBayClient, path: &str) -> AgentBayResult<LinkResult> {
    let envelope: ApiResponse<LinkData> = client.get(path).await?;
    Ok(LinkResult {
        url: envelope.data.map(|d| d.url),
        request_id: envelope.request_id,
        success: envelope.success,
        error_message: fill_message(envelope.success, envelope.error_message),
    })
}
