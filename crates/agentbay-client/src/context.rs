//! Context client: CRUD plus sync triggering and progress polling

use agentbay_api_contract::{
    ApiResponse, Context, ContextInfoData, ContextListData, ContextState, ContextStatusData,
    ListContextsParams, TaskType,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::client::AgentBayClient;
use crate::error::AgentBayResult;
use crate::poll::{interval_from_secs, poll_until};
use crate::result::{ensure_not_empty, fill_message, OperationResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateContextRequest<'a> {
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateContextRequest<'a> {
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContextInfoQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    context_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    task_type: Option<TaskType>,
}

/// Result carrying a single context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextResult {
    pub request_id: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub context: Option<Context>,
}

/// One page of contexts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextListResult {
    pub request_id: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub contexts: Vec<Context>,
    pub total_count: u32,
    pub next_token: Option<String>,
    pub max_results: u32,
}

/// Sync task snapshots for a session's mounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextInfoResult {
    pub request_id: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub items: Vec<ContextStatusData>,
}

/// Outcome of a clear command plus its poll loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearResult {
    pub request_id: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub cleared: bool,
}

/// Operations on durable context storage roots
#[derive(Debug, Clone)]
pub struct ContextClient {
    client: Arc<AgentBayClient>,
}

impl ContextClient {
    pub(crate) fn new(client: Arc<AgentBayClient>) -> Self {
        Self { client }
    }

    /// Create a named context.
    pub async fn create(&self, name: &str) -> AgentBayResult<ContextResult> {
        ensure_not_empty(name, "name")?;
        let envelope: ApiResponse<Context> = self
            .client
            .post("/api/v1/contexts", &CreateContextRequest { name })
            .await?;
        Ok(self.context_result(envelope))
    }

    /// Look a context up by name, optionally creating it when absent.
    pub async fn get(&self, name: &str, allow_create: bool) -> AgentBayResult<ContextResult> {
        ensure_not_empty(name, "name")?;
        let envelope: ApiResponse<Context> = self
            .client
            .get(&format!(
                "/api/v1/contexts?name={}&allowCreate={}",
                name, allow_create
            ))
            .await?;
        Ok(self.context_result(envelope))
    }

    /// Fetch a context by id.
    pub async fn get_by_id(&self, context_id: &str) -> AgentBayResult<ContextResult> {
        ensure_not_empty(context_id, "contextId")?;
        let envelope: ApiResponse<Context> =
            self.client.get(&format!("/api/v1/contexts/{}", context_id)).await?;
        Ok(self.context_result(envelope))
    }

    /// List contexts, cursor-paginated like the session list.
    pub async fn list(&self, params: &ListContextsParams) -> AgentBayResult<ContextListResult> {
        params.validate()?;
        let query = AgentBayClient::build_query_params(params)?;
        let path = if query.is_empty() {
            "/api/v1/contexts".to_string()
        } else {
            format!("/api/v1/contexts?{}", query)
        };
        let envelope: ApiResponse<ContextListData> = self.client.get(&path).await?;

        let data = envelope.data.unwrap_or(ContextListData {
            contexts: Vec::new(),
            total_count: 0,
            next_token: None,
            max_results: 0,
        });
        Ok(ContextListResult {
            request_id: envelope.request_id,
            success: envelope.success,
            error_message: fill_message(envelope.success, envelope.error_message),
            contexts: data.contexts,
            total_count: data.total_count,
            next_token: data.next_token,
            max_results: data.max_results,
        })
    }

    /// Rename a context.
    pub async fn update(&self, context: &Context) -> AgentBayResult<OperationResult> {
        ensure_not_empty(&context.id, "contextId")?;
        ensure_not_empty(&context.name, "name")?;
        let envelope: ApiResponse<serde_json::Value> = self
            .client
            .put(
                &format!("/api/v1/contexts/{}", context.id),
                &UpdateContextRequest {
                    name: &context.name,
                },
            )
            .await?;
        Ok(OperationResult::from_envelope(envelope))
    }

    /// Delete a context. An `in-use` context is rejected server-side and
    /// surfaced as a structured failure.
    pub async fn delete(&self, context: &Context) -> AgentBayResult<OperationResult> {
        ensure_not_empty(&context.id, "contextId")?;
        let envelope: ApiResponse<serde_json::Value> =
            self.client.delete(&format!("/api/v1/contexts/{}", context.id)).await?;
        Ok(OperationResult::from_envelope(envelope))
    }

    /// Trigger upload/download reconciliation for every context mount of a
    /// session. `success` means the trigger was accepted, not that the sync
    /// completed; observe progress via [`ContextClient::info`].
    pub async fn sync(&self, session_id: &str) -> AgentBayResult<OperationResult> {
        ensure_not_empty(session_id, "sessionId")?;
        let envelope: ApiResponse<serde_json::Value> = self
            .client
            .post_empty(&format!("/api/v1/sessions/{}/contexts/sync", session_id))
            .await?;
        Ok(OperationResult::from_envelope(envelope))
    }

    /// Current sync task snapshots for all mounts of a session.
    pub async fn info(&self, session_id: &str) -> AgentBayResult<ContextInfoResult> {
        self.info_with_params(session_id, None, None, None).await
    }

    /// Sync task snapshots filtered by context, path, or task direction.
    pub async fn info_with_params(
        &self,
        session_id: &str,
        context_id: Option<&str>,
        path: Option<&str>,
        task_type: Option<TaskType>,
    ) -> AgentBayResult<ContextInfoResult> {
        ensure_not_empty(session_id, "sessionId")?;
        let query = AgentBayClient::build_query_params(&ContextInfoQuery {
            context_id,
            path,
            task_type,
        })?;
        let url = if query.is_empty() {
            format!("/api/v1/sessions/{}/contexts/info", session_id)
        } else {
            format!("/api/v1/sessions/{}/contexts/info?{}", session_id, query)
        };
        let envelope: ApiResponse<ContextInfoData> = self.client.get(&url).await?;
        Ok(ContextInfoResult {
            items: envelope.data.map(|d| d.items).unwrap_or_default(),
            request_id: envelope.request_id,
            success: envelope.success,
            error_message: fill_message(envelope.success, envelope.error_message),
        })
    }

    /// Fire-and-forget content wipe.
    pub async fn clear_async(&self, context_id: &str) -> AgentBayResult<OperationResult> {
        ensure_not_empty(context_id, "contextId")?;
        let envelope: ApiResponse<serde_json::Value> = self
            .client
            .post_empty(&format!("/api/v1/contexts/{}/clear", context_id))
            .await?;
        Ok(OperationResult::from_envelope(envelope))
    }

    /// Wipe a context's content and wait until the clear finishes.
    ///
    /// Completion is the context's state leaving `clearing`; the timeout is
    /// reported as `success == false`, and the wipe may still finish
    /// server-side afterwards.
    pub async fn clear(
        &self,
        context_id: &str,
        timeout_secs: u64,
        poll_interval_secs: f64,
    ) -> AgentBayResult<ClearResult> {
        let interval = interval_from_secs(poll_interval_secs)?;
        let trigger = self.clear_async(context_id).await?;
        if !trigger.success {
            return Ok(ClearResult {
                request_id: trigger.request_id,
                success: false,
                error_message: trigger.error_message,
                cleared: false,
            });
        }

        tracing::debug!(context_id, "clear accepted, polling context state");
        let outcome = poll_until(
            || self.probe_cleared(context_id),
            Duration::from_secs(timeout_secs),
            interval,
        )
        .await?;

        match outcome {
            Some(observed) if observed.success => Ok(ClearResult {
                request_id: observed.request_id,
                success: true,
                error_message: None,
                cleared: true,
            }),
            Some(observed) => Ok(ClearResult {
                request_id: observed.request_id,
                success: false,
                error_message: observed.error_message,
                cleared: false,
            }),
            None => Ok(ClearResult {
                request_id: trigger.request_id,
                success: false,
                error_message: Some(format!(
                    "timed out after {}s waiting for context {} to finish clearing",
                    timeout_secs, context_id
                )),
                cleared: false,
            }),
        }
    }

    /// One poll tick: terminal once the context is readable and no longer
    /// `clearing`, or once the read itself fails structurally.
    async fn probe_cleared(&self, context_id: &str) -> AgentBayResult<Option<ContextResult>> {
        let observed = self.get_by_id(context_id).await?;
        if !observed.success {
            return Ok(Some(observed));
        }
        match observed.context.as_ref().map(|c| c.state) {
            Some(ContextState::Clearing) => Ok(None),
            _ => Ok(Some(observed)),
        }
    }

    fn context_result(&self, envelope: ApiResponse<Context>) -> ContextResult {
        ContextResult {
            context: envelope.data,
            request_id: envelope.request_id,
            success: envelope.success,
            error_message: fill_message(envelope.success, envelope.error_message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::AgentBayError;
    use agentbay_api_contract::ContractError;

    fn test_client() -> ContextClient {
        let config = Config {
            api_key: "test-key".to_string(),
            endpoint: "http://localhost:3001".to_string(),
            timeout_ms: 5000,
        };
        ContextClient::new(Arc::new(AgentBayClient::new(&config).unwrap()))
    }

    #[tokio::test]
    async fn empty_name_fails_before_the_network() {
        let client = test_client();
        assert!(matches!(
            client.create("").await.unwrap_err(),
            AgentBayError::Contract(ContractError::EmptyField("name"))
        ));
        assert!(matches!(
            client.get("", true).await.unwrap_err(),
            AgentBayError::Contract(ContractError::EmptyField("name"))
        ));
    }

    #[tokio::test]
    async fn list_rejects_zero_page() {
        let client = test_client();
        let params = ListContextsParams {
            page: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            client.list(&params).await.unwrap_err(),
            AgentBayError::Contract(ContractError::InvalidPage(0))
        ));
    }

    #[tokio::test]
    async fn clear_rejects_bad_poll_interval_before_triggering() {
        let client = test_client();
        for bad in [0.0, -2.5, f64::INFINITY] {
            let err = client.clear("ctx-1", 60, bad).await.unwrap_err();
            assert!(matches!(
                err,
                AgentBayError::Contract(ContractError::InvalidPollInterval(_))
            ));
        }
    }

    #[test]
    fn info_query_includes_only_set_filters() {
        let query = AgentBayClient::build_query_params(&ContextInfoQuery {
            context_id: Some("ctx-1"),
            path: None,
            task_type: Some(TaskType::Upload),
        })
        .unwrap();
        assert!(query.contains("contextId=ctx-1"));
        assert!(query.contains("taskType=upload"));
        assert!(!query.contains("path"));
    }
}
