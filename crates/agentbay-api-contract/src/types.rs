//! API contract types for the AgentBay session service

use crate::error::ContractError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Session lifecycle states as reported by the service
///
/// The client never computes transitions locally; it issues commands
/// (pause/resume/delete) and observes the state the server reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Running,
    Paused,
    Pausing,
    Resuming,
    Deleting,
    Deleted,
    Unknown,
}

impl SessionStatus {
    /// The full set of statuses the service may report.
    pub fn valid_statuses() -> &'static [SessionStatus] {
        &[
            SessionStatus::Running,
            SessionStatus::Paused,
            SessionStatus::Pausing,
            SessionStatus::Resuming,
            SessionStatus::Deleting,
            SessionStatus::Deleted,
            SessionStatus::Unknown,
        ]
    }

    /// Parse a wire status string, rejecting anything outside the fixed set.
    pub fn parse(value: &str) -> Result<SessionStatus, ContractError> {
        match value {
            "RUNNING" => Ok(SessionStatus::Running),
            "PAUSED" => Ok(SessionStatus::Paused),
            "PAUSING" => Ok(SessionStatus::Pausing),
            "RESUMING" => Ok(SessionStatus::Resuming),
            "DELETING" => Ok(SessionStatus::Deleting),
            "DELETED" => Ok(SessionStatus::Deleted),
            "UNKNOWN" => Ok(SessionStatus::Unknown),
            other => Err(ContractError::InvalidSessionStatus(other.to_string())),
        }
    }

    pub fn is_valid(value: &str) -> bool {
        SessionStatus::parse(value).is_ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Running => "RUNNING",
            SessionStatus::Paused => "PAUSED",
            SessionStatus::Pausing => "PAUSING",
            SessionStatus::Resuming => "RESUMING",
            SessionStatus::Deleting => "DELETING",
            SessionStatus::Deleted => "DELETED",
            SessionStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionStatus::parse(s)
    }
}

/// Upload transfer mode for context sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadMode {
    File,
    Archive,
}

impl UploadMode {
    /// Parse an upload mode string. The policy structs carry the mode as a
    /// plain string so an illegal value can exist in memory; this is the
    /// single place it is checked.
    pub fn parse(value: &str) -> Result<UploadMode, ContractError> {
        match value {
            "File" => Ok(UploadMode::File),
            "Archive" => Ok(UploadMode::Archive),
            other => Err(ContractError::InvalidUploadMode(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadMode::File => "File",
            UploadMode::Archive => "Archive",
        }
    }
}

impl std::fmt::Display for UploadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When uploads are flushed to the context storage root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UploadStrategy {
    #[default]
    UploadBeforeResourceRelease,
}

/// How downloads are scheduled when a context is mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DownloadStrategy {
    #[default]
    DownloadAsync,
}

/// Upload side of a sync policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPolicy {
    pub auto_upload: bool,
    pub upload_strategy: UploadStrategy,
    pub upload_mode: String,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            auto_upload: true,
            upload_strategy: UploadStrategy::UploadBeforeResourceRelease,
            upload_mode: UploadMode::File.as_str().to_string(),
        }
    }
}

/// Download side of a sync policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadPolicy {
    pub auto_download: bool,
    pub download_strategy: DownloadStrategy,
}

impl Default for DownloadPolicy {
    fn default() -> Self {
        Self {
            auto_download: true,
            download_strategy: DownloadStrategy::DownloadAsync,
        }
    }
}

/// Whether local files are removed when their remote copy is deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePolicy {
    pub sync_local_file: bool,
}

impl Default for DeletePolicy {
    fn default() -> Self {
        Self {
            sync_local_file: true,
        }
    }
}

/// Archive extraction behavior for `Archive` upload mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractPolicy {
    pub extract: bool,
    pub delete_src_file: bool,
}

impl Default for ExtractPolicy {
    fn default() -> Self {
        Self {
            extract: true,
            delete_src_file: true,
        }
    }
}

/// Cross-OS path remapping rule
///
/// When a context was last synced under a different OS's path convention,
/// the sync path of the new session resolves against `path` instead of the
/// literal mount path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingPolicy {
    pub path: String,
}

/// A single allow rule with optional exclusions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteList {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub exclude_paths: Vec<String>,
}

/// Allow/deny list scoping which paths participate in sync
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BwList {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub white_lists: Vec<WhiteList>,
}

/// Complete sync policy bundle attached to a context mount
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPolicy {
    pub upload_policy: UploadPolicy,
    pub download_policy: DownloadPolicy,
    pub delete_policy: DeletePolicy,
    pub extract_policy: ExtractPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bw_list: Option<BwList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping_policy: Option<MappingPolicy>,
}

impl SyncPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload_policy(mut self, upload_policy: UploadPolicy) -> Self {
        self.upload_policy = upload_policy;
        self
    }

    pub fn with_mapping_policy(mut self, mapping_policy: MappingPolicy) -> Self {
        self.mapping_policy = Some(mapping_policy);
        self
    }

    pub fn with_bw_list(mut self, bw_list: BwList) -> Self {
        self.bw_list = Some(bw_list);
        self
    }
}

/// Binding of a context to a mount path plus its sync policy
///
/// Many of these may be attached to one session-creation request, each
/// mounting a distinct context at a distinct path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContextSync {
    #[validate(length(min = 1, message = "contextId cannot be empty"))]
    pub context_id: String,
    #[validate(length(min = 1, message = "path cannot be empty"))]
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<SyncPolicy>,
}

impl ContextSync {
    /// Build a validated context sync binding.
    ///
    /// Fails when `context_id` or `path` is empty, or when the policy
    /// carries an illegal upload mode.
    pub fn new(
        context_id: impl Into<String>,
        path: impl Into<String>,
        policy: Option<SyncPolicy>,
    ) -> Result<Self, ContractError> {
        let sync = Self {
            context_id: context_id.into(),
            path: path.into(),
            policy,
        };
        crate::validation::validate_context_sync(&sync)?;
        Ok(sync)
    }

    /// Replace the policy, re-validating the whole binding.
    pub fn with_policy(mut self, policy: SyncPolicy) -> Result<Self, ContractError> {
        self.policy = Some(policy);
        crate::validation::validate_context_sync(&self)?;
        Ok(self)
    }

    /// Resolve the sync path for a session, honoring the mapping policy.
    ///
    /// The mapped path applies only when the context was last written under
    /// a different OS than the session mounting it.
    pub fn effective_path(&self, context_os: Option<&str>, session_os: Option<&str>) -> &str {
        if let (Some(policy), Some(ctx_os), Some(sess_os)) =
            (self.policy.as_ref(), context_os, session_os)
        {
            if let Some(mapping) = policy.mapping_policy.as_ref() {
                if !ctx_os.eq_ignore_ascii_case(sess_os) {
                    return &mapping.path;
                }
            }
        }
        &self.path
    }
}

/// Lifecycle state of a durable context storage root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextState {
    Available,
    InUse,
    Creating,
    Releasing,
    Clearing,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ContextState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContextState::Available => "available",
            ContextState::InUse => "in-use",
            ContextState::Creating => "creating",
            ContextState::Releasing => "releasing",
            ContextState::Clearing => "clearing",
            ContextState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A durable, server-managed file-storage root
///
/// Mounted into at most one active session at a time; the server flips the
/// state to `in-use` while a session holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub id: String,
    pub name: String,
    pub state: ContextState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
}

/// Direction of a sync task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Upload,
    Download,
}

impl TaskType {
    pub fn parse(value: &str) -> Result<TaskType, ContractError> {
        match value {
            "upload" => Ok(TaskType::Upload),
            "download" => Ok(TaskType::Download),
            other => Err(ContractError::InvalidTaskType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Upload => "upload",
            TaskType::Download => "download",
        }
    }
}

/// Point-in-time snapshot of one sync task's progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextStatusData {
    pub context_id: String,
    pub path: String,
    pub status: String,
    pub task_type: TaskType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Session creation request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub labels: HashMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[validate(nested)]
    pub context_syncs: Vec<ContextSync>,
    #[serde(default)]
    pub is_vpc: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    #[serde(default)]
    pub enable_browser_replay: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta_volume_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta_network_id: Option<String>,
}

/// Session information echoed back by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub labels: HashMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub capabilities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Session list page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListData {
    #[serde(default)]
    pub session_ids: Vec<String>,
    pub total_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    pub max_results: u32,
}

/// Session status read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusData {
    pub status: SessionStatus,
}

/// Resource access link for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkData {
    pub url: String,
}

/// Labels attached to a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelsData {
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// Context list page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextListData {
    #[serde(default)]
    pub contexts: Vec<Context>,
    pub total_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    pub max_results: u32,
}

/// Sync task snapshots for one session's mounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextInfoData {
    #[serde(default)]
    pub items: Vec<ContextStatusData>,
}

/// Query parameters for session listing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSessionsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl ListSessionsParams {
    pub fn validate(&self) -> Result<(), ContractError> {
        crate::validation::validate_list_sessions_params(self)
    }
}

/// Query parameters for context listing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContextsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl ListContextsParams {
    pub fn validate(&self) -> Result<(), ContractError> {
        crate::validation::validate_page(self.page)
    }
}

/// Wire envelope shared by every operation
///
/// Every completed round trip carries a `requestId`; failed outcomes carry a
/// non-empty `errorMessage` alongside `success == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub request_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}
