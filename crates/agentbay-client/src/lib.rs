//! HTTP client for the AgentBay cloud session service
//!
//! The SDK tracks a remote session's lifecycle (create, running,
//! paused/resumed, deleted), binds persistent contexts to sessions via
//! validated sync policies, and polls long-running transitions to their
//! terminal state. All genuine orchestration happens server-side; every
//! operation here is a request/response round trip.
//!
//! ```no_run
//! use agentbay_client::{load_config, AgentBay};
//! use agentbay_client::contract::CreateSessionRequest;
//!
//! # async fn example() -> agentbay_client::AgentBayResult<()> {
//! let config = load_config(None, None);
//! let agent_bay = AgentBay::new(&config)?;
//! let created = agent_bay.sessions().create(&CreateSessionRequest::default()).await?;
//! if let Some(session) = created.session {
//!     agent_bay.sessions().delete(&session.id, false).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod capability;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
mod poll;
pub mod result;
pub mod session;

pub use client::AgentBayClient;
pub use config::{load_config, Config};
pub use context::{ClearResult, ContextClient, ContextInfoResult, ContextListResult, ContextResult};
pub use error::{AgentBayError, AgentBayResult};
pub use result::{LabelsResult, LinkResult, OperationResult};
pub use session::{
    GetSessionResult, PauseResult, ResumeResult, Session, SessionClient, SessionListResult,
    SessionResult, StatusResult,
};

/// Contract types re-exported for callers building requests and policies.
pub use agentbay_api_contract as contract;

use std::sync::Arc;

/// Entry point owning the shared transport
#[derive(Debug, Clone)]
pub struct AgentBay {
    client: Arc<AgentBayClient>,
}

impl AgentBay {
    /// Build an SDK instance from a resolved [`Config`].
    pub fn new(config: &Config) -> AgentBayResult<Self> {
        Ok(Self {
            client: Arc::new(AgentBayClient::new(config)?),
        })
    }

    /// Session lifecycle operations.
    pub fn sessions(&self) -> SessionClient {
        SessionClient::new(Arc::clone(&self.client))
    }

    /// Context storage operations.
    pub fn contexts(&self) -> ContextClient {
        ContextClient::new(Arc::clone(&self.client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facades_share_one_transport() {
        let config = Config {
            api_key: "test-key".to_string(),
            endpoint: "http://localhost:3001".to_string(),
            timeout_ms: 5000,
        };
        let agent_bay = AgentBay::new(&config).unwrap();
        let _sessions = agent_bay.sessions();
        let _contexts = agent_bay.contexts();
        assert_eq!(Arc::strong_count(&agent_bay.client), 3);
    }
}
