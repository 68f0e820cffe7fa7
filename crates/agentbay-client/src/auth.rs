//! API-key authentication

use crate::error::{AgentBayError, AgentBayResult};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

/// Bearer-token credentials attached to every request
#[derive(Clone, Default)]
pub struct AuthConfig {
    api_key: String,
}

// Keep the key out of debug logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig").field("api_key", &"[REDACTED]").finish()
    }
}

impl AuthConfig {
    pub fn bearer(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Build the authorization headers for one request.
    pub fn headers(&self) -> AgentBayResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        if !self.api_key.is_empty() {
            let value = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| AgentBayError::Auth(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_is_set() {
        let auth = AuthConfig::bearer("akm-test-key");
        let headers = auth.headers().unwrap();
        assert_eq!(
            headers.get(AUTHORIZATION).unwrap().to_str().unwrap(),
            "Bearer akm-test-key"
        );
    }

    #[test]
    fn empty_key_produces_no_header() {
        let auth = AuthConfig::default();
        let headers = auth.headers().unwrap();
        assert!(headers.is_empty());
    }

    #[test]
    fn control_characters_are_rejected() {
        let auth = AuthConfig::bearer("bad\nkey");
        assert!(matches!(auth.headers(), Err(AgentBayError::Auth(_))));
    }
}
