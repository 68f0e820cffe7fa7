//! SDK configuration and layered loading
//!
//! There is no ambient global configuration: `load_config` resolves a
//! `Config` once and the caller passes it into [`crate::AgentBay::new`].
//! Precedence per field: explicit config > process environment > `.env`
//! file > built-in default. When no `.env` path is given, the file is
//! discovered by upward directory search from the current directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const ENV_API_KEY: &str = "AGENTBAY_API_KEY";
pub const ENV_ENDPOINT: &str = "AGENTBAY_ENDPOINT";
pub const ENV_TIMEOUT_MS: &str = "AGENTBAY_TIMEOUT_MS";

pub const DEFAULT_ENDPOINT: &str = "https://wuyingai.cn-shanghai.aliyuncs.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

const ENV_FILE_NAME: &str = ".env";

/// Connection settings for the AgentBay service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub api_key: String,
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Resolve the effective configuration.
///
/// An explicit `Config` wins outright. Otherwise each field falls back
/// from the process environment to the `.env` file to the default.
pub fn load_config(explicit: Option<&Config>, env_file: Option<&Path>) -> Config {
    load_config_with(explicit, env_file, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an injectable environment lookup, so the
/// precedence rules are testable without mutating process state.
pub fn load_config_with(
    explicit: Option<&Config>,
    env_file: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Config {
    if let Some(config) = explicit {
        return config.clone();
    }

    let file_vars = env_file
        .map(PathBuf::from)
        .or_else(find_env_file)
        .map(|path| parse_env_file(&path))
        .unwrap_or_default();

    let lookup = |key: &str| env(key).or_else(|| file_vars.get(key).cloned());

    let timeout_ms = lookup(ENV_TIMEOUT_MS)
        .and_then(|raw| match raw.parse::<u64>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(value = %raw, "ignoring non-numeric {ENV_TIMEOUT_MS}");
                None
            }
        })
        .unwrap_or(DEFAULT_TIMEOUT_MS);

    Config {
        api_key: lookup(ENV_API_KEY).unwrap_or_default(),
        endpoint: lookup(ENV_ENDPOINT).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        timeout_ms,
    }
}

/// Walk up from the current directory looking for a `.env` file.
fn find_env_file() -> Option<PathBuf> {
    let start = std::env::current_dir().ok()?;
    for dir in start.ancestors() {
        let candidate = dir.join(ENV_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Parse `KEY=VALUE` lines; `#` comments and blank lines are skipped, and
/// values may be wrapped in single or double quotes.
fn parse_env_file(path: &Path) -> HashMap<String, String> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        tracing::warn!(path = %path.display(), "unable to read env file");
        return HashMap::new();
    };

    let mut vars = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim().to_string();
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            vars.insert(key, value.to_string());
        }
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_env_file(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join(".env");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn explicit_config_wins_outright() {
        let explicit = Config {
            api_key: "explicit-key".to_string(),
            endpoint: "https://example.test".to_string(),
            timeout_ms: 1234,
        };
        let resolved = load_config_with(Some(&explicit), None, |_| {
            Some("from-env".to_string())
        });
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn env_beats_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = write_env_file(
            dir.path(),
            "AGENTBAY_API_KEY=file-key\nAGENTBAY_ENDPOINT=https://file.test\n",
        );

        let resolved = load_config_with(None, Some(&env_file), |key| match key {
            ENV_API_KEY => Some("env-key".to_string()),
            _ => None,
        });
        assert_eq!(resolved.api_key, "env-key");
        assert_eq!(resolved.endpoint, "https://file.test");
        assert_eq!(resolved.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn env_file_beats_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = write_env_file(
            dir.path(),
            "# service credentials\nAGENTBAY_API_KEY=\"quoted-key\"\nAGENTBAY_TIMEOUT_MS=5000\n",
        );

        let resolved = load_config_with(None, Some(&env_file), |_| None);
        assert_eq!(resolved.api_key, "quoted-key");
        assert_eq!(resolved.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(resolved.timeout_ms, 5000);
    }

    #[test]
    fn non_numeric_timeout_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = write_env_file(dir.path(), "AGENTBAY_TIMEOUT_MS=soon\n");

        let resolved = load_config_with(None, Some(&env_file), |_| None);
        assert_eq!(resolved.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = write_env_file(dir.path(), "");

        let resolved = load_config_with(None, Some(&env_file), |_| None);
        assert_eq!(resolved.api_key, "");
        assert_eq!(resolved.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(resolved.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn env_file_parser_handles_comments_and_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = write_env_file(
            dir.path(),
            "# comment\n\nAGENTBAY_API_KEY='single'\nMALFORMED LINE\nAGENTBAY_ENDPOINT = https://spaced.test\n",
        );

        let vars = parse_env_file(&env_file);
        assert_eq!(vars.get(ENV_API_KEY).unwrap(), "single");
        assert_eq!(vars.get(ENV_ENDPOINT).unwrap(), "https://spaced.test");
        assert!(!vars.contains_key("MALFORMED LINE"));
    }
}
