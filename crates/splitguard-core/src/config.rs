//! splitguard.toml configuration parser.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default path queried on the peer for its membership view.
pub const DEFAULT_QUERY_PATH: &str = "/ignite?cmd=top";

/// Upper bound accepted for any configured duration (one week).
pub const MAX_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitGuardConfig {
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub node: NodeConfig,
}

/// Settings for the periodic partition check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Peer `host[:port]` whose membership view is compared with ours.
    pub server: Option<String>,
    /// Tie-break flag. `None` means no preference is configured.
    pub preferred_zone: Option<bool>,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_timeout")]
    pub timeout: String,
    #[serde(default = "default_query_path")]
    pub query_path: String,
}

/// Settings for the local node and its cluster registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Fixed id for this node; generated at startup when absent.
    pub node_id: Option<String>,
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_dead_timeout")]
    pub dead_timeout: String,
}

fn default_interval() -> String {
    "10s".to_string()
}

fn default_timeout() -> String {
    "2s".to_string()
}

fn default_query_path() -> String {
    DEFAULT_QUERY_PATH.to_string()
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_dead_timeout() -> String {
    "30s".to_string()
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            server: None,
            preferred_zone: None,
            interval: default_interval(),
            timeout: default_timeout(),
            query_path: default_query_path(),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: None,
            listen: default_listen(),
            dead_timeout: default_dead_timeout(),
        }
    }
}

impl SplitGuardConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: SplitGuardConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every check cycle meaningless.
    ///
    /// An absent `check.server` is accepted here; the check itself
    /// aborts each cycle until one is configured.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(server) = &self.check.server {
            if server.trim().is_empty() {
                return Err(ConfigError::Invalid("check.server is blank".to_string()));
            }
        }
        if !self.check.query_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "check.query_path must start with '/': {}",
                self.check.query_path
            )));
        }
        for (key, value) in [
            ("check.interval", &self.check.interval),
            ("check.timeout", &self.check.timeout),
            ("node.dead_timeout", &self.node.dead_timeout),
        ] {
            match parse_duration(value) {
                Some(d) if d > MAX_DURATION => {
                    return Err(ConfigError::Invalid(format!(
                        "{key} exceeds {MAX_DURATION:?}: {value}"
                    )));
                }
                Some(d) if !d.is_zero() => {}
                _ => {
                    return Err(ConfigError::Invalid(format!(
                        "{key} is not a positive duration: {value}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Peer address, if one is configured and non-blank.
    pub fn check_server(&self) -> Option<&str> {
        self.check
            .server
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn interval(&self) -> Duration {
        parse_duration(&self.check.interval).unwrap_or(Duration::from_secs(10))
    }

    pub fn timeout(&self) -> Duration {
        parse_duration(&self.check.timeout).unwrap_or(Duration::from_secs(2))
    }

    pub fn dead_timeout(&self) -> Duration {
        parse_duration(&self.node.dead_timeout).unwrap_or(Duration::from_secs(30))
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
///
/// A bare number is read as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
