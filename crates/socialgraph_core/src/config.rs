//! Runtime configuration for the social graph core.
//!
//! # Responsibility
//! - Hold knobs that change domain behavior (tag delete policy) and
//!   bootstrap settings (database path, log level and directory).
//! - Load overrides from `SOCIALGRAPH_*` environment variables.
//!
//! # Invariants
//! - Missing variables fall back to defaults; malformed values are errors,
//!   never silently ignored.

use crate::logging::{default_log_level, normalize_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_DB_PATH: &str = "SOCIALGRAPH_DB_PATH";
pub const ENV_TAG_DELETE_POLICY: &str = "SOCIALGRAPH_TAG_DELETE_POLICY";
pub const ENV_LOG_LEVEL: &str = "SOCIALGRAPH_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SOCIALGRAPH_LOG_DIR";

/// What deleting a tag does to publications that carry it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagDeletePolicy {
    /// Remove every `has_tag` edge, then the tag.
    #[default]
    Detach,
    /// Refuse with `Conflict` while any publication carries the tag.
    Block,
}

impl FromStr for TagDeletePolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "detach" => Ok(Self::Detach),
            "block" => Ok(Self::Block),
            other => Err(ConfigError::InvalidValue {
                var: ENV_TAG_DELETE_POLICY,
                value: other.to_string(),
                expected: "detach|block",
            }),
        }
    }
}

/// Configuration consumed by sessions and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// SQLite file. `None` means an in-memory database per session.
    pub db_path: Option<PathBuf>,
    pub tag_delete_policy: TagDeletePolicy,
    pub log_level: String,
    /// Rolling log directory. `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            tag_delete_policy: TagDeletePolicy::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl GraphConfig {
    /// Builds configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = non_blank(lookup(ENV_DB_PATH)) {
            config.db_path = Some(PathBuf::from(raw));
        }
        if let Some(raw) = non_blank(lookup(ENV_TAG_DELETE_POLICY)) {
            config.tag_delete_policy = raw.parse()?;
        }
        if let Some(raw) = non_blank(lookup(ENV_LOG_LEVEL)) {
            config.log_level = normalize_level(&raw)
                .map_err(|_| ConfigError::InvalidValue {
                    var: ENV_LOG_LEVEL,
                    value: raw.clone(),
                    expected: "trace|debug|info|warn|error",
                })?
                .to_string();
        }
        if let Some(raw) = non_blank(lookup(ENV_LOG_DIR)) {
            config.log_dir = Some(PathBuf::from(raw));
        }

        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                var,
                value,
                expected,
            } => write!(f, "invalid {var} value `{value}`; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{
        GraphConfig, TagDeletePolicy, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL,
        ENV_TAG_DELETE_POLICY,
    };
    use std::path::Path;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_detach_tags_and_use_memory_database() {
        let config = GraphConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.tag_delete_policy, TagDeletePolicy::Detach);
        assert!(config.db_path.is_none());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn blank_paths_are_treated_as_unset() {
        let config = GraphConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/tmp/graph.db"),
            (ENV_LOG_DIR, "   "),
        ]))
        .unwrap();
        assert_eq!(config.db_path.as_deref(), Some(Path::new("/tmp/graph.db")));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn env_overrides_policy_and_level() {
        let config = GraphConfig::from_lookup(lookup_from(&[
            (ENV_TAG_DELETE_POLICY, " BLOCK "),
            (ENV_LOG_LEVEL, "warning"),
        ]))
        .unwrap();
        assert_eq!(config.tag_delete_policy, TagDeletePolicy::Block);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn malformed_policy_is_rejected() {
        let err = GraphConfig::from_lookup(lookup_from(&[(ENV_TAG_DELETE_POLICY, "cascade")]))
            .unwrap_err();
        assert!(err.to_string().contains("detach|block"));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let err = GraphConfig::from_lookup(lookup_from(&[(ENV_LOG_LEVEL, "verbose")])).unwrap_err();
        assert!(err.to_string().contains(ENV_LOG_LEVEL));
    }
}
