//! Configuration for the Capital ledger.
//!
//! Loaded from `~/.capital/config.toml`, or from the file named by
//! `CAPITAL_CONFIG`. Every section is optional; absent values fall back to
//! the defaults documented on each accessor.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use serde::Deserialize;
use thiserror::Error;

use capital_types::{AggregationScope, WithdrawalPolicy};

pub const CONFIG_ENV_VAR: &str = "CAPITAL_CONFIG";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapitalConfig {
    pub ledger: Option<LedgerConfig>,
    pub policy: Option<PolicyConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Database file. `${VAR}` references are expanded from the environment.
    pub path: Option<String>,
    /// How long a writer waits for another writer's lock before failing.
    pub busy_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    #[serde(default)]
    pub withdrawals: WithdrawalPolicy,
    #[serde(default)]
    pub platform_totals: AggregationScope,
}

/// Replace `${VAR}` occurrences with environment values (missing vars become empty).
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    out
}

impl CapitalConfig {
    /// Load the configuration file if one exists.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file; using defaults");
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Configured database path, or `~/.capital/ledger.db`.
    #[must_use]
    pub fn ledger_path(&self) -> Option<PathBuf> {
        let configured = self
            .ledger
            .as_ref()
            .and_then(|ledger| ledger.path.as_deref())
            .map(expand_env_vars)
            .filter(|path| !path.trim().is_empty());

        match configured {
            Some(path) => Some(PathBuf::from(path)),
            None => data_dir().map(|dir| dir.join("ledger.db")),
        }
    }

    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        let ms = self
            .ledger
            .as_ref()
            .and_then(|ledger| ledger.busy_timeout_ms)
            .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS);
        Duration::from_millis(ms)
    }

    #[must_use]
    pub fn withdrawal_policy(&self) -> WithdrawalPolicy {
        self.policy
            .as_ref()
            .map(|policy| policy.withdrawals)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn aggregation_scope(&self) -> AggregationScope {
        self.policy
            .as_ref()
            .map(|policy| policy.platform_totals)
            .unwrap_or_default()
    }
}

/// Directory holding the default config, database and logs (`~/.capital`).
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".capital"))
}

fn config_path() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os(CONFIG_ENV_VAR).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(explicit));
    }
    data_dir().map(|dir| dir.join("config.toml"))
}
