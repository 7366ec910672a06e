use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::repo::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

pub(crate) const ENV_USER: &str = "CATBUDGET_USER";
pub(crate) const ENV_REMOTE_URL: &str = "CATBUDGET_REMOTE_URL";
pub(crate) const ENV_LOG: &str = "CATBUDGET_LOG";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{0} needs a value")]
    MissingValue(&'static str),
    #[error("no user selected; pass --user <id> or set CATBUDGET_USER")]
    MissingUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum BackendKind {
    #[default]
    Local,
    Remote,
}

/// Settings from `config.json`, then environment, then command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) user_id: Option<i64>,
    pub(crate) backend: BackendKind,
    pub(crate) remote_url: String,
    pub(crate) timeout_secs: u64,
    pub(crate) currency_symbol: String,
    /// Overrides the platform data directory for the local database.
    pub(crate) database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: None,
            backend: BackendKind::Local,
            remote_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            currency_symbol: "$".to_string(),
            database_path: None,
        }
    }
}

impl Config {
    /// Read the config file, or defaults when it does not exist.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides. `lookup` is `std::env::var(..).ok()` in
    /// production.
    pub(crate) fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup(ENV_USER).filter(|v| !v.trim().is_empty()) {
            self.user_id = Some(parse_user(ENV_USER, &raw)?);
        }
        if let Some(url) = lookup(ENV_REMOTE_URL).filter(|v| !v.trim().is_empty()) {
            self.remote_url = url.trim().to_string();
            self.backend = BackendKind::Remote;
        }
        Ok(())
    }

    /// Consume the global flags (`--user`, `--remote`, `--local`) anywhere in
    /// `args` and return what is left for the command.
    pub(crate) fn apply_args(&mut self, args: &[String]) -> Result<Vec<String>, ConfigError> {
        let mut rest = Vec::with_capacity(args.len());
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--user" => {
                    let raw = iter.next().ok_or(ConfigError::MissingValue("--user"))?;
                    self.user_id = Some(parse_user("--user", raw)?);
                }
                "--remote" => {
                    let url = iter.next().ok_or(ConfigError::MissingValue("--remote"))?;
                    self.remote_url = url.clone();
                    self.backend = BackendKind::Remote;
                }
                "--local" => self.backend = BackendKind::Local,
                _ => rest.push(arg.clone()),
            }
        }
        Ok(rest)
    }

    pub(crate) fn require_user(&self) -> Result<i64, ConfigError> {
        self.user_id.ok_or(ConfigError::MissingUser)
    }
}

fn parse_user(key: &'static str, raw: &str) -> Result<i64, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
