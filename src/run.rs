mod cli;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{BackendKind, Config};
use crate::db::Database;
use crate::repo::http::HttpStore;
use crate::repo::Store;

pub(crate) use cli::as_cli;

/// Where the config file and the local database live by default.
pub(crate) struct Paths {
    pub(crate) config_file: PathBuf,
    pub(crate) database: PathBuf,
}

/// The store a command runs against, chosen by configuration.
pub(crate) enum Backend {
    Local(Database),
    Remote(HttpStore),
}

impl Backend {
    pub(crate) fn open(config: &Config, default_db_path: &Path) -> Result<Self> {
        match config.backend {
            BackendKind::Local => {
                let path = config
                    .database_path
                    .as_deref()
                    .unwrap_or(default_db_path);
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir).with_context(|| {
                        format!("Failed to create data directory: {}", dir.display())
                    })?;
                }
                Ok(Self::Local(Database::open(path)?))
            }
            BackendKind::Remote => {
                let store = HttpStore::new(
                    &config.remote_url,
                    Duration::from_secs(config.timeout_secs),
                )
                .context("Failed to build HTTP client")?;
                Ok(Self::Remote(store))
            }
        }
    }

    pub(crate) fn store(&self) -> &dyn Store {
        match self {
            Self::Local(db) => db,
            Self::Remote(http) => http,
        }
    }

    /// The local database, when that is the active backend.
    pub(crate) fn local_mut(&mut self) -> Option<&mut Database> {
        match self {
            Self::Local(db) => Some(db),
            Self::Remote(_) => None,
        }
    }
}
