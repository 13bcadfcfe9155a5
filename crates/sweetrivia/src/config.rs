//! Project configuration file support for sweetrivia.
//!
//! Loads configuration from `sweetrivia.toml` in the working directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use sweetrivia_db::Database;
use sweetrivia_publish::{LocalStorage, Publisher, SupabaseConfig, SupabaseStorage};

/// The config file name
pub const CONFIG_FILE_NAME: &str = "sweetrivia.toml";

pub const DEFAULT_PORT: u16 = 3210;
pub const DEFAULT_BUCKET: &str = "trivia-csv";
pub const DEFAULT_TABLE: &str = "trivia_exports";
pub const DEFAULT_API_KEY_ENV: &str = "SUPABASE_KEY";
pub const DEFAULT_LOCAL_DIR: &str = "exports";

/// Project-level configuration loaded from `sweetrivia.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// SQLite file holding drafts (default: the user data directory)
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub port: Option<u16>,
}

/// Where published exports go
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PublishConfig {
    pub backend: Option<BackendKind>,
    pub bucket: Option<String>,
    pub table: Option<String>,
    /// Supabase project URL
    pub url: Option<String>,
    /// Environment variable holding the Supabase API key
    pub api_key_env: Option<String>,
    /// Directory used by the local backend
    pub local_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Supabase,
    #[default]
    Local,
}

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Load from the working directory, falling back to defaults.
    pub fn load_or_default(working_dir: &Path) -> Result<Self> {
        Ok(Self::load(working_dir)?.unwrap_or_default())
    }

    pub fn port(&self) -> u16 {
        self.server.port.unwrap_or(DEFAULT_PORT)
    }

    /// Open the configured database, or the default one.
    pub fn open_database(&self) -> Result<Database> {
        match &self.database {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create database directory {}", parent.display())
                    })?;
                }
                Database::open_at(path)
                    .with_context(|| format!("Failed to open database {}", path.display()))
            }
            None => Database::open().context("Failed to initialize database"),
        }
    }

    /// Build the publisher for the configured backend.
    pub fn build_publisher(&self, working_dir: &Path) -> Result<Publisher> {
        let publish = &self.publish;
        match publish.backend.unwrap_or_default() {
            BackendKind::Local => {
                let dir = publish
                    .local_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_DIR));
                let dir = if dir.is_absolute() {
                    dir
                } else {
                    working_dir.join(dir)
                };
                let storage = Arc::new(LocalStorage::new(dir));
                Ok(Publisher::new(storage.clone(), storage))
            }
            BackendKind::Supabase => {
                let url = publish
                    .url
                    .clone()
                    .context("[publish].url is required for the supabase backend")?;
                let key_env = publish
                    .api_key_env
                    .as_deref()
                    .unwrap_or(DEFAULT_API_KEY_ENV);
                let api_key = std::env::var(key_env)
                    .with_context(|| format!("Environment variable {} is not set", key_env))?;

                let storage = Arc::new(SupabaseStorage::new(SupabaseConfig {
                    url,
                    api_key,
                    bucket: publish
                        .bucket
                        .clone()
                        .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
                    table: publish
                        .table
                        .clone()
                        .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
                })?);
                Ok(Publisher::new(storage.clone(), storage))
            }
        }
    }
}
