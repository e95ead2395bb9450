//! # Store Configuration
//!
//! Where the store keeps its data, and under which keys.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PHARMALIFE_DATA_DIR=/srv/pharmalife                                │
//! │     PHARMALIFE_DB_FILE=pharmalife.db                                   │
//! │     PHARMALIFE_BACKUP_DIR=/mnt/usb/backups                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pharmalife/store.toml (Linux)                            │
//! │     ~/Library/Application Support/com.pharmalife.store/store.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     platform data dir, keys "main" / "pharmalife_db"                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! data_dir = "/var/lib/pharmalife"
//! database_file = "pharmalife.db"
//! legacy_dir = "legacy"
//! primary_key = "main"
//! legacy_key = "pharmalife_db"
//! max_connections = 2
//! connect_timeout_secs = 10
//!
//! [backup]
//! dir = "backups"
//! ```
//!
//! Relative `legacy_dir`, `database_file` and `backup.dir` are resolved
//! against `data_dir`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

/// Key of the snapshot in the primary backend.
pub const DEFAULT_PRIMARY_KEY: &str = "main";

/// Key of the snapshot in the legacy backend.
pub const DEFAULT_LEGACY_KEY: &str = "pharmalife_db";

// =============================================================================
// Storage Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Root directory for everything the store writes.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// SQLite database file for the primary backend.
    #[serde(default = "default_database_file")]
    pub database_file: PathBuf,

    /// Directory of the flat-file legacy backend.
    #[serde(default = "default_legacy_dir")]
    pub legacy_dir: PathBuf,

    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    #[serde(default = "default_legacy_key")]
    pub legacy_key: String,

    /// SQLite pool size. Writes are serialized by the writer task, so a
    /// small pool is enough.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "pharmalife", "store")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./pharmalife-data"))
}

fn default_database_file() -> PathBuf {
    PathBuf::from("pharmalife.db")
}

fn default_legacy_dir() -> PathBuf {
    PathBuf::from("legacy")
}

fn default_primary_key() -> String {
    DEFAULT_PRIMARY_KEY.to_string()
}

fn default_legacy_key() -> String {
    DEFAULT_LEGACY_KEY.to_string()
}

fn default_max_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
            legacy_dir: default_legacy_dir(),
            primary_key: default_primary_key(),
            legacy_key: default_legacy_key(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

// =============================================================================
// Backup Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupSettings {
    /// Where `export` writes backup files.
    #[serde(default = "default_backup_dir")]
    pub dir: PathBuf,
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("backups")
}

impl Default for BackupSettings {
    fn default() -> Self {
        BackupSettings {
            dir: default_backup_dir(),
        }
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub backup: BackupSettings,
}

impl StoreConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (store.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading store config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load store config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Invalid("no config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Store config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.storage.primary_key.trim().is_empty() {
            return Err(ConfigError::Invalid("primary_key must not be empty".into()));
        }

        if self.storage.legacy_key.trim().is_empty() {
            return Err(ConfigError::Invalid("legacy_key must not be empty".into()));
        }

        if self.storage.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.storage.database_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database_file must not be empty".into()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("PHARMALIFE_DATA_DIR") {
            debug!(data_dir = %dir, "Overriding data dir from environment");
            self.storage.data_dir = PathBuf::from(dir);
        }

        if let Ok(file) = std::env::var("PHARMALIFE_DB_FILE") {
            debug!(database_file = %file, "Overriding database file from environment");
            self.storage.database_file = PathBuf::from(file);
        }

        if let Ok(dir) = std::env::var("PHARMALIFE_BACKUP_DIR") {
            self.backup.dir = PathBuf::from(dir);
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "pharmalife", "store")
            .map(|dirs| dirs.config_dir().join("store.toml"))
    }

    // =========================================================================
    // Resolved Paths
    // =========================================================================

    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.storage.database_file)
    }

    pub fn legacy_dir(&self) -> PathBuf {
        self.resolve(&self.storage.legacy_dir)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.resolve(&self.backup.dir)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.storage.connect_timeout_secs)
    }

    /// Points every path at `data_dir`, keeping relative layout.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.storage.data_dir = data_dir.into();
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.storage.data_dir.join(path)
        }
    }
}
