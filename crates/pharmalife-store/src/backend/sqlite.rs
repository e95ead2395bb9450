//! # SQLite Backend
//!
//! The primary backend. Snapshots live in a single key/value table.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SQLite Primary Backend                             │
//! │                                                                         │
//! │  SqliteConfig::new(path) ← pool settings                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteBackend::connect(config).await ← pool + migrations              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │  app_data                                │                           │
//! │  │  key (PK) │ value (JSON) │ updated_at    │                           │
//! │  │  ─────────┼──────────────┼───────────────│                           │
//! │  │  main     │ {"branches…  │ 2024-06-01T…  │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! WAL journaling with NORMAL synchronous: readers never block the writer,
//! and a crash can lose at most the last committed snapshot, never corrupt
//! the file.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::StorageBackend;
use crate::error::{StorageError, StorageResult};

/// Embedded migrations from the workspace `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

// =============================================================================
// Configuration
// =============================================================================

/// SQLite connection settings.
///
/// ## Example
/// ```rust,ignore
/// let config = SqliteConfig::new("/var/lib/pharmalife/pharmalife.db")
///     .max_connections(2);
/// ```
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    pub database_path: PathBuf,

    /// Default: 2. Writes are serialized by the writer task anyway.
    pub max_connections: u32,

    /// Default: 10 seconds
    pub connect_timeout: Duration,

    /// Default: true
    pub run_migrations: bool,
}

impl SqliteConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteConfig {
            database_path: path.into(),
            max_connections: 2,
            connect_timeout: Duration::from_secs(10),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// An in-memory database (for testing).
    ///
    /// A single connection, since each in-memory connection is its own
    /// database.
    pub fn in_memory() -> Self {
        SqliteConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Backend
// =============================================================================

#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Opens (creating if needed) the database and applies migrations.
    pub async fn connect(config: SqliteConfig) -> StorageResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening primary database"
        );

        let in_memory = config.database_path.as_os_str() == ":memory:";

        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() && !in_memory {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Paths go through `filename`, never a URL, so `?` and `#` in a
        // directory name stay part of the path.
        let connect_options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else {
            SqliteConnectOptions::new().filename(&config.database_path)
        }
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await?;

        debug!(max_connections = config.max_connections, "Primary pool created");

        let backend = SqliteBackend { pool };
        if config.run_migrations {
            backend.run_migrations().await?;
        }

        Ok(backend)
    }

    /// Applies pending migrations. Idempotent.
    pub async fn run_migrations(&self) -> StorageResult<()> {
        MIGRATOR.run(&self.pool).await?;
        debug!("Primary migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the pool. Later operations fail with `Unavailable`.
    pub async fn close(&self) {
        info!("Closing primary database");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM app_data WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO app_data (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM app_data WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let backend = SqliteBackend::connect(SqliteConfig::in_memory())
            .await
            .unwrap();
        assert!(backend.health_check().await);
    }

    #[tokio::test]
    async fn test_upsert_and_load() {
        let backend = SqliteBackend::connect(SqliteConfig::in_memory())
            .await
            .unwrap();

        assert_eq!(backend.load("main").await.unwrap(), None);
        backend.save("main", "first").await.unwrap();
        backend.save("main", "second").await.unwrap();
        assert_eq!(backend.load("main").await.unwrap().as_deref(), Some("second"));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM app_data")
            .fetch_one(backend.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);

        backend.remove("main").await.unwrap();
        assert_eq!(backend.load("main").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/pharmalife.db");

        let backend = SqliteBackend::connect(SqliteConfig::new(&path)).await.unwrap();
        backend.save("main", "{}").await.unwrap();
        backend.close().await;

        let reopened = SqliteBackend::connect(SqliteConfig::new(&path)).await.unwrap();
        assert_eq!(reopened.load("main").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_path_with_url_characters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("branch?mode=ro#1/pharmalife.db");

        let backend = SqliteBackend::connect(SqliteConfig::new(&path)).await.unwrap();
        backend.save("main", "{}").await.unwrap();
        backend.close().await;

        assert!(path.is_file());
        let reopened = SqliteBackend::connect(SqliteConfig::new(&path)).await.unwrap();
        assert_eq!(reopened.load("main").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_closed_pool_fails() {
        let backend = SqliteBackend::connect(SqliteConfig::in_memory())
            .await
            .unwrap();
        backend.close().await;
        assert!(backend.save("main", "{}").await.is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = SqliteConfig::new("/tmp/test.db")
            .max_connections(4)
            .run_migrations(false);
        assert_eq!(config.max_connections, 4);
        assert!(!config.run_migrations);
    }
}
