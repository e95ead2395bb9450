//! # pharmalife-store: Local Persistence for PharmaLife
//!
//! Keeps the whole dashboard dataset in memory and mirrors it to durable
//! storage in the background.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PharmaLife Data Flow                             │
//! │                                                                         │
//! │  Dashboard / CLI                                                       │
//! │       │  branches().add(..), stats(), create_backup() …                │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  pharmalife-store (THIS CRATE)                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  LocalStore   │    │  Persistence  │    │   Backends   │  │   │
//! │  │   │  (store.rs)   │───►│    Writer     │───►│              │  │   │
//! │  │   │               │    │  (writer.rs)  │    │ SqliteBackend│  │   │
//! │  │   │ Mutex<Repo>   │    │ FIFO snapshot │    │ FileBackend  │  │   │
//! │  │   │ Collection<T> │    │ queue         │    │ MemoryBackend│  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  primary: <data_dir>/pharmalife.db   (app_data, key "main")     │   │
//! │  │  legacy:  <data_dir>/legacy/pharmalife_db.json                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - `LocalStore`, init from the primary backend, collection handles
//! - [`backup`] - Backup export, restore and reset
//! - [`backend`] - `StorageBackend` trait and its SQLite/file/memory impls
//! - [`config`] - TOML configuration with env overrides
//! - [`error`] - Storage and store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pharmalife_store::{LocalStore, StoreConfig};
//!
//! let config = StoreConfig::load_or_default(None);
//! let store = LocalStore::open_with_config(&config).await?;
//! store.wait_for_init().await;
//!
//! let stats = store.stats();
//! println!("{} active branches", stats.active_branches);
//!
//! store.flush().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod backup;
pub mod config;
pub mod error;
pub mod store;
mod writer;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{FileBackend, MemoryBackend, SqliteBackend, SqliteConfig, StorageBackend};
pub use config::StoreConfig;
pub use error::{ConfigError, StorageError, StoreError, StoreResult};
pub use store::{Collection, InitOutcome, LocalStore, SeedSource, StoreOptions};
pub use writer::{PersistStats, WriteOutcome};
