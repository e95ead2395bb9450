//! # pharmalife-core: Domain Logic for the PharmaLife Local Store
//!
//! Entity types, money, derived statuses, validation, statistics and the
//! default dataset. Everything here is pure: no database, no files, no
//! tasks. The store crate owns all of that.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PharmaLife Local Store                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Dashboard / pharmalife CLI                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │     pharmalife-store: LocalStore, backends, writer task         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           ★ pharmalife-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  status   │  │repository │  │  backup   │  │   │
//! │  │   │  patch    │  │  money    │  │  defaults │  │  stats    │  │   │
//! │  │   │ settings  │  │validation │  │   Record  │  │  alerts   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO TASKS • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entity records and their `New*` shapes
//! - [`patch`] - Partial updates
//! - [`status`] - Status enums and derivation rules
//! - [`money`] - Integer money
//! - [`settings`] - Company settings
//! - [`validation`] - Field rules
//! - [`repository`] - The aggregate and the `Record` trait
//! - [`stats`] / [`alerts`] - Dashboard queries
//! - [`defaults`] - Demo dataset
//! - [`backup`] - Backup envelope
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use pharmalife_core::{default_repository, StoreStats};
//!
//! let repo = default_repository(Utc::now());
//! let stats = StoreStats::compute(&repo, Utc::now().date_naive());
//! assert_eq!(stats.total_branches, 5);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod alerts;
pub mod backup;
pub mod defaults;
pub mod error;
pub mod money;
pub mod patch;
pub mod repository;
pub mod settings;
pub mod stats;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use alerts::{license_alerts, AlertKind, AlertSummary, LicenseAlert};
pub use backup::{backup_file_name, Backup, RawBackup, BACKUP_VERSION, SUPPORTED_BACKUP_VERSIONS};
pub use defaults::default_repository;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use patch::*;
pub use repository::{generate_id, Record, Repository};
pub use settings::{Settings, SettingsPatch};
pub use stats::StoreStats;
pub use status::*;
pub use types::*;
