//! # Backup Envelope
//!
//! The on-disk backup format and the checks applied before a backup may
//! replace the live repository.
//!
//! ## File Format
//! ```text
//! pharmalife-backup-2024-06-01.json
//! {
//!   "version": "1.0.0",
//!   "createdAt": "2024-06-01T09:30:00Z",
//!   "data": { "branches": [...], "suppliers": [...], ..., "settings": {...} }
//! }
//! ```
//!
//! Restores accept a looser shape ([`RawBackup`]) because backup files are
//! user-supplied: every field is optional at parse time and checked
//! afterwards, so a bad file is reported as `InvalidBackup` rather than a
//! raw JSON error.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::repository::Repository;

/// Version written into every new backup.
pub const BACKUP_VERSION: &str = "1.0.0";

/// Versions `restore` accepts.
pub const SUPPORTED_BACKUP_VERSIONS: &[&str] = &["1.0.0"];

/// A complete backup of the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub data: Repository,
}

impl Backup {
    /// Wraps a repository copy in a current-version envelope.
    pub fn new(data: Repository, created_at: DateTime<Utc>) -> Self {
        Backup {
            version: BACKUP_VERSION.to_string(),
            created_at,
            data,
        }
    }

    /// Checks that this backup may be restored.
    pub fn validate(&self) -> CoreResult<()> {
        check_version(&self.version)?;
        self.data
            .validate_amounts()
            .map_err(|e| CoreError::InvalidBackup(format!("invalid data: {e}")))
    }

    /// Pretty-printed JSON, the format of exported backup files.
    pub fn to_pretty_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

/// Rejects empty or unknown backup versions.
pub fn check_version(version: &str) -> CoreResult<()> {
    if version.trim().is_empty() {
        return Err(CoreError::InvalidBackup("missing version".to_string()));
    }

    if !SUPPORTED_BACKUP_VERSIONS.contains(&version) {
        return Err(CoreError::InvalidBackup(format!(
            "unsupported version {version}"
        )));
    }

    Ok(())
}

/// File name for a backup exported on `date`.
///
/// ```rust
/// use chrono::NaiveDate;
/// use pharmalife_core::backup::backup_file_name;
///
/// let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// assert_eq!(backup_file_name(date), "pharmalife-backup-2024-06-01.json");
/// ```
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("pharmalife-backup-{}.json", date.format("%Y-%m-%d"))
}

// =============================================================================
// Loose Parsing
// =============================================================================

/// A backup as read from an untrusted file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBackup {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RawBackup {
    /// Parses backup file text.
    pub fn parse(text: &str) -> CoreResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| CoreError::InvalidBackup(format!("malformed backup file: {e}")))
    }

    /// Checks the envelope and decodes the repository.
    ///
    /// A missing `createdAt` is replaced by `now`; a present but unparsable
    /// one is rejected.
    pub fn into_backup(self, now: DateTime<Utc>) -> CoreResult<Backup> {
        let version = self
            .version
            .ok_or_else(|| CoreError::InvalidBackup("missing version".to_string()))?;
        check_version(&version)?;

        let data = self
            .data
            .ok_or_else(|| CoreError::InvalidBackup("missing data".to_string()))?;
        if !data.is_object() {
            return Err(CoreError::InvalidBackup("data is not an object".to_string()));
        }
        let data: Repository = serde_json::from_value(data)
            .map_err(|e| CoreError::InvalidBackup(format!("invalid data: {e}")))?;

        let created_at = match self.created_at {
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|e| CoreError::InvalidBackup(format!("invalid createdAt: {e}")))?,
            None => now,
        };

        Ok(Backup {
            version,
            created_at,
            data,
        })
    }
}
