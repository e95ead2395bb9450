//! # Backup, Restore and Reset
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Backup Lifecycle                                │
//! │                                                                         │
//! │  create_backup() ─► Backup { version, createdAt, data }                │
//! │        │                                                                │
//! │        ├── export_backup()         → pretty JSON bytes                 │
//! │        └── export_backup_to_dir()  → pharmalife-backup-YYYY-MM-DD.json  │
//! │                                                                         │
//! │  restore_backup_file(path)                                             │
//! │        │ read + RawBackup::parse + version check + decode               │
//! │        ▼                                                                │
//! │  restore_backup(backup) ─► whole repository replaced, or nothing       │
//! │                                                                         │
//! │  reset_to_defaults() ─► default dataset, legacy snapshot removed       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use chrono::Utc;
use pharmalife_core::{backup_file_name, default_repository, Backup, RawBackup};
use tracing::{info, warn};

use crate::error::{StoreError, StoreResult};
use crate::store::{today, LocalStore};

impl LocalStore {
    /// A deep copy of the current repository in a backup envelope.
    pub fn create_backup(&self) -> Backup {
        let mut data = self.read(|repo| repo.clone());
        data.refresh_derived(today());
        Backup::new(data, Utc::now())
    }

    /// The current repository as pretty-printed backup JSON.
    pub fn export_backup(&self) -> StoreResult<Vec<u8>> {
        let bytes = self.create_backup().to_pretty_json()?;
        info!(bytes = bytes.len(), "Backup exported");
        Ok(bytes)
    }

    /// Writes a backup file named after today's date into `dir`.
    pub async fn export_backup_to_dir(&self, dir: &Path) -> StoreResult<PathBuf> {
        let bytes = self.export_backup()?;
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(backup_file_name(today()));
        tokio::fs::write(&path, &bytes).await?;

        info!(path = %path.display(), bytes = bytes.len(), "Backup file written");
        Ok(path)
    }

    /// Replaces the entire repository with the backup's data.
    ///
    /// Either every collection and the settings are replaced, or nothing is.
    pub fn restore_backup(&self, backup: Backup) -> StoreResult<()> {
        backup.validate()?;

        let Backup {
            version,
            created_at,
            mut data,
        } = backup;
        data.refresh_derived(today());

        self.mutate(|repo| {
            *repo = data;
            Ok(())
        })?;

        info!(version = %version, created_at = %created_at, "Backup restored");
        Ok(())
    }

    /// Parses backup JSON and restores it.
    pub fn restore_backup_json(&self, text: &str) -> StoreResult<()> {
        let backup = RawBackup::parse(text)?.into_backup(Utc::now())?;
        self.restore_backup(backup)
    }

    /// Reads a backup file and restores it.
    pub async fn restore_backup_file(&self, path: &Path) -> StoreResult<()> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to read backup file");
            StoreError::Io(e)
        })?;
        self.restore_backup_json(&text)
    }

    /// Discards all data and reinstalls the default dataset.
    ///
    /// The legacy snapshot is removed before the defaults are written, so a
    /// write that falls back to the legacy backend leaves the defaults there.
    pub fn reset_to_defaults(&self) {
        let mut defaults = default_repository(Utc::now());
        defaults.refresh_derived(today());

        let result = self.mutate(|repo| {
            self.remove_legacy_snapshot();
            *repo = defaults;
            Ok(())
        });

        match result {
            Ok(()) => warn!("Store reset to default data"),
            Err(e) => warn!(error = %e, "Reset failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmalife_core::NewBranch;

    #[tokio::test]
    async fn test_backup_is_deep_copy() {
        let store = LocalStore::in_memory().await;
        store.wait_for_init().await;

        let backup = store.create_backup();
        store
            .branches()
            .add(NewBranch {
                name: "Heliopolis".to_string(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(backup.data.branches.len(), 5);
        assert_eq!(store.branches().count(), 6);
    }

    #[tokio::test]
    async fn test_restore_rejects_unknown_version() {
        let store = LocalStore::in_memory().await;
        store.wait_for_init().await;

        let mut backup = store.create_backup();
        backup.data.branches.clear();
        backup.version = "9.9.9".to_string();

        let err = store.restore_backup(backup).unwrap_err();
        assert!(matches!(err, StoreError::InvalidBackup(_)));
        assert_eq!(store.branches().count(), 5);
    }

    #[tokio::test]
    async fn test_restore_json_missing_data() {
        let store = LocalStore::in_memory().await;
        store.wait_for_init().await;

        let err = store
            .restore_backup_json(r#"{"version":"1.0.0"}"#)
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidBackup(_)));
    }
}
