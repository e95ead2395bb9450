//! # LocalStore
//!
//! Owner of the whole dataset. Reads and writes are synchronous against an
//! in-memory `Repository`; durability happens behind the caller's back.
//!
//! ## Initialization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        LocalStore::open                                 │
//! │                                                                         │
//! │  1. legacy.load("pharmalife_db")                                       │
//! │       ├── parseable snapshot → seed from it                            │
//! │       └── absent / broken    → seed from default dataset               │
//! │  2. create PersistenceWriter (stopped, commands queue up)              │
//! │  3. spawn primary init ───────────────┐   return store (usable now)    │
//! │                                        ▼                                │
//! │  4. primary.load("main")                                               │
//! │       ├── snapshot      → replace in-memory repo  (LoadedFromPrimary)  │
//! │       ├── none          → write seed to primary   (MigratedToPrimary)  │
//! │       └── error / junk  → keep seed               (Degraded)           │
//! │  5. start the writer                                                   │
//! │                                                                         │
//! │  wait_for_init() resolves after step 5 and any migration write.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations made before init completes are overwritten if a primary
//! snapshot arrives. Callers that need the authoritative dataset await
//! `wait_for_init()` first.
//!
//! ## Locking
//! The repository sits behind a `std::sync::Mutex` that is never held
//! across an `.await`. Each mutation serializes the snapshot and queues it
//! for the writer while still holding the lock, which is what keeps the
//! writer queue in mutation order.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, NaiveDate, Utc};
use pharmalife_core::{
    default_repository, generate_id, license_alerts, AlertSummary, Branch, Employee, Expense,
    License, LicenseAlert, Order, Product, Record, Repository, Sale, Settings, SettingsPatch,
    StoreStats, Supplier, User,
};
use serde::Serialize;
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::backend::{FileBackend, MemoryBackend, SqliteBackend, SqliteConfig, StorageBackend};
use crate::config::{StoreConfig, DEFAULT_LEGACY_KEY, DEFAULT_PRIMARY_KEY};
use crate::error::{StorageResult, StoreError, StoreResult};
use crate::writer::{PersistStats, PersistenceWriter, WriteOutcome, WriterHandle};

// =============================================================================
// Options and Outcomes
// =============================================================================

/// Keys the store reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub primary_key: String,
    pub legacy_key: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            legacy_key: DEFAULT_LEGACY_KEY.to_string(),
        }
    }
}

impl StoreOptions {
    pub fn from_config(config: &StoreConfig) -> Self {
        StoreOptions {
            primary_key: config.storage.primary_key.clone(),
            legacy_key: config.storage.legacy_key.clone(),
        }
    }
}

/// Where the in-memory repository came from at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedSource {
    Legacy,
    Defaults,
}

/// Result of loading from the primary backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InitOutcome {
    /// The primary snapshot replaced the seed.
    LoadedFromPrimary,
    /// The primary backend was empty; the seed was written to it.
    MigratedToPrimary,
    /// The primary backend could not be read, held an unreadable
    /// snapshot, or rejected the first write. The seed stays in use.
    Degraded,
}

// =============================================================================
// LocalStore
// =============================================================================

enum InitStep {
    Done(InitOutcome),
    Migrating(oneshot::Receiver<WriteOutcome>),
}

/// Handle to the dataset. Clones share the same state.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    repo: Mutex<Repository>,
    writer: WriterHandle,
    options: StoreOptions,
    seed_source: SeedSource,
    initialized: AtomicBool,
    /// Set when a mutation happens before primary init completes.
    mutated_before_init: AtomicBool,
    init_rx: watch::Receiver<Option<InitOutcome>>,
}

impl LocalStore {
    /// Opens the store and starts loading from `primary` in the background.
    ///
    /// Only the legacy read is awaited here; the returned store is usable
    /// immediately.
    pub async fn open(
        primary: Arc<dyn StorageBackend>,
        legacy: Arc<dyn StorageBackend>,
        options: StoreOptions,
    ) -> Self {
        let now = Utc::now();
        let (mut repo, seed_source) = match legacy.load(&options.legacy_key).await {
            Ok(Some(text)) => match Repository::from_json(&text) {
                Ok(repo) => (repo, SeedSource::Legacy),
                Err(e) => {
                    warn!(
                        backend = legacy.name(),
                        key = %options.legacy_key,
                        error = %e,
                        "Legacy snapshot is unreadable, seeding defaults"
                    );
                    (default_repository(now), SeedSource::Defaults)
                }
            },
            Ok(None) => (default_repository(now), SeedSource::Defaults),
            Err(e) => {
                warn!(
                    backend = legacy.name(),
                    key = %options.legacy_key,
                    error = %e,
                    "Legacy backend read failed, seeding defaults"
                );
                (default_repository(now), SeedSource::Defaults)
            }
        };
        repo.refresh_derived(today());

        info!(
            primary = primary.name(),
            legacy = legacy.name(),
            seed = ?seed_source,
            "Opening local store"
        );

        let (writer, pending_writer) = PersistenceWriter::new(
            primary.clone(),
            legacy,
            options.primary_key.clone(),
            options.legacy_key.clone(),
        );
        let (init_tx, init_rx) = watch::channel(None);

        let store = LocalStore {
            inner: Arc::new(StoreInner {
                repo: Mutex::new(repo),
                writer,
                options,
                seed_source,
                initialized: AtomicBool::new(false),
                mutated_before_init: AtomicBool::new(false),
                init_rx,
            }),
        };

        let task_store = store.clone();
        tokio::spawn(async move {
            let outcome = task_store.init_from_primary(primary, pending_writer).await;
            info!(outcome = ?outcome, "Primary init complete");
            let _ = init_tx.send(Some(outcome));
        });

        store
    }

    /// Opens the SQLite primary and file legacy backends from `config`.
    pub async fn open_with_config(config: &StoreConfig) -> StoreResult<Self> {
        let sqlite = SqliteBackend::connect(
            SqliteConfig::new(config.database_path())
                .max_connections(config.storage.max_connections)
                .connect_timeout(config.connect_timeout()),
        )
        .await?;
        let legacy = FileBackend::new(config.legacy_dir());

        Ok(Self::open(
            Arc::new(sqlite),
            Arc::new(legacy),
            StoreOptions::from_config(config),
        )
        .await)
    }

    /// A store backed by two fresh in-memory backends.
    pub async fn in_memory() -> Self {
        Self::open(
            Arc::new(MemoryBackend::new()),
            Arc::new(MemoryBackend::new()),
            StoreOptions::default(),
        )
        .await
    }

    async fn init_from_primary(
        &self,
        primary: Arc<dyn StorageBackend>,
        writer: PersistenceWriter,
    ) -> InitOutcome {
        let key = self.inner.options.primary_key.clone();
        let loaded = primary.load(&key).await;
        let step = self.apply_primary_load(primary.name(), &key, loaded);

        // Everything queued so far now lands after the primary read.
        writer.start();

        match step {
            InitStep::Done(outcome) => outcome,
            InitStep::Migrating(ack) => match ack.await {
                Ok(WriteOutcome::Primary) => {
                    info!(key = %key, "Migrated seed to primary backend");
                    InitOutcome::MigratedToPrimary
                }
                _ => InitOutcome::Degraded,
            },
        }
    }

    fn apply_primary_load(
        &self,
        backend: &str,
        key: &str,
        loaded: StorageResult<Option<String>>,
    ) -> InitStep {
        let mut repo = self.lock();
        self.inner.initialized.store(true, Ordering::SeqCst);

        match loaded {
            Err(e) => {
                error!(backend, key, error = %e, "Primary read failed, keeping seed");
                InitStep::Done(InitOutcome::Degraded)
            }
            Ok(None) => match repo.to_json() {
                Ok(snapshot) => InitStep::Migrating(self.inner.writer.save_with_ack(snapshot)),
                Err(e) => {
                    error!(error = %e, "Failed to serialize repository");
                    InitStep::Done(InitOutcome::Degraded)
                }
            },
            Ok(Some(text)) => match Repository::from_json(&text) {
                Ok(mut fresh) => {
                    fresh.refresh_derived(today());
                    *repo = fresh;

                    if self.inner.mutated_before_init.load(Ordering::SeqCst) {
                        warn!("Changes made before init were replaced by the primary snapshot");
                        self.persist(&repo);
                    }
                    debug!(bytes = text.len(), "Loaded repository from primary");
                    InitStep::Done(InitOutcome::LoadedFromPrimary)
                }
                Err(e) => {
                    error!(backend, key, error = %e, "Primary snapshot is unreadable, keeping seed");
                    InitStep::Done(InitOutcome::Degraded)
                }
            },
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Waits for primary init and returns its outcome.
    pub async fn wait_for_init(&self) -> InitOutcome {
        let mut rx = self.inner.init_rx.clone();
        let result = match rx.wait_for(|outcome| outcome.is_some()).await {
            Ok(outcome) => *outcome,
            Err(_) => None,
        };
        result.unwrap_or(InitOutcome::Degraded)
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::SeqCst)
    }

    pub fn seed_source(&self) -> SeedSource {
        self.inner.seed_source
    }

    /// Waits until every write queued so far has been applied.
    pub async fn flush(&self) {
        self.inner.writer.flush().await;
    }

    pub fn persist_stats(&self) -> PersistStats {
        self.inner.writer.stats()
    }

    pub fn options(&self) -> &StoreOptions {
        &self.inner.options
    }

    // =========================================================================
    // Collections
    // =========================================================================

    pub fn collection<T: Record>(&self) -> Collection<'_, T> {
        Collection {
            store: self,
            _record: PhantomData,
        }
    }

    pub fn branches(&self) -> Collection<'_, Branch> {
        self.collection()
    }

    pub fn suppliers(&self) -> Collection<'_, Supplier> {
        self.collection()
    }

    pub fn licenses(&self) -> Collection<'_, License> {
        self.collection()
    }

    pub fn employees(&self) -> Collection<'_, Employee> {
        self.collection()
    }

    pub fn products(&self) -> Collection<'_, Product> {
        self.collection()
    }

    pub fn orders(&self) -> Collection<'_, Order> {
        self.collection()
    }

    pub fn sales(&self) -> Collection<'_, Sale> {
        self.collection()
    }

    pub fn expenses(&self) -> Collection<'_, Expense> {
        self.collection()
    }

    pub fn users(&self) -> Collection<'_, User> {
        self.collection()
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn settings(&self) -> Settings {
        self.read(|repo| repo.settings.clone())
    }

    pub fn update_settings(&self, patch: SettingsPatch) -> Settings {
        let result = self.mutate(|repo| {
            patch.apply_to(&mut repo.settings);
            Ok(repo.settings.clone())
        });
        // The closure never fails.
        result.unwrap_or_else(|_| self.settings())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Dashboard statistics, recomputed on every call.
    pub fn stats(&self) -> StoreStats {
        self.read(|repo| StoreStats::compute(repo, today()))
    }

    /// Licenses that are expired or expire within 30 days, most urgent first.
    pub fn license_alerts(&self) -> Vec<LicenseAlert> {
        self.read(|repo| license_alerts(repo, today()))
    }

    pub fn alert_summary(&self) -> AlertSummary {
        AlertSummary::from_alerts(&self.license_alerts())
    }

    /// Finds the user with exactly this username and password.
    ///
    /// ## Security
    /// Passwords are stored and compared in plaintext, with no rate
    /// limiting and no session. Suitable only for a single-operator
    /// machine whose data directory nobody else can read.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<User> {
        self.read(|repo| {
            repo.users
                .iter()
                .find(|u| u.username == username && u.password == password)
                .cloned()
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    pub(crate) fn lock(&self) -> MutexGuard<'_, Repository> {
        self.inner
            .repo
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&Repository) -> R) -> R {
        let repo = self.lock();
        f(&repo)
    }

    /// Runs `f` under the lock and, if it succeeds, queues a snapshot.
    ///
    /// `f` must leave the repository untouched when it returns an error.
    pub(crate) fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Repository) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let mut repo = self.lock();
        let result = f(&mut repo)?;

        if !self.inner.initialized.load(Ordering::SeqCst) {
            self.inner.mutated_before_init.store(true, Ordering::SeqCst);
        }
        self.persist(&repo);
        Ok(result)
    }

    /// Queues legacy removal, in order with snapshot writes.
    pub(crate) fn remove_legacy_snapshot(&self) {
        self.inner.writer.remove_legacy();
    }

    fn persist(&self, repo: &Repository) {
        match repo.to_json() {
            Ok(snapshot) => self.inner.writer.save(snapshot),
            Err(e) => error!(error = %e, "Failed to serialize repository; change not persisted"),
        }
    }
}

/// Today's date on the operator's clock, used for expiry calculations.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

// =============================================================================
// Collection Handle
// =============================================================================

/// Typed access to one collection of the repository.
///
/// Every read returns copies with derived fields recomputed for today.
pub struct Collection<'a, T: Record> {
    store: &'a LocalStore,
    _record: PhantomData<T>,
}

impl<'a, T: Record> Collection<'a, T> {
    /// Every record, in insertion order.
    pub fn all(&self) -> Vec<T> {
        self.find(|_| true)
    }

    pub fn get(&self, id: &str) -> Option<T> {
        let today = today();
        self.store.read(|repo| {
            T::collection(repo).iter().find(|r| r.id() == id).map(|r| {
                let mut record = r.clone();
                record.refresh_derived(today);
                record
            })
        })
    }

    /// Records matching `predicate`, evaluated on refreshed copies.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let today = today();
        self.store.read(|repo| {
            T::collection(repo)
                .iter()
                .map(|r| {
                    let mut record = r.clone();
                    record.refresh_derived(today);
                    record
                })
                .filter(|r| predicate(r))
                .collect()
        })
    }

    pub fn count(&self) -> usize {
        self.store.read(|repo| T::collection(repo).len())
    }

    /// Validates and appends a new record, returning it with its new id.
    pub fn add(&self, new: T::New) -> StoreResult<T> {
        let now = Utc::now();
        let mut record = T::create(new, generate_id(), now);
        record.refresh_derived(today());
        record.validate()?;

        let created = self.store.mutate(|repo| {
            T::collection_mut(repo).push(record.clone());
            Ok(record)
        })?;

        debug!(collection = T::COLLECTION, id = %created.id(), "Record added");
        Ok(created)
    }

    /// Merges `patch` into the record with this id.
    ///
    /// The merged record is validated before anything is stored; on error
    /// the repository is unchanged and nothing is written.
    pub fn update(&self, id: &str, patch: T::Patch) -> StoreResult<T> {
        let today = today();
        let updated = self.store.mutate(|repo| {
            let slot = T::collection_mut(repo)
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or_else(|| StoreError::not_found(T::ENTITY, id))?;

            let mut record = slot.clone();
            record.apply(patch);
            record.refresh_derived(today);
            record.validate()?;

            let now = Utc::now();
            record.touch(now.max(record.created_at()));
            *slot = record.clone();
            Ok(record)
        })?;

        debug!(collection = T::COLLECTION, id = %id, "Record updated");
        Ok(updated)
    }

    /// Removes the record with this id. Returns whether one was removed.
    ///
    /// A snapshot is queued either way.
    pub fn delete(&self, id: &str) -> bool {
        let result = self.store.mutate(|repo| {
            let records = T::collection_mut(repo);
            let before = records.len();
            records.retain(|r| r.id() != id);
            Ok(records.len() != before)
        });

        let removed = result.unwrap_or(false);
        debug!(collection = T::COLLECTION, id = %id, removed, "Record delete");
        removed
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pharmalife_core::NewBranch;

    fn two_branch_snapshot() -> String {
        let mut repo = Repository::default();
        for name in ["Zamalek", "Giza"] {
            repo.branches.push(Branch::create(
                NewBranch {
                    name: name.to_string(),
                    ..Default::default()
                },
                generate_id(),
                Utc::now(),
            ));
        }
        repo.to_json().unwrap()
    }

    #[tokio::test]
    async fn test_mutation_before_init_does_not_clobber_primary() {
        let primary = MemoryBackend::new();
        primary.insert("main", two_branch_snapshot());
        let legacy = MemoryBackend::new();

        let store = LocalStore::open(
            Arc::new(primary.clone()),
            Arc::new(legacy.clone()),
            StoreOptions::default(),
        )
        .await;

        // The init task has not run yet on this single-threaded runtime.
        assert!(!store.is_initialized());
        store
            .branches()
            .add(NewBranch {
                name: "Early".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.branches().count(), 6);

        assert_eq!(store.wait_for_init().await, InitOutcome::LoadedFromPrimary);
        assert_eq!(store.branches().count(), 2);

        store.flush().await;
        let persisted = Repository::from_json(&primary.get("main").unwrap()).unwrap();
        assert_eq!(persisted.branches.len(), 2);
    }

    #[tokio::test]
    async fn test_get_refreshes_stale_license_status() {
        let store = LocalStore::in_memory().await;
        store.wait_for_init().await;

        {
            let mut repo = store.lock();
            for license in &mut repo.licenses {
                license.status = pharmalife_core::LicenseStatus::Valid;
            }
        }

        let license = store.licenses().get("1").unwrap();
        assert_eq!(license.status, license.status_on(today()));
    }

    #[tokio::test]
    async fn test_collection_names_match_record() {
        let store = LocalStore::in_memory().await;
        assert_eq!(store.users().count(), 1);
        assert_eq!(store.expenses().count(), 0);
        assert_eq!(store.sales().all().len(), 2);
    }
}
