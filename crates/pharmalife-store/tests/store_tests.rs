//! End-to-end behaviour of `LocalStore` over in-memory and on-disk backends.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, Utc};
use pharmalife_core::{
    generate_id, AlertKind, Backup, Branch, BranchPatch, LicenseStatus, LicenseType, Money,
    NewBranch, NewLicense, NewOrder, NewOrderItem, NewProduct, NewSupplier, OrderPatch,
    ProductPatch, ProductStatus, Record, RecordStatus, Repository, SettingsPatch, ValidationError,
};
use pharmalife_store::{
    InitOutcome, LocalStore, MemoryBackend, SeedSource, StoreConfig, StoreError, StoreOptions,
};

// =============================================================================
// Helpers
// =============================================================================

async fn open(primary: &MemoryBackend, legacy: &MemoryBackend) -> LocalStore {
    LocalStore::open(
        Arc::new(primary.clone()),
        Arc::new(legacy.clone()),
        StoreOptions::default(),
    )
    .await
}

/// A store whose init has finished, plus handles to both backends.
async fn ready_store() -> (LocalStore, MemoryBackend, MemoryBackend) {
    let primary = MemoryBackend::new();
    let legacy = MemoryBackend::new();
    let store = open(&primary, &legacy).await;
    store.wait_for_init().await;
    (store, primary, legacy)
}

/// Clears every collection so tests start from a known state.
async fn empty_store() -> (LocalStore, MemoryBackend, MemoryBackend) {
    let (store, primary, legacy) = ready_store().await;
    store
        .restore_backup(Backup::new(Repository::default(), Utc::now()))
        .unwrap();
    (store, primary, legacy)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn branch(name: &str) -> NewBranch {
    NewBranch {
        name: name.to_string(),
        address: "Corniche Street".to_string(),
        phone: "01000000000".to_string(),
        manager: "Mona Adel".to_string(),
        ..Default::default()
    }
}

fn license(branch_id: &str, name: &str, expires_in_days: i64) -> NewLicense {
    NewLicense {
        branch_id: branch_id.to_string(),
        kind: LicenseType::Pharmacy,
        name: name.to_string(),
        license_number: format!("PH-{name}"),
        issue_date: today() - Duration::days(365),
        expiry_date: today() + Duration::days(expires_in_days),
        document_url: None,
    }
}

fn repo_with_branches(names: &[&str]) -> String {
    let mut repo = Repository::default();
    for name in names {
        repo.branches
            .push(Branch::create(branch(name), generate_id(), Utc::now()));
    }
    repo.to_json().unwrap()
}

fn stored_repo(backend: &MemoryBackend, key: &str) -> Repository {
    Repository::from_json(&backend.get(key).unwrap()).unwrap()
}

// =============================================================================
// Initialization
// =============================================================================

#[tokio::test]
async fn test_first_run_seeds_defaults_and_migrates() {
    let primary = MemoryBackend::new();
    let legacy = MemoryBackend::new();
    let store = open(&primary, &legacy).await;

    assert_eq!(store.seed_source(), SeedSource::Defaults);
    assert_eq!(store.branches().count(), 5);

    assert_eq!(store.wait_for_init().await, InitOutcome::MigratedToPrimary);
    assert!(store.is_initialized());
    assert_eq!(stored_repo(&primary, "main").branches.len(), 5);
}

#[tokio::test]
async fn test_legacy_seed_is_migrated_to_primary() {
    let primary = MemoryBackend::new();
    let legacy = MemoryBackend::new();
    legacy.insert("pharmalife_db", repo_with_branches(&["Legacy Branch"]));

    let store = open(&primary, &legacy).await;
    assert_eq!(store.seed_source(), SeedSource::Legacy);
    assert_eq!(store.wait_for_init().await, InitOutcome::MigratedToPrimary);

    let migrated = stored_repo(&primary, "main");
    assert_eq!(migrated.branches.len(), 1);
    assert_eq!(migrated.branches[0].name, "Legacy Branch");
}

#[tokio::test]
async fn test_primary_snapshot_overrides_legacy_seed() {
    let primary = MemoryBackend::new();
    let legacy = MemoryBackend::new();
    legacy.insert("pharmalife_db", repo_with_branches(&["Old"]));
    primary.insert("main", repo_with_branches(&["Zamalek", "Giza"]));

    let store = open(&primary, &legacy).await;
    assert_eq!(store.wait_for_init().await, InitOutcome::LoadedFromPrimary);

    let names: Vec<String> = store.branches().all().into_iter().map(|b| b.name).collect();
    assert_eq!(names, vec!["Zamalek", "Giza"]);
}

#[tokio::test]
async fn test_unreadable_legacy_falls_back_to_defaults() {
    let primary = MemoryBackend::new();
    let legacy = MemoryBackend::new();
    legacy.insert("pharmalife_db", "{ definitely not json");

    let store = open(&primary, &legacy).await;
    assert_eq!(store.seed_source(), SeedSource::Defaults);
    assert_eq!(store.branches().count(), 5);
}

#[tokio::test]
async fn test_primary_read_failure_is_degraded() {
    let primary = MemoryBackend::new();
    primary.set_fail_reads(true);
    let legacy = MemoryBackend::new();

    let store = open(&primary, &legacy).await;
    assert_eq!(store.wait_for_init().await, InitOutcome::Degraded);
    assert_eq!(store.branches().count(), 5);
}

#[tokio::test]
async fn test_corrupt_primary_snapshot_is_degraded() {
    let primary = MemoryBackend::new();
    primary.insert("main", "[1, 2, 3]");
    let legacy = MemoryBackend::new();

    let store = open(&primary, &legacy).await;
    assert_eq!(store.wait_for_init().await, InitOutcome::Degraded);
    assert_eq!(store.seed_source(), SeedSource::Defaults);
}

#[tokio::test]
async fn test_wait_for_init_is_repeatable() {
    let (store, _, _) = ready_store().await;
    assert_eq!(store.wait_for_init().await, InitOutcome::MigratedToPrimary);
    assert_eq!(store.clone().wait_for_init().await, InitOutcome::MigratedToPrimary);
}

// =============================================================================
// Collections
// =============================================================================

#[tokio::test]
async fn test_add_assigns_unique_ids_and_timestamps() {
    let (store, _, _) = empty_store().await;

    let mut ids = HashSet::new();
    for i in 0..100 {
        let created = store.branches().add(branch(&format!("Branch {i}"))).unwrap();
        assert_eq!(created.created_at, created.updated_at);
        ids.insert(created.id);
    }

    assert_eq!(ids.len(), 100);
    assert_eq!(store.branches().count(), 100);
}

#[tokio::test]
async fn test_read_your_writes_and_persistence() {
    let (store, primary, _) = empty_store().await;

    let created = store.branches().add(branch("Heliopolis")).unwrap();
    assert_eq!(store.branches().get(&created.id), Some(created.clone()));

    store.flush().await;
    let persisted = stored_repo(&primary, "main");
    assert_eq!(persisted.branches, vec![created]);
}

#[tokio::test]
async fn test_update_merges_patch_and_touches() {
    let (store, _, _) = empty_store().await;
    let created = store.branches().add(branch("Shubra")).unwrap();

    let updated = store
        .branches()
        .update(
            &created.id,
            BranchPatch {
                monthly_sales: Some(Money::from_major(130_000)),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.name, "Shubra");
    assert_eq!(updated.monthly_sales, Money::from_major(130_000));
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(store.branches().get(&created.id), Some(updated));
}

#[tokio::test]
async fn test_update_missing_id_is_not_found_without_write() {
    let (store, primary, _) = empty_store().await;
    store.flush().await;
    let saves = primary.save_count();

    let err = store
        .branches()
        .update("no-such-id", BranchPatch::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    store.flush().await;
    assert_eq!(primary.save_count(), saves);
}

#[tokio::test]
async fn test_delete_is_idempotent_and_always_writes() {
    let (store, primary, _) = empty_store().await;
    let created = store.branches().add(branch("Ain Shams")).unwrap();
    store.flush().await;
    let saves = primary.save_count();

    assert!(store.branches().delete(&created.id));
    assert!(!store.branches().delete(&created.id));
    assert_eq!(store.branches().count(), 0);

    store.flush().await;
    assert_eq!(primary.save_count(), saves + 2);
}

#[tokio::test]
async fn test_validation_failure_leaves_state_untouched() {
    let (store, _, _) = ready_store().await;
    let before = store.create_backup().data;

    let err = store
        .suppliers()
        .add(NewSupplier {
            name: "Delta Pharma".to_string(),
            rating: 9,
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let err = store
        .branches()
        .update(
            "1",
            BranchPatch {
                name: Some("   ".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    assert_eq!(store.create_backup().data, before);
}

#[tokio::test]
async fn test_find_filters_records() {
    let (store, _, _) = ready_store().await;

    let branch_one = store.employees().find(|e| e.branch_id == "1");
    assert_eq!(branch_one.len(), 2);
    assert!(branch_one.iter().all(|e| e.branch_id == "1"));
}

#[tokio::test]
async fn test_clones_share_state_across_tasks() {
    let (store, primary, _) = empty_store().await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                for j in 0..10 {
                    store.branches().add(branch(&format!("B{i}-{j}"))).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.branches().count(), 80);
    store.flush().await;
    assert_eq!(stored_repo(&primary, "main").branches.len(), 80);
}

// =============================================================================
// Derived Fields
// =============================================================================

#[tokio::test]
async fn test_license_status_derived_from_expiry() {
    let (store, _, _) = empty_store().await;
    let licenses = store.licenses();

    let soon = licenses.add(license("1", "soon", 10)).unwrap();
    let later = licenses.add(license("1", "later", 40)).unwrap();
    let past = licenses.add(license("1", "past", -5)).unwrap();

    assert_eq!(soon.status, LicenseStatus::Expiring);
    assert_eq!(later.status, LicenseStatus::Valid);
    assert_eq!(past.status, LicenseStatus::Expired);
    assert_eq!(licenses.get(&past.id).unwrap().status, LicenseStatus::Expired);
}

#[tokio::test]
async fn test_product_status_follows_quantity() {
    let (store, _, _) = empty_store().await;
    let products = store.products();

    let created = products
        .add(NewProduct {
            branch_id: "1".to_string(),
            name: "Ibuprofen 400mg".to_string(),
            category: "medicines".to_string(),
            sku: "MED-010".to_string(),
            quantity: 10,
            min_quantity: 5,
            price: Money::from_major(30),
            cost_price: Money::from_major(22),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(created.status, ProductStatus::Available);

    let restock = |quantity| ProductPatch {
        quantity: Some(quantity),
        ..Default::default()
    };
    assert_eq!(
        products.update(&created.id, restock(3)).unwrap().status,
        ProductStatus::Low
    );
    assert_eq!(
        products.update(&created.id, restock(0)).unwrap().status,
        ProductStatus::Out
    );
}

#[tokio::test]
async fn test_order_totals_follow_items() {
    let (store, _, _) = empty_store().await;
    let item = |quantity, price| NewOrderItem {
        product_id: "1".to_string(),
        product_name: "Paracetamol 500mg".to_string(),
        quantity,
        unit_price: Money::from_major(price),
    };

    let order = store
        .orders()
        .add(NewOrder {
            supplier_id: "1".to_string(),
            branch_id: "1".to_string(),
            order_number: "ORD-2024-100".to_string(),
            items: vec![item(10, 18), item(2, 50)],
            status: Default::default(),
            payment_status: Default::default(),
            order_date: today(),
            expected_delivery_date: None,
            delivered_date: None,
            notes: None,
        })
        .unwrap();
    assert_eq!(order.total_amount, Money::from_major(280));

    let updated = store
        .orders()
        .update(
            &order.id,
            OrderPatch {
                items: Some(vec![item(1, 18)]),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.total_amount, Money::from_major(18));

    let err = store
        .orders()
        .update(
            &order.id,
            OrderPatch {
                items: Some(vec![]),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn test_overflowing_order_total_is_rejected() {
    let (store, primary, _) = empty_store().await;
    let huge = NewOrderItem {
        product_id: "1".to_string(),
        product_name: "Paracetamol 500mg".to_string(),
        quantity: 4,
        unit_price: Money::from_minor(i64::MAX / 2),
    };
    let new_order = |items| NewOrder {
        supplier_id: "1".to_string(),
        branch_id: "1".to_string(),
        order_number: "ORD-2024-101".to_string(),
        items,
        status: Default::default(),
        payment_status: Default::default(),
        order_date: today(),
        expected_delivery_date: None,
        delivered_date: None,
        notes: None,
    };

    let err = store.orders().add(new_order(vec![huge.clone()])).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "totalAmount"
    ));
    assert_eq!(store.orders().count(), 0);

    let order = store
        .orders()
        .add(new_order(vec![NewOrderItem {
            quantity: 1,
            unit_price: Money::from_major(18),
            ..huge.clone()
        }]))
        .unwrap();
    store.flush().await;
    let saves = primary.save_count();

    let err = store
        .orders()
        .update(
            &order.id,
            OrderPatch {
                items: Some(vec![huge]),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.orders().get(&order.id).unwrap().total_amount, Money::from_major(18));

    store.flush().await;
    assert_eq!(primary.save_count(), saves);
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn test_stats_counts_active_branches_and_sales() {
    let (store, _, _) = empty_store().await;

    store
        .branches()
        .add(NewBranch {
            monthly_sales: Money::from_major(100),
            ..branch("Active")
        })
        .unwrap();
    store
        .branches()
        .add(NewBranch {
            status: RecordStatus::Inactive,
            monthly_sales: Money::from_major(50),
            ..branch("Closed")
        })
        .unwrap();

    let stats = store.stats();
    assert_eq!(stats.active_branches, 1);
    assert_eq!(stats.total_branches, 2);
    assert_eq!(stats.total_sales, Money::from_major(150));
}

#[tokio::test]
async fn test_license_alerts_most_urgent_first() {
    let (store, _, _) = empty_store().await;
    let main = store.branches().add(branch("Main")).unwrap();

    for (name, days) in [("later", 20), ("valid", 60), ("expired", -3), ("week", 5)] {
        store.licenses().add(license(&main.id, name, days)).unwrap();
    }
    store.licenses().add(license("gone", "orphan", -1)).unwrap();

    let alerts = store.license_alerts();
    let order: Vec<(&str, AlertKind)> = alerts
        .iter()
        .map(|a| (a.license_name.as_str(), a.kind))
        .collect();
    assert_eq!(
        order,
        vec![
            ("expired", AlertKind::Expired),
            ("orphan", AlertKind::Expired),
            ("week", AlertKind::ExpiringThisWeek),
            ("later", AlertKind::ExpiringSoon),
        ]
    );
    assert_eq!(alerts[0].branch_name, "Main");
    assert_eq!(alerts[1].branch_name, "Unassigned");

    let summary = store.alert_summary();
    assert_eq!(summary.expired, 2);
    assert_eq!(summary.total, 4);
    assert!(summary.has_critical);
}

#[tokio::test]
async fn test_settings_update_and_extra_keys() {
    let (store, primary, _) = ready_store().await;

    let mut patch = SettingsPatch {
        company_name: Some("PharmaLife Group".to_string()),
        ..Default::default()
    };
    patch
        .extra
        .insert("lowStockEmail".to_string(), serde_json::json!("ops@example.com"));
    let settings = store.update_settings(patch);

    assert_eq!(settings.company_name, "PharmaLife Group");
    assert_eq!(settings.currency, "EGP");
    assert_eq!(store.settings(), settings);

    store.flush().await;
    assert_eq!(stored_repo(&primary, "main").settings, settings);
}

#[tokio::test]
async fn test_authenticate_default_admin() {
    let (store, _, _) = ready_store().await;

    let user = store.authenticate("admin", "admin123").unwrap();
    assert_eq!(user.name, "System Administrator");
    assert!(store.authenticate("admin", "wrong").is_none());
    assert!(store.authenticate("Admin", "admin123").is_none());
}

// =============================================================================
// Durability
// =============================================================================

#[tokio::test]
async fn test_degraded_durability_keeps_memory_authoritative() {
    let primary = MemoryBackend::unavailable();
    let legacy = MemoryBackend::unavailable();
    let store = open(&primary, &legacy).await;
    assert_eq!(store.wait_for_init().await, InitOutcome::Degraded);

    let created = store.branches().add(branch("Offline")).unwrap();
    store
        .branches()
        .update(
            &created.id,
            BranchPatch {
                manager: Some("Omar Said".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(store.branches().delete("1"));

    assert_eq!(store.branches().get(&created.id).unwrap().manager, "Omar Said");
    assert!(store.branches().get("1").is_none());

    store.flush().await;
    let stats = store.persist_stats();
    assert_eq!(stats.primary_writes, 0);
    assert!(stats.failed_writes >= 3);
}

#[tokio::test]
async fn test_failed_primary_write_falls_back_to_legacy() {
    let primary = MemoryBackend::new();
    primary.set_fail_writes(true);
    let legacy = MemoryBackend::new();
    let store = open(&primary, &legacy).await;
    assert_eq!(store.wait_for_init().await, InitOutcome::Degraded);

    let created = store.branches().add(branch("Fallback")).unwrap();
    store.flush().await;

    let saved = stored_repo(&legacy, "pharmalife_db");
    assert!(saved.branches.iter().any(|b| b.id == created.id));
    assert!(store.persist_stats().fallback_writes >= 1);
}

#[tokio::test]
async fn test_sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::default().with_data_dir(dir.path());

    let created = {
        let store = LocalStore::open_with_config(&config).await.unwrap();
        assert_eq!(store.wait_for_init().await, InitOutcome::MigratedToPrimary);
        let created = store.branches().add(branch("Persistent")).unwrap();
        store.flush().await;
        created
    };

    let reopened = LocalStore::open_with_config(&config).await.unwrap();
    assert_eq!(reopened.wait_for_init().await, InitOutcome::LoadedFromPrimary);
    assert_eq!(reopened.branches().get(&created.id), Some(created));
    assert_eq!(reopened.branches().count(), 6);
}
