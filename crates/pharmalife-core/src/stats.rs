//! # Dashboard Statistics
//!
//! Headline counts for the dashboard, computed from a repository snapshot.
//! Nothing here is cached: every call walks the collections again, so the
//! numbers always match the data they were computed from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::repository::Repository;
use crate::status::{LicenseStatus, OrderStatus, ProductStatus};

/// Aggregate counts shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub active_branches: usize,
    pub total_branches: usize,
    pub active_employees: usize,
    /// Sum of `monthly_sales` across all branches.
    pub total_sales: Money,
    pub active_suppliers: usize,
    pub total_suppliers: usize,
    pub expiring_licenses: usize,
    pub expired_licenses: usize,
    pub total_licenses: usize,
    pub low_stock_products: usize,
    pub out_of_stock_products: usize,
    pub pending_orders: usize,
    /// Net pay of active employees.
    pub monthly_payroll: Money,
}

impl StoreStats {
    /// Computes statistics as of `today`.
    ///
    /// License and product statuses are derived here rather than read from
    /// the records, so a stale stored status does not skew the counts.
    pub fn compute(repo: &Repository, today: NaiveDate) -> Self {
        let license_count = |wanted: LicenseStatus| {
            repo.licenses
                .iter()
                .filter(|license| license.status_on(today) == wanted)
                .count()
        };
        let product_count = |wanted: ProductStatus| {
            repo.products
                .iter()
                .filter(|p| ProductStatus::from_stock(p.quantity, p.min_quantity) == wanted)
                .count()
        };

        let active_employees = repo.employees.iter().filter(|e| e.status.is_active());

        StoreStats {
            active_branches: repo.branches.iter().filter(|b| b.status.is_active()).count(),
            total_branches: repo.branches.len(),
            active_employees: active_employees.clone().count(),
            total_sales: repo.branches.iter().map(|b| b.monthly_sales).sum(),
            active_suppliers: repo.suppliers.iter().filter(|s| s.status.is_active()).count(),
            total_suppliers: repo.suppliers.len(),
            expiring_licenses: license_count(LicenseStatus::Expiring),
            expired_licenses: license_count(LicenseStatus::Expired),
            total_licenses: repo.licenses.len(),
            low_stock_products: product_count(ProductStatus::Low),
            out_of_stock_products: product_count(ProductStatus::Out),
            pending_orders: repo
                .orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .count(),
            monthly_payroll: active_employees.map(|e| e.net_pay()).sum(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::default_repository;
    use crate::status::RecordStatus;
    use chrono::{Duration, Utc};

    #[test]
    fn test_empty_repository() {
        let stats = StoreStats::compute(&Repository::default(), Utc::now().date_naive());
        assert_eq!(stats, StoreStats::default());
    }

    #[test]
    fn test_branch_counts_and_sales() {
        let mut repo = default_repository(Utc::now());
        repo.branches[0].status = RecordStatus::Inactive;
        let stats = StoreStats::compute(&repo, Utc::now().date_naive());

        assert_eq!(stats.total_branches, 5);
        assert_eq!(stats.active_branches, 4);
        // 125k + 98k + 115k + 87k + 142k, inactive branches included
        assert_eq!(stats.total_sales, Money::from_major(567_000));
    }

    #[test]
    fn test_license_counts_use_derived_status() {
        let mut repo = default_repository(Utc::now());
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        repo.licenses[0].expiry_date = today + Duration::days(10);
        repo.licenses[1].expiry_date = today + Duration::days(40);
        repo.licenses[2].expiry_date = today - Duration::days(5);
        for license in &mut repo.licenses {
            license.status = LicenseStatus::Valid;
        }

        let stats = StoreStats::compute(&repo, today);
        assert_eq!(stats.expiring_licenses, 1);
        assert_eq!(stats.expired_licenses, 1);
        assert_eq!(stats.total_licenses, 3);
    }

    #[test]
    fn test_stock_orders_and_payroll() {
        let repo = default_repository(Utc::now());
        let stats = StoreStats::compute(&repo, Utc::now().date_naive());

        assert_eq!(stats.low_stock_products, 1);
        assert_eq!(stats.out_of_stock_products, 1);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.active_employees, 3);
        // 9000 + 5600 + 8300
        assert_eq!(stats.monthly_payroll, Money::from_major(22_900));
    }
}
