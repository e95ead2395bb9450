//! # Status Enums
//!
//! Closed sets of states for branches, licenses, products, orders and users.
//!
//! ## Derived Statuses
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two statuses are functions of other fields:                           │
//! │                                                                         │
//! │  LicenseStatus ← expiry_date vs. today                                 │
//! │    days < 0          → Expired                                         │
//! │    0 ≤ days ≤ 30     → Expiring                                        │
//! │    days > 30         → Valid                                           │
//! │                                                                         │
//! │  ProductStatus ← quantity vs. min_quantity                             │
//! │    quantity = 0              → Out                                     │
//! │    0 < quantity ≤ min        → Low                                     │
//! │    quantity > min            → Available                               │
//! │                                                                         │
//! │  The stored value is a cache. The store recomputes it on every write   │
//! │  and every read, so a snapshot saved weeks ago never reports a         │
//! │  license as valid after it has lapsed.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days before expiry at which a license counts as expiring.
pub const LICENSE_EXPIRING_WINDOW_DAYS: i64 = 30;

// =============================================================================
// Record Status
// =============================================================================

/// Active/inactive flag shared by branches, suppliers and employees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, RecordStatus::Active)
    }
}

// =============================================================================
// License
// =============================================================================

/// The kind of license or certificate a branch holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
    /// Permit to operate the pharmacy.
    #[default]
    Pharmacy,
    /// Professional license of an individual employee.
    Employee,
    /// Equipment or premises maintenance certificate.
    Maintenance,
    /// Health and sanitation certificate.
    Health,
}

/// Validity of a license relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    #[default]
    Valid,
    Expiring,
    Expired,
}

impl LicenseStatus {
    /// Derives the status from an expiry date.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use pharmalife_core::LicenseStatus;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let soon = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
    /// assert_eq!(LicenseStatus::from_expiry(soon, today), LicenseStatus::Expiring);
    /// ```
    pub fn from_expiry(expiry_date: NaiveDate, today: NaiveDate) -> Self {
        let days_left = days_until(expiry_date, today);
        if days_left < 0 {
            LicenseStatus::Expired
        } else if days_left <= LICENSE_EXPIRING_WINDOW_DAYS {
            LicenseStatus::Expiring
        } else {
            LicenseStatus::Valid
        }
    }
}

/// Whole days from `today` until `date`; negative once `date` has passed.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

// =============================================================================
// Product
// =============================================================================

/// Stock level of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Available,
    Low,
    Out,
}

impl ProductStatus {
    /// Derives the status from the current quantity and reorder threshold.
    pub fn from_stock(quantity: u32, min_quantity: u32) -> Self {
        if quantity == 0 {
            ProductStatus::Out
        } else if quantity <= min_quantity {
            ProductStatus::Low
        } else {
            ProductStatus::Available
        }
    }
}

// =============================================================================
// Purchase Orders
// =============================================================================

/// Lifecycle of a purchase order placed with a supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Orders that still need action from someone.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Shipped
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    #[default]
    User,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_license_status_from_expiry() {
        let today = today();
        assert_eq!(
            LicenseStatus::from_expiry(today + Duration::days(10), today),
            LicenseStatus::Expiring
        );
        assert_eq!(
            LicenseStatus::from_expiry(today + Duration::days(40), today),
            LicenseStatus::Valid
        );
        assert_eq!(
            LicenseStatus::from_expiry(today - Duration::days(5), today),
            LicenseStatus::Expired
        );
    }

    #[test]
    fn test_license_status_boundaries() {
        let today = today();
        assert_eq!(LicenseStatus::from_expiry(today, today), LicenseStatus::Expiring);
        assert_eq!(
            LicenseStatus::from_expiry(today + Duration::days(30), today),
            LicenseStatus::Expiring
        );
        assert_eq!(
            LicenseStatus::from_expiry(today + Duration::days(31), today),
            LicenseStatus::Valid
        );
        assert_eq!(
            LicenseStatus::from_expiry(today - Duration::days(1), today),
            LicenseStatus::Expired
        );
    }

    #[test]
    fn test_product_status_from_stock() {
        assert_eq!(ProductStatus::from_stock(0, 10), ProductStatus::Out);
        assert_eq!(ProductStatus::from_stock(0, 0), ProductStatus::Out);
        assert_eq!(ProductStatus::from_stock(5, 10), ProductStatus::Low);
        assert_eq!(ProductStatus::from_stock(10, 10), ProductStatus::Low);
        assert_eq!(ProductStatus::from_stock(11, 10), ProductStatus::Available);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&LicenseType::Health).unwrap(), "\"health\"");
        assert_eq!(serde_json::to_string(&OrderStatus::Cancelled).unwrap(), "\"cancelled\"");
        let role: UserRole = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(role, UserRole::Manager);
    }

    #[test]
    fn test_open_orders() {
        assert!(OrderStatus::Pending.is_open());
        assert!(OrderStatus::Shipped.is_open());
        assert!(!OrderStatus::Delivered.is_open());
        assert!(!OrderStatus::Cancelled.is_open());
    }
}
