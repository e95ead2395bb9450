//! # Domain Types
//!
//! Entity records held by the repository, and the `New*` shapes callers pass
//! to `add`.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────┐      ┌─────────────┐      ┌─────────────┐             │
//! │  │   Branch    │◄─────│  Employee   │      │  Supplier   │             │
//! │  │             │◄─────│  License    │      │             │             │
//! │  │             │◄─────│  Product    │─────►│             │             │
//! │  │             │◄─────│  Order      │─────►│             │             │
//! │  │             │◄─────│  Sale       │      └─────────────┘             │
//! │  │             │◄─────│  Expense    │                                  │
//! │  └─────────────┘      └─────────────┘      ┌─────────────┐             │
//! │                                            │    User     │             │
//! │       ◄──── branch_id / supplier_id        │  Settings   │             │
//! │             (not enforced)                 └─────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity and Timestamps
//! Every record carries `id`, `created_at` and `updated_at`. All three are
//! assigned by the store; the `New*` types do not have them. Derived fields
//! (`License::status`, `Product::status`, order totals) are also absent from
//! the `New*` types.
//!
//! Field names serialize in camelCase, matching the snapshot format written
//! by earlier releases of the dashboard.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::status::{
    LicenseStatus, LicenseType, OrderStatus, PaymentStatus, ProductStatus, RecordStatus, UserRole,
};

// =============================================================================
// Branch
// =============================================================================

/// A pharmacy branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Name of the branch manager.
    pub manager: String,
    pub status: RecordStatus,
    /// Sales for the current month, as entered by the branch.
    pub monthly_sales: Money,
    pub employees_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBranch {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub manager: String,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub monthly_sales: Money,
    #[serde(default)]
    pub employees_count: u32,
}

// =============================================================================
// Supplier
// =============================================================================

/// A medicine or equipment supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    /// Star rating, 1 to 5.
    pub rating: u8,
    pub status: RecordStatus,
    pub total_orders: u32,
    pub last_order_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub rating: u8,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub total_orders: u32,
    #[serde(default)]
    pub last_order_date: Option<NaiveDate>,
}

// =============================================================================
// Employee
// =============================================================================

/// An employee on a branch payroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    pub position: String,
    pub phone: String,
    pub email: String,
    pub salary: Money,
    pub allowances: Money,
    pub deductions: Money,
    pub status: RecordStatus,
    pub hire_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Net monthly pay: salary + allowances - deductions.
    ///
    /// Never stored; always computed from the three components.
    pub fn net_pay(&self) -> Money {
        self.salary + self.allowances - self.deductions
    }

    /// `net_pay`, or `None` if it does not fit in `Money`.
    pub fn checked_net_pay(&self) -> Option<Money> {
        self.salary
            .checked_add(self.allowances)?
            .checked_sub(self.deductions)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub branch_id: String,
    pub name: String,
    pub position: String,
    pub phone: String,
    pub email: String,
    pub salary: Money,
    #[serde(default)]
    pub allowances: Money,
    #[serde(default)]
    pub deductions: Money,
    #[serde(default)]
    pub status: RecordStatus,
    pub hire_date: NaiveDate,
}

// =============================================================================
// License
// =============================================================================

/// A license or certificate held by a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub id: String,
    pub branch_id: String,
    #[serde(rename = "type")]
    pub kind: LicenseType,
    pub name: String,
    pub license_number: String,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    /// Derived from `expiry_date`; refreshed by the store on every read.
    pub status: LicenseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl License {
    /// Status as of `today`, ignoring the stored value.
    pub fn status_on(&self, today: NaiveDate) -> LicenseStatus {
        LicenseStatus::from_expiry(self.expiry_date, today)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLicense {
    pub branch_id: String,
    #[serde(rename = "type")]
    pub kind: LicenseType,
    pub name: String,
    pub license_number: String,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    #[serde(default)]
    pub document_url: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// An inventory item stocked at a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    /// Free-form category (medicines, supplements, cosmetics, equipment, ...).
    pub category: String,
    pub sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub quantity: u32,
    /// Reorder threshold.
    pub min_quantity: u32,
    pub price: Money,
    pub cost_price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    /// Derived from quantity and min_quantity.
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Gross margin per unit (price - cost price).
    pub fn unit_margin(&self) -> Money {
        self.price - self.cost_price
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub branch_id: String,
    pub name: String,
    pub category: String,
    pub sku: String,
    #[serde(default)]
    pub barcode: Option<String>,
    pub quantity: u32,
    pub min_quantity: u32,
    pub price: Money,
    pub cost_price: Money,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

// =============================================================================
// Order
// =============================================================================

/// A line of a purchase order.
///
/// Product name and unit price are snapshots taken when the order was
/// placed, so later product edits do not rewrite order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    /// quantity × unit_price
    pub total: Money,
}

/// Caller-supplied order line; the store computes `total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl From<NewOrderItem> for OrderItem {
    fn from(item: NewOrderItem) -> Self {
        OrderItem {
            total: item.unit_price.multiply_quantity(item.quantity),
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// A purchase order placed with a supplier for a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub supplier_id: String,
    pub branch_id: String,
    /// Human-readable order number (e.g. "ORD-2024-001").
    pub order_number: String,
    pub items: Vec<OrderItem>,
    /// Sum of item totals.
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub order_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// The order total computed from the items, or `None` if a line total
    /// or the sum overflows.
    pub fn checked_total(&self) -> Option<Money> {
        self.items.iter().try_fold(Money::zero(), |acc, item| {
            acc.checked_add(item.unit_price.checked_multiply_quantity(item.quantity)?)
        })
    }

    /// Recomputes every line total and the order total. Saturates on
    /// overflow; `checked_total` reports it.
    pub fn recalculate_totals(&mut self) {
        for item in &mut self.items {
            item.total = item.unit_price.multiply_quantity(item.quantity);
        }
        self.total_amount = self.items.iter().map(|item| item.total).sum();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub supplier_id: String,
    pub branch_id: String,
    pub order_number: String,
    pub items: Vec<NewOrderItem>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub order_date: NaiveDate,
    #[serde(default)]
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub delivered_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// Monthly sales total for a branch.
///
/// One row per branch per month is the convention; the store does not
/// enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub branch_id: String,
    /// `YYYY-MM`
    pub month: String,
    pub total_sales: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub branch_id: String,
    pub month: String,
    pub total_sales: Money,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Expense
// =============================================================================

/// A branch expense (rent, utilities, maintenance, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub branch_id: String,
    pub category: String,
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub branch_id: String,
    pub category: String,
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
    #[serde(default)]
    pub receipt_url: Option<String>,
}

// =============================================================================
// User
// =============================================================================

/// A dashboard user.
///
/// ## Security
/// `password` is stored and compared in **plaintext**. This mirrors the
/// snapshot format the dashboard has always written and is not safe for
/// any deployment where the data directory can be read by someone other
/// than the operator. Do not reuse this type as a model for real
/// credential storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
}

// =============================================================================
// Unit Tests
// =============================================================================
