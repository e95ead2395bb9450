//! # Partial Updates
//!
//! One `*Patch` type per entity. A `None` field leaves the record unchanged.
//! Optional record fields use `Option<Option<T>>`: `Some(None)` clears the
//! value, `Some(Some(v))` sets it.
//!
//! Patches never carry `id`, timestamps or derived fields; the store owns
//! those.
//!
//! ```rust
//! use pharmalife_core::{BranchPatch, Money};
//!
//! let patch = BranchPatch {
//!     monthly_sales: Some(Money::from_major(130_000)),
//!     ..Default::default()
//! };
//! assert!(patch.name.is_none());
//! ```

use chrono::NaiveDate;

use crate::money::Money;
use crate::status::{LicenseType, OrderStatus, PaymentStatus, RecordStatus, UserRole};
use crate::types::{
    Branch, Employee, Expense, License, NewOrderItem, Order, Product, Sale, Supplier, User,
};

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

// =============================================================================
// Branch
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub manager: Option<String>,
    pub status: Option<RecordStatus>,
    pub monthly_sales: Option<Money>,
    pub employees_count: Option<u32>,
}

impl BranchPatch {
    pub fn apply_to(self, branch: &mut Branch) {
        set(&mut branch.name, self.name);
        set(&mut branch.address, self.address);
        set(&mut branch.phone, self.phone);
        set(&mut branch.manager, self.manager);
        set(&mut branch.status, self.status);
        set(&mut branch.monthly_sales, self.monthly_sales);
        set(&mut branch.employees_count, self.employees_count);
    }
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub rating: Option<u8>,
    pub status: Option<RecordStatus>,
    pub total_orders: Option<u32>,
    pub last_order_date: Option<Option<NaiveDate>>,
}

impl SupplierPatch {
    pub fn apply_to(self, supplier: &mut Supplier) {
        set(&mut supplier.name, self.name);
        set(&mut supplier.phone, self.phone);
        set(&mut supplier.email, self.email);
        set(&mut supplier.address, self.address);
        set(&mut supplier.rating, self.rating);
        set(&mut supplier.status, self.status);
        set(&mut supplier.total_orders, self.total_orders);
        set(&mut supplier.last_order_date, self.last_order_date);
    }
}

// =============================================================================
// Employee
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeePatch {
    pub branch_id: Option<String>,
    pub name: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub salary: Option<Money>,
    pub allowances: Option<Money>,
    pub deductions: Option<Money>,
    pub status: Option<RecordStatus>,
    pub hire_date: Option<NaiveDate>,
}

impl EmployeePatch {
    pub fn apply_to(self, employee: &mut Employee) {
        set(&mut employee.branch_id, self.branch_id);
        set(&mut employee.name, self.name);
        set(&mut employee.position, self.position);
        set(&mut employee.phone, self.phone);
        set(&mut employee.email, self.email);
        set(&mut employee.salary, self.salary);
        set(&mut employee.allowances, self.allowances);
        set(&mut employee.deductions, self.deductions);
        set(&mut employee.status, self.status);
        set(&mut employee.hire_date, self.hire_date);
    }
}

// =============================================================================
// License
// =============================================================================

/// License changes. There is no `status` field: status follows `expiry_date`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LicensePatch {
    pub branch_id: Option<String>,
    pub kind: Option<LicenseType>,
    pub name: Option<String>,
    pub license_number: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub document_url: Option<Option<String>>,
}

impl LicensePatch {
    pub fn apply_to(self, license: &mut License) {
        set(&mut license.branch_id, self.branch_id);
        set(&mut license.kind, self.kind);
        set(&mut license.name, self.name);
        set(&mut license.license_number, self.license_number);
        set(&mut license.issue_date, self.issue_date);
        set(&mut license.expiry_date, self.expiry_date);
        set(&mut license.document_url, self.document_url);
    }
}

// =============================================================================
// Product
// =============================================================================

/// Product changes. There is no `status` field: status follows stock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub branch_id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<Option<String>>,
    pub quantity: Option<u32>,
    pub min_quantity: Option<u32>,
    pub price: Option<Money>,
    pub cost_price: Option<Money>,
    pub supplier_id: Option<Option<String>>,
    pub expiry_date: Option<Option<NaiveDate>>,
}

impl ProductPatch {
    pub fn apply_to(self, product: &mut Product) {
        set(&mut product.branch_id, self.branch_id);
        set(&mut product.name, self.name);
        set(&mut product.category, self.category);
        set(&mut product.sku, self.sku);
        set(&mut product.barcode, self.barcode);
        set(&mut product.quantity, self.quantity);
        set(&mut product.min_quantity, self.min_quantity);
        set(&mut product.price, self.price);
        set(&mut product.cost_price, self.cost_price);
        set(&mut product.supplier_id, self.supplier_id);
        set(&mut product.expiry_date, self.expiry_date);
    }
}

// =============================================================================
// Order
// =============================================================================

/// Order changes. Supplying `items` replaces every line; totals are
/// recomputed by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub supplier_id: Option<String>,
    pub branch_id: Option<String>,
    pub order_number: Option<String>,
    pub items: Option<Vec<NewOrderItem>>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub order_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<Option<NaiveDate>>,
    pub delivered_date: Option<Option<NaiveDate>>,
    pub notes: Option<Option<String>>,
}

impl OrderPatch {
    pub fn apply_to(self, order: &mut Order) {
        set(&mut order.supplier_id, self.supplier_id);
        set(&mut order.branch_id, self.branch_id);
        set(&mut order.order_number, self.order_number);
        if let Some(items) = self.items {
            order.items = items.into_iter().map(Into::into).collect();
        }
        set(&mut order.status, self.status);
        set(&mut order.payment_status, self.payment_status);
        set(&mut order.order_date, self.order_date);
        set(&mut order.expected_delivery_date, self.expected_delivery_date);
        set(&mut order.delivered_date, self.delivered_date);
        set(&mut order.notes, self.notes);
    }
}

// =============================================================================
// Sale
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalePatch {
    pub branch_id: Option<String>,
    pub month: Option<String>,
    pub total_sales: Option<Money>,
    pub notes: Option<Option<String>>,
}

impl SalePatch {
    pub fn apply_to(self, sale: &mut Sale) {
        set(&mut sale.branch_id, self.branch_id);
        set(&mut sale.month, self.month);
        set(&mut sale.total_sales, self.total_sales);
        set(&mut sale.notes, self.notes);
    }
}

// =============================================================================
// Expense
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    pub branch_id: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub receipt_url: Option<Option<String>>,
}

impl ExpensePatch {
    pub fn apply_to(self, expense: &mut Expense) {
        set(&mut expense.branch_id, self.branch_id);
        set(&mut expense.category, self.category);
        set(&mut expense.description, self.description);
        set(&mut expense.amount, self.amount);
        set(&mut expense.date, self.date);
        set(&mut expense.receipt_url, self.receipt_url);
    }
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<UserRole>,
}

impl UserPatch {
    pub fn apply_to(self, user: &mut User) {
        set(&mut user.username, self.username);
        set(&mut user.password, self.password);
        set(&mut user.name, self.name);
        set(&mut user.role, self.role);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn sample_product() -> Product {
        let now: DateTime<Utc> = Utc::now();
        Product {
            id: "p1".to_string(),
            branch_id: "1".to_string(),
            name: "Vitamin C 1000".to_string(),
            category: "supplements".to_string(),
            sku: "SUP-001".to_string(),
            barcode: Some("6221234567890".to_string()),
            quantity: 0,
            min_quantity: 20,
            price: Money::from_major(85),
            cost_price: Money::from_major(60),
            supplier_id: Some("2".to_string()),
            expiry_date: None,
            status: crate::ProductStatus::Out,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_patch_changes_nothing() {
        let mut product = sample_product();
        let before = product.clone();
        ProductPatch::default().apply_to(&mut product);
        assert_eq!(product, before);
    }

    #[test]
    fn test_patch_sets_and_clears_optional_fields() {
        let mut product = sample_product();
        ProductPatch {
            quantity: Some(50),
            barcode: Some(None),
            expiry_date: Some(NaiveDate::from_ymd_opt(2026, 1, 1)),
            ..Default::default()
        }
        .apply_to(&mut product);

        assert_eq!(product.quantity, 50);
        assert_eq!(product.barcode, None);
        assert_eq!(product.expiry_date, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(product.supplier_id.as_deref(), Some("2"));
    }
}
