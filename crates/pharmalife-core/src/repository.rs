//! # Repository
//!
//! The aggregate of every collection plus settings. This is the unit the
//! store persists: one JSON document, one snapshot.
//!
//! ## Record Plumbing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        The Record Trait                                 │
//! │                                                                         │
//! │   NewBranch ──create(id, now)──► Branch ──apply(patch)──► Branch        │
//! │                                    │                                    │
//! │                                    ├── refresh_derived(today)           │
//! │                                    ├── validate()                       │
//! │                                    └── collection(&Repository)          │
//! │                                                                         │
//! │   One impl per entity lets the store expose a single generic            │
//! │   collection handle instead of nine hand-written accessor sets.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::patch::{
    BranchPatch, EmployeePatch, ExpensePatch, LicensePatch, OrderPatch, ProductPatch, SalePatch,
    SupplierPatch, UserPatch,
};
use crate::settings::Settings;
use crate::status::{LicenseStatus, ProductStatus};
use crate::types::{
    Branch, Employee, Expense, License, NewBranch, NewEmployee, NewExpense, NewLicense, NewOrder,
    NewProduct, NewSale, NewSupplier, NewUser, Order, Product, Sale, Supplier, User,
};
use crate::validation::{self, ValidationResult};

/// Generates a fresh record id.
///
/// UUID v7: a 48-bit millisecond timestamp followed by random bits, so ids
/// sort roughly by creation time and never collide in practice.
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}

// =============================================================================
// Repository
// =============================================================================

/// Every collection the dashboard stores, plus settings.
///
/// Missing collections in a stored snapshot deserialize as empty, so
/// snapshots written before `expenses` existed still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Repository {
    pub branches: Vec<Branch>,
    pub suppliers: Vec<Supplier>,
    pub licenses: Vec<License>,
    pub employees: Vec<Employee>,
    pub expenses: Vec<Expense>,
    pub sales: Vec<Sale>,
    pub users: Vec<User>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub settings: Settings,
}

impl Repository {
    /// Parses a snapshot.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Serializes the repository as compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Recomputes derived fields of every record as of `today`.
    pub fn refresh_derived(&mut self, today: NaiveDate) {
        self.licenses
            .iter_mut()
            .for_each(|license| license.refresh_derived(today));
        self.products
            .iter_mut()
            .for_each(|product| product.refresh_derived(today));
        self.orders
            .iter_mut()
            .for_each(|order| order.refresh_derived(today));
    }

    /// Checks that every derived amount fits in `Money`.
    ///
    /// Loaded snapshots and backups skip field validation, but an order
    /// total or net pay that overflows would be silently clamped.
    pub fn validate_amounts(&self) -> ValidationResult<()> {
        self.orders.iter().try_for_each(validation::validate_order_total)?;
        self.employees.iter().try_for_each(validation::validate_net_pay)
    }

    /// Name of a branch, if it exists.
    pub fn branch_name(&self, branch_id: &str) -> Option<&str> {
        self.branches
            .iter()
            .find(|branch| branch.id == branch_id)
            .map(|branch| branch.name.as_str())
    }
}

// =============================================================================
// Record Trait
// =============================================================================

/// A record stored in one of the repository collections.
pub trait Record: Clone + Send + Sync + 'static {
    /// Caller-supplied shape for `add`.
    type New;
    /// Partial update shape for `update`.
    type Patch;

    /// Singular name used in errors and logs ("branch").
    const ENTITY: &'static str;
    /// Collection field name in the snapshot ("branches").
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;

    /// Builds a record with the given id and `created_at = updated_at = now`.
    fn create(new: Self::New, id: String, now: DateTime<Utc>) -> Self;

    /// Merges a patch. Does not touch timestamps.
    fn apply(&mut self, patch: Self::Patch);

    /// Sets `updated_at`.
    fn touch(&mut self, now: DateTime<Utc>);

    /// Recomputes fields derived from other fields. No-op for most records.
    fn refresh_derived(&mut self, _today: NaiveDate) {}

    fn validate(&self) -> ValidationResult<()>;

    fn collection(repo: &Repository) -> &Vec<Self>;
    fn collection_mut(repo: &mut Repository) -> &mut Vec<Self>;
}

macro_rules! impl_record {
    (
        $ty:ident,
        new = $new:ident,
        patch = $patch:ident,
        entity = $entity:literal,
        collection = $field:ident,
        validate = $validate:path
    ) => {
        impl Record for $ty {
            type New = $new;
            type Patch = $patch;

            const ENTITY: &'static str = $entity;
            const COLLECTION: &'static str = stringify!($field);

            fn id(&self) -> &str {
                &self.id
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }

            fn updated_at(&self) -> DateTime<Utc> {
                self.updated_at
            }

            fn create(new: $new, id: String, now: DateTime<Utc>) -> Self {
                $ty::from_new(new, id, now)
            }

            fn apply(&mut self, patch: $patch) {
                patch.apply_to(self);
            }

            fn touch(&mut self, now: DateTime<Utc>) {
                self.updated_at = now;
            }

            fn refresh_derived(&mut self, today: NaiveDate) {
                $ty::derive_fields(self, today);
            }

            fn validate(&self) -> ValidationResult<()> {
                $validate(self)
            }

            fn collection(repo: &Repository) -> &Vec<Self> {
                &repo.$field
            }

            fn collection_mut(repo: &mut Repository) -> &mut Vec<Self> {
                &mut repo.$field
            }
        }
    };
}

impl_record!(Branch, new = NewBranch, patch = BranchPatch, entity = "branch", collection = branches, validate = validation::validate_branch);
impl_record!(Supplier, new = NewSupplier, patch = SupplierPatch, entity = "supplier", collection = suppliers, validate = validation::validate_supplier);
impl_record!(Employee, new = NewEmployee, patch = EmployeePatch, entity = "employee", collection = employees, validate = validation::validate_employee);
impl_record!(License, new = NewLicense, patch = LicensePatch, entity = "license", collection = licenses, validate = validation::validate_license);
impl_record!(Product, new = NewProduct, patch = ProductPatch, entity = "product", collection = products, validate = validation::validate_product);
impl_record!(Order, new = NewOrder, patch = OrderPatch, entity = "order", collection = orders, validate = validation::validate_order);
impl_record!(Sale, new = NewSale, patch = SalePatch, entity = "sale", collection = sales, validate = validation::validate_sale);
impl_record!(Expense, new = NewExpense, patch = ExpensePatch, entity = "expense", collection = expenses, validate = validation::validate_expense);
impl_record!(User, new = NewUser, patch = UserPatch, entity = "user", collection = users, validate = validation::validate_user);

// =============================================================================
// Construction and Derived Fields
// =============================================================================

impl Branch {
    fn from_new(new: NewBranch, id: String, now: DateTime<Utc>) -> Self {
        Branch {
            id,
            name: new.name,
            address: new.address,
            phone: new.phone,
            manager: new.manager,
            status: new.status,
            monthly_sales: new.monthly_sales,
            employees_count: new.employees_count,
            created_at: now,
            updated_at: now,
        }
    }

    fn derive_fields(&mut self, _today: NaiveDate) {}
}

impl Supplier {
    fn from_new(new: NewSupplier, id: String, now: DateTime<Utc>) -> Self {
        Supplier {
            id,
            name: new.name,
            phone: new.phone,
            email: new.email,
            address: new.address,
            rating: new.rating,
            status: new.status,
            total_orders: new.total_orders,
            last_order_date: new.last_order_date,
            created_at: now,
            updated_at: now,
        }
    }

    fn derive_fields(&mut self, _today: NaiveDate) {}
}

impl Employee {
    fn from_new(new: NewEmployee, id: String, now: DateTime<Utc>) -> Self {
        Employee {
            id,
            branch_id: new.branch_id,
            name: new.name,
            position: new.position,
            phone: new.phone,
            email: new.email,
            salary: new.salary,
            allowances: new.allowances,
            deductions: new.deductions,
            status: new.status,
            hire_date: new.hire_date,
            created_at: now,
            updated_at: now,
        }
    }

    fn derive_fields(&mut self, _today: NaiveDate) {}
}

impl License {
    /// The status written here is a placeholder until `derive_fields` runs;
    /// the store always refreshes before storing or returning a record.
    fn from_new(new: NewLicense, id: String, now: DateTime<Utc>) -> Self {
        License {
            status: LicenseStatus::from_expiry(new.expiry_date, now.date_naive()),
            id,
            branch_id: new.branch_id,
            kind: new.kind,
            name: new.name,
            license_number: new.license_number,
            issue_date: new.issue_date,
            expiry_date: new.expiry_date,
            document_url: new.document_url,
            created_at: now,
            updated_at: now,
        }
    }

    fn derive_fields(&mut self, today: NaiveDate) {
        self.status = self.status_on(today);
    }
}

impl Product {
    fn from_new(new: NewProduct, id: String, now: DateTime<Utc>) -> Self {
        Product {
            status: ProductStatus::from_stock(new.quantity, new.min_quantity),
            id,
            branch_id: new.branch_id,
            name: new.name,
            category: new.category,
            sku: new.sku,
            barcode: new.barcode,
            quantity: new.quantity,
            min_quantity: new.min_quantity,
            price: new.price,
            cost_price: new.cost_price,
            supplier_id: new.supplier_id,
            expiry_date: new.expiry_date,
            created_at: now,
            updated_at: now,
        }
    }

    fn derive_fields(&mut self, _today: NaiveDate) {
        self.status = ProductStatus::from_stock(self.quantity, self.min_quantity);
    }
}

impl Order {
    fn from_new(new: NewOrder, id: String, now: DateTime<Utc>) -> Self {
        let mut order = Order {
            id,
            supplier_id: new.supplier_id,
            branch_id: new.branch_id,
            order_number: new.order_number,
            items: new.items.into_iter().map(Into::into).collect(),
            total_amount: Default::default(),
            status: new.status,
            payment_status: new.payment_status,
            order_date: new.order_date,
            expected_delivery_date: new.expected_delivery_date,
            delivered_date: new.delivered_date,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        order.recalculate_totals();
        order
    }

    fn derive_fields(&mut self, _today: NaiveDate) {
        self.recalculate_totals();
    }
}

impl Sale {
    fn from_new(new: NewSale, id: String, now: DateTime<Utc>) -> Self {
        Sale {
            id,
            branch_id: new.branch_id,
            month: new.month,
            total_sales: new.total_sales,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    fn derive_fields(&mut self, _today: NaiveDate) {}
}

impl Expense {
    fn from_new(new: NewExpense, id: String, now: DateTime<Utc>) -> Self {
        Expense {
            id,
            branch_id: new.branch_id,
            category: new.category,
            description: new.description,
            amount: new.amount,
            date: new.date,
            receipt_url: new.receipt_url,
            created_at: now,
            updated_at: now,
        }
    }

    fn derive_fields(&mut self, _today: NaiveDate) {}
}

impl User {
    fn from_new(new: NewUser, id: String, now: DateTime<Utc>) -> Self {
        User {
            id,
            username: new.username,
            password: new.password,
            name: new.name,
            role: new.role,
            created_at: now,
            updated_at: now,
        }
    }

    fn derive_fields(&mut self, _today: NaiveDate) {}
}

// =============================================================================
// Unit Tests
// =============================================================================
