//! # Default Dataset
//!
//! The demo data a fresh installation starts with, and what `reset`
//! restores: five branches, three suppliers, three licenses, three
//! employees, two monthly sales rows, one admin user, five products and
//! three purchase orders.
//!
//! Default records use short numeric ids ("1", "2", ...). Records created
//! at runtime get UUIDs, so the two never collide.

use chrono::{DateTime, NaiveDate, Utc};

use crate::money::Money;
use crate::repository::Repository;
use crate::settings::Settings;
use crate::status::{
    LicenseStatus, LicenseType, OrderStatus, PaymentStatus, ProductStatus, RecordStatus, UserRole,
};
use crate::types::{
    Branch, Employee, License, Order, OrderItem, Product, Sale, Supplier, User,
};

/// Username of the built-in administrator.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Builds the default repository with every timestamp set to `now`.
///
/// Derived fields are computed as of `now`; the literal dates are fixed, so
/// the license statuses depend on when this runs.
pub fn default_repository(now: DateTime<Utc>) -> Repository {
    let mut repo = Repository {
        branches: default_branches(now),
        suppliers: default_suppliers(now),
        licenses: default_licenses(now),
        employees: default_employees(now),
        expenses: Vec::new(),
        sales: default_sales(now),
        users: default_users(now),
        products: default_products(now),
        orders: default_orders(now),
        settings: Settings::default(),
    };
    repo.refresh_derived(now.date_naive());
    repo
}

fn default_branches(now: DateTime<Utc>) -> Vec<Branch> {
    let rows = [
        ("1", "Maadi Branch", "9 Street, Maadi", "01012345678", "Ahmed Mohamed", 125_000, 8),
        ("2", "Nasr City Branch", "Makram Ebeid Street", "01112345678", "Mohamed Ali", 98_000, 6),
        ("3", "Dokki Branch", "Tahrir Street", "01212345678", "Sara Ahmed", 115_000, 7),
        ("4", "Haram Branch", "Main Haram Street", "01512345678", "Khaled Ibrahim", 87_000, 5),
        ("5", "Mohandessin Branch", "Lebanon Street", "01012345679", "Fatma Hassan", 142_000, 9),
    ];

    rows.into_iter()
        .map(|(id, name, address, phone, manager, sales, employees)| Branch {
            id: id.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            phone: phone.to_string(),
            manager: manager.to_string(),
            status: RecordStatus::Active,
            monthly_sales: Money::from_major(sales),
            employees_count: employees,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

fn default_suppliers(now: DateTime<Utc>) -> Vec<Supplier> {
    let rows = [
        ("1", "Pharma Drug Company", "02-12345678", "pharma@example.com", "Industrial Zone, 6th of October", 5, 156, date(2024, 1, 5)),
        ("2", "Al Shifa Warehouse", "02-23456789", "shifa@example.com", "10th of Ramadan", 4, 89, date(2024, 1, 3)),
        ("3", "Nile Drug Distribution", "02-34567890", "nile@example.com", "Badr City", 4, 67, date(2024, 1, 2)),
    ];

    rows.into_iter()
        .map(|(id, name, phone, email, address, rating, orders, last)| Supplier {
            id: id.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
            address: address.to_string(),
            rating,
            status: RecordStatus::Active,
            total_orders: orders,
            last_order_date: Some(last),
            created_at: now,
            updated_at: now,
        })
        .collect()
}

fn default_licenses(now: DateTime<Utc>) -> Vec<License> {
    let rows = [
        ("1", "1", LicenseType::Pharmacy, "Practice License", "PH-2024-001", date(2024, 1, 1), date(2025, 1, 1)),
        ("2", "1", LicenseType::Health, "Health Certificate", "HL-2024-001", date(2024, 1, 1), date(2024, 2, 15)),
        ("3", "2", LicenseType::Pharmacy, "Practice License", "PH-2024-002", date(2023, 6, 1), date(2024, 1, 10)),
    ];

    rows.into_iter()
        .map(|(id, branch_id, kind, name, number, issued, expires)| License {
            id: id.to_string(),
            branch_id: branch_id.to_string(),
            kind,
            name: name.to_string(),
            license_number: number.to_string(),
            issue_date: issued,
            expiry_date: expires,
            status: LicenseStatus::Valid,
            document_url: None,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

fn default_employees(now: DateTime<Utc>) -> Vec<Employee> {
    let rows = [
        ("1", "1", "Ahmed Mohamed Ali", "Pharmacist", "01012345680", "ahmed@pharma.com", 8000, 1500, 500, date(2022, 3, 15)),
        ("2", "1", "Sara Hassan", "Assistant Pharmacist", "01112345680", "sara@pharma.com", 5000, 800, 200, date(2023, 1, 10)),
        ("3", "2", "Mohamed Khaled", "Pharmacist", "01212345680", "mohamed@pharma.com", 7500, 1200, 400, date(2021, 8, 20)),
    ];

    rows.into_iter()
        .map(
            |(id, branch_id, name, position, phone, email, salary, allowances, deductions, hired)| {
                Employee {
                    id: id.to_string(),
                    branch_id: branch_id.to_string(),
                    name: name.to_string(),
                    position: position.to_string(),
                    phone: phone.to_string(),
                    email: email.to_string(),
                    salary: Money::from_major(salary),
                    allowances: Money::from_major(allowances),
                    deductions: Money::from_major(deductions),
                    status: RecordStatus::Active,
                    hire_date: hired,
                    created_at: now,
                    updated_at: now,
                }
            },
        )
        .collect()
}

fn default_sales(now: DateTime<Utc>) -> Vec<Sale> {
    vec![
        Sale {
            id: "1".to_string(),
            branch_id: "1".to_string(),
            month: "2024-01".to_string(),
            total_sales: Money::from_major(125_000),
            notes: Some("Good sales".to_string()),
            created_at: now,
            updated_at: now,
        },
        Sale {
            id: "2".to_string(),
            branch_id: "2".to_string(),
            month: "2024-01".to_string(),
            total_sales: Money::from_major(98_000),
            notes: None,
            created_at: now,
            updated_at: now,
        },
    ]
}

/// The built-in administrator. Password is `admin123`, in plaintext.
fn default_users(now: DateTime<Utc>) -> Vec<User> {
    vec![User {
        id: "1".to_string(),
        username: DEFAULT_ADMIN_USERNAME.to_string(),
        password: "admin123".to_string(),
        name: "System Administrator".to_string(),
        role: UserRole::Admin,
        created_at: now,
        updated_at: now,
    }]
}

fn default_products(now: DateTime<Utc>) -> Vec<Product> {
    let rows = [
        ("1", "1", "Paracetamol 500mg", "medicines", "MED-001", 150, 50, 25, 18, "1", Some(date(2025, 6, 1))),
        ("2", "1", "Amoxicillin 500mg", "medicines", "MED-002", 30, 40, 45, 32, "1", Some(date(2025, 3, 15))),
        ("3", "1", "Vitamin C 1000", "supplements", "SUP-001", 0, 20, 85, 60, "2", Some(date(2025, 12, 1))),
        ("4", "2", "Moisturizing Skin Cream", "cosmetics", "COS-001", 45, 15, 120, 85, "3", None),
        ("5", "1", "Blood Pressure Monitor", "equipment", "EQP-001", 8, 5, 450, 320, "2", None),
    ];

    rows.into_iter()
        .map(
            |(id, branch_id, name, category, sku, quantity, min, price, cost, supplier, expiry)| {
                Product {
                    id: id.to_string(),
                    branch_id: branch_id.to_string(),
                    name: name.to_string(),
                    category: category.to_string(),
                    sku: sku.to_string(),
                    barcode: None,
                    quantity,
                    min_quantity: min,
                    price: Money::from_major(price),
                    cost_price: Money::from_major(cost),
                    supplier_id: Some(supplier.to_string()),
                    expiry_date: expiry,
                    status: ProductStatus::from_stock(quantity, min),
                    created_at: now,
                    updated_at: now,
                }
            },
        )
        .collect()
}

fn default_orders(now: DateTime<Utc>) -> Vec<Order> {
    let order = |id: &str,
                 supplier_id: &str,
                 branch_id: &str,
                 number: &str,
                 item: (&str, &str, u32, i64),
                 status: OrderStatus,
                 payment_status: PaymentStatus,
                 ordered: NaiveDate,
                 expected: NaiveDate,
                 delivered: Option<NaiveDate>| {
        let (product_id, product_name, quantity, unit_price) = item;
        let unit_price = Money::from_major(unit_price);
        let total = unit_price.multiply_quantity(quantity);

        Order {
            id: id.to_string(),
            supplier_id: supplier_id.to_string(),
            branch_id: branch_id.to_string(),
            order_number: number.to_string(),
            items: vec![OrderItem {
                product_id: product_id.to_string(),
                product_name: product_name.to_string(),
                quantity,
                unit_price,
                total,
            }],
            total_amount: total,
            status,
            payment_status,
            order_date: ordered,
            expected_delivery_date: Some(expected),
            delivered_date: delivered,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    };

    vec![
        order(
            "1",
            "1",
            "1",
            "ORD-2024-001",
            ("1", "Paracetamol 500mg", 100, 18),
            OrderStatus::Delivered,
            PaymentStatus::Paid,
            date(2024, 1, 1),
            date(2024, 1, 5),
            Some(date(2024, 1, 4)),
        ),
        order(
            "2",
            "2",
            "1",
            "ORD-2024-002",
            ("3", "Vitamin C 1000", 50, 60),
            OrderStatus::Shipped,
            PaymentStatus::Partial,
            date(2024, 1, 10),
            date(2024, 1, 15),
            None,
        ),
        order(
            "3",
            "1",
            "2",
            "ORD-2024-003",
            ("2", "Amoxicillin 500mg", 200, 32),
            OrderStatus::Pending,
            PaymentStatus::Unpaid,
            date(2024, 1, 12),
            date(2024, 1, 18),
            None,
        ),
    ]
}
