//! # Validation Module
//!
//! Field validation for records before they enter the repository.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Forms (outside this workspace)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: LocalStore add/update                                        │
//! │  └── THIS MODULE: field rules on the complete, merged record           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Repository                                                   │
//! │  └── No referential checks: branch_id / supplier_id / product_id       │
//! │      are the caller's responsibility                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Record validators run on the whole record, so an `update` is checked
//! against the merged result rather than the patch alone.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Branch, Employee, Expense, License, Order, Product, Sale, Supplier, User};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound for free-text fields.
pub const MAX_TEXT_LEN: usize = 200;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a required text field.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
///
/// ```rust
/// use pharmalife_core::validation::validate_required;
///
/// assert!(validate_required("name", "Maadi Branch").is_ok());
/// assert!(validate_required("name", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Validates that a monetary amount is zero or positive.
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a supplier rating (1 to 5 stars).
pub fn validate_rating(rating: u8) -> ValidationResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 1,
            max: 5,
        });
    }

    Ok(())
}

/// Validates a `YYYY-MM` month key.
///
/// ```rust
/// use pharmalife_core::validation::validate_month;
///
/// assert!(validate_month("2024-01").is_ok());
/// assert!(validate_month("2024-13").is_err());
/// assert!(validate_month("2024-1").is_err());
/// ```
pub fn validate_month(month: &str) -> ValidationResult<()> {
    let invalid = || ValidationError::invalid_format("month", "expected YYYY-MM");

    let (year, mon) = month.split_once('-').ok_or_else(invalid)?;

    if year.len() != 4 || mon.len() != 2 {
        return Err(invalid());
    }
    if !year.chars().all(|c| c.is_ascii_digit()) || !mon.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let mon: u32 = mon.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&mon) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }

    Ok(())
}

/// Validates an optional email address. Empty is allowed.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Ok(());
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(ValidationError::invalid_format(
            "email",
            "must look like name@domain",
        )),
    }
}

/// Validates that a license is not issued after it expires.
pub fn validate_date_order(issue_date: NaiveDate, expiry_date: NaiveDate) -> ValidationResult<()> {
    if issue_date > expiry_date {
        return Err(ValidationError::invalid_format(
            "expiryDate",
            "must not be before issueDate",
        ));
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

pub fn validate_branch(branch: &Branch) -> ValidationResult<()> {
    validate_required("name", &branch.name)?;
    validate_non_negative("monthlySales", branch.monthly_sales)
}

pub fn validate_supplier(supplier: &Supplier) -> ValidationResult<()> {
    validate_required("name", &supplier.name)?;
    validate_email(&supplier.email)?;
    validate_rating(supplier.rating)
}

pub fn validate_employee(employee: &Employee) -> ValidationResult<()> {
    validate_required("name", &employee.name)?;
    validate_required("branchId", &employee.branch_id)?;
    validate_email(&employee.email)?;
    validate_non_negative("salary", employee.salary)?;
    validate_non_negative("allowances", employee.allowances)?;
    validate_non_negative("deductions", employee.deductions)?;
    validate_net_pay(employee)
}

pub fn validate_license(license: &License) -> ValidationResult<()> {
    validate_required("name", &license.name)?;
    validate_required("branchId", &license.branch_id)?;
    validate_required("licenseNumber", &license.license_number)?;
    validate_date_order(license.issue_date, license.expiry_date)
}

pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_required("name", &product.name)?;
    validate_required("branchId", &product.branch_id)?;
    validate_required("sku", &product.sku)?;
    validate_non_negative("price", product.price)?;
    validate_non_negative("costPrice", product.cost_price)
}

pub fn validate_order(order: &Order) -> ValidationResult<()> {
    validate_required("orderNumber", &order.order_number)?;
    validate_required("supplierId", &order.supplier_id)?;
    validate_required("branchId", &order.branch_id)?;

    if order.items.is_empty() {
        return Err(ValidationError::required("items"));
    }

    for item in &order.items {
        validate_required("productName", &item.product_name)?;
        if item.quantity == 0 {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: u32::MAX as i64,
            });
        }
        validate_non_negative("unitPrice", item.unit_price)?;
    }

    validate_order_total(order)
}

/// Rejects an order whose total does not fit in `Money`.
pub fn validate_order_total(order: &Order) -> ValidationResult<()> {
    order
        .checked_total()
        .map(|_| ())
        .ok_or_else(|| money_out_of_range("totalAmount"))
}

/// Rejects an employee whose net pay does not fit in `Money`.
pub fn validate_net_pay(employee: &Employee) -> ValidationResult<()> {
    employee
        .checked_net_pay()
        .map(|_| ())
        .ok_or_else(|| money_out_of_range("netPay"))
}

fn money_out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: i64::MIN,
        max: i64::MAX,
    }
}

pub fn validate_sale(sale: &Sale) -> ValidationResult<()> {
    validate_required("branchId", &sale.branch_id)?;
    validate_month(&sale.month)?;
    validate_non_negative("totalSales", sale.total_sales)
}

pub fn validate_expense(expense: &Expense) -> ValidationResult<()> {
    validate_required("branchId", &expense.branch_id)?;
    validate_required("category", &expense.category)?;
    validate_non_negative("amount", expense.amount)
}

pub fn validate_user(user: &User) -> ValidationResult<()> {
    validate_required("username", &user.username)?;
    validate_required("password", &user.password)?;
    validate_required("name", &user.name)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "Dokki Branch").is_ok());
        assert_eq!(
            validate_required("name", ""),
            Err(ValidationError::required("name"))
        );
        assert!(validate_required("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_rating() {
        for rating in 1..=5 {
            assert!(validate_rating(rating).is_ok());
        }
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month("2024-01").is_ok());
        assert!(validate_month("2024-12").is_ok());
        assert!(validate_month("2024-00").is_err());
        assert!(validate_month("24-01").is_err());
        assert!(validate_month("2024/01").is_err());
        assert!(validate_month("abcd-ef").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("").is_ok());
        assert!(validate_email("pharma@example.com").is_ok());
        assert!(validate_email("pharma.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@b@c").is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("salary", Money::zero()).is_ok());
        assert!(validate_non_negative("salary", Money::from_minor(-1)).is_err());
    }

    #[test]
    fn test_order_total_overflow_rejected() {
        let now = chrono::Utc::now();
        let order = Order {
            id: "o1".to_string(),
            supplier_id: "1".to_string(),
            branch_id: "1".to_string(),
            order_number: "ORD-1".to_string(),
            items: vec![crate::types::OrderItem {
                product_id: "p1".to_string(),
                product_name: "Panadol".to_string(),
                quantity: 4,
                unit_price: Money::from_minor(i64::MAX / 2),
                total: Money::zero(),
            }],
            total_amount: Money::zero(),
            status: Default::default(),
            payment_status: Default::default(),
            order_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expected_delivery_date: None,
            delivered_date: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        assert!(matches!(
            validate_order(&order),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "totalAmount"
        ));
    }

    #[test]
    fn test_validate_date_order() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dec = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert!(validate_date_order(jan, dec).is_ok());
        assert!(validate_date_order(jan, jan).is_ok());
        assert!(validate_date_order(dec, jan).is_err());
    }
}
