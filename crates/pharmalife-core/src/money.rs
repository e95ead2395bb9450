//! # Money Module
//!
//! Provides the `Money` type for salaries, prices, sales and order totals.
//!
//! ## Representation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Money(i64) counts piastres (or cents): EGP 8,000.00 is 800000.         │
//! │                                                                         │
//! │  Employee      salary, allowances, deductions ──► net_pay()             │
//! │  Product       price, cost_price             ──► unit_margin()          │
//! │  Order item    unit_price × quantity         ──► total                  │
//! │  Order         Σ item.total                  ──► total_amount           │
//! │  Branch / Sale monthly_sales, total_sales    ──► StoreStats             │
//! │                                                                         │
//! │  Payroll and sales sums stay exact; floats appear only at the JSON     │
//! │  boundary, where amounts are written in major units: 8000, 25.5.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Overflow
//! Operators saturate at the `i64` bounds instead of panicking or wrapping.
//! Code that must reject an overflowing amount (order totals, net pay) uses
//! the `checked_*` methods.
//!
//! ## Usage
//! ```rust
//! use pharmalife_core::money::Money;
//!
//! let salary = Money::from_major(8000);
//! let allowances = Money::from_major(1500);
//! let deductions = Money::from_major(500);
//!
//! let net = salary + allowances - deductions;
//! assert_eq!(net, Money::from_major(9000));
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Serializes as a JSON number of major units, the format existing
/// snapshots and backup files use: `{"salary": 8000, "price": 25.5}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use pharmalife_core::money::Money;
    ///
    /// let price = Money::from_minor(2550); // 25.50
    /// assert_eq!(price.minor(), 2550);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole major units.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole major-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity (order line totals).
    /// Saturates on overflow.
    ///
    /// ```rust
    /// use pharmalife_core::money::Money;
    ///
    /// let unit_price = Money::from_major(18);
    /// assert_eq!(unit_price.multiply_quantity(100), Money::from_major(1800));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// `None` if the line total does not fit.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: u32) -> Option<Self> {
        match self.0.checked_mul(qty as i64) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Converts a major-unit amount such as `25.5`, rounding to the nearest
    /// minor unit. `None` for NaN, infinities and out-of-range values.
    ///
    /// ```rust
    /// use pharmalife_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_f64(25.5), Some(Money::from_minor(2550)));
    /// assert_eq!(Money::from_major_f64(0.1 + 0.2), Some(Money::from_minor(30)));
    /// assert_eq!(Money::from_major_f64(f64::NAN), None);
    /// ```
    pub fn from_major_f64(major: f64) -> Option<Self> {
        let minor = (major * 100.0).round();
        // i64::MAX as f64 rounds up to 2^63, which is already out of range.
        if !minor.is_finite() || minor < i64::MIN as f64 || minor >= i64::MAX as f64 {
            return None;
        }
        Some(Money(minor as i64))
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.0 as f64 / 100.0)
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an amount in major currency units")
    }

    fn visit_i64<E: de::Error>(self, major: i64) -> Result<Money, E> {
        major
            .checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom(format!("amount {major} is out of range")))
    }

    fn visit_u64<E: de::Error>(self, major: u64) -> Result<Money, E> {
        i64::try_from(major)
            .ok()
            .and_then(|major| major.checked_mul(100))
            .map(Money)
            .ok_or_else(|| E::custom(format!("amount {major} is out of range")))
    }

    fn visit_f64<E: de::Error>(self, major: f64) -> Result<Money, E> {
        Money::from_major_f64(major)
            .ok_or_else(|| E::custom(format!("amount {major} is out of range")))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering (`1250.00`), no currency symbol.
///
/// The currency code lives in `Settings`; formatting with a symbol and
/// locale belongs to whoever renders the value.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
