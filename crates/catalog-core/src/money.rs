//! # Money Module
//!
//! Provides the `Money` type for monetary values exchanged with the catalog.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units + ISO 4217 currency                  │
//! │    { "amount": 450, "currency": "USD" }  = $4.50                       │
//! │                                                                         │
//! │  This is exactly the shape the remote catalog uses for price_money     │
//! │  and amount_money, so no conversion happens at the wire boundary.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catalog_core::money::Money;
//!
//! let price = Money::new(450, "USD"); // $4.50
//! assert_eq!(price.amount(), 450);
//! assert_eq!(price.to_string(), "4.50 USD");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit plus its currency code.
///
/// ## Design Decisions
/// - **i64 (signed)**: Same width as the remote store's `amount`
/// - **Currency as String**: Validated on submission, not on construction,
///   so values decoded from the store are never rejected locally
/// - **Empty currency**: Means "use the configured default"; reconcilers
///   stamp the default before encoding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: String,
}

impl Money {
    /// Creates a Money value from minor units and a currency code.
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::money::Money;
    ///
    /// let price = Money::new(1099, "EUR");
    /// assert_eq!(price.amount(), 1099);
    /// assert_eq!(price.currency(), "EUR");
    /// ```
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Money {
            amount,
            currency: currency.into(),
        }
    }

    /// Creates a Money value with no currency yet.
    ///
    /// The configured default currency is applied before submission.
    pub fn from_minor(amount: i64) -> Self {
        Money::new(amount, String::new())
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn amount(&self) -> i64 {
        self.amount
    }

    /// Returns the ISO 4217 currency code (possibly empty).
    #[inline]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Returns true when no currency has been set.
    #[inline]
    pub fn has_currency(&self) -> bool {
        !self.currency.is_empty()
    }

    /// Sets the currency if none is set yet.
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::money::Money;
    ///
    /// let mut price = Money::from_minor(300);
    /// price.default_currency("USD");
    /// assert_eq!(price.currency(), "USD");
    ///
    /// let mut euro = Money::new(300, "EUR");
    /// euro.default_currency("USD");
    /// assert_eq!(euro.currency(), "EUR");
    /// ```
    pub fn default_currency(&mut self, currency: &str) {
        if self.currency.is_empty() {
            self.currency = currency.to_string();
        }
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.amount / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.amount % 100).abs()
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.amount < 0
    }

    /// Validates the value for submission.
    ///
    /// ## Rules
    /// - Amount must be non-negative (zero is a valid free price)
    /// - Currency must be three uppercase ASCII letters
    pub fn validate(&self, field: &str) -> ValidationResult<()> {
        if self.is_negative() {
            return Err(ValidationError::OutOfRange {
                field: format!("{}.amount", field),
                min: 0,
                max: i64::MAX,
            });
        }

        validate_currency_code(&format!("{}.currency", field), &self.currency)
    }
}

/// Validates an ISO 4217 style currency code.
///
/// ## Example
/// ```rust
/// use catalog_core::money::validate_currency_code;
///
/// assert!(validate_currency_code("currency", "USD").is_ok());
/// assert!(validate_currency_code("currency", "usd").is_err());
/// assert!(validate_currency_code("currency", "").is_err());
/// ```
pub fn validate_currency_code(field: &str, code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::required(field));
    }

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::invalid_format(
            field,
            format!("'{}' is not a three-letter uppercase currency code", code),
        ));
    }

    Ok(())
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as "4.50 USD" for logs and error messages.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:02}",
            sign,
            self.major().abs(),
            self.minor_part()
        )?;
        if !self.currency.is_empty() {
            write!(f, " {}", self.currency)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let money = Money::new(1099, "USD");
        assert_eq!(money.amount(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
        assert!(money.has_currency());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::new(1099, "USD").to_string(), "10.99 USD");
        assert_eq!(Money::new(500, "EUR").to_string(), "5.00 EUR");
        assert_eq!(Money::new(-550, "USD").to_string(), "-5.50 USD");
        assert_eq!(Money::from_minor(7).to_string(), "0.07");
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(Money::new(450, "USD")).unwrap();
        assert_eq!(json, serde_json::json!({ "amount": 450, "currency": "USD" }));
    }

    #[test]
    fn test_validate() {
        assert!(Money::new(0, "USD").validate("price").is_ok());
        assert!(Money::new(450, "JPY").validate("price").is_ok());

        let err = Money::new(-1, "USD").validate("price").unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));

        let err = Money::from_minor(100).validate("price").unwrap_err();
        assert_eq!(err, ValidationError::required("price.currency"));

        assert!(Money::new(100, "US").validate("price").is_err());
        assert!(Money::new(100, "usd").validate("price").is_err());
    }

    #[test]
    fn test_default_currency_only_fills_empty() {
        let mut money = Money::from_minor(100);
        money.default_currency("CAD");
        assert_eq!(money.currency(), "CAD");

        money.default_currency("USD");
        assert_eq!(money.currency(), "CAD");
    }
}
