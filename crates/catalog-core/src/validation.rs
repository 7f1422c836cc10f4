//! # Validation Module
//!
//! Field constraint checks that run before any request is submitted.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (declarative resource layer)                          │
//! │  └── Schema-level checks, "has this field changed"                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Length bounds (name ≤ 255, abbreviation ≤ 24, …)                  │
//! │  ├── Formats (currency code, label color)                              │
//! │  └── Conditional fields vs. their discriminator                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote catalog store                                         │
//! │  └── Referential integrity, version checks                             │
//! │                                                                         │
//! │  A ValidationError here means no network call was made.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{Category, Discount, DiscountType, Item, ItemVariation, PricingType, Tax};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Limits
// =============================================================================

/// Maximum length of any entity name.
pub const NAME_MAX_LENGTH: usize = 255;

/// Maximum length of an item abbreviation.
pub const ABBREVIATION_MAX_LENGTH: usize = 24;

/// Maximum length of an item description.
pub const DESCRIPTION_MAX_LENGTH: usize = 4096;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required, length-bounded name.
///
/// ## Rules
/// - Must not be blank
/// - Must be at most `max` characters (counted as chars, not bytes)
///
/// ## Example
/// ```rust
/// use catalog_core::validation::{validate_name, NAME_MAX_LENGTH};
///
/// assert!(validate_name("name", "Beverages", NAME_MAX_LENGTH).is_ok());
/// assert!(validate_name("name", "   ", NAME_MAX_LENGTH).is_err());
/// assert!(validate_name("name", &"A".repeat(256), NAME_MAX_LENGTH).is_err());
/// ```
pub fn validate_name(field: &str, name: &str, max: usize) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    validate_max_length(field, name, max)
}

/// Validates that a string is at most `max` characters.
pub fn validate_max_length(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }

    Ok(())
}

/// Validates an optional length-bounded string.
pub fn validate_optional_length(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<()> {
    match value {
        Some(value) => validate_max_length(field, value, max),
        None => Ok(()),
    }
}

/// Validates a label color: six hex digits, no leading `#`.
///
/// ## Example
/// ```rust
/// use catalog_core::validation::validate_label_color;
///
/// assert!(validate_label_color("label_color", "9da2a6").is_ok());
/// assert!(validate_label_color("label_color", "#9da2a6").is_err());
/// assert!(validate_label_color("label_color", "blue").is_err());
/// ```
pub fn validate_label_color(field: &str, color: &str) -> ValidationResult<()> {
    if color.len() != 6 || !color.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::invalid_format(
            field,
            "must be six hexadecimal digits",
        ));
    }

    Ok(())
}

/// Validates a reference to another catalog object.
///
/// Temporary ids are accepted so objects in the same batch can refer to
/// each other before the store assigns permanent ids.
pub fn validate_object_ref(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    if id.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format(
            field,
            "object ids cannot contain whitespace",
        ));
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a category before submission.
pub fn validate_category(category: &Category) -> ValidationResult<()> {
    validate_name("name", &category.name, NAME_MAX_LENGTH)
}

/// Validates an item before submission.
pub fn validate_item(item: &Item) -> ValidationResult<()> {
    validate_name("name", &item.name, NAME_MAX_LENGTH)?;
    validate_optional_length(
        "abbreviation",
        item.abbreviation.as_deref(),
        ABBREVIATION_MAX_LENGTH,
    )?;
    validate_optional_length(
        "description",
        item.description.as_deref(),
        DESCRIPTION_MAX_LENGTH,
    )?;

    if let Some(color) = &item.label_color {
        validate_label_color("label_color", color)?;
    }
    if let Some(category_id) = &item.category_id {
        validate_object_ref("category_id", category_id)?;
    }
    for tax_id in &item.tax_ids {
        validate_object_ref("tax_ids", tax_id)?;
    }

    Ok(())
}

/// Validates an item variation before submission.
///
/// ## Rules
/// - FIXED_PRICING requires a price
/// - VARIABLE_PRICING forbids a price
pub fn validate_item_variation(variation: &ItemVariation) -> ValidationResult<()> {
    validate_object_ref("item_id", &variation.item_id)?;
    validate_name("name", &variation.name, NAME_MAX_LENGTH)?;

    match (variation.pricing_type, &variation.price) {
        (PricingType::Fixed, Some(price)) => price.validate("price")?,
        (PricingType::Fixed, None) => {
            return Err(ValidationError::inconsistent(
                "price",
                "pricing_type",
                "FIXED_PRICING requires a price",
            ));
        }
        (PricingType::Variable, Some(_)) => {
            return Err(ValidationError::inconsistent(
                "price",
                "pricing_type",
                "VARIABLE_PRICING must not carry a price",
            ));
        }
        (PricingType::Variable, None) => {}
    }

    Ok(())
}

/// Validates a discount before submission.
///
/// ## Rules
/// - FIXED_AMOUNT requires `amount` and forbids `percentage`
/// - FIXED_PERCENTAGE requires `percentage` and forbids `amount`
/// - VARIABLE_PERCENTAGE forbids `amount`; `percentage` is optional
pub fn validate_discount(discount: &Discount) -> ValidationResult<()> {
    validate_name("name", &discount.name, NAME_MAX_LENGTH)?;

    if let Some(color) = &discount.label_color {
        validate_label_color("label_color", color)?;
    }

    match discount.discount_type {
        DiscountType::FixedAmount => {
            let amount = discount.amount.as_ref().ok_or_else(|| {
                ValidationError::inconsistent(
                    "amount",
                    "discount_type",
                    "FIXED_AMOUNT requires an amount",
                )
            })?;
            amount.validate("amount")?;
            if discount.percentage.is_some() {
                return Err(ValidationError::inconsistent(
                    "percentage",
                    "discount_type",
                    "FIXED_AMOUNT must not carry a percentage",
                ));
            }
        }
        kind => {
            if discount.amount.is_some() {
                return Err(ValidationError::inconsistent(
                    "amount",
                    "discount_type",
                    "percentage discounts must not carry an amount",
                ));
            }
            if kind == DiscountType::FixedPercentage && discount.percentage.is_none() {
                return Err(ValidationError::inconsistent(
                    "percentage",
                    "discount_type",
                    "FIXED_PERCENTAGE requires a percentage",
                ));
            }
        }
    }

    Ok(())
}

/// Validates a tax before submission.
pub fn validate_tax(tax: &Tax) -> ValidationResult<()> {
    validate_name("name", &tax.name, NAME_MAX_LENGTH)
}

// =============================================================================
// Unit Tests
// =============================================================================
