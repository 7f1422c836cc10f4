//! # Domain Types
//!
//! The typed catalog entities and the wire enums their fields use.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog Entities                                │
//! │                                                                         │
//! │  ┌─────────────┐   ┌─────────────────┐   ┌──────────────────────┐      │
//! │  │  Category   │◄──│      Item       │◄──│    ItemVariation     │      │
//! │  │  name       │   │  category_id    │   │  item_id             │      │
//! │  └─────────────┘   │  tax_ids ───────┼─┐ │  pricing_type        │      │
//! │                    │  name, …        │ │ │  price (FIXED only)  │      │
//! │                    └─────────────────┘ │ └──────────────────────┘      │
//! │                                        ▼                                │
//! │  ┌──────────────────────────┐   ┌─────────────────┐                    │
//! │  │        Discount          │   │       Tax       │                    │
//! │  │  discount_type           │   │  percentage     │                    │
//! │  │  amount (FIXED_AMOUNT)   │   │  phase          │                    │
//! │  │  percentage (% kinds)    │   │  inclusion_type │                    │
//! │  └──────────────────────────┘   └─────────────────┘                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Optional Fields
//! `Option<T>` means "omitted on the wire". An empty string and `None` are
//! different values: `Some(String::new())` is sent as `""`.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::percentage::Percentage;

// =============================================================================
// Wire Enums
// =============================================================================

/// How an item variation is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricingType {
    /// The price is fixed and carried in `price_money`.
    #[serde(rename = "FIXED_PRICING")]
    Fixed,
    /// The price is entered at the time of sale; no `price_money`.
    #[serde(rename = "VARIABLE_PRICING")]
    Variable,
}

/// How a discount is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// A fixed percentage (e.g., 5%) off the item price.
    FixedPercentage,
    /// A fixed amount (e.g., $1.00) off the item price.
    FixedAmount,
    /// A percentage entered at the time of sale.
    VariablePercentage,
}

impl DiscountType {
    /// Returns true for the percentage kinds.
    pub const fn is_percentage(&self) -> bool {
        matches!(
            self,
            DiscountType::FixedPercentage | DiscountType::VariablePercentage
        )
    }
}

/// Whether a discount reduces the base a tax is computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifyTaxBasis {
    ModifyTaxBasis,
    DoNotModifyTaxBasis,
}

/// When a tax is calculated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxCalculationPhase {
    /// Calculated on the payment's subtotal.
    #[serde(rename = "TAX_SUBTOTAL_PHASE")]
    Subtotal,
    /// Calculated on the payment's total.
    #[serde(rename = "TAX_TOTAL_PHASE")]
    Total,
}

/// Whether a tax is added on top of or included in the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxInclusionType {
    Additive,
    Inclusive,
}

// =============================================================================
// Category
// =============================================================================

/// A catalog category (CATEGORY).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Category { name: name.into() }
    }
}

// =============================================================================
// Item
// =============================================================================

/// A sellable catalog item (ITEM).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    /// Short display text, at most 24 characters.
    pub abbreviation: Option<String>,
    pub available_electronically: bool,
    pub available_online: bool,
    pub available_for_pickup: bool,
    pub category_id: Option<String>,
    pub description: Option<String>,
    /// Six hex digits, e.g. "9da2a6".
    pub label_color: Option<String>,
    pub name: String,
    pub skip_modifier_screen: bool,
    /// Taxes applied to this item, in order.
    pub tax_ids: Vec<String>,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Item {
            name: name.into(),
            ..Item::default()
        }
    }

    /// Sets the category this item belongs to.
    pub fn in_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }
}

// =============================================================================
// Item Variation
// =============================================================================

/// A purchasable variation of an item (ITEM_VARIATION).
///
/// `price` must be present exactly when `pricing_type` is `Fixed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemVariation {
    pub item_id: String,
    pub name: String,
    pub pricing_type: PricingType,
    pub price: Option<Money>,
    pub sku: Option<String>,
    pub upc: Option<String>,
}

impl ItemVariation {
    /// Creates a fixed-price variation.
    pub fn fixed(item_id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        ItemVariation {
            item_id: item_id.into(),
            name: name.into(),
            pricing_type: PricingType::Fixed,
            price: Some(price),
            sku: None,
            upc: None,
        }
    }

    /// Creates a variable-price variation.
    pub fn variable(item_id: impl Into<String>, name: impl Into<String>) -> Self {
        ItemVariation {
            item_id: item_id.into(),
            name: name.into(),
            pricing_type: PricingType::Variable,
            price: None,
            sku: None,
            upc: None,
        }
    }
}

// =============================================================================
// Discount
// =============================================================================

/// A catalog discount (DISCOUNT).
///
/// ## Conditional Fields
/// ```text
///   discount_type         amount     percentage
///   ───────────────────   ────────   ───────────
///   FIXED_AMOUNT          required   absent
///   FIXED_PERCENTAGE      absent     required
///   VARIABLE_PERCENTAGE   absent     optional
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discount {
    pub name: String,
    pub discount_type: DiscountType,
    pub amount: Option<Money>,
    pub percentage: Option<Percentage>,
    pub label_color: Option<String>,
    pub modify_tax_basis: Option<ModifyTaxBasis>,
    pub pin_required: bool,
}

impl Discount {
    /// Creates a fixed-amount discount.
    pub fn fixed_amount(name: impl Into<String>, amount: Money) -> Self {
        Discount {
            name: name.into(),
            discount_type: DiscountType::FixedAmount,
            amount: Some(amount),
            percentage: None,
            label_color: None,
            modify_tax_basis: None,
            pin_required: false,
        }
    }

    /// Creates a fixed-percentage discount.
    pub fn fixed_percentage(name: impl Into<String>, percentage: Percentage) -> Self {
        Discount {
            name: name.into(),
            discount_type: DiscountType::FixedPercentage,
            amount: None,
            percentage: Some(percentage),
            label_color: None,
            modify_tax_basis: None,
            pin_required: false,
        }
    }
}

// =============================================================================
// Tax
// =============================================================================

/// A catalog tax (TAX).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tax {
    pub name: String,
    pub percentage: Percentage,
    pub calculation_phase: TaxCalculationPhase,
    pub inclusion_type: TaxInclusionType,
    pub enabled: bool,
    pub applies_to_custom_amounts: bool,
}

impl Tax {
    /// Creates an enabled, additive, subtotal-phase tax.
    pub fn new(name: impl Into<String>, percentage: Percentage) -> Self {
        Tax {
            name: name.into(),
            percentage,
            calculation_phase: TaxCalculationPhase::Subtotal,
            inclusion_type: TaxInclusionType::Additive,
            enabled: true,
            applies_to_custom_amounts: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_value(PricingType::Fixed).unwrap(), json!("FIXED_PRICING"));
        assert_eq!(
            serde_json::to_value(PricingType::Variable).unwrap(),
            json!("VARIABLE_PRICING")
        );
        assert_eq!(
            serde_json::to_value(DiscountType::VariablePercentage).unwrap(),
            json!("VARIABLE_PERCENTAGE")
        );
        assert_eq!(
            serde_json::to_value(TaxCalculationPhase::Total).unwrap(),
            json!("TAX_TOTAL_PHASE")
        );
        assert_eq!(
            serde_json::to_value(ModifyTaxBasis::DoNotModifyTaxBasis).unwrap(),
            json!("DO_NOT_MODIFY_TAX_BASIS")
        );
        assert_eq!(
            serde_json::to_value(TaxInclusionType::Inclusive).unwrap(),
            json!("INCLUSIVE")
        );
    }

    #[test]
    fn test_discount_type_kinds() {
        assert!(DiscountType::FixedPercentage.is_percentage());
        assert!(DiscountType::VariablePercentage.is_percentage());
        assert!(!DiscountType::FixedAmount.is_percentage());
    }

    #[test]
    fn test_constructors() {
        let variation = ItemVariation::variable("ITEM_1", "Regular");
        assert_eq!(variation.pricing_type, PricingType::Variable);
        assert!(variation.price.is_none());

        let item = Item::new("Latte").in_category("CAT_1");
        assert_eq!(item.category_id.as_deref(), Some("CAT_1"));
        assert!(item.tax_ids.is_empty());
    }
}
