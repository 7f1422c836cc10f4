//! # Variant Codec
//!
//! Bidirectional mapping between typed entities and catalog object envelopes.
//!
//! ## Encode / Decode
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ItemVariation { pricing_type: Variable, price: None, … }             │
//! │        │                                                                │
//! │        │ encode(id, version, &entity)                                   │
//! │        │   1. validate (length bounds, conditional fields)             │
//! │        │   2. to_data  (conditional fields omitted when off)           │
//! │        ▼                                                                │
//! │   CatalogObject { id, version, data: ObjectData::ItemVariation(…) }    │
//! │        │                                                                │
//! │        │ decode::<ItemVariation>(&object)                               │
//! │        │   1. discriminator must be ITEM_VARIATION                     │
//! │        │   2. required fields must be present                          │
//! │        ▼                                                                │
//! │   ItemVariation { … }   (identical to the input)                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Round-Trip Law
//! For every entity `e` that passes validation,
//! `decode(&encode(id, version, &e)?)? == e`. Only `id`, `version` and the
//! server metadata on the envelope are outside the law.

use std::fmt;

use crate::error::{DecodeError, DecodeResult};
use crate::object::{
    CatalogObject, CategoryData, DiscountData, ItemData, ItemVariationData, ObjectData,
    ObjectType, TaxData,
};
use crate::percentage::Percentage;
use crate::types::{Category, Discount, DiscountType, Item, ItemVariation, PricingType, Tax};
use crate::validation::{self, ValidationResult};

// =============================================================================
// Catalog Entity Trait
// =============================================================================

/// A typed entity that travels inside a catalog object envelope.
pub trait CatalogEntity: Clone + PartialEq + fmt::Debug + Sized {
    /// The discriminator of envelopes carrying this entity.
    const OBJECT_TYPE: ObjectType;

    /// Checks local constraints before submission.
    fn validate(&self) -> ValidationResult<()>;

    /// Builds the wire payload. Conditional fields whose discriminator is
    /// off are omitted, never sent empty.
    fn to_data(&self) -> ObjectData;

    /// Reads the typed entity out of a payload.
    fn from_data(data: &ObjectData) -> DecodeResult<Self>;

    /// Fills in the currency of any money field that has none.
    fn apply_default_currency(&mut self, _currency: &str) {}
}

// =============================================================================
// Encode / Decode
// =============================================================================

/// Encodes an entity into an envelope.
///
/// Fails with a `ValidationError` if the entity breaks a local constraint.
pub fn encode<E: CatalogEntity>(
    id: impl Into<String>,
    version: Option<i64>,
    entity: &E,
) -> ValidationResult<CatalogObject> {
    entity.validate()?;
    Ok(CatalogObject::new(id, version, entity.to_data()))
}

/// Decodes the typed entity out of an envelope.
///
/// ## Errors
/// - `TypeMismatch` if the envelope is not an `E::OBJECT_TYPE` object
/// - `MissingField` / `InvalidField` if the payload is incomplete
pub fn decode<E: CatalogEntity>(object: &CatalogObject) -> DecodeResult<E> {
    if object.object_type() != E::OBJECT_TYPE {
        return Err(DecodeError::TypeMismatch {
            expected: E::OBJECT_TYPE,
            actual: object.object_type(),
        });
    }
    E::from_data(&object.data)
}

fn wrong_variant(expected: ObjectType, data: &ObjectData) -> DecodeError {
    DecodeError::TypeMismatch {
        expected,
        actual: data.object_type(),
    }
}

fn required<T>(value: Option<T>, object_type: ObjectType, field: &str) -> DecodeResult<T> {
    value.ok_or_else(|| DecodeError::missing(object_type, field))
}

fn parse_percentage(object_type: ObjectType, raw: &str) -> DecodeResult<Percentage> {
    raw.parse()
        .map_err(|err| DecodeError::invalid(object_type, "percentage", format!("{}", err)))
}

// =============================================================================
// Category
// =============================================================================

impl CatalogEntity for Category {
    const OBJECT_TYPE: ObjectType = ObjectType::Category;

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_category(self)
    }

    fn to_data(&self) -> ObjectData {
        ObjectData::Category(CategoryData {
            name: Some(self.name.clone()),
        })
    }

    fn from_data(data: &ObjectData) -> DecodeResult<Self> {
        let ObjectData::Category(data) = data else {
            return Err(wrong_variant(Self::OBJECT_TYPE, data));
        };
        Ok(Category {
            name: required(data.name.clone(), Self::OBJECT_TYPE, "name")?,
        })
    }
}

// =============================================================================
// Item
// =============================================================================

impl CatalogEntity for Item {
    const OBJECT_TYPE: ObjectType = ObjectType::Item;

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_item(self)
    }

    fn to_data(&self) -> ObjectData {
        ObjectData::Item(ItemData {
            name: Some(self.name.clone()),
            description: self.description.clone(),
            abbreviation: self.abbreviation.clone(),
            label_color: self.label_color.clone(),
            available_online: Some(self.available_online),
            available_for_pickup: Some(self.available_for_pickup),
            available_electronically: Some(self.available_electronically),
            category_id: self.category_id.clone(),
            tax_ids: Some(self.tax_ids.clone()),
            skip_modifier_screen: Some(self.skip_modifier_screen),
        })
    }

    fn from_data(data: &ObjectData) -> DecodeResult<Self> {
        let ObjectData::Item(data) = data else {
            return Err(wrong_variant(Self::OBJECT_TYPE, data));
        };
        Ok(Item {
            abbreviation: data.abbreviation.clone(),
            available_electronically: data.available_electronically.unwrap_or(false),
            available_online: data.available_online.unwrap_or(false),
            available_for_pickup: data.available_for_pickup.unwrap_or(false),
            category_id: data.category_id.clone(),
            description: data.description.clone(),
            label_color: data.label_color.clone(),
            name: required(data.name.clone(), Self::OBJECT_TYPE, "name")?,
            skip_modifier_screen: data.skip_modifier_screen.unwrap_or(false),
            tax_ids: data.tax_ids.clone().unwrap_or_default(),
        })
    }
}

// =============================================================================
// Item Variation
// =============================================================================

impl CatalogEntity for ItemVariation {
    const OBJECT_TYPE: ObjectType = ObjectType::ItemVariation;

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_item_variation(self)
    }

    fn to_data(&self) -> ObjectData {
        let price_money = match self.pricing_type {
            PricingType::Fixed => self.price.clone(),
            PricingType::Variable => None,
        };
        ObjectData::ItemVariation(ItemVariationData {
            item_id: Some(self.item_id.clone()),
            name: Some(self.name.clone()),
            sku: self.sku.clone(),
            upc: self.upc.clone(),
            pricing_type: Some(self.pricing_type),
            price_money,
        })
    }

    fn from_data(data: &ObjectData) -> DecodeResult<Self> {
        let ObjectData::ItemVariation(data) = data else {
            return Err(wrong_variant(Self::OBJECT_TYPE, data));
        };
        let pricing_type = required(data.pricing_type, Self::OBJECT_TYPE, "pricing_type")?;
        let price = match pricing_type {
            PricingType::Fixed => Some(required(
                data.price_money.clone(),
                Self::OBJECT_TYPE,
                "price_money",
            )?),
            PricingType::Variable if data.price_money.is_some() => {
                return Err(DecodeError::invalid(
                    Self::OBJECT_TYPE,
                    "price_money",
                    "not allowed with VARIABLE_PRICING",
                ));
            }
            PricingType::Variable => None,
        };
        Ok(ItemVariation {
            item_id: required(data.item_id.clone(), Self::OBJECT_TYPE, "item_id")?,
            name: required(data.name.clone(), Self::OBJECT_TYPE, "name")?,
            pricing_type,
            price,
            sku: data.sku.clone(),
            upc: data.upc.clone(),
        })
    }

    fn apply_default_currency(&mut self, currency: &str) {
        if let Some(price) = self.price.as_mut() {
            price.default_currency(currency);
        }
    }
}

// =============================================================================
// Discount
// =============================================================================

impl CatalogEntity for Discount {
    const OBJECT_TYPE: ObjectType = ObjectType::Discount;

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_discount(self)
    }

    fn to_data(&self) -> ObjectData {
        let amount_money = match self.discount_type {
            DiscountType::FixedAmount => self.amount.clone(),
            _ => None,
        };
        let percentage = if self.discount_type.is_percentage() {
            self.percentage.map(|p| p.to_string())
        } else {
            None
        };
        ObjectData::Discount(DiscountData {
            name: Some(self.name.clone()),
            discount_type: Some(self.discount_type),
            percentage,
            amount_money,
            pin_required: Some(self.pin_required),
            label_color: self.label_color.clone(),
            modify_tax_basis: self.modify_tax_basis,
        })
    }

    fn from_data(data: &ObjectData) -> DecodeResult<Self> {
        let ObjectData::Discount(data) = data else {
            return Err(wrong_variant(Self::OBJECT_TYPE, data));
        };
        let discount_type = required(data.discount_type, Self::OBJECT_TYPE, "discount_type")?;

        let amount = match discount_type {
            DiscountType::FixedAmount => Some(required(
                data.amount_money.clone(),
                Self::OBJECT_TYPE,
                "amount_money",
            )?),
            _ if data.amount_money.is_some() => {
                return Err(DecodeError::invalid(
                    Self::OBJECT_TYPE,
                    "amount_money",
                    "only allowed with FIXED_AMOUNT",
                ));
            }
            _ => None,
        };

        let percentage = match (discount_type, data.percentage.as_deref()) {
            (DiscountType::FixedAmount, Some(_)) => {
                return Err(DecodeError::invalid(
                    Self::OBJECT_TYPE,
                    "percentage",
                    "not allowed with FIXED_AMOUNT",
                ));
            }
            (DiscountType::FixedAmount, None) => None,
            (DiscountType::FixedPercentage, None) => {
                return Err(DecodeError::missing(Self::OBJECT_TYPE, "percentage"));
            }
            (_, Some(raw)) => Some(parse_percentage(Self::OBJECT_TYPE, raw)?),
            (_, None) => None,
        };

        Ok(Discount {
            name: required(data.name.clone(), Self::OBJECT_TYPE, "name")?,
            discount_type,
            amount,
            percentage,
            label_color: data.label_color.clone(),
            modify_tax_basis: data.modify_tax_basis,
            pin_required: data.pin_required.unwrap_or(false),
        })
    }

    fn apply_default_currency(&mut self, currency: &str) {
        if let Some(amount) = self.amount.as_mut() {
            amount.default_currency(currency);
        }
    }
}

// =============================================================================
// Tax
// =============================================================================

impl CatalogEntity for Tax {
    const OBJECT_TYPE: ObjectType = ObjectType::Tax;

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_tax(self)
    }

    fn to_data(&self) -> ObjectData {
        ObjectData::Tax(TaxData {
            name: Some(self.name.clone()),
            calculation_phase: Some(self.calculation_phase),
            inclusion_type: Some(self.inclusion_type),
            percentage: Some(self.percentage.to_string()),
            applies_to_custom_amounts: Some(self.applies_to_custom_amounts),
            enabled: Some(self.enabled),
        })
    }

    fn from_data(data: &ObjectData) -> DecodeResult<Self> {
        let ObjectData::Tax(data) = data else {
            return Err(wrong_variant(Self::OBJECT_TYPE, data));
        };
        let raw = required(data.percentage.as_deref(), Self::OBJECT_TYPE, "percentage")?;
        Ok(Tax {
            name: required(data.name.clone(), Self::OBJECT_TYPE, "name")?,
            percentage: parse_percentage(Self::OBJECT_TYPE, raw)?,
            calculation_phase: required(
                data.calculation_phase,
                Self::OBJECT_TYPE,
                "calculation_phase",
            )?,
            inclusion_type: required(data.inclusion_type, Self::OBJECT_TYPE, "inclusion_type")?,
            enabled: data.enabled.unwrap_or(false),
            applies_to_custom_amounts: data.applies_to_custom_amounts.unwrap_or(false),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
