//! # Catalog Object Envelope
//!
//! The generic wire representation every catalog entity travels in.
//!
//! ## Wire Shape vs. Memory Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ON THE WIRE (remote store contract)                                    │
//! │  {                                                                      │
//! │    "type": "ITEM_VARIATION",          ◄── discriminator string         │
//! │    "id": "#3f2a…",                                                      │
//! │    "version": 1700000000001,                                            │
//! │    "item_variation_data": { … },      ◄── exactly one *_data populated │
//! │  }                                                                      │
//! │                                                                         │
//! │  IN MEMORY                                                              │
//! │  CatalogObject { id, version, …, data: ObjectData::ItemVariation(…) }   │
//! │                                                                         │
//! │  The discriminator and the payload are one value, so they can never    │
//! │  disagree once an envelope has been parsed. Parsing rejects envelopes  │
//! │  whose populated payload does not match `type`.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DecodeError, DecodeResult};
use crate::money::Money;
use crate::types::{
    DiscountType, ModifyTaxBasis, PricingType, TaxCalculationPhase, TaxInclusionType,
};

// =============================================================================
// Object Type
// =============================================================================

/// The kind of entity a catalog object wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    Category,
    Item,
    ItemVariation,
    Discount,
    Tax,
}

impl ObjectType {
    /// All object types, in wire order.
    pub const ALL: [ObjectType; 5] = [
        ObjectType::Category,
        ObjectType::Item,
        ObjectType::ItemVariation,
        ObjectType::Discount,
        ObjectType::Tax,
    ];

    /// Returns the wire discriminator.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Category => "CATEGORY",
            ObjectType::Item => "ITEM",
            ObjectType::ItemVariation => "ITEM_VARIATION",
            ObjectType::Discount => "DISCOUNT",
            ObjectType::Tax => "TAX",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DecodeError::UnknownType(s.to_string()))
    }
}

// =============================================================================
// Variant Payloads (wire field sets)
// =============================================================================
// Every field is optional on the wire. Which ones are required is decided by
// the codec, so a malformed response surfaces as a DecodeError naming the
// field rather than as an opaque deserialization failure.

/// Payload of a CATEGORY object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Payload of an ITEM object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_online: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_for_pickup: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_electronically: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_modifier_screen: Option<bool>,
}

/// Payload of an ITEM_VARIATION object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemVariationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_type: Option<PricingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_money: Option<Money>,
}

/// Payload of a DISCOUNT object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_type: Option<DiscountType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_money: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modify_tax_basis: Option<ModifyTaxBasis>,
}

/// Payload of a TAX object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_phase: Option<TaxCalculationPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion_type: Option<TaxInclusionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to_custom_amounts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

// =============================================================================
// Object Data (tagged union)
// =============================================================================

/// Exactly one variant payload, tagged by its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectData {
    Category(CategoryData),
    Item(ItemData),
    ItemVariation(ItemVariationData),
    Discount(DiscountData),
    Tax(TaxData),
}

impl ObjectData {
    /// Returns the discriminator matching this payload.
    pub const fn object_type(&self) -> ObjectType {
        match self {
            ObjectData::Category(_) => ObjectType::Category,
            ObjectData::Item(_) => ObjectType::Item,
            ObjectData::ItemVariation(_) => ObjectType::ItemVariation,
            ObjectData::Discount(_) => ObjectType::Discount,
            ObjectData::Tax(_) => ObjectType::Tax,
        }
    }
}

// =============================================================================
// Catalog Object
// =============================================================================

/// A catalog object envelope: identity, concurrency token and one payload.
///
/// ## Server-Assigned Fields
/// - `id`: temporary (`#…`) until the first successful create
/// - `version`: absent on create, returned by the store after every upsert
/// - `updated_at`, `is_deleted`: informational, set by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireObject", into = "WireObject")]
pub struct CatalogObject {
    pub id: String,
    pub version: Option<i64>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub data: ObjectData,
}

impl CatalogObject {
    /// Creates an envelope with no server-assigned metadata.
    pub fn new(id: impl Into<String>, version: Option<i64>, data: ObjectData) -> Self {
        CatalogObject {
            id: id.into(),
            version,
            updated_at: None,
            is_deleted: false,
            data,
        }
    }

    /// Returns the discriminator.
    pub const fn object_type(&self) -> ObjectType {
        self.data.object_type()
    }

    /// Parses a raw wire envelope, enforcing discriminator/payload agreement.
    pub fn from_wire(wire: WireObject) -> DecodeResult<Self> {
        let object_type: ObjectType = wire.object_type.parse()?;

        let mut populated = Vec::new();
        if wire.category_data.is_some() {
            populated.push(ObjectType::Category);
        }
        if wire.item_data.is_some() {
            populated.push(ObjectType::Item);
        }
        if wire.item_variation_data.is_some() {
            populated.push(ObjectType::ItemVariation);
        }
        if wire.discount_data.is_some() {
            populated.push(ObjectType::Discount);
        }
        if wire.tax_data.is_some() {
            populated.push(ObjectType::Tax);
        }

        if let Some(&stray) = populated.iter().find(|&&t| t != object_type) {
            return Err(DecodeError::UnexpectedPayload {
                object_type,
                populated: stray,
            });
        }

        let missing = || DecodeError::MissingPayload { object_type };
        let data = match object_type {
            ObjectType::Category => ObjectData::Category(wire.category_data.ok_or_else(missing)?),
            ObjectType::Item => ObjectData::Item(wire.item_data.ok_or_else(missing)?),
            ObjectType::ItemVariation => {
                ObjectData::ItemVariation(wire.item_variation_data.ok_or_else(missing)?)
            }
            ObjectType::Discount => ObjectData::Discount(wire.discount_data.ok_or_else(missing)?),
            ObjectType::Tax => ObjectData::Tax(wire.tax_data.ok_or_else(missing)?),
        };

        Ok(CatalogObject {
            id: wire.id,
            version: wire.version,
            updated_at: wire.updated_at,
            is_deleted: wire.is_deleted,
            data,
        })
    }
}

// =============================================================================
// Wire Object
// =============================================================================

/// The raw wire envelope: a type string plus one-of-many optional payloads.
///
/// Only used at the serialization boundary; see [`CatalogObject::from_wire`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireObject {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_data: Option<CategoryData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_data: Option<ItemData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_variation_data: Option<ItemVariationData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_data: Option<DiscountData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_data: Option<TaxData>,
}

impl TryFrom<WireObject> for CatalogObject {
    type Error = DecodeError;

    fn try_from(wire: WireObject) -> Result<Self, Self::Error> {
        CatalogObject::from_wire(wire)
    }
}

impl From<CatalogObject> for WireObject {
    fn from(object: CatalogObject) -> Self {
        let mut wire = WireObject {
            object_type: object.object_type().as_str().to_string(),
            id: object.id,
            version: object.version,
            updated_at: object.updated_at,
            is_deleted: object.is_deleted,
            ..WireObject::default()
        };
        match object.data {
            ObjectData::Category(data) => wire.category_data = Some(data),
            ObjectData::Item(data) => wire.item_data = Some(data),
            ObjectData::ItemVariation(data) => wire.item_variation_data = Some(data),
            ObjectData::Discount(data) => wire.discount_data = Some(data),
            ObjectData::Tax(data) => wire.tax_data = Some(data),
        }
        wire
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_type_wire_names() {
        for t in ObjectType::ALL {
            let json = serde_json::to_value(t).unwrap();
            assert_eq!(json, json!(t.as_str()));
            assert_eq!(t.as_str().parse::<ObjectType>().unwrap(), t);
        }
        assert!(matches!(
            "CATAGORY".parse::<ObjectType>(),
            Err(DecodeError::UnknownType(_))
        ));
    }

    #[test]
    fn test_serialize_populates_only_matching_payload() {
        let object = CatalogObject::new(
            "#tmp",
            None,
            ObjectData::Category(CategoryData {
                name: Some("Beverages".into()),
            }),
        );

        let json = serde_json::to_value(&object).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "CATEGORY",
                "id": "#tmp",
                "category_data": { "name": "Beverages" }
            })
        );
    }

    #[test]
    fn test_parse_rejects_mismatched_payload() {
        let json = json!({
            "type": "ITEM",
            "id": "ITEM_1",
            "version": 3,
            "category_data": { "name": "Beverages" }
        });
        let wire: WireObject = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(
            CatalogObject::from_wire(wire),
            Err(DecodeError::UnexpectedPayload {
                object_type: ObjectType::Item,
                populated: ObjectType::Category,
            })
        );

        // The same check runs when deserializing straight into CatalogObject
        assert!(serde_json::from_value::<CatalogObject>(json).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_payload() {
        let wire = WireObject {
            object_type: "TAX".into(),
            id: "TAX_1".into(),
            ..WireObject::default()
        };
        assert_eq!(
            CatalogObject::from_wire(wire),
            Err(DecodeError::MissingPayload {
                object_type: ObjectType::Tax
            })
        );
    }

    #[test]
    fn test_parse_keeps_server_metadata() {
        let json = json!({
            "type": "CATEGORY",
            "id": "CAT_123",
            "version": 1,
            "updated_at": "2024-03-01T12:00:00Z",
            "is_deleted": false,
            "category_data": { "name": "Beverages" }
        });
        let object: CatalogObject = serde_json::from_value(json).unwrap();
        assert_eq!(object.id, "CAT_123");
        assert_eq!(object.version, Some(1));
        assert!(object.updated_at.is_some());
        assert_eq!(object.object_type(), ObjectType::Category);
    }
}
