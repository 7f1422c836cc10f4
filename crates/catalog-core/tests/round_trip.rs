//! Property tests for the encode/decode round-trip law.
//!
//! Every valid entity survives encode → JSON → parse → decode unchanged.

use catalog_core::codec::{decode, encode, CatalogEntity};
use catalog_core::ids::new_temporary_id;
use catalog_core::{
    CatalogObject, Category, Discount, DiscountType, Item, ItemVariation, ModifyTaxBasis, Money,
    Percentage, PricingType, Tax, TaxCalculationPhase, TaxInclusionType,
};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9 '-]{0,40}").expect("Invalid regex")
}

fn object_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z]{3,4}_[0-9A-Z]{1,12}").expect("Invalid regex")
}

fn label_color_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::string::string_regex("[0-9a-f]{6}").expect("Invalid regex"))
}

fn money_strategy() -> impl Strategy<Value = Money> {
    (
        0i64..10_000_000,
        prop_oneof![Just("USD"), Just("EUR"), Just("JPY"), Just("CAD")],
    )
        .prop_map(|(amount, currency)| Money::new(amount, currency))
}

fn percentage_strategy() -> impl Strategy<Value = Percentage> {
    (0u32..=1_000_000).prop_map(|scaled| Percentage::from_scaled(scaled).expect("in range"))
}

fn category_strategy() -> impl Strategy<Value = Category> {
    name_strategy().prop_map(Category::new)
}

fn item_strategy() -> impl Strategy<Value = Item> {
    (
        name_strategy(),
        prop::option::of(prop::string::string_regex("[A-Za-z]{1,24}").expect("Invalid regex")),
        prop::option::of(prop::string::string_regex("[ -~]{0,80}").expect("Invalid regex")),
        prop::option::of(object_id_strategy()),
        label_color_strategy(),
        prop::collection::vec(object_id_strategy(), 0..4),
        any::<[bool; 4]>(),
    )
        .prop_map(
            |(name, abbreviation, description, category_id, label_color, tax_ids, flags)| Item {
                abbreviation,
                available_electronically: flags[0],
                available_online: flags[1],
                available_for_pickup: flags[2],
                category_id,
                description,
                label_color,
                name,
                skip_modifier_screen: flags[3],
                tax_ids,
            },
        )
}

fn variation_strategy() -> impl Strategy<Value = ItemVariation> {
    (
        object_id_strategy(),
        name_strategy(),
        prop::option::of(money_strategy()),
        prop::option::of(prop::string::string_regex("[A-Z0-9-]{1,16}").expect("Invalid regex")),
        prop::option::of(prop::string::string_regex("[0-9]{12}").expect("Invalid regex")),
    )
        .prop_map(|(item_id, name, price, sku, upc)| {
            let pricing_type = if price.is_some() {
                PricingType::Fixed
            } else {
                PricingType::Variable
            };
            ItemVariation {
                item_id,
                name,
                pricing_type,
                price,
                sku,
                upc,
            }
        })
}

fn discount_strategy() -> impl Strategy<Value = Discount> {
    let kind = prop_oneof![
        money_strategy().prop_map(|m| (DiscountType::FixedAmount, Some(m), None::<Percentage>)),
        percentage_strategy().prop_map(|p| (DiscountType::FixedPercentage, None::<Money>, Some(p))),
        prop::option::of(percentage_strategy())
            .prop_map(|p| (DiscountType::VariablePercentage, None::<Money>, p)),
    ];
    (
        name_strategy(),
        kind,
        label_color_strategy(),
        prop::option::of(prop_oneof![
            Just(ModifyTaxBasis::ModifyTaxBasis),
            Just(ModifyTaxBasis::DoNotModifyTaxBasis),
        ]),
        any::<bool>(),
    )
        .prop_map(
            |(name, (discount_type, amount, percentage), label_color, modify_tax_basis, pin)| {
                Discount {
                    name,
                    discount_type,
                    amount,
                    percentage,
                    label_color,
                    modify_tax_basis,
                    pin_required: pin,
                }
            },
        )
}

fn tax_strategy() -> impl Strategy<Value = Tax> {
    (
        name_strategy(),
        percentage_strategy(),
        prop_oneof![
            Just(TaxCalculationPhase::Subtotal),
            Just(TaxCalculationPhase::Total)
        ],
        prop_oneof![
            Just(TaxInclusionType::Additive),
            Just(TaxInclusionType::Inclusive)
        ],
        any::<(bool, bool)>(),
    )
        .prop_map(
            |(name, percentage, calculation_phase, inclusion_type, (enabled, custom))| Tax {
                name,
                percentage,
                calculation_phase,
                inclusion_type,
                enabled,
                applies_to_custom_amounts: custom,
            },
        )
}

// =============================================================================
// Round trip through the wire
// =============================================================================

fn round_trip<E: CatalogEntity>(entity: &E) -> E {
    let object = encode(new_temporary_id(), None, entity).expect("valid entity");
    let json = serde_json::to_string(&object).expect("serialize");
    let parsed: CatalogObject = serde_json::from_str(&json).expect("parse");
    decode(&parsed).expect("decode")
}

proptest! {
    #[test]
    fn prop_category_round_trip(category in category_strategy()) {
        prop_assert_eq!(round_trip(&category), category);
    }

    #[test]
    fn prop_item_round_trip(item in item_strategy()) {
        prop_assert_eq!(round_trip(&item), item);
    }

    #[test]
    fn prop_item_variation_round_trip(variation in variation_strategy()) {
        prop_assert_eq!(round_trip(&variation), variation);
    }

    #[test]
    fn prop_discount_round_trip(discount in discount_strategy()) {
        prop_assert_eq!(round_trip(&discount), discount);
    }

    #[test]
    fn prop_tax_round_trip(tax in tax_strategy()) {
        prop_assert_eq!(round_trip(&tax), tax);
    }

    #[test]
    fn prop_variable_variation_has_no_price_on_wire(
        item_id in object_id_strategy(),
        name in name_strategy(),
    ) {
        let variation = ItemVariation::variable(item_id, name);
        let object = encode(new_temporary_id(), None, &variation).expect("valid entity");
        let json = serde_json::to_value(&object).expect("serialize");
        prop_assert!(json["item_variation_data"].get("price_money").is_none());
    }
}
