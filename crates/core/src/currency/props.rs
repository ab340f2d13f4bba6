//! Property-based tests for currency rounding and formatting.
//!
//! - Rounding is idempotent
//! - Rounded values are whole multiples of the unit
//! - Rounding never moves a value by more than half a unit
//! - Formatting shows exactly the unit's digits

use proptest::prelude::*;
use rust_decimal::Decimal;

use invoicing_shared::types::CurrencyDescriptor;

use super::formatter::{FormatOptions, format_value};
use super::value::round_to_unit;

/// Strategy for amounts with up to 6 fractional digits (-10,000,000 to 10,000,000).
fn amount() -> impl Strategy<Value = Decimal> {
    (-10_000_000_000_000i64..10_000_000_000_000i64).prop_map(|v| Decimal::new(v, 6))
}

/// Strategy for rounding units seen in practice.
fn rounding_unit() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::new(1, 2)),
        Just(Decimal::new(5, 2)),
        Just(Decimal::new(1, 3)),
        Just(Decimal::ONE),
        Just(Decimal::new(25, 2)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* value and unit, rounding twice equals rounding once.
    #[test]
    fn prop_rounding_is_idempotent(value in amount(), unit in rounding_unit()) {
        let once = round_to_unit(value, unit);
        prop_assert_eq!(round_to_unit(once, unit), once);
    }

    /// *For any* value and unit, the rounded value is a multiple of the unit.
    #[test]
    fn prop_rounded_is_multiple_of_unit(value in amount(), unit in rounding_unit()) {
        let rounded = round_to_unit(value, unit);
        prop_assert_eq!(rounded % unit, Decimal::ZERO);
    }

    /// *For any* value and unit, rounding moves the value by at most half a unit.
    #[test]
    fn prop_rounding_error_is_bounded(value in amount(), unit in rounding_unit()) {
        let rounded = round_to_unit(value, unit);
        prop_assert!((rounded - value).abs() * Decimal::TWO <= unit);
    }

    /// *For any* value, euro output carries two fractional digits and a
    /// sign marker exactly when the value is negative.
    #[test]
    fn prop_format_shape(value in amount()) {
        let eur = CurrencyDescriptor::default_currency();
        let text = format_value(&eur, value, &FormatOptions::new());

        let digits = text
            .trim_start_matches(super::MINUS_SIGN)
            .trim_end_matches(" \u{20ac}");
        let fraction = digits.split_once('.').map(|(_, f)| f);
        prop_assert_eq!(fraction.map(str::len), Some(2));
        prop_assert_eq!(text.starts_with(super::MINUS_SIGN), value < Decimal::ZERO);
    }
}
