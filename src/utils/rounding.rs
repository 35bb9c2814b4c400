//! Fixed-scale rounding for weights and currency

use bigdecimal::{BigDecimal, RoundingMode};

/// Decimal places for every weight field (grams), the resolution of a
/// trade weighing scale
pub const WEIGHT_SCALE: i64 = 3;

/// Decimal places for every currency field
pub const CURRENCY_SCALE: i64 = 2;

/// Round a weight to 3 decimal places, half away from zero
pub fn round_weight(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(WEIGHT_SCALE, RoundingMode::HalfUp)
}

/// Round a currency amount to 2 decimal places, half away from zero
pub fn round_currency(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(CURRENCY_SCALE, RoundingMode::HalfUp)
}

/// Render a value with exactly `scale` decimal places, rounding half up.
///
/// `BigDecimal` drops the scale of a zero when displayed, so reports format
/// through this instead of `to_string`.
pub fn to_fixed(value: &BigDecimal, scale: i64) -> String {
    let (digits, exponent) = value
        .with_scale_round(scale, RoundingMode::HalfUp)
        .as_bigint_and_exponent();

    let mut digits = digits.to_string();
    let negative = digits.starts_with('-');
    if negative {
        digits.remove(0);
    }
    for _ in exponent..scale {
        digits.push('0');
    }
    while digits.len() <= scale as usize {
        digits.insert(0, '0');
    }

    let split = digits.len() - scale as usize;
    let (whole, fraction) = digits.split_at(split);
    match (negative, fraction.is_empty()) {
        (true, true) => format!("-{}", whole),
        (true, false) => format!("-{}.{}", whole, fraction),
        (false, true) => whole.to_string(),
        (false, false) => format!("{}.{}", whole, fraction),
    }
}

/// Display a weight with 3 decimal places
pub fn format_weight(value: &BigDecimal) -> String {
    to_fixed(value, WEIGHT_SCALE)
}

/// Display a currency amount with 2 decimal places
pub fn format_currency(value: &BigDecimal) -> String {
    to_fixed(value, CURRENCY_SCALE)
}

macro_rules! fixed_scale_serde {
    ($name:ident, $opt_name:ident, $scale:expr, $what:literal) => {
        #[doc = concat!("Serde adapter writing a ", $what, " as a fixed-scale string")]
        pub mod $name {
            use bigdecimal::BigDecimal;
            use serde::{Deserialize, Deserializer, Serializer};

            pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&super::to_fixed(value, $scale))
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
                BigDecimal::deserialize(deserializer)
            }
        }

        #[doc = concat!("Serde adapter for an optional ", $what)]
        pub mod $opt_name {
            use bigdecimal::BigDecimal;
            use serde::{Deserialize, Deserializer, Serializer};

            pub fn serialize<S: Serializer>(
                value: &Option<BigDecimal>,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                match value {
                    Some(value) => serializer.serialize_some(&super::to_fixed(value, $scale)),
                    None => serializer.serialize_none(),
                }
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Option<BigDecimal>, D::Error> {
                Option::<BigDecimal>::deserialize(deserializer)
            }
        }
    };
}

fixed_scale_serde!(weight_serde, opt_weight_serde, super::WEIGHT_SCALE, "weight");
fixed_scale_serde!(currency_serde, opt_currency_serde, super::CURRENCY_SCALE, "currency amount");
