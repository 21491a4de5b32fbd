use std::str::FromStr;

use bigdecimal::{BigDecimal, Signed};
use serde::Deserialize;

use crate::domain::value_objects::delivery_errors::DeliveryError;

/// Rates must stay below this to fit a `NUMERIC(10, 2)` column.
pub const HOURLY_RATE_CEILING: i64 = 100_000_000;
pub const HOURLY_RATE_SCALE: i64 = 2;

/// Rate as it arrives on the wire: a JSON number or a numeric string.
/// Any other JSON value lands in `Other` and is rejected by `parse_rate`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RateInput {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl From<&str> for RateInput {
    fn from(value: &str) -> Self {
        RateInput::Text(value.to_string())
    }
}

impl From<i64> for RateInput {
    fn from(value: i64) -> Self {
        RateInput::Number(value.into())
    }
}

/// Converts a rate into an exact decimal.
///
/// JSON numbers are converted from their shortest textual form, so `12.1`
/// becomes exactly `12.1` rather than the nearest binary double.
pub fn parse_rate(input: &RateInput) -> Result<BigDecimal, DeliveryError> {
    let text = match input {
        RateInput::Number(number) => number.to_string(),
        RateInput::Text(text) => text.trim().to_string(),
        RateInput::Other(_) => {
            return Err(DeliveryError::InvalidAmount(
                "hourly_rate must be a number or a numeric string".to_string(),
            ));
        }
    };

    if text.is_empty() {
        return Err(DeliveryError::InvalidAmount(
            "hourly_rate must be a number".to_string(),
        ));
    }

    BigDecimal::from_str(&text).map_err(|_| {
        DeliveryError::InvalidAmount(format!("hourly_rate is not a valid amount: {text}"))
    })
}

/// Checks a parsed rate can be stored: non-negative and representable as `NUMERIC(10, 2)`.
pub fn ensure_storable_rate(rate: &BigDecimal) -> Result<(), DeliveryError> {
    if rate.is_negative() {
        return Err(DeliveryError::InvalidAmount(
            "hourly_rate must be non-negative".to_string(),
        ));
    }

    let (_, scale) = rate.normalized().as_bigint_and_exponent();
    if scale > HOURLY_RATE_SCALE {
        return Err(DeliveryError::InvalidAmount(format!(
            "hourly_rate must have at most {HOURLY_RATE_SCALE} decimal places"
        )));
    }

    if *rate >= BigDecimal::from(HOURLY_RATE_CEILING) {
        return Err(DeliveryError::InvalidAmount(format!(
            "hourly_rate must be less than {HOURLY_RATE_CEILING}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_from_json(raw: &str) -> RateInput {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn number_and_string_forms_are_identical() {
        let from_number = parse_rate(&rate_from_json("12.5")).unwrap();
        let from_text = parse_rate(&rate_from_json("\"12.5\"")).unwrap();

        assert_eq!(from_number, from_text);
        assert_eq!(from_number, BigDecimal::from_str("12.5").unwrap());
    }

    #[test]
    fn float_input_does_not_pick_up_binary_noise() {
        let parsed = parse_rate(&rate_from_json("0.1")).unwrap();
        assert_eq!(parsed, BigDecimal::from_str("0.1").unwrap());

        let parsed = parse_rate(&rate_from_json("12.1")).unwrap();
        assert_eq!(parsed.to_string(), "12.1");
    }

    #[test]
    fn integer_input_parses() {
        assert_eq!(parse_rate(&RateInput::from(20)).unwrap(), BigDecimal::from(20));
        assert_eq!(parse_rate(&RateInput::from(" 20 ")).unwrap(), BigDecimal::from(20));
    }

    #[test]
    fn non_numeric_text_is_invalid_amount() {
        for raw in ["", "  ", "abc", "12.5.1", "NaN", "$12"] {
            let err = parse_rate(&RateInput::from(raw)).unwrap_err();
            assert!(
                matches!(err, DeliveryError::InvalidAmount(_)),
                "{raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn non_numeric_json_values_are_invalid_amount() {
        for raw in ["true", "[12]", "{\"amount\": 12}"] {
            let err = parse_rate(&rate_from_json(raw)).unwrap_err();
            assert!(
                matches!(err, DeliveryError::InvalidAmount(_)),
                "{raw} gave {err:?}"
            );
        }
    }

    #[test]
    fn negative_rate_is_rejected_by_storable_check() {
        let rate = parse_rate(&RateInput::from(-5)).unwrap();
        let err = ensure_storable_rate(&rate).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAmount(_)));
        assert_eq!(err.to_string(), "hourly_rate must be non-negative");
    }

    #[test]
    fn zero_and_cents_are_storable() {
        assert!(ensure_storable_rate(&BigDecimal::from(0)).is_ok());
        assert!(ensure_storable_rate(&BigDecimal::from_str("18.75").unwrap()).is_ok());
        assert!(ensure_storable_rate(&BigDecimal::from_str("18.750000").unwrap()).is_ok());
    }

    #[test]
    fn sub_cent_precision_is_rejected() {
        let err = ensure_storable_rate(&BigDecimal::from_str("12.345").unwrap()).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAmount(_)));
    }

    #[test]
    fn rate_beyond_column_precision_is_rejected() {
        let err = ensure_storable_rate(&BigDecimal::from_str("100000000").unwrap()).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAmount(_)));
    }
}
