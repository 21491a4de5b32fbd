use bigdecimal::BigDecimal;
use serde::Deserialize;

use crate::domain::{
    entities::deliveries::InsertDeliveryEntity,
    value_objects::{
        delivery_errors::DeliveryError,
        hourly_rate::{RateInput, ensure_storable_rate, parse_rate},
        shift_times::{
            ShiftPolicy, TimestampInput, ValidatedShift, normalize_timestamp, validate_shift,
        },
    },
};

/// Driver id as it arrives on the wire: a JSON integer or an integer string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DriverIdInput {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl DriverIdInput {
    pub fn to_driver_id(&self) -> Result<i32, DeliveryError> {
        let parsed = match self {
            DriverIdInput::Number(number) => number.as_i64(),
            DriverIdInput::Text(text) => text.trim().parse::<i64>().ok(),
            DriverIdInput::Other(_) => None,
        };

        parsed
            .and_then(|value| i32::try_from(value).ok())
            .ok_or_else(|| DeliveryError::InvalidField("driver_id must be an integer".to_string()))
    }
}

/// Body of a create-delivery request. Every field is optional at the type
/// level and accepts any JSON value, so a missing or wrongly typed field is
/// reported by name rather than as a generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDeliveryModel {
    pub driver_id: Option<DriverIdInput>,
    pub start_time: Option<TimestampInput>,
    pub end_time: Option<TimestampInput>,
    pub hourly_rate: Option<RateInput>,
}

/// A delivery that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDelivery {
    pub driver_id: i32,
    pub shift: ValidatedShift,
    pub hourly_rate: BigDecimal,
}

impl ValidatedDelivery {
    pub fn to_insert_entity(&self) -> InsertDeliveryEntity {
        InsertDeliveryEntity {
            driver_id: self.driver_id,
            start_time: self.shift.start_utc(),
            end_time: self.shift.end_utc(),
            hourly_rate: self.hourly_rate.clone(),
        }
    }
}

impl CreateDeliveryModel {
    /// Validates the request: required fields, driver id, timestamps, shift
    /// bounds and rate, in that order. Nothing here touches storage.
    pub fn validate(&self, policy: &ShiftPolicy) -> Result<ValidatedDelivery, DeliveryError> {
        let driver_id = self
            .driver_id
            .as_ref()
            .ok_or(DeliveryError::MissingField("driver_id"))?;
        let start_time = required_timestamp(self.start_time.as_ref(), "start_time")?;
        let end_time = required_timestamp(self.end_time.as_ref(), "end_time")?;
        let hourly_rate = self
            .hourly_rate
            .as_ref()
            .ok_or(DeliveryError::MissingField("hourly_rate"))?;

        let driver_id = driver_id.to_driver_id()?;

        let start = normalize_timestamp("start_time", start_time.as_text("start_time")?)?;
        let end = normalize_timestamp("end_time", end_time.as_text("end_time")?)?;
        let shift = validate_shift(start, end, policy)?;

        let hourly_rate = parse_rate(hourly_rate)?;
        ensure_storable_rate(&hourly_rate)?;

        Ok(ValidatedDelivery {
            driver_id,
            shift,
            hourly_rate,
        })
    }
}

fn required_timestamp<'a>(
    value: Option<&'a TimestampInput>,
    field: &'static str,
) -> Result<&'a TimestampInput, DeliveryError> {
    match value {
        Some(input) if !input.is_blank() => Ok(input),
        _ => Err(DeliveryError::MissingField(field)),
    }
}
