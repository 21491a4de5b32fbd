use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde::Deserialize;

use crate::domain::value_objects::delivery_errors::DeliveryError;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub const NANOS_PER_HOUR: i64 = 3_600 * NANOS_PER_SECOND;

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Timestamp as it arrives on the wire. Anything other than a string is kept
/// so it can be rejected as `InvalidFormat` for its field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimestampInput {
    Text(String),
    Other(serde_json::Value),
}

impl TimestampInput {
    pub fn as_text(&self, field: &str) -> Result<&str, DeliveryError> {
        match self {
            TimestampInput::Text(text) => Ok(text),
            TimestampInput::Other(_) => Err(DeliveryError::InvalidFormat(format!(
                "{field} must be an ISO-8601 string"
            ))),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, TimestampInput::Text(text) if text.trim().is_empty())
    }
}

impl From<&str> for TimestampInput {
    fn from(value: &str) -> Self {
        TimestampInput::Text(value.to_string())
    }
}

/// Bounds applied to every delivery shift before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftPolicy {
    /// Treat `end < start` as a shift that ran past midnight.
    pub allow_cross_day: bool,
    pub min_minutes: i64,
    pub max_hours: i64,
}

impl Default for ShiftPolicy {
    fn default() -> Self {
        Self {
            allow_cross_day: true,
            min_minutes: 1,
            max_hours: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedShift {
    pub start: DateTime<FixedOffset>,
    /// End instant after any cross-day adjustment.
    pub end: DateTime<FixedOffset>,
    pub duration: TimeDelta,
    pub crossed_midnight: bool,
}

impl ValidatedShift {
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }

    /// Exact elapsed hours.
    pub fn hours(&self) -> BigDecimal {
        elapsed_hours(self.duration)
    }

    /// Elapsed hours rounded to two places. Display only; never feed this back into cost math.
    pub fn display_hours(&self) -> BigDecimal {
        self.hours().with_scale_round(2, RoundingMode::HalfEven)
    }
}

/// Parses an ISO-8601 style timestamp into an offset-aware instant.
///
/// A trailing `Z` means UTC. Input without an offset is taken to be UTC, not
/// server local time, so two naive inputs always compare the same way
/// regardless of where the service runs. A bare date resolves to midnight UTC.
pub fn normalize_timestamp(
    field: &str,
    raw: &str,
) -> Result<DateTime<FixedOffset>, DeliveryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DeliveryError::InvalidFormat(format!(
            "{field} must be a non-empty string"
        )));
    }

    let candidate = match trimmed.strip_suffix('Z') {
        Some(stripped) => format!("{stripped}+00:00"),
        None => trimmed.to_string(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&candidate) {
        return Ok(parsed);
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(&candidate, format) {
            return Ok(parsed);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&candidate, format) {
            return Ok(parsed.and_utc().fixed_offset());
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(&candidate, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc().fixed_offset());
    }

    Err(DeliveryError::InvalidFormat(format!(
        "Invalid datetime format for {field}: {raw}"
    )))
}

/// Applies ordering, cross-day and bounds rules to a start/end pair.
///
/// When `end < start` and cross-day shifts are allowed, exactly 24 hours are
/// added to `end` (a `22:00 -> 02:00` shift becomes four hours). The upper
/// bound rejects a wrong date being accepted as a multi-day shift.
pub fn validate_shift(
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    policy: &ShiftPolicy,
) -> Result<ValidatedShift, DeliveryError> {
    let mut end = end;
    let mut crossed_midnight = false;

    if end < start {
        if !policy.allow_cross_day {
            return Err(DeliveryError::InvalidRange(
                "end_time must be after start_time".to_string(),
            ));
        }
        end = end.checked_add_signed(TimeDelta::days(1)).ok_or_else(|| {
            DeliveryError::InvalidRange("end_time is out of the supported range".to_string())
        })?;
        crossed_midnight = true;

        if end < start {
            return Err(DeliveryError::InvalidRange(
                "end_time must be after start_time".to_string(),
            ));
        }
    }

    let duration = end - start;

    if duration < TimeDelta::try_minutes(policy.min_minutes).unwrap_or(TimeDelta::MAX) {
        return Err(DeliveryError::InvalidRange(format!(
            "Duration must be at least {} minute(s)",
            policy.min_minutes
        )));
    }

    if duration > TimeDelta::try_hours(policy.max_hours).unwrap_or(TimeDelta::MAX) {
        return Err(DeliveryError::InvalidRange(format!(
            "Duration must be at most {} hours",
            policy.max_hours
        )));
    }

    Ok(ValidatedShift {
        start,
        end,
        duration,
        crossed_midnight,
    })
}

/// Elapsed nanoseconds as an exact decimal.
pub fn elapsed_nanos(duration: TimeDelta) -> BigDecimal {
    BigDecimal::from(duration.num_seconds()) * BigDecimal::from(NANOS_PER_SECOND)
        + BigDecimal::from(duration.subsec_nanos())
}

pub fn elapsed_hours(duration: TimeDelta) -> BigDecimal {
    elapsed_nanos(duration) / BigDecimal::from(NANOS_PER_HOUR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn at(raw: &str) -> DateTime<FixedOffset> {
        normalize_timestamp("start_time", raw).unwrap()
    }

    #[test]
    fn trailing_z_is_utc() {
        let parsed = at("2024-01-01T22:00:00Z");
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        assert_eq!(parsed, at("2024-01-01T22:00:00+00:00"));
    }

    #[test]
    fn naive_input_is_assumed_utc() {
        let naive = at("2024-01-01T22:00:00");
        assert_eq!(naive.offset().local_minus_utc(), 0);
        assert_eq!(naive, at("2024-01-01T22:00:00Z"));
    }

    #[test]
    fn explicit_offset_is_kept() {
        let parsed = at("2024-01-01T22:00:00+02:00");
        assert_eq!(parsed.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(parsed.with_timezone(&Utc), at("2024-01-01T20:00:00Z"));
    }

    #[test]
    fn minute_precision_and_fractions_parse() {
        assert_eq!(at("2024-01-01T22:00"), at("2024-01-01T22:00:00Z"));
        assert_eq!(at("2024-01-01 22:00:00"), at("2024-01-01T22:00:00Z"));

        let fractional = at("2024-01-01T22:00:00.250Z");
        assert_eq!(fractional.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        assert_eq!(at("2024-01-01"), at("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(at("  2024-01-01T22:00:00Z "), at("2024-01-01T22:00:00Z"));
    }

    #[test]
    fn empty_and_garbage_are_invalid_format() {
        for raw in ["", "   ", "not a date", "2024-13-01T00:00:00", "22:00"] {
            let err = normalize_timestamp("end_time", raw).unwrap_err();
            assert!(
                matches!(err, DeliveryError::InvalidFormat(_)),
                "{raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn ordered_shift_is_not_adjusted() {
        let start = at("2024-01-01T08:00:00Z");
        let end = at("2024-01-01T16:30:00Z");

        let shift = validate_shift(start, end, &ShiftPolicy::default()).unwrap();

        assert!(!shift.crossed_midnight);
        assert_eq!(shift.end, end);
        assert!(shift.end > shift.start);
        assert_eq!(shift.duration, TimeDelta::minutes(8 * 60 + 30));
        assert_eq!(shift.hours(), BigDecimal::from_str("8.5").unwrap());
    }

    #[test]
    fn midnight_shift_logged_on_wrong_day_adds_exactly_one_day() {
        let start = at("2024-01-01T22:00:00Z");
        let end = at("2024-01-01T02:00:00Z");

        let shift = validate_shift(start, end, &ShiftPolicy::default()).unwrap();

        assert!(shift.crossed_midnight);
        assert_eq!(shift.end, end + TimeDelta::hours(24));
        assert_eq!(shift.duration, TimeDelta::hours(4));
    }

    #[test]
    fn shift_spanning_midnight_with_correct_dates_is_four_hours() {
        let shift = validate_shift(
            at("2024-01-01T22:00:00Z"),
            at("2024-01-02T02:00:00Z"),
            &ShiftPolicy::default(),
        )
        .unwrap();

        assert!(!shift.crossed_midnight);
        assert_eq!(shift.hours(), BigDecimal::from(4));
        assert_eq!(shift.display_hours().to_string(), "4.00");
    }

    #[test]
    fn reversed_shift_rejected_without_cross_day() {
        let policy = ShiftPolicy {
            allow_cross_day: false,
            ..ShiftPolicy::default()
        };

        let err = validate_shift(
            at("2024-01-01T22:00:00Z"),
            at("2024-01-01T02:00:00Z"),
            &policy,
        )
        .unwrap_err();

        assert!(matches!(err, DeliveryError::InvalidRange(_)));
    }

    #[test]
    fn end_still_before_start_after_adjustment_is_rejected() {
        let err = validate_shift(
            at("2024-01-05T22:00:00Z"),
            at("2024-01-01T02:00:00Z"),
            &ShiftPolicy::default(),
        )
        .unwrap_err();

        assert!(matches!(err, DeliveryError::InvalidRange(_)));
    }

    #[test]
    fn thirty_seconds_is_below_minimum() {
        let err = validate_shift(
            at("2024-01-01T10:00:00Z"),
            at("2024-01-01T10:00:30Z"),
            &ShiftPolicy::default(),
        )
        .unwrap_err();

        assert!(matches!(err, DeliveryError::InvalidRange(_)));
    }

    #[test]
    fn identical_instants_are_below_minimum() {
        let instant = at("2024-01-01T10:00:00Z");
        let err = validate_shift(instant, instant, &ShiftPolicy::default()).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidRange(_)));
    }

    #[test]
    fn exactly_one_minute_and_exactly_max_hours_are_accepted() {
        let policy = ShiftPolicy::default();
        let start = at("2024-01-01T10:00:00Z");

        assert!(validate_shift(start, start + TimeDelta::minutes(1), &policy).is_ok());
        assert!(validate_shift(start, start + TimeDelta::hours(24), &policy).is_ok());
    }

    #[test]
    fn longer_than_max_hours_is_rejected() {
        let err = validate_shift(
            at("2024-01-01T10:00:00Z"),
            at("2024-01-02T10:00:01Z"),
            &ShiftPolicy::default(),
        )
        .unwrap_err();

        assert!(matches!(err, DeliveryError::InvalidRange(_)));
    }

    #[test]
    fn mixed_offsets_compare_as_instants() {
        // 23:00+02:00 is 21:00Z, so this is a two hour shift, not a reversed one.
        let shift = validate_shift(
            at("2024-01-01T23:00:00+02:00"),
            at("2024-01-01T23:00:00Z"),
            &ShiftPolicy::default(),
        )
        .unwrap();

        assert!(!shift.crossed_midnight);
        assert_eq!(shift.duration, TimeDelta::hours(2));
    }

    #[test]
    fn wrapping_past_the_last_representable_day_is_invalid_range() {
        let last_day = NaiveDate::MAX;
        let start = last_day.and_hms_opt(23, 30, 0).unwrap().and_utc().fixed_offset();
        let end = last_day.and_hms_opt(23, 0, 0).unwrap().and_utc().fixed_offset();

        let err = validate_shift(start, end, &ShiftPolicy::default()).unwrap_err();

        assert!(matches!(err, DeliveryError::InvalidRange(_)), "{err:?}");
    }

    #[test]
    fn out_of_range_policy_bounds_do_not_overflow() {
        let policy = ShiftPolicy {
            allow_cross_day: true,
            min_minutes: 1,
            max_hours: i64::MAX,
        };
        let start = at("2024-01-01T10:00:00Z");

        assert!(validate_shift(start, start + TimeDelta::days(400), &policy).is_ok());

        let policy = ShiftPolicy {
            min_minutes: i64::MAX,
            ..policy
        };
        let err = validate_shift(start, start + TimeDelta::hours(1), &policy).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidRange(_)));
    }

    #[test]
    fn non_string_timestamp_is_invalid_format() {
        let input: TimestampInput = serde_json::from_value(serde_json::json!(123)).unwrap();
        let err = input.as_text("start_time").unwrap_err();

        assert!(matches!(err, DeliveryError::InvalidFormat(_)));
        assert!(err.to_string().contains("start_time"));

        let input: TimestampInput =
            serde_json::from_value(serde_json::json!("2024-01-01T10:00:00Z")).unwrap();
        assert_eq!(input.as_text("start_time").unwrap(), "2024-01-01T10:00:00Z");
        assert!(!input.is_blank());
        assert!(TimestampInput::from("  ").is_blank());
    }

    #[test]
    fn display_hours_round_to_two_places() {
        let start = at("2024-01-01T10:00:00Z");
        let shift =
            validate_shift(start, start + TimeDelta::minutes(20), &ShiftPolicy::default()).unwrap();

        assert_eq!(shift.display_hours().to_string(), "0.33");
        assert!(shift.hours() > shift.display_hours());
    }
}
