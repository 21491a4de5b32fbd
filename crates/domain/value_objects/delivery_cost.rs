use bigdecimal::{BigDecimal, RoundingMode, Zero};

use crate::domain::{
    entities::deliveries::DeliveryEntity,
    value_objects::shift_times::{NANOS_PER_HOUR, elapsed_nanos},
};

pub const COST_SCALE: i64 = 2;

/// Total pay cost of the given deliveries, rounded half-to-even to cents.
///
/// Each `elapsed_nanos * hourly_rate` term is an exact product, and the
/// division into hours happens once on the sum, so the only rounding is the
/// final one. An empty slice costs `0.00`.
pub fn total_cost(deliveries: &[DeliveryEntity]) -> BigDecimal {
    let rate_nanos = deliveries
        .iter()
        .map(|delivery| {
            elapsed_nanos(delivery.end_time - delivery.start_time) * &delivery.hourly_rate
        })
        .fold(BigDecimal::zero(), |sum, term| sum + term);

    let total = rate_nanos / BigDecimal::from(NANOS_PER_HOUR);
    total.with_scale_round(COST_SCALE, RoundingMode::HalfEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta, Utc};
    use std::str::FromStr;

    fn delivery(id: i32, minutes: i64, rate: &str) -> DeliveryEntity {
        let start = DateTime::parse_from_rfc3339("2024-03-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        DeliveryEntity {
            id,
            driver_id: 7,
            start_time: start,
            end_time: start + TimeDelta::minutes(minutes),
            hourly_rate: BigDecimal::from_str(rate).unwrap(),
        }
    }

    fn dec(raw: &str) -> BigDecimal {
        BigDecimal::from_str(raw).unwrap()
    }

    #[test]
    fn empty_total_is_zero() {
        assert_eq!(total_cost(&[]), dec("0.00"));
    }

    #[test]
    fn two_hours_at_ten_and_ninety_minutes_at_twenty() {
        let deliveries = [delivery(1, 120, "10.00"), delivery(2, 90, "20.00")];
        assert_eq!(total_cost(&deliveries), dec("50.00"));
    }

    #[test]
    fn order_does_not_change_total() {
        let mut deliveries = vec![
            delivery(1, 37, "13.37"),
            delivery(2, 61, "0.10"),
            delivery(3, 1439, "18.99"),
            delivery(4, 7, "42.42"),
        ];
        let forward = total_cost(&deliveries);

        deliveries.reverse();
        assert_eq!(total_cost(&deliveries), forward);

        deliveries.swap(0, 2);
        assert_eq!(total_cost(&deliveries), forward);
    }

    #[test]
    fn thirds_of_an_hour_do_not_drift() {
        // 20 minutes at 0.10/h is 0.0333.., three of them should cost exactly 0.10.
        let deliveries = [
            delivery(1, 20, "0.10"),
            delivery(2, 20, "0.10"),
            delivery(3, 20, "0.10"),
        ];
        assert_eq!(total_cost(&deliveries), dec("0.10"));
    }

    #[test]
    fn half_cent_rounds_to_even() {
        // 3 minutes at 0.10/h = 0.005 -> 0.00, 9 minutes at 0.10/h = 0.015 -> 0.02.
        assert_eq!(total_cost(&[delivery(1, 3, "0.10")]), dec("0.00"));
        assert_eq!(total_cost(&[delivery(1, 9, "0.10")]), dec("0.02"));
    }

    #[test]
    fn sub_second_precision_counts() {
        let mut half_hour_and_a_bit = delivery(1, 30, "36.00");
        half_hour_and_a_bit.end_time += TimeDelta::milliseconds(500);
        // 0.5h + 0.5s at 36/h = 18.005 -> 18.00 (half-even).
        assert_eq!(total_cost(&[half_hour_and_a_bit]), dec("18.00"));
    }
}
