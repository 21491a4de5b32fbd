use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::deliveries;

/// A persisted delivery shift. Rows only enter the table through the validated
/// construction path, so `end_time > start_time` and `hourly_rate >= 0` hold.
#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = deliveries)]
pub struct DeliveryEntity {
    pub id: i32,
    pub driver_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub hourly_rate: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = deliveries)]
pub struct InsertDeliveryEntity {
    pub driver_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub hourly_rate: BigDecimal,
}
