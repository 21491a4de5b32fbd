use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, SecondsFormat, Utc};
use payroll_core::domain::{
    entities::deliveries::DeliveryEntity,
    repositories::deliveries::DeliveryRepository,
    value_objects::{
        deliveries::CreateDeliveryModel, delivery_cost::total_cost,
        delivery_errors::DeliveryError, shift_times::ShiftPolicy,
    },
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryDto {
    pub id: i32,
    pub driver_id: i32,
    pub start_time: String,
    pub end_time: String,
    pub hourly_rate: f64,
}

impl From<DeliveryEntity> for DeliveryDto {
    fn from(value: DeliveryEntity) -> Self {
        Self {
            id: value.id,
            driver_id: value.driver_id,
            start_time: iso_8601(value.start_time),
            end_time: iso_8601(value.end_time),
            hourly_rate: to_json_number(&value.hourly_rate),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedDeliveryDto {
    #[serde(flatten)]
    pub delivery: DeliveryDto,
    pub duration_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalCostDto {
    pub total_cost: f64,
}

pub struct DeliveriesUseCase<R>
where
    R: DeliveryRepository + Send + Sync + 'static,
{
    delivery_repository: Arc<R>,
    shift_policy: ShiftPolicy,
}

impl<R> DeliveriesUseCase<R>
where
    R: DeliveryRepository + Send + Sync + 'static,
{
    pub fn new(delivery_repository: Arc<R>, shift_policy: ShiftPolicy) -> Self {
        Self {
            delivery_repository,
            shift_policy,
        }
    }

    pub async fn create(
        &self,
        model: CreateDeliveryModel,
    ) -> Result<CreatedDeliveryDto, DeliveryError> {
        let validated = model.validate(&self.shift_policy).map_err(|err| {
            warn!(error = %err, "deliveries: rejected create request");
            err
        })?;

        let inserted = self
            .delivery_repository
            .insert(validated.to_insert_entity())
            .await
            .map_err(|err| {
                error!(
                    driver_id = validated.driver_id,
                    error = ?err,
                    "deliveries: failed to store delivery"
                );
                DeliveryError::Storage(err)
            })?;

        info!(
            delivery_id = inserted.id,
            driver_id = inserted.driver_id,
            crossed_midnight = validated.shift.crossed_midnight,
            "deliveries: delivery stored"
        );

        Ok(CreatedDeliveryDto {
            delivery: DeliveryDto::from(inserted),
            duration_hours: to_json_number(&validated.shift.display_hours()),
        })
    }

    pub async fn list(&self) -> Result<Vec<DeliveryDto>, DeliveryError> {
        let deliveries = self.delivery_repository.list_all().await.map_err(|err| {
            error!(error = ?err, "deliveries: failed to fetch deliveries");
            DeliveryError::Storage(err)
        })?;

        Ok(deliveries.into_iter().map(DeliveryDto::from).collect())
    }

    pub async fn total_cost(&self) -> Result<TotalCostDto, DeliveryError> {
        let deliveries = self.delivery_repository.list_all().await.map_err(|err| {
            error!(error = ?err, "deliveries: failed to calculate total cost");
            DeliveryError::Storage(err)
        })?;

        let total = total_cost(&deliveries);
        info!(
            deliveries = deliveries.len(),
            total_cost = %total,
            "deliveries: total cost calculated"
        );

        Ok(TotalCostDto {
            total_cost: to_json_number(&total),
        })
    }
}

fn iso_8601(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// JSON numbers are doubles; callers only do this at the response boundary.
fn to_json_number(amount: &BigDecimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}
