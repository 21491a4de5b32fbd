use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use payroll_core::{
    domain::{
        repositories::deliveries::DeliveryRepository,
        value_objects::{deliveries::CreateDeliveryModel, shift_times::ShiftPolicy},
    },
    infra::db::{
        postgres::postgres_connection::PgPool, repositories::deliveries::DeliveryPostgres,
    },
};
use tracing::info;

use crate::{axum_http::error_responses::AppError, usecases::deliveries::DeliveriesUseCase};

pub fn routes(db_pool: Arc<PgPool>, shift_policy: ShiftPolicy) -> Router {
    let delivery_repository = DeliveryPostgres::new(Arc::clone(&db_pool));
    routes_with_repository(Arc::new(delivery_repository), shift_policy)
}

/// Builds the delivery routes over any repository; `routes` plugs in Postgres.
pub fn routes_with_repository<R>(
    delivery_repository: Arc<R>,
    shift_policy: ShiftPolicy,
) -> Router
where
    R: DeliveryRepository + Send + Sync + 'static,
{
    let usecase = DeliveriesUseCase::new(delivery_repository, shift_policy);

    Router::new()
        .route("/deliveries", get(list::<R>).post(create::<R>))
        .route("/total-cost", get(total_cost::<R>))
        .with_state(Arc::new(usecase))
}

pub async fn create<R>(
    State(usecase): State<Arc<DeliveriesUseCase<R>>>,
    payload: Result<Json<CreateDeliveryModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: DeliveryRepository + Send + Sync + 'static,
{
    let Json(model) = payload?;
    info!("deliveries: create request received");

    let created = usecase.create(model).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list<R>(
    State(usecase): State<Arc<DeliveriesUseCase<R>>>,
) -> Result<impl IntoResponse, AppError>
where
    R: DeliveryRepository + Send + Sync + 'static,
{
    let deliveries = usecase.list().await?;
    Ok(Json(deliveries))
}

pub async fn total_cost<R>(
    State(usecase): State<Arc<DeliveriesUseCase<R>>>,
) -> Result<impl IntoResponse, AppError>
where
    R: DeliveryRepository + Send + Sync + 'static,
{
    let total = usecase.total_cost().await?;
    Ok(Json(total))
}
