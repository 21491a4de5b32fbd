use anyhow::Result;
use async_trait::async_trait;
use diesel::{Connection, RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use tokio::task;

use crate::{
    domain::{
        entities::deliveries::{DeliveryEntity, InsertDeliveryEntity},
        repositories::deliveries::DeliveryRepository,
    },
    infra::db::postgres::{postgres_connection::PgPool, schema::deliveries},
};

pub struct DeliveryPostgres {
    db_pool: Arc<PgPool>,
}

impl DeliveryPostgres {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl DeliveryRepository for DeliveryPostgres {
    async fn insert(&self, delivery: InsertDeliveryEntity) -> Result<DeliveryEntity> {
        // Diesel is synchronous; keep DB work off the async worker threads.
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<DeliveryEntity> {
            let mut conn = db_pool.get()?;

            let inserted = conn.transaction(|conn| {
                insert_into(deliveries::table)
                    .values(&delivery)
                    .returning(DeliveryEntity::as_returning())
                    .get_result::<DeliveryEntity>(conn)
            })?;

            Ok(inserted)
        })
        .await?
    }

    async fn list_all(&self) -> Result<Vec<DeliveryEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<DeliveryEntity>> {
            let mut conn = db_pool.get()?;

            let rows = deliveries::table
                .select(DeliveryEntity::as_select())
                .order(deliveries::id.asc())
                .load::<DeliveryEntity>(&mut conn)?;

            Ok(rows)
        })
        .await?
    }
}
