use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::deliveries::{DeliveryEntity, InsertDeliveryEntity};

#[async_trait]
#[automock]
pub trait DeliveryRepository {
    /// Persists a validated delivery and returns it with its storage-assigned id.
    async fn insert(&self, delivery: InsertDeliveryEntity) -> Result<DeliveryEntity>;
    async fn list_all(&self) -> Result<Vec<DeliveryEntity>>;
}
