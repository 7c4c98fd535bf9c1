use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::ratings::{InsertRatingEntity, RatingEntity};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandRatingAggregate {
    pub count: i64,
    pub total: i64,
}

#[async_trait]
#[automock]
pub trait RatingRepository {
    async fn find_rating(&self, band_id: Uuid, profile_id: Uuid) -> Result<Option<RatingEntity>>;

    async fn upsert_rating(&self, entity: InsertRatingEntity) -> Result<Uuid>;

    async fn band_aggregate(&self, band_id: Uuid) -> Result<BandRatingAggregate>;
}
