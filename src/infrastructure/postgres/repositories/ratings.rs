use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::{count_star, sum};
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::ratings::{InsertRatingEntity, RatingEntity};
use crate::domain::repositories::ratings::{BandRatingAggregate, RatingRepository};
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::ratings};

pub struct RatingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl RatingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl RatingRepository for RatingPostgres {
    async fn find_rating(&self, band_id: Uuid, profile_id: Uuid) -> Result<Option<RatingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rating = ratings::table
            .filter(ratings::band_id.eq(band_id))
            .filter(ratings::profile_id.eq(profile_id))
            .select(RatingEntity::as_select())
            .first::<RatingEntity>(&mut conn)
            .optional()?;

        Ok(rating)
    }

    async fn upsert_rating(&self, entity: InsertRatingEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rating_id = insert_into(ratings::table)
            .values(&entity)
            .on_conflict((ratings::band_id, ratings::profile_id))
            .do_update()
            .set((
                ratings::score.eq(entity.score),
                ratings::updated_at.eq(Utc::now()),
            ))
            .returning(ratings::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(rating_id)
    }

    async fn band_aggregate(&self, band_id: Uuid) -> Result<BandRatingAggregate> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let (count, total) = ratings::table
            .filter(ratings::band_id.eq(band_id))
            .select((count_star(), sum(ratings::score)))
            .first::<(i64, Option<i64>)>(&mut conn)?;

        Ok(BandRatingAggregate {
            count,
            total: total.unwrap_or(0),
        })
    }
}
