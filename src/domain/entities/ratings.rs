use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::ratings;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = ratings)]
pub struct RatingEntity {
    pub id: Uuid,
    pub band_id: Uuid,
    pub profile_id: Uuid,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ratings)]
pub struct InsertRatingEntity {
    pub band_id: Uuid,
    pub profile_id: Uuid,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
