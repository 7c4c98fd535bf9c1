use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::band_members;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = band_members)]
pub struct BandMemberEntity {
    pub id: Uuid,
    pub band_id: Uuid,
    pub profile_id: Uuid,
    pub name: String,
    pub instrument: String,
    pub role: String,
    pub status: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = band_members)]
pub struct InsertBandMemberEntity {
    pub band_id: Uuid,
    pub profile_id: Uuid,
    pub name: String,
    pub instrument: String,
    pub role: String,
    pub status: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
