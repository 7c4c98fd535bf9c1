use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::release_payments;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = release_payments)]
pub struct ReleasePaymentEntity {
    pub id: Uuid,
    pub release_id: Uuid,
    pub band_id: Uuid,
    pub user_id: Uuid,
    pub hosted_tracks_paid: i32,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub stripe_checkout_session_id: Option<String>,
    pub stripe_payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = release_payments)]
pub struct InsertReleasePaymentEntity {
    pub release_id: Uuid,
    pub band_id: Uuid,
    pub user_id: Uuid,
    pub hosted_tracks_paid: i32,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
