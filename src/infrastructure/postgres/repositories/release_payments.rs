use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::sum;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::release_payments::InsertReleasePaymentEntity;
use crate::domain::repositories::release_payments::ReleasePaymentRepository;
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, schema::release_payments,
};

pub struct ReleasePaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ReleasePaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ReleasePaymentRepository for ReleasePaymentPostgres {
    async fn sum_paid_hosted_tracks(&self, release_id: Uuid, user_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = release_payments::table
            .filter(release_payments::release_id.eq(release_id))
            .filter(release_payments::user_id.eq(user_id))
            .filter(release_payments::status.eq(PaymentStatus::Paid.to_string()))
            .select(sum(release_payments::hosted_tracks_paid))
            .first::<Option<i64>>(&mut conn)?;

        Ok(total.unwrap_or(0))
    }

    async fn insert_pending(&self, entity: InsertReleasePaymentEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment_id = insert_into(release_payments::table)
            .values(&entity)
            .returning(release_payments::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(payment_id)
    }

    async fn attach_checkout_session(
        &self,
        payment_id: Uuid,
        checkout_session_id: String,
        payment_intent_id: Option<String>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(release_payments::table)
            .filter(release_payments::id.eq(payment_id))
            .set((
                release_payments::stripe_checkout_session_id.eq(Some(checkout_session_id)),
                release_payments::stripe_payment_intent_id.eq(payment_intent_id),
                release_payments::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn mark_paid_if_pending(
        &self,
        payment_id: Uuid,
        payment_intent_id: Option<String>,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let affected = match payment_intent_id {
            Some(payment_intent_id) => update(release_payments::table)
                .filter(release_payments::id.eq(payment_id))
                .filter(release_payments::status.eq(PaymentStatus::Pending.to_string()))
                .set((
                    release_payments::status.eq(PaymentStatus::Paid.to_string()),
                    release_payments::stripe_payment_intent_id.eq(Some(payment_intent_id)),
                    release_payments::updated_at.eq(now),
                ))
                .execute(&mut conn)?,
            None => update(release_payments::table)
                .filter(release_payments::id.eq(payment_id))
                .filter(release_payments::status.eq(PaymentStatus::Pending.to_string()))
                .set((
                    release_payments::status.eq(PaymentStatus::Paid.to_string()),
                    release_payments::updated_at.eq(now),
                ))
                .execute(&mut conn)?,
        };

        Ok(affected)
    }

    async fn mark_failed_if_pending(&self, payment_id: Uuid) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(release_payments::table)
            .filter(release_payments::id.eq(payment_id))
            .filter(release_payments::status.eq(PaymentStatus::Pending.to_string()))
            .set((
                release_payments::status.eq(PaymentStatus::Failed.to_string()),
                release_payments::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
