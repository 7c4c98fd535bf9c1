use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::subscriptions::InsertSubscriptionEntity;
use crate::domain::repositories::subscriptions::SubscriptionRepository;
use crate::domain::value_objects::enums::subscription_statuses::SubscriptionStatus;
use crate::domain::value_objects::subscriptions::UpsertSubscriptionModel;
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::subscriptions};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn upsert_active_subscription(
        &self,
        user_id: Uuid,
        model: UpsertSubscriptionModel,
    ) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let entity = InsertSubscriptionEntity {
            user_id,
            stripe_customer_id: model.stripe_customer_id.clone(),
            stripe_subscription_id: model.stripe_subscription_id.clone(),
            status: SubscriptionStatus::Active.to_string(),
            current_period_end: None,
            created_at: now,
            updated_at: now,
        };

        let subscription_id = insert_into(subscriptions::table)
            .values(&entity)
            .on_conflict(subscriptions::user_id)
            .do_update()
            .set((
                subscriptions::stripe_customer_id.eq(model.stripe_customer_id),
                subscriptions::stripe_subscription_id.eq(model.stripe_subscription_id),
                subscriptions::status.eq(SubscriptionStatus::Active.to_string()),
                subscriptions::updated_at.eq(now),
            ))
            .returning(subscriptions::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(subscription_id)
    }
}
