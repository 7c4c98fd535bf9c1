use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::subscriptions::UpsertSubscriptionModel;

#[async_trait]
#[automock]
pub trait SubscriptionRepository {
    /// Upsert on user_id: checkout completion either creates the row or
    /// refreshes the provider references on an existing one.
    async fn upsert_active_subscription(
        &self,
        user_id: Uuid,
        model: UpsertSubscriptionModel,
    ) -> Result<Uuid>;
}
