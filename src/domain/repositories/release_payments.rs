use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::release_payments::InsertReleasePaymentEntity;

#[async_trait]
#[automock]
pub trait ReleasePaymentRepository {
    /// Sum of `hosted_tracks_paid` across `paid` rows for (release, payer).
    async fn sum_paid_hosted_tracks(&self, release_id: Uuid, user_id: Uuid) -> Result<i64>;

    async fn insert_pending(&self, entity: InsertReleasePaymentEntity) -> Result<Uuid>;

    async fn attach_checkout_session(
        &self,
        payment_id: Uuid,
        checkout_session_id: String,
        payment_intent_id: Option<String>,
    ) -> Result<()>;

    /// Compare-and-swap to `paid`, constrained to rows still `pending`.
    /// Returns the number of rows moved (0 on duplicate webhook delivery).
    async fn mark_paid_if_pending(
        &self,
        payment_id: Uuid,
        payment_intent_id: Option<String>,
    ) -> Result<usize>;

    /// Compare-and-swap to `failed`, constrained to rows still `pending`.
    async fn mark_failed_if_pending(&self, payment_id: Uuid) -> Result<usize>;
}
