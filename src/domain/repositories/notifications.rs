use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

/// Best-effort signals to a band's leader. Callers swallow failures; a lost
/// notification must never fail the request that produced it.
#[async_trait]
#[automock]
pub trait MembershipNotifier {
    async fn notify_join_request(
        &self,
        band_id: Uuid,
        requester_name: String,
        instruments: Vec<String>,
    ) -> Result<()>;
}
