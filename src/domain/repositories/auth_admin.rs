use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

#[async_trait]
#[automock]
pub trait AuthAdminGateway {
    /// Deletes the auth identity behind a profile (service-role operation).
    async fn delete_auth_user(&self, user_id: Uuid) -> Result<()>;
}
