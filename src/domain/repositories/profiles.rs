use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

#[async_trait]
#[automock]
pub trait ProfileRepository {
    async fn find_email(&self, profile_id: Uuid) -> Result<Option<String>>;

    /// Deletes the profile row; band/membership/rating rows go with it via
    /// the store's cascade rules. Returns the number of rows deleted.
    async fn delete_profile(&self, profile_id: Uuid) -> Result<usize>;
}
