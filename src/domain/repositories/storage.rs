use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

#[async_trait]
#[automock]
pub trait DemoStorageClient {
    /// Uploads one object and returns the stored path.
    async fn upload_object(
        &self,
        bucket: String,
        object_key: String,
        bytes: Vec<u8>,
        content_type: String,
    ) -> Result<String>;
}
