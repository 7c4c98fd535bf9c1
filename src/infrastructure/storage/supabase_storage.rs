use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    error::{ProvideErrorMetadata, SdkError},
    operation::put_object::PutObjectError,
    primitives::ByteStream,
};
use tracing::info;

use crate::config::config_model::SupabaseStorage;
use crate::domain::repositories::storage::DemoStorageClient;

use super::s3::{S3Config, build_s3_client};

/// Supabase Storage S3-compatible API reference:
/// https://supabase.com/docs/guides/storage/s3/compatibility
pub struct SupabaseStorageClient {
    client: aws_sdk_s3::Client,
}

impl SupabaseStorageClient {
    pub async fn new(config: &SupabaseStorage) -> Result<Self> {
        let client = build_s3_client(&S3Config::new(
            config.endpoint.clone(),
            config.region.clone(),
            config.access_key.clone(),
            config.secret_key.clone(),
        ))
        .await
        .context("failed to build Supabase s3 client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DemoStorageClient for SupabaseStorageClient {
    async fn upload_object(
        &self,
        bucket: String,
        object_key: String,
        bytes: Vec<u8>,
        content_type: String,
    ) -> Result<String> {
        let size = bytes.len();
        let body = ByteStream::from(bytes);

        self.client
            .put_object()
            .bucket(&bucket)
            .key(&object_key)
            .content_type(&content_type)
            .body(body)
            .send()
            .await
            .map_err(|err| map_put_object_error(err, &bucket, &object_key))?;

        info!(
            bucket,
            object_key,
            size_bytes = size,
            "storage: object uploaded"
        );

        Ok(object_key)
    }
}

fn map_put_object_error(
    err: SdkError<PutObjectError>,
    bucket: &str,
    object_key: &str,
) -> anyhow::Error {
    let code = err.code().map(|code| code.to_string());
    let message = err.message().map(|message| message.to_string());

    anyhow::anyhow!(
        "put_object failed for {}/{}: code={:?} message={:?}: {}",
        bucket,
        object_key,
        code,
        message,
        err
    )
}
