use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use tracing::{error, info};

use crate::domain::repositories::storage::DemoStorageClient;
use crate::domain::value_objects::storage::UploadedObjectDto;
use crate::infrastructure::axum_http::{auth::AuthUser, error_responses};

pub fn routes<C>(storage_client: Arc<C>) -> Router
where
    C: DemoStorageClient + Send + Sync + 'static,
{
    Router::new()
        .route("/api/storage-upload", post(storage_upload))
        .with_state(storage_client)
}

/// Multipart fields: `file` (the demo bytes), `path` (object key), `bucket`.
pub async fn storage_upload<C>(
    State(storage_client): State<Arc<C>>,
    AuthUser { user_id, .. }: AuthUser,
    mut multipart: Multipart,
) -> impl IntoResponse
where
    C: DemoStorageClient + Send + Sync + 'static,
{
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_content_type: Option<String> = None;
    let mut path: Option<String> = None;
    let mut bucket: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                return error_responses::usecase_error(
                    StatusCode::BAD_REQUEST,
                    format!("invalid multipart body: {err}"),
                    None,
                );
            }
        };

        match field.name() {
            Some("file") => {
                file_content_type = field.content_type().map(|value| value.to_string());
                match field.bytes().await {
                    Ok(bytes) => file_bytes = Some(bytes.to_vec()),
                    Err(err) => {
                        return error_responses::usecase_error(
                            StatusCode::BAD_REQUEST,
                            format!("failed to read file field: {err}"),
                            None,
                        );
                    }
                }
            }
            Some("path") => match field.text().await {
                Ok(text) => path = Some(text),
                Err(err) => {
                    return error_responses::usecase_error(
                        StatusCode::BAD_REQUEST,
                        format!("failed to read path field: {err}"),
                        None,
                    );
                }
            },
            Some("bucket") => match field.text().await {
                Ok(text) => bucket = Some(text),
                Err(err) => {
                    return error_responses::usecase_error(
                        StatusCode::BAD_REQUEST,
                        format!("failed to read bucket field: {err}"),
                        None,
                    );
                }
            },
            _ => {}
        }
    }

    let Some(file_bytes) = file_bytes else {
        return error_responses::usecase_error(
            StatusCode::BAD_REQUEST,
            "file field is required".to_string(),
            None,
        );
    };
    let Some(path) = path.filter(|path| !path.trim().is_empty()) else {
        return error_responses::usecase_error(
            StatusCode::BAD_REQUEST,
            "path field is required".to_string(),
            None,
        );
    };
    let Some(bucket) = bucket.filter(|bucket| !bucket.trim().is_empty()) else {
        return error_responses::usecase_error(
            StatusCode::BAD_REQUEST,
            "bucket field is required".to_string(),
            None,
        );
    };

    let content_type = file_content_type.unwrap_or_else(|| {
        mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string()
    });

    info!(
        %user_id,
        bucket,
        path,
        size_bytes = file_bytes.len(),
        "storage_upload: upload received"
    );

    match storage_client
        .upload_object(bucket, path.clone(), file_bytes, content_type)
        .await
    {
        Ok(stored_path) => Json(UploadedObjectDto { path: stored_path }).into_response(),
        Err(err) => {
            error!(%user_id, path, error = ?err, "storage_upload: upload failed");
            error_responses::usecase_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to upload file".to_string(),
                None,
            )
        }
    }
}
