use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::config::{config_loader, stage::Stage};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Translates a usecase error into `{error}` / `{error, hint}` JSON.
/// Unhinted 500s are flattened to a generic message in production so
/// database detail never reaches clients; configuration errors keep their
/// actionable hint everywhere.
pub fn usecase_error(status: StatusCode, message: String, hint: Option<&str>) -> Response {
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR
        && hint.is_none()
        && config_loader::get_stage() == Stage::Production
    {
        "Internal server error".to_string()
    } else {
        message
    };

    let body = Json(ErrorBody {
        error: message,
        hint: hint.map(|hint| hint.to_string()),
    });

    (status, body).into_response()
}
