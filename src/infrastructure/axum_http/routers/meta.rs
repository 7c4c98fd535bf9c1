use std::sync::Arc;

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use serde::Serialize;

use crate::config::config_model::DotEnvyConfig;

#[derive(Debug, Serialize)]
struct InviteRequiredDto {
    required: bool,
}

pub fn routes(config: Arc<DotEnvyConfig>) -> Router {
    Router::new()
        .route("/api/invite-required", get(invite_required))
        .with_state(config)
}

pub async fn invite_required(State(config): State<Arc<DotEnvyConfig>>) -> impl IntoResponse {
    Json(InviteRequiredDto {
        required: config.features.invite_required,
    })
}
