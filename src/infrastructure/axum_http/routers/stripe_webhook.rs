use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde::Serialize;
use tracing::error;

use crate::application::usecases::stripe_gateway::StripeGateway;
use crate::application::usecases::stripe_webhook::{StripeWebhookError, StripeWebhookUseCase};
use crate::config::config_model::DotEnvyConfig;
use crate::domain::repositories::release_payments::ReleasePaymentRepository;
use crate::domain::repositories::subscriptions::SubscriptionRepository;
use crate::infrastructure::payments::stripe_client::StripeClient;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{
        release_payments::ReleasePaymentPostgres, subscriptions::SubscriptionPostgres,
    },
};

#[derive(Debug, Serialize)]
struct WebhookAck {
    received: bool,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let payment_repository = ReleasePaymentPostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let stripe_client = StripeClient::from_config(&config.stripe).map(Arc::new);

    let usecase = StripeWebhookUseCase::new(
        Arc::new(payment_repository),
        Arc::new(subscription_repository),
        stripe_client,
    );

    Router::new()
        .route("/webhook", post(handle_stripe_webhook))
        .with_state(Arc::new(usecase))
}

/// Raw-body endpoint: the signature covers the exact bytes Stripe sent, so
/// the payload must not pass through a JSON extractor first.
pub async fn handle_stripe_webhook<P, S, Stripe>(
    State(usecase): State<Arc<StripeWebhookUseCase<P, S, Stripe>>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse
where
    P: ReleasePaymentRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    match usecase.handle_event(&body, signature).await {
        Ok(()) => Json(WebhookAck { received: true }).into_response(),
        Err(err @ StripeWebhookError::InvalidSignature) => {
            (err.status_code(), "Webhook Error").into_response()
        }
        Err(err) => {
            // Generic 500: Stripe redelivers on its own retry schedule.
            error!(error = %err, "stripe_webhook: event handling failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
