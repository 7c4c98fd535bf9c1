use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::post,
};
use tracing::error;

use crate::application::usecases::stripe_gateway::StripeGateway;
use crate::application::usecases::subscriptions::{SubscribeSettings, SubscriptionUseCase};
use crate::config::config_model::DotEnvyConfig;
use crate::domain::repositories::profiles::ProfileRepository;
use crate::infrastructure::axum_http::{auth::AuthUser, error_responses};
use crate::infrastructure::payments::stripe_client::StripeClient;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, repositories::profiles::ProfilePostgres,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let profile_repository = ProfilePostgres::new(Arc::clone(&db_pool));
    let stripe_client = StripeClient::from_config(&config.stripe).map(Arc::new);

    let usecase = SubscriptionUseCase::new(
        Arc::new(profile_repository),
        stripe_client,
        SubscribeSettings::from_config(&config),
    );

    Router::new()
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/create-portal-session", post(create_portal_session))
        .with_state(Arc::new(usecase))
}

pub async fn create_checkout_session<P, S>(
    State(usecase): State<Arc<SubscriptionUseCase<P, S>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    P: ProfileRepository + Send + Sync + 'static,
    S: StripeGateway + Send + Sync + 'static,
{
    match usecase.create_checkout_session(user_id).await {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => {
            error!(%user_id, error = %err, "subscriptions: checkout session request failed");
            error_responses::usecase_error(err.status_code(), err.to_string(), err.hint())
        }
    }
}

pub async fn create_portal_session<P, S>(
    State(usecase): State<Arc<SubscriptionUseCase<P, S>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    P: ProfileRepository + Send + Sync + 'static,
    S: StripeGateway + Send + Sync + 'static,
{
    match usecase.create_portal_session(user_id).await {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => {
            error!(%user_id, error = %err, "subscriptions: portal session request failed");
            error_responses::usecase_error(err.status_code(), err.to_string(), err.hint())
        }
    }
}
