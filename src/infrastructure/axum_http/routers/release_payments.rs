use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::post,
};
use tracing::error;

use crate::application::usecases::release_payments::{BillingSettings, ReleasePaymentUseCase};
use crate::application::usecases::stripe_gateway::StripeGateway;
use crate::config::config_model::DotEnvyConfig;
use crate::domain::repositories::band_memberships::BandMembershipRepository;
use crate::domain::repositories::release_payments::ReleasePaymentRepository;
use crate::domain::value_objects::release_payments::CreateCheckoutSessionModel;
use crate::infrastructure::axum_http::{auth::AuthUser, error_responses};
use crate::infrastructure::payments::stripe_client::StripeClient;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{
        band_memberships::BandMembershipPostgres, release_payments::ReleasePaymentPostgres,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let membership_repository = BandMembershipPostgres::new(Arc::clone(&db_pool));
    let payment_repository = ReleasePaymentPostgres::new(Arc::clone(&db_pool));
    let stripe_client = StripeClient::from_config(&config.stripe).map(Arc::new);

    let usecase = ReleasePaymentUseCase::new(
        Arc::new(membership_repository),
        Arc::new(payment_repository),
        stripe_client,
        BillingSettings::from_config(&config),
    );

    Router::new()
        .route("/create-checkout-session", post(create_checkout_session))
        .with_state(Arc::new(usecase))
}

pub async fn create_checkout_session<M, P, S>(
    State(usecase): State<Arc<ReleasePaymentUseCase<M, P, S>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(model): Json<CreateCheckoutSessionModel>,
) -> impl IntoResponse
where
    M: BandMembershipRepository + Send + Sync + 'static,
    P: ReleasePaymentRepository + Send + Sync + 'static,
    S: StripeGateway + Send + Sync + 'static,
{
    match usecase.create_checkout_session(user_id, model).await {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => {
            error!(%user_id, error = %err, "release_payments: checkout session request failed");
            error_responses::usecase_error(err.status_code(), err.to_string(), err.hint())
        }
    }
}
