use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use tracing::error;

use crate::application::usecases::accounts::AccountUseCase;
use crate::config::config_model::DotEnvyConfig;
use crate::domain::repositories::auth_admin::AuthAdminGateway;
use crate::domain::repositories::profiles::ProfileRepository;
use crate::infrastructure::axum_http::{auth::AuthUser, error_responses};
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, repositories::profiles::ProfilePostgres,
};
use crate::infrastructure::supabase::admin_client::SupabaseAdminClient;

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let profile_repository = ProfilePostgres::new(Arc::clone(&db_pool));
    let auth_admin = SupabaseAdminClient::new(
        config.supabase.project_url.clone(),
        config.supabase.service_role_key.clone(),
    );

    let usecase = AccountUseCase::new(Arc::new(profile_repository), Arc::new(auth_admin));

    Router::new()
        .route("/delete", post(delete_account))
        .with_state(Arc::new(usecase))
}

pub async fn delete_account<P, A>(
    State(usecase): State<Arc<AccountUseCase<P, A>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    P: ProfileRepository + Send + Sync + 'static,
    A: AuthAdminGateway + Send + Sync + 'static,
{
    match usecase.delete_account(user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(%user_id, error = %err, "accounts: account deletion failed");
            error_responses::usecase_error(err.status_code(), err.to_string(), None)
        }
    }
}
