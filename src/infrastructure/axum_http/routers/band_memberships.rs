use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{error, warn};
use url::Url;
use uuid::Uuid;

use crate::application::usecases::band_memberships::BandMembershipUseCase;
use crate::config::config_model::DotEnvyConfig;
use crate::domain::repositories::band_memberships::BandMembershipRepository;
use crate::domain::repositories::notifications::MembershipNotifier;
use crate::domain::value_objects::band_memberships::{InviteMemberModel, JoinRequestModel};
use crate::infrastructure::axum_http::{
    auth::{AuthUser, OptionalAuthUser},
    error_responses,
};
use crate::infrastructure::notifications::webhook_notifier::WebhookMembershipNotifier;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, repositories::band_memberships::BandMembershipPostgres,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let membership_repository = BandMembershipPostgres::new(Arc::clone(&db_pool));

    let notifier = config
        .notifications
        .member_request_webhook_url
        .as_deref()
        .and_then(|raw| match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(err) => {
                warn!(error = %err, "band_memberships: MEMBER_REQUEST_WEBHOOK_URL is invalid");
                None
            }
        })
        .map(|url| Arc::new(WebhookMembershipNotifier::new(url)));

    let usecase = BandMembershipUseCase::new(Arc::new(membership_repository), notifier);

    Router::new()
        .route("/:band_id/join-requests", post(request_to_join))
        .route("/:band_id/invites", post(invite_member))
        .route(
            "/:band_id/join-requests/:membership_id/approve",
            post(approve_join_request),
        )
        .route(
            "/:band_id/join-requests/:membership_id/decline",
            post(decline_join_request),
        )
        .route("/:band_id/invitation/accept", post(accept_invitation))
        .route("/:band_id/invitation/decline", post(decline_invitation))
        .route("/:band_id/members", get(list_members))
        .route("/:band_id/membership", get(membership_status))
        .with_state(Arc::new(usecase))
}

pub async fn request_to_join<M, N>(
    State(usecase): State<Arc<BandMembershipUseCase<M, N>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(band_id): Path<Uuid>,
    Json(model): Json<JoinRequestModel>,
) -> impl IntoResponse
where
    M: BandMembershipRepository + Send + Sync + 'static,
    N: MembershipNotifier + Send + Sync + 'static,
{
    match usecase.request_to_join(user_id, band_id, model).await {
        Ok(membership_id) => (StatusCode::CREATED, membership_id.to_string()).into_response(),
        Err(err) => {
            error!(%user_id, %band_id, error = %err, "band_memberships: join request failed");
            error_responses::usecase_error(err.status_code(), err.to_string(), None)
        }
    }
}

pub async fn invite_member<M, N>(
    State(usecase): State<Arc<BandMembershipUseCase<M, N>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(band_id): Path<Uuid>,
    Json(model): Json<InviteMemberModel>,
) -> impl IntoResponse
where
    M: BandMembershipRepository + Send + Sync + 'static,
    N: MembershipNotifier + Send + Sync + 'static,
{
    match usecase.invite_member(user_id, band_id, model).await {
        Ok(membership_id) => (StatusCode::CREATED, membership_id.to_string()).into_response(),
        Err(err) => {
            error!(%user_id, %band_id, error = %err, "band_memberships: invite failed");
            error_responses::usecase_error(err.status_code(), err.to_string(), None)
        }
    }
}

pub async fn approve_join_request<M, N>(
    State(usecase): State<Arc<BandMembershipUseCase<M, N>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path((band_id, membership_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse
where
    M: BandMembershipRepository + Send + Sync + 'static,
    N: MembershipNotifier + Send + Sync + 'static,
{
    match usecase
        .approve_join_request(user_id, band_id, membership_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(%user_id, %band_id, %membership_id, error = %err, "band_memberships: approve failed");
            error_responses::usecase_error(err.status_code(), err.to_string(), None)
        }
    }
}

pub async fn decline_join_request<M, N>(
    State(usecase): State<Arc<BandMembershipUseCase<M, N>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path((band_id, membership_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse
where
    M: BandMembershipRepository + Send + Sync + 'static,
    N: MembershipNotifier + Send + Sync + 'static,
{
    match usecase
        .decline_join_request(user_id, band_id, membership_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(%user_id, %band_id, %membership_id, error = %err, "band_memberships: decline failed");
            error_responses::usecase_error(err.status_code(), err.to_string(), None)
        }
    }
}

pub async fn accept_invitation<M, N>(
    State(usecase): State<Arc<BandMembershipUseCase<M, N>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(band_id): Path<Uuid>,
) -> impl IntoResponse
where
    M: BandMembershipRepository + Send + Sync + 'static,
    N: MembershipNotifier + Send + Sync + 'static,
{
    match usecase.accept_invitation(user_id, band_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(%user_id, %band_id, error = %err, "band_memberships: accept invitation failed");
            error_responses::usecase_error(err.status_code(), err.to_string(), None)
        }
    }
}

pub async fn decline_invitation<M, N>(
    State(usecase): State<Arc<BandMembershipUseCase<M, N>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(band_id): Path<Uuid>,
) -> impl IntoResponse
where
    M: BandMembershipRepository + Send + Sync + 'static,
    N: MembershipNotifier + Send + Sync + 'static,
{
    match usecase.decline_invitation(user_id, band_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(%user_id, %band_id, error = %err, "band_memberships: decline invitation failed");
            error_responses::usecase_error(err.status_code(), err.to_string(), None)
        }
    }
}

pub async fn list_members<M, N>(
    State(usecase): State<Arc<BandMembershipUseCase<M, N>>>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(band_id): Path<Uuid>,
) -> impl IntoResponse
where
    M: BandMembershipRepository + Send + Sync + 'static,
    N: MembershipNotifier + Send + Sync + 'static,
{
    let viewer_id = viewer.map(|viewer| viewer.user_id);

    match usecase.list_members(band_id, viewer_id).await {
        Ok(members) => Json(members).into_response(),
        Err(err) => {
            error!(%band_id, error = %err, "band_memberships: list members failed");
            error_responses::usecase_error(err.status_code(), err.to_string(), None)
        }
    }
}

pub async fn membership_status<M, N>(
    State(usecase): State<Arc<BandMembershipUseCase<M, N>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(band_id): Path<Uuid>,
) -> impl IntoResponse
where
    M: BandMembershipRepository + Send + Sync + 'static,
    N: MembershipNotifier + Send + Sync + 'static,
{
    match usecase.membership_status(band_id, user_id).await {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => {
            error!(%user_id, %band_id, error = %err, "band_memberships: membership status failed");
            error_responses::usecase_error(err.status_code(), err.to_string(), None)
        }
    }
}
