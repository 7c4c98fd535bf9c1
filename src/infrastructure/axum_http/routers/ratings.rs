use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::put,
};
use tracing::error;
use uuid::Uuid;

use crate::application::usecases::ratings::RatingUseCase;
use crate::domain::repositories::ratings::RatingRepository;
use crate::domain::value_objects::ratings::RateBandModel;
use crate::infrastructure::axum_http::{auth::AuthUser, error_responses};
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, repositories::ratings::RatingPostgres,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let rating_repository = RatingPostgres::new(Arc::clone(&db_pool));
    let usecase = RatingUseCase::new(Arc::new(rating_repository));

    Router::new()
        .route("/:band_id/rating", put(rate_band).get(band_rating))
        .with_state(Arc::new(usecase))
}

pub async fn rate_band<R>(
    State(usecase): State<Arc<RatingUseCase<R>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(band_id): Path<Uuid>,
    Json(model): Json<RateBandModel>,
) -> impl IntoResponse
where
    R: RatingRepository + Send + Sync + 'static,
{
    match usecase.rate_band(user_id, band_id, model).await {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => {
            error!(%user_id, %band_id, error = %err, "ratings: rate band failed");
            error_responses::usecase_error(err.status_code(), err.to_string(), None)
        }
    }
}

pub async fn band_rating<R>(
    State(usecase): State<Arc<RatingUseCase<R>>>,
    Path(band_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RatingRepository + Send + Sync + 'static,
{
    match usecase.band_rating(band_id).await {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => {
            error!(%band_id, error = %err, "ratings: band rating failed");
            error_responses::usecase_error(err.status_code(), err.to_string(), None)
        }
    }
}
