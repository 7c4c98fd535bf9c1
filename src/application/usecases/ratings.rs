use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::entities::ratings::InsertRatingEntity;
use crate::domain::repositories::ratings::RatingRepository;
use crate::domain::value_objects::ratings::{
    BandRatingDto, MAX_SCORE, MIN_SCORE, RateBandModel, recompute_average,
};

#[derive(Debug, Error)]
pub enum RatingError {
    #[error("score must be between {MIN_SCORE} and {MAX_SCORE}")]
    InvalidScore,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RatingError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            RatingError::InvalidScore => StatusCode::BAD_REQUEST,
            RatingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, RatingError>;

pub struct RatingUseCase<R>
where
    R: RatingRepository + Send + Sync + 'static,
{
    rating_repo: Arc<R>,
}

impl<R> RatingUseCase<R>
where
    R: RatingRepository + Send + Sync + 'static,
{
    pub fn new(rating_repo: Arc<R>) -> Self {
        Self { rating_repo }
    }

    /// Upserts the caller's rating and returns the aggregate recomputed
    /// locally from the pre-write snapshot, the same adjustment a client
    /// would apply without re-querying every row.
    pub async fn rate_band(
        &self,
        user_id: Uuid,
        band_id: Uuid,
        model: RateBandModel,
    ) -> UseCaseResult<BandRatingDto> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&model.score) {
            let err = RatingError::InvalidScore;
            warn!(
                %user_id,
                %band_id,
                score = model.score,
                status = err.status_code().as_u16(),
                "ratings: out-of-range score rejected"
            );
            return Err(err);
        }

        let old_score = self
            .rating_repo
            .find_rating(band_id, user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %band_id,
                    db_error = ?err,
                    "ratings: failed to load existing rating"
                );
                RatingError::Internal(err)
            })?
            .map(|rating| rating.score);

        let aggregate = self
            .rating_repo
            .band_aggregate(band_id)
            .await
            .map_err(|err| {
                error!(
                    %band_id,
                    db_error = ?err,
                    "ratings: failed to load rating aggregate"
                );
                RatingError::Internal(err)
            })?;

        let now = Utc::now();
        self.rating_repo
            .upsert_rating(InsertRatingEntity {
                band_id,
                profile_id: user_id,
                score: model.score,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %band_id,
                    db_error = ?err,
                    "ratings: failed to upsert rating"
                );
                RatingError::Internal(err)
            })?;

        let previous_average = if aggregate.count > 0 {
            aggregate.total as f64 / aggregate.count as f64
        } else {
            0.0
        };
        let (average, count) =
            recompute_average(previous_average, aggregate.count, old_score, model.score);

        info!(
            %user_id,
            %band_id,
            score = model.score,
            count,
            "ratings: rating recorded"
        );

        Ok(BandRatingDto { average, count })
    }

    pub async fn band_rating(&self, band_id: Uuid) -> UseCaseResult<BandRatingDto> {
        let aggregate = self
            .rating_repo
            .band_aggregate(band_id)
            .await
            .map_err(|err| {
                error!(
                    %band_id,
                    db_error = ?err,
                    "ratings: failed to load rating aggregate"
                );
                RatingError::Internal(err)
            })?;

        let average = if aggregate.count > 0 {
            aggregate.total as f64 / aggregate.count as f64
        } else {
            0.0
        };

        Ok(BandRatingDto {
            average,
            count: aggregate.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ratings::RatingEntity;
    use crate::domain::repositories::ratings::{BandRatingAggregate, MockRatingRepository};
    use mockall::predicate::eq;

    fn rating(band_id: Uuid, profile_id: Uuid, score: i32) -> RatingEntity {
        let now = Utc::now();
        RatingEntity {
            id: Uuid::new_v4(),
            band_id,
            profile_id,
            score,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn rejects_out_of_range_scores() {
        let usecase = RatingUseCase::new(Arc::new(MockRatingRepository::new()));

        let err = usecase
            .rate_band(Uuid::new_v4(), Uuid::new_v4(), RateBandModel { score: 6 })
            .await
            .unwrap_err();

        assert!(matches!(err, RatingError::InvalidScore));
        assert_eq!(err.status_code().as_u16(), 400);
    }

    #[tokio::test]
    async fn first_rating_starts_the_aggregate() {
        let band_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let mut rating_repo = MockRatingRepository::new();
        rating_repo
            .expect_find_rating()
            .with(eq(band_id), eq(user_id))
            .returning(|_, _| Box::pin(async { Ok(None) }));
        rating_repo
            .expect_band_aggregate()
            .returning(|_| Box::pin(async { Ok(BandRatingAggregate::default()) }));
        rating_repo
            .expect_upsert_rating()
            .withf(|entity| entity.score == 4)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let usecase = RatingUseCase::new(Arc::new(rating_repo));

        let dto = usecase
            .rate_band(user_id, band_id, RateBandModel { score: 4 })
            .await
            .unwrap();

        assert_eq!(dto, BandRatingDto { average: 4.0, count: 1 });
    }

    #[tokio::test]
    async fn updated_rating_keeps_the_count() {
        let band_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let mut rating_repo = MockRatingRepository::new();
        rating_repo
            .expect_find_rating()
            .returning(|band_id, profile_id| {
                Box::pin(async move { Ok(Some(rating(band_id, profile_id, 3))) })
            });
        rating_repo
            .expect_band_aggregate()
            // scores {3, 5} before the update
            .returning(|_| Box::pin(async { Ok(BandRatingAggregate { count: 2, total: 8 }) }));
        rating_repo
            .expect_upsert_rating()
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let usecase = RatingUseCase::new(Arc::new(rating_repo));

        let dto = usecase
            .rate_band(user_id, band_id, RateBandModel { score: 5 })
            .await
            .unwrap();

        assert_eq!(dto, BandRatingDto { average: 5.0, count: 2 });
    }

    #[tokio::test]
    async fn band_rating_averages_the_stored_aggregate() {
        let band_id = Uuid::new_v4();

        let mut rating_repo = MockRatingRepository::new();
        rating_repo
            .expect_band_aggregate()
            .with(eq(band_id))
            .returning(|_| Box::pin(async { Ok(BandRatingAggregate { count: 4, total: 14 }) }));

        let usecase = RatingUseCase::new(Arc::new(rating_repo));

        let dto = usecase.band_rating(band_id).await.unwrap();
        assert_eq!(dto, BandRatingDto { average: 3.5, count: 4 });
    }

    #[tokio::test]
    async fn unrated_band_reports_an_empty_aggregate() {
        let mut rating_repo = MockRatingRepository::new();
        rating_repo
            .expect_band_aggregate()
            .returning(|_| Box::pin(async { Ok(BandRatingAggregate::default()) }));

        let usecase = RatingUseCase::new(Arc::new(rating_repo));

        let dto = usecase.band_rating(Uuid::new_v4()).await.unwrap();
        assert_eq!(dto, BandRatingDto { average: 0.0, count: 0 });
    }
}
