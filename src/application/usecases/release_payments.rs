use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::usecases::stripe_gateway::StripeGateway;
use crate::config::config_model::DotEnvyConfig;
use crate::domain::entities::release_payments::InsertReleasePaymentEntity;
use crate::domain::repositories::band_memberships::BandMembershipRepository;
use crate::domain::repositories::release_payments::ReleasePaymentRepository;
use crate::domain::value_objects::enums::{
    membership_roles::MembershipRole, membership_statuses::MembershipStatus,
    payment_statuses::PaymentStatus,
};
use crate::domain::value_objects::release_payments::{
    CheckoutSessionDto, CreateCheckoutSessionModel,
};

#[derive(Debug, Error)]
pub enum ReleasePaymentError {
    #[error("hostedTrackCount must be a positive integer")]
    InvalidTrackCount,
    #[error("only the approved band leader can purchase hosted tracks")]
    NotBandLeader,
    #[error("billing is not configured")]
    BillingNotConfigured(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ReleasePaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ReleasePaymentError::InvalidTrackCount => StatusCode::BAD_REQUEST,
            ReleasePaymentError::NotBandLeader => StatusCode::FORBIDDEN,
            ReleasePaymentError::BillingNotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ReleasePaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ReleasePaymentError::BillingNotConfigured(hint) => Some(hint),
            _ => None,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ReleasePaymentError>;

#[derive(Debug, Clone)]
pub struct BillingSettings {
    pub hosted_track_price: i64,
    pub billing_disabled: bool,
    pub app_base_url: Option<String>,
}

impl BillingSettings {
    pub fn from_config(config: &DotEnvyConfig) -> Self {
        Self {
            hosted_track_price: config.billing.hosted_track_price,
            billing_disabled: config.billing.billing_disabled,
            app_base_url: config.stripe.app_base_url.clone(),
        }
    }
}

pub struct ReleasePaymentUseCase<M, P, Stripe>
where
    M: BandMembershipRepository + Send + Sync + 'static,
    P: ReleasePaymentRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    membership_repo: Arc<M>,
    payment_repo: Arc<P>,
    stripe_client: Option<Arc<Stripe>>,
    billing: BillingSettings,
}

impl<M, P, Stripe> ReleasePaymentUseCase<M, P, Stripe>
where
    M: BandMembershipRepository + Send + Sync + 'static,
    P: ReleasePaymentRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    pub fn new(
        membership_repo: Arc<M>,
        payment_repo: Arc<P>,
        stripe_client: Option<Arc<Stripe>>,
        billing: BillingSettings,
    ) -> Self {
        Self {
            membership_repo,
            payment_repo,
            stripe_client,
            billing,
        }
    }

    /// Computes the unbilled portion of hosted tracks for a release and
    /// starts a checkout for exactly that delta. Counts already covered by
    /// `paid` rows produce a zero-amount response and no provider call, so
    /// resubmitting the same count never double-charges.
    pub async fn create_checkout_session(
        &self,
        user_id: Uuid,
        model: CreateCheckoutSessionModel,
    ) -> UseCaseResult<CheckoutSessionDto> {
        info!(
            %user_id,
            release_id = %model.release_id,
            band_id = %model.band_id,
            hosted_track_count = model.hosted_track_count,
            "release_payments: checkout session requested"
        );

        if model.hosted_track_count <= 0 {
            let err = ReleasePaymentError::InvalidTrackCount;
            warn!(
                %user_id,
                release_id = %model.release_id,
                hosted_track_count = model.hosted_track_count,
                status = err.status_code().as_u16(),
                "release_payments: rejected non-positive track count"
            );
            return Err(err);
        }

        self.ensure_band_leader(model.band_id, user_id).await?;

        let already_paid = self
            .payment_repo
            .sum_paid_hosted_tracks(model.release_id, user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    release_id = %model.release_id,
                    db_error = ?err,
                    "release_payments: failed to sum paid hosted tracks"
                );
                ReleasePaymentError::Internal(err)
            })?;

        if self.billing.billing_disabled {
            info!(
                %user_id,
                release_id = %model.release_id,
                "release_payments: billing kill switch active, treating as fully paid"
            );
            return Ok(CheckoutSessionDto::fully_covered(already_paid));
        }

        let new_billable = (i64::from(model.hosted_track_count) - already_paid).max(0);
        if new_billable == 0 {
            info!(
                %user_id,
                release_id = %model.release_id,
                already_paid,
                "release_payments: count already covered, nothing to bill"
            );
            return Ok(CheckoutSessionDto::fully_covered(already_paid));
        }

        let stripe_client = self.stripe_client.as_ref().ok_or_else(|| {
            let err = ReleasePaymentError::BillingNotConfigured(
                "set STRIPE_SECRET_KEY and STRIPE_WEBHOOK_SECRET",
            );
            error!(
                %user_id,
                release_id = %model.release_id,
                status = err.status_code().as_u16(),
                "release_payments: stripe keys missing"
            );
            err
        })?;
        let app_base_url = self.billing.app_base_url.clone().ok_or_else(|| {
            let err = ReleasePaymentError::BillingNotConfigured("set APP_BASE_URL");
            error!(
                %user_id,
                release_id = %model.release_id,
                status = err.status_code().as_u16(),
                "release_payments: app base url missing"
            );
            err
        })?;

        let unit_amount_cents = self.billing.hosted_track_price * 100;
        let amount_cents = new_billable * unit_amount_cents;
        let now = Utc::now();

        let payment_id = self
            .payment_repo
            .insert_pending(InsertReleasePaymentEntity {
                release_id: model.release_id,
                band_id: model.band_id,
                user_id,
                hosted_tracks_paid: new_billable as i32,
                amount_cents,
                currency: "usd".to_string(),
                status: PaymentStatus::Pending.to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    release_id = %model.release_id,
                    db_error = ?err,
                    "release_payments: failed to insert pending payment"
                );
                ReleasePaymentError::Internal(err)
            })?;

        let metadata = HashMap::from([
            ("release_payment_id".to_string(), payment_id.to_string()),
            ("release_id".to_string(), model.release_id.to_string()),
            ("band_id".to_string(), model.band_id.to_string()),
            ("user_id".to_string(), user_id.to_string()),
        ]);

        let success_url = format!(
            "{}/releases/{}?payment=success",
            app_base_url.trim_end_matches('/'),
            model.release_id
        );
        let cancel_url = format!(
            "{}/releases/{}?payment=canceled",
            app_base_url.trim_end_matches('/'),
            model.release_id
        );

        info!(
            %user_id,
            %payment_id,
            new_billable,
            amount_cents,
            "release_payments: creating stripe checkout session"
        );

        let session = stripe_client
            .create_hosted_track_checkout(
                unit_amount_cents,
                new_billable,
                "Hosted track".to_string(),
                success_url,
                cancel_url,
                metadata,
            )
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %payment_id,
                    error = ?err,
                    "release_payments: stripe checkout session creation failed"
                );
                ReleasePaymentError::Internal(err)
            })?;

        self.payment_repo
            .attach_checkout_session(payment_id, session.id.clone(), session.payment_intent.clone())
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %payment_id,
                    checkout_session_id = %session.id,
                    db_error = ?err,
                    "release_payments: failed to attach checkout session ids"
                );
                ReleasePaymentError::Internal(err)
            })?;

        info!(
            %user_id,
            %payment_id,
            checkout_session_id = %session.id,
            "release_payments: checkout session created"
        );

        Ok(CheckoutSessionDto {
            checkout_url: Some(session.url),
            already_paid,
            new_billable,
            amount_cents,
        })
    }

    async fn ensure_band_leader(&self, band_id: Uuid, user_id: Uuid) -> UseCaseResult<()> {
        let membership = self
            .membership_repo
            .find_membership(band_id, user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %band_id,
                    db_error = ?err,
                    "release_payments: failed to load membership for authorization"
                );
                ReleasePaymentError::Internal(err)
            })?;

        let is_leader = membership.is_some_and(|membership| {
            MembershipRole::from_str(&membership.role) == Some(MembershipRole::Leader)
                && MembershipStatus::from_str(&membership.status)
                    == Some(MembershipStatus::Approved)
        });

        if !is_leader {
            let err = ReleasePaymentError::NotBandLeader;
            warn!(
                %user_id,
                %band_id,
                status = err.status_code().as_u16(),
                "release_payments: caller is not the approved band leader"
            );
            return Err(err);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::usecases::stripe_gateway::MockStripeGateway;
    use crate::domain::entities::band_members::BandMemberEntity;
    use crate::domain::repositories::band_memberships::MockBandMembershipRepository;
    use crate::domain::repositories::release_payments::MockReleasePaymentRepository;
    use crate::infrastructure::payments::stripe_client::CreatedCheckoutSession;
    use mockall::predicate::eq;

    fn settings() -> BillingSettings {
        BillingSettings {
            hosted_track_price: 5,
            billing_disabled: false,
            app_base_url: Some("https://themetalist.example".to_string()),
        }
    }

    fn leader_membership(band_id: Uuid, profile_id: Uuid) -> BandMemberEntity {
        let now = Utc::now();
        BandMemberEntity {
            id: Uuid::new_v4(),
            band_id,
            profile_id,
            name: "Varg".to_string(),
            instrument: "guitar".to_string(),
            role: "leader".to_string(),
            status: "approved".to_string(),
            display_order: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn member_membership(band_id: Uuid, profile_id: Uuid) -> BandMemberEntity {
        let mut membership = leader_membership(band_id, profile_id);
        membership.role = "member".to_string();
        membership
    }

    fn usecase(
        membership_repo: MockBandMembershipRepository,
        payment_repo: MockReleasePaymentRepository,
        stripe: Option<MockStripeGateway>,
        billing: BillingSettings,
    ) -> ReleasePaymentUseCase<
        MockBandMembershipRepository,
        MockReleasePaymentRepository,
        MockStripeGateway,
    > {
        ReleasePaymentUseCase::new(
            Arc::new(membership_repo),
            Arc::new(payment_repo),
            stripe.map(Arc::new),
            billing,
        )
    }

    #[tokio::test]
    async fn rejects_non_positive_track_count() {
        let usecase = usecase(
            MockBandMembershipRepository::new(),
            MockReleasePaymentRepository::new(),
            Some(MockStripeGateway::new()),
            settings(),
        );

        let result = usecase
            .create_checkout_session(
                Uuid::new_v4(),
                CreateCheckoutSessionModel {
                    release_id: Uuid::new_v4(),
                    band_id: Uuid::new_v4(),
                    hosted_track_count: 0,
                },
            )
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, ReleasePaymentError::InvalidTrackCount));
        assert_eq!(err.status_code().as_u16(), 400);
    }

    #[tokio::test]
    async fn non_leader_is_forbidden_and_nothing_is_inserted() {
        let band_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .with(eq(band_id), eq(user_id))
            .returning(move |band_id, profile_id| {
                Box::pin(async move { Ok(Some(member_membership(band_id, profile_id))) })
            });

        let usecase = usecase(
            membership_repo,
            MockReleasePaymentRepository::new(),
            Some(MockStripeGateway::new()),
            settings(),
        );

        let err = usecase
            .create_checkout_session(
                user_id,
                CreateCheckoutSessionModel {
                    release_id: Uuid::new_v4(),
                    band_id,
                    hosted_track_count: 5,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ReleasePaymentError::NotBandLeader));
        assert_eq!(err.status_code().as_u16(), 403);
    }

    #[tokio::test]
    async fn fully_covered_count_is_a_noop() {
        let band_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let release_id = Uuid::new_v4();

        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .returning(move |band_id, profile_id| {
                Box::pin(async move { Ok(Some(leader_membership(band_id, profile_id))) })
            });

        let mut payment_repo = MockReleasePaymentRepository::new();
        payment_repo
            .expect_sum_paid_hosted_tracks()
            .with(eq(release_id), eq(user_id))
            .returning(|_, _| Box::pin(async { Ok(5) }));

        let usecase = usecase(
            membership_repo,
            payment_repo,
            Some(MockStripeGateway::new()),
            settings(),
        );

        let dto = usecase
            .create_checkout_session(
                user_id,
                CreateCheckoutSessionModel {
                    release_id,
                    band_id,
                    hosted_track_count: 5,
                },
            )
            .await
            .unwrap();

        assert_eq!(dto, CheckoutSessionDto::fully_covered(5));
    }

    #[tokio::test]
    async fn bills_only_the_unpaid_delta() {
        let band_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let release_id = Uuid::new_v4();

        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .returning(move |band_id, profile_id| {
                Box::pin(async move { Ok(Some(leader_membership(band_id, profile_id))) })
            });

        let mut payment_repo = MockReleasePaymentRepository::new();
        payment_repo
            .expect_sum_paid_hosted_tracks()
            .returning(|_, _| Box::pin(async { Ok(2) }));
        payment_repo
            .expect_insert_pending()
            .withf(|entity| {
                entity.hosted_tracks_paid == 3
                    && entity.amount_cents == 1500
                    && entity.status == "pending"
                    && entity.currency == "usd"
            })
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));
        payment_repo
            .expect_attach_checkout_session()
            .withf(|_, session_id, payment_intent| {
                session_id.as_str() == "cs_test_1"
                    && payment_intent.as_deref() == Some("pi_test_1")
            })
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let mut stripe = MockStripeGateway::new();
        stripe
            .expect_create_hosted_track_checkout()
            .withf(|unit_amount, quantity, _, _, _, metadata| {
                *unit_amount == 500 && *quantity == 3 && metadata.contains_key("release_payment_id")
            })
            .returning(|_, _, _, _, _, _| {
                Ok(CreatedCheckoutSession {
                    id: "cs_test_1".to_string(),
                    url: "https://checkout.stripe.com/c/cs_test_1".to_string(),
                    payment_intent: Some("pi_test_1".to_string()),
                })
            });

        let usecase = usecase(membership_repo, payment_repo, Some(stripe), settings());

        let dto = usecase
            .create_checkout_session(
                user_id,
                CreateCheckoutSessionModel {
                    release_id,
                    band_id,
                    hosted_track_count: 5,
                },
            )
            .await
            .unwrap();

        assert_eq!(dto.already_paid, 2);
        assert_eq!(dto.new_billable, 3);
        assert_eq!(dto.amount_cents, 1500);
        assert_eq!(
            dto.checkout_url.as_deref(),
            Some("https://checkout.stripe.com/c/cs_test_1")
        );
    }

    #[tokio::test]
    async fn first_purchase_bills_the_full_count() {
        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .returning(move |band_id, profile_id| {
                Box::pin(async move { Ok(Some(leader_membership(band_id, profile_id))) })
            });

        let mut payment_repo = MockReleasePaymentRepository::new();
        payment_repo
            .expect_sum_paid_hosted_tracks()
            .returning(|_, _| Box::pin(async { Ok(0) }));
        payment_repo
            .expect_insert_pending()
            .withf(|entity| entity.hosted_tracks_paid == 5 && entity.amount_cents == 2500)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));
        payment_repo
            .expect_attach_checkout_session()
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let mut stripe = MockStripeGateway::new();
        stripe
            .expect_create_hosted_track_checkout()
            .returning(|_, _, _, _, _, _| {
                Ok(CreatedCheckoutSession {
                    id: "cs_test_2".to_string(),
                    url: "https://checkout.stripe.com/c/cs_test_2".to_string(),
                    payment_intent: None,
                })
            });

        let usecase = usecase(membership_repo, payment_repo, Some(stripe), settings());

        let dto = usecase
            .create_checkout_session(
                Uuid::new_v4(),
                CreateCheckoutSessionModel {
                    release_id: Uuid::new_v4(),
                    band_id: Uuid::new_v4(),
                    hosted_track_count: 5,
                },
            )
            .await
            .unwrap();

        assert_eq!(dto.already_paid, 0);
        assert_eq!(dto.new_billable, 5);
        assert_eq!(dto.amount_cents, 2500);
        assert!(dto.checkout_url.is_some());
    }

    #[tokio::test]
    async fn kill_switch_treats_every_request_as_fully_paid() {
        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .returning(move |band_id, profile_id| {
                Box::pin(async move { Ok(Some(leader_membership(band_id, profile_id))) })
            });

        let mut payment_repo = MockReleasePaymentRepository::new();
        payment_repo
            .expect_sum_paid_hosted_tracks()
            .returning(|_, _| Box::pin(async { Ok(0) }));

        let mut billing = settings();
        billing.billing_disabled = true;

        let usecase = usecase(
            membership_repo,
            payment_repo,
            Some(MockStripeGateway::new()),
            billing,
        );

        let dto = usecase
            .create_checkout_session(
                Uuid::new_v4(),
                CreateCheckoutSessionModel {
                    release_id: Uuid::new_v4(),
                    band_id: Uuid::new_v4(),
                    hosted_track_count: 12,
                },
            )
            .await
            .unwrap();

        assert_eq!(dto, CheckoutSessionDto::fully_covered(0));
    }

    #[tokio::test]
    async fn missing_stripe_config_is_a_configuration_error() {
        let mut membership_repo = MockBandMembershipRepository::new();
        membership_repo
            .expect_find_membership()
            .returning(move |band_id, profile_id| {
                Box::pin(async move { Ok(Some(leader_membership(band_id, profile_id))) })
            });

        let mut payment_repo = MockReleasePaymentRepository::new();
        payment_repo
            .expect_sum_paid_hosted_tracks()
            .returning(|_, _| Box::pin(async { Ok(0) }));

        let usecase = usecase(membership_repo, payment_repo, None, settings());

        let err = usecase
            .create_checkout_session(
                Uuid::new_v4(),
                CreateCheckoutSessionModel {
                    release_id: Uuid::new_v4(),
                    band_id: Uuid::new_v4(),
                    hosted_track_count: 3,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ReleasePaymentError::BillingNotConfigured(_)));
        assert_eq!(err.status_code().as_u16(), 500);
        assert!(err.hint().is_some());
    }
}
