use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::usecases::stripe_gateway::StripeGateway;
use crate::config::config_model::DotEnvyConfig;
use crate::domain::repositories::profiles::ProfileRepository;
use crate::domain::value_objects::subscriptions::CheckoutUrlDto;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("subscriptions are not configured")]
    NotConfigured(&'static str),
    #[error("user email is required")]
    MissingEmail,
    #[error("no billing account found for this user")]
    NoCustomer,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SubscriptionError::MissingEmail => StatusCode::BAD_REQUEST,
            SubscriptionError::NoCustomer => StatusCode::BAD_REQUEST,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            SubscriptionError::NotConfigured(hint) => Some(hint),
            SubscriptionError::MissingEmail => Some("add an email to your profile first"),
            SubscriptionError::NoCustomer => Some("subscribe first"),
            SubscriptionError::Internal(_) => None,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

#[derive(Debug, Clone)]
pub struct SubscribeSettings {
    pub price_id: Option<String>,
    pub app_base_url: Option<String>,
}

impl SubscribeSettings {
    pub fn from_config(config: &DotEnvyConfig) -> Self {
        Self {
            price_id: config.stripe.subscription_price_id.clone(),
            app_base_url: config.stripe.app_base_url.clone(),
        }
    }
}

pub struct SubscriptionUseCase<Prof, Stripe>
where
    Prof: ProfileRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    profile_repo: Arc<Prof>,
    stripe_client: Option<Arc<Stripe>>,
    settings: SubscribeSettings,
}

impl<Prof, Stripe> SubscriptionUseCase<Prof, Stripe>
where
    Prof: ProfileRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    pub fn new(
        profile_repo: Arc<Prof>,
        stripe_client: Option<Arc<Stripe>>,
        settings: SubscribeSettings,
    ) -> Self {
        Self {
            profile_repo,
            stripe_client,
            settings,
        }
    }

    pub async fn create_checkout_session(&self, user_id: Uuid) -> UseCaseResult<CheckoutUrlDto> {
        info!(%user_id, "subscriptions: checkout session requested");

        let stripe_client = self.require_stripe(user_id)?;
        let price_id = self.settings.price_id.clone().ok_or_else(|| {
            let err = SubscriptionError::NotConfigured("set STRIPE_SUBSCRIPTION_PRICE_ID");
            error!(
                %user_id,
                status = err.status_code().as_u16(),
                "subscriptions: subscription price id missing"
            );
            err
        })?;
        let app_base_url = self.require_app_base_url(user_id)?;

        let url = stripe_client
            .create_subscription_checkout(
                price_id,
                user_id.to_string(),
                format!("{}/subscribe?status=success", app_base_url),
                format!("{}/subscribe?status=canceled", app_base_url),
            )
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    error = ?err,
                    "subscriptions: stripe checkout session creation failed"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(%user_id, "subscriptions: checkout session created");
        Ok(CheckoutUrlDto { url })
    }

    /// Resolves the Stripe customer for the user by email, first match only,
    /// and opens a billing portal session for it.
    pub async fn create_portal_session(&self, user_id: Uuid) -> UseCaseResult<CheckoutUrlDto> {
        info!(%user_id, "subscriptions: portal session requested");

        let stripe_client = self.require_stripe(user_id)?;
        let app_base_url = self.require_app_base_url(user_id)?;

        let email = self
            .profile_repo
            .find_email(user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "subscriptions: failed to load profile email"
                );
                SubscriptionError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = SubscriptionError::MissingEmail;
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "subscriptions: profile has no email for portal lookup"
                );
                err
            })?;

        let customer_id = stripe_client
            .find_customer_by_email(email)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    error = ?err,
                    "subscriptions: stripe customer lookup failed"
                );
                SubscriptionError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = SubscriptionError::NoCustomer;
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "subscriptions: no stripe customer for user email"
                );
                err
            })?;

        let url = stripe_client
            .create_billing_portal_session(
                customer_id,
                format!("{}/account", app_base_url),
            )
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    error = ?err,
                    "subscriptions: stripe portal session creation failed"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(%user_id, "subscriptions: portal session created");
        Ok(CheckoutUrlDto { url })
    }

    fn require_stripe(&self, user_id: Uuid) -> UseCaseResult<&Arc<Stripe>> {
        self.stripe_client.as_ref().ok_or_else(|| {
            let err = SubscriptionError::NotConfigured(
                "set STRIPE_SECRET_KEY and STRIPE_WEBHOOK_SECRET",
            );
            error!(
                %user_id,
                status = err.status_code().as_u16(),
                "subscriptions: stripe keys missing"
            );
            err
        })
    }

    fn require_app_base_url(&self, user_id: Uuid) -> UseCaseResult<String> {
        self.settings
            .app_base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or_else(|| {
                let err = SubscriptionError::NotConfigured("set APP_BASE_URL");
                error!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "subscriptions: app base url missing"
                );
                err
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::usecases::stripe_gateway::MockStripeGateway;
    use crate::domain::repositories::profiles::MockProfileRepository;
    use mockall::predicate::eq;

    fn settings() -> SubscribeSettings {
        SubscribeSettings {
            price_id: Some("price_metalist_monthly".to_string()),
            app_base_url: Some("https://themetalist.example".to_string()),
        }
    }

    fn usecase(
        profile_repo: MockProfileRepository,
        stripe: Option<MockStripeGateway>,
        settings: SubscribeSettings,
    ) -> SubscriptionUseCase<MockProfileRepository, MockStripeGateway> {
        SubscriptionUseCase::new(Arc::new(profile_repo), stripe.map(Arc::new), settings)
    }

    #[tokio::test]
    async fn checkout_requires_a_configured_price() {
        let mut settings = settings();
        settings.price_id = None;

        let usecase = usecase(
            MockProfileRepository::new(),
            Some(MockStripeGateway::new()),
            settings,
        );

        let err = usecase
            .create_checkout_session(Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::NotConfigured(_)));
        assert_eq!(err.status_code().as_u16(), 500);
        assert!(err.hint().is_some());
    }

    #[tokio::test]
    async fn checkout_carries_the_user_reference() {
        let user_id = Uuid::new_v4();

        let mut stripe = MockStripeGateway::new();
        let expected_reference = user_id.to_string();
        stripe
            .expect_create_subscription_checkout()
            .withf(move |price_id, reference, _, _| {
                price_id.as_str() == "price_metalist_monthly" && *reference == expected_reference
            })
            .returning(|_, _, _, _| Ok("https://checkout.stripe.com/c/cs_sub_1".to_string()));

        let usecase = usecase(MockProfileRepository::new(), Some(stripe), settings());

        let dto = usecase.create_checkout_session(user_id).await.unwrap();
        assert_eq!(dto.url, "https://checkout.stripe.com/c/cs_sub_1");
    }

    #[tokio::test]
    async fn portal_requires_an_existing_customer() {
        let user_id = Uuid::new_v4();

        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_find_email()
            .with(eq(user_id))
            .returning(|_| Box::pin(async { Ok(Some("fan@example.com".to_string())) }));

        let mut stripe = MockStripeGateway::new();
        stripe
            .expect_find_customer_by_email()
            .with(eq("fan@example.com".to_string()))
            .returning(|_| Ok(None));

        let usecase = usecase(profile_repo, Some(stripe), settings());

        let err = usecase.create_portal_session(user_id).await.unwrap_err();

        assert!(matches!(err, SubscriptionError::NoCustomer));
        assert_eq!(err.status_code().as_u16(), 400);
        assert_eq!(err.hint(), Some("subscribe first"));
    }

    #[tokio::test]
    async fn portal_opens_for_the_first_matching_customer() {
        let user_id = Uuid::new_v4();

        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_find_email()
            .returning(|_| Box::pin(async { Ok(Some("fan@example.com".to_string())) }));

        let mut stripe = MockStripeGateway::new();
        stripe
            .expect_find_customer_by_email()
            .returning(|_| Ok(Some("cus_first".to_string())));
        stripe
            .expect_create_billing_portal_session()
            .withf(|customer_id, return_url| {
                customer_id.as_str() == "cus_first" && return_url.ends_with("/account")
            })
            .returning(|_, _| Ok("https://billing.stripe.com/p/session_1".to_string()));

        let usecase = usecase(profile_repo, Some(stripe), settings());

        let dto = usecase.create_portal_session(user_id).await.unwrap();
        assert_eq!(dto.url, "https://billing.stripe.com/p/session_1");
    }

    #[tokio::test]
    async fn portal_requires_a_profile_email() {
        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_find_email()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = usecase(profile_repo, Some(MockStripeGateway::new()), settings());

        let err = usecase
            .create_portal_session(Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::MissingEmail));
        assert_eq!(err.status_code().as_u16(), 400);
    }
}
