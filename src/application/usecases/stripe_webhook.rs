use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::usecases::stripe_gateway::StripeGateway;
use crate::domain::repositories::release_payments::ReleasePaymentRepository;
use crate::domain::repositories::subscriptions::SubscriptionRepository;
use crate::domain::value_objects::subscriptions::UpsertSubscriptionModel;
use crate::infrastructure::payments::stripe_client::{StripeClient, StripeEvent};

#[derive(Debug, Error)]
pub enum StripeWebhookError {
    #[error("Webhook Error")]
    InvalidSignature,
    #[error("webhook endpoint is not configured")]
    NotConfigured,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl StripeWebhookError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            StripeWebhookError::InvalidSignature => StatusCode::BAD_REQUEST,
            StripeWebhookError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            StripeWebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, StripeWebhookError>;

/// Applies asynchronous Stripe state changes to payment rows, at most once
/// per logical event. Every transition is gated on `status = 'pending'`, so
/// redelivered or racing events find no pending row and no-op; errors are
/// surfaced as 500 so Stripe redelivers on its own schedule.
pub struct StripeWebhookUseCase<P, S, Stripe>
where
    P: ReleasePaymentRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    payment_repo: Arc<P>,
    subscription_repo: Arc<S>,
    stripe_client: Option<Arc<Stripe>>,
}

impl<P, S, Stripe> StripeWebhookUseCase<P, S, Stripe>
where
    P: ReleasePaymentRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    pub fn new(
        payment_repo: Arc<P>,
        subscription_repo: Arc<S>,
        stripe_client: Option<Arc<Stripe>>,
    ) -> Self {
        Self {
            payment_repo,
            subscription_repo,
            stripe_client,
        }
    }

    pub async fn handle_event(&self, payload: &[u8], signature: &str) -> UseCaseResult<()> {
        let stripe_client = self.stripe_client.as_ref().ok_or_else(|| {
            error!("stripe_webhook: webhook secret not configured");
            StripeWebhookError::NotConfigured
        })?;

        let event = stripe_client
            .verify_webhook_signature(payload, signature)
            .map_err(|err| {
                warn!(
                    error = %err,
                    status = StripeWebhookError::InvalidSignature.status_code().as_u16(),
                    "stripe_webhook: signature verification failed"
                );
                StripeWebhookError::InvalidSignature
            })?;

        let event_type = event.type_.clone();
        info!(event_type = %event_type, event_id = ?event.id, "stripe_webhook: event verified");

        match event_type.as_str() {
            "checkout.session.completed" => self.handle_checkout_completed(&event).await?,
            "checkout.session.expired" => {
                let payment_id = Self::payment_id_from_session_metadata(&event)?;
                self.resolve_as_failed(payment_id, "checkout.session.expired")
                    .await?;
            }
            "payment_intent.payment_failed" => {
                let payment_id = Self::payment_id_from_intent_metadata(&event)?;
                self.resolve_as_failed(payment_id, "payment_intent.payment_failed")
                    .await?;
            }
            _ => {
                debug!(event_type = %event_type, "stripe_webhook: unhandled event type ignored");
            }
        }

        Ok(())
    }

    async fn handle_checkout_completed(&self, event: &StripeEvent) -> UseCaseResult<()> {
        let session = StripeClient::extract_checkout_session(event).ok_or_else(|| {
            warn!("stripe_webhook: checkout session missing in completed event");
            StripeWebhookError::Internal(anyhow::anyhow!("missing checkout session object"))
        })?;

        match session.mode.as_deref() {
            Some("payment") => {
                let payment_id = Self::payment_id_from_session_metadata(event)?;
                let affected = self
                    .payment_repo
                    .mark_paid_if_pending(payment_id, session.payment_intent.clone())
                    .await
                    .map_err(|err| {
                        error!(
                            %payment_id,
                            db_error = ?err,
                            "stripe_webhook: failed to mark payment paid"
                        );
                        StripeWebhookError::Internal(err)
                    })?;

                if affected == 0 {
                    info!(
                        %payment_id,
                        "stripe_webhook: payment already resolved, duplicate delivery ignored"
                    );
                } else {
                    info!(%payment_id, "stripe_webhook: payment marked paid");
                }
            }
            Some("subscription") => {
                let user_id = session
                    .client_reference_id
                    .as_deref()
                    .and_then(|value| Uuid::parse_str(value).ok());

                let Some(user_id) = user_id else {
                    warn!(
                        session_id = ?session.id,
                        "stripe_webhook: subscription checkout without usable client_reference_id"
                    );
                    return Ok(());
                };

                self.subscription_repo
                    .upsert_active_subscription(
                        user_id,
                        UpsertSubscriptionModel {
                            stripe_customer_id: session.customer.clone(),
                            stripe_subscription_id: session.subscription.clone(),
                        },
                    )
                    .await
                    .map_err(|err| {
                        error!(
                            %user_id,
                            db_error = ?err,
                            "stripe_webhook: failed to upsert subscription"
                        );
                        StripeWebhookError::Internal(err)
                    })?;

                info!(%user_id, "stripe_webhook: subscription activated");
            }
            other => {
                debug!(mode = ?other, "stripe_webhook: checkout session mode ignored");
            }
        }

        Ok(())
    }

    async fn resolve_as_failed(&self, payment_id: Uuid, event_type: &str) -> UseCaseResult<()> {
        let affected = self
            .payment_repo
            .mark_failed_if_pending(payment_id)
            .await
            .map_err(|err| {
                error!(
                    %payment_id,
                    event_type,
                    db_error = ?err,
                    "stripe_webhook: failed to mark payment failed"
                );
                StripeWebhookError::Internal(err)
            })?;

        if affected == 0 {
            info!(
                %payment_id,
                event_type,
                "stripe_webhook: payment already resolved, failure event ignored"
            );
        } else {
            info!(%payment_id, event_type, "stripe_webhook: payment marked failed");
        }

        Ok(())
    }

    fn payment_id_from_session_metadata(event: &StripeEvent) -> UseCaseResult<Uuid> {
        StripeClient::extract_checkout_session(event)
            .and_then(|session| {
                session
                    .metadata
                    .as_ref()
                    .and_then(|metadata| metadata.get("release_payment_id"))
                    .and_then(|value| Uuid::parse_str(value).ok())
            })
            .ok_or_else(|| {
                warn!("stripe_webhook: release_payment_id missing from session metadata");
                StripeWebhookError::Internal(anyhow::anyhow!(
                    "release_payment_id missing from session metadata"
                ))
            })
    }

    fn payment_id_from_intent_metadata(event: &StripeEvent) -> UseCaseResult<Uuid> {
        StripeClient::extract_payment_intent(event)
            .and_then(|intent| {
                intent
                    .metadata
                    .as_ref()
                    .and_then(|metadata| metadata.get("release_payment_id"))
                    .and_then(|value| Uuid::parse_str(value).ok())
            })
            .ok_or_else(|| {
                warn!("stripe_webhook: release_payment_id missing from payment intent metadata");
                StripeWebhookError::Internal(anyhow::anyhow!(
                    "release_payment_id missing from payment intent metadata"
                ))
            })
    }
}
