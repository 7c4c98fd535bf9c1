use std::collections::HashMap;

use anyhow::Result as AnyResult;
use async_trait::async_trait;

use crate::infrastructure::payments::stripe_client::{
    CreatedCheckoutSession, StripeClient, StripeEvent,
};

/// Seam between the billing usecases and the Stripe HTTP client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StripeGateway: Send + Sync {
    async fn create_hosted_track_checkout(
        &self,
        unit_amount_cents: i64,
        quantity: i64,
        product_name: String,
        success_url: String,
        cancel_url: String,
        metadata: HashMap<String, String>,
    ) -> AnyResult<CreatedCheckoutSession>;

    async fn create_subscription_checkout(
        &self,
        price_id: String,
        client_reference_id: String,
        success_url: String,
        cancel_url: String,
    ) -> AnyResult<String>;

    async fn find_customer_by_email(&self, email: String) -> AnyResult<Option<String>>;

    async fn create_billing_portal_session(
        &self,
        customer_id: String,
        return_url: String,
    ) -> AnyResult<String>;

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent>;
}

#[async_trait]
impl StripeGateway for StripeClient {
    async fn create_hosted_track_checkout(
        &self,
        unit_amount_cents: i64,
        quantity: i64,
        product_name: String,
        success_url: String,
        cancel_url: String,
        metadata: HashMap<String, String>,
    ) -> AnyResult<CreatedCheckoutSession> {
        self.create_hosted_track_checkout(
            unit_amount_cents,
            quantity,
            product_name,
            success_url,
            cancel_url,
            metadata,
        )
        .await
    }

    async fn create_subscription_checkout(
        &self,
        price_id: String,
        client_reference_id: String,
        success_url: String,
        cancel_url: String,
    ) -> AnyResult<String> {
        self.create_subscription_checkout(price_id, client_reference_id, success_url, cancel_url)
            .await
    }

    async fn find_customer_by_email(&self, email: String) -> AnyResult<Option<String>> {
        self.find_customer_by_email(email).await
    }

    async fn create_billing_portal_session(
        &self,
        customer_id: String,
        return_url: String,
    ) -> AnyResult<String> {
        self.create_billing_portal_session(customer_id, return_url)
            .await
    }

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent> {
        self.verify_webhook_signature(payload, signature)
    }
}
