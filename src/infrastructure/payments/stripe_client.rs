use std::collections::HashMap;

use anyhow::Result;
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use sha2::Sha256;
use tracing::error;

type HmacSha256 = Hmac<Sha256>;

/// Minimal Stripe client built on reqwest.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub type_: String,
    pub livemode: Option<bool>,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: Option<String>,
    pub mode: Option<String>,
    pub customer: Option<String>,
    pub subscription: Option<String>,
    pub payment_intent: Option<String>,
    pub client_reference_id: Option<String>,
    pub amount_total: Option<i64>,
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct StripePaymentIntent {
    pub id: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

/// What checkout-session creation hands back to the caller: the session id
/// to pin on the payment row, the redirect URL, and the payment intent when
/// Stripe has already allocated one.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedCheckoutSession {
    pub id: String,
    pub url: String,
    pub payment_intent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: String, webhook_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            webhook_secret,
        }
    }

    /// None until both keys are configured; billing surfaces report the
    /// missing configuration instead of panicking at startup.
    pub fn from_config(config: &crate::config::config_model::Stripe) -> Option<Self> {
        match (config.secret_key.as_ref(), config.webhook_secret.as_ref()) {
            (Some(secret_key), Some(webhook_secret)) => {
                Some(Self::new(secret_key.clone(), webhook_secret.clone()))
            }
            _ => None,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (error_type, error_code, error_param, error_message) =
            match serde_json::from_str::<StripeErrorEnvelope>(&body) {
                Ok(envelope) => {
                    let details = envelope.error;
                    (details.type_, details.code, details.param, details.message)
                }
                Err(_) => (None, None, None, None),
            };

        error!(
            status = %status,
            stripe_request_id = ?request_id,
            stripe_error_type = ?error_type,
            stripe_error_code = ?error_code,
            stripe_error_param = ?error_param,
            stripe_error_message = ?error_message,
            context = %context,
            "stripe api request failed"
        );

        anyhow::bail!(
            "Stripe API request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }

    /// Creates a mode=payment Checkout Session priced ad hoc per hosted
    /// track. Metadata is mirrored onto the payment intent so failure
    /// events can be traced back to the payment row.
    pub async fn create_hosted_track_checkout(
        &self,
        unit_amount_cents: i64,
        quantity: i64,
        product_name: String,
        success_url: String,
        cancel_url: String,
        metadata: HashMap<String, String>,
    ) -> Result<CreatedCheckoutSession> {
        // Stripe Checkout docs:
        // https://stripe.com/docs/payments/checkout
        let mut body: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                "usd".to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                unit_amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                product_name,
            ),
            ("line_items[0][quantity]".to_string(), quantity.to_string()),
            ("success_url".to_string(), success_url),
            ("cancel_url".to_string(), cancel_url),
        ];

        for (key, value) in metadata {
            body.push((format!("metadata[{}]", key), value.clone()));
            body.push((format!("payment_intent_data[metadata][{}]", key), value));
        }

        let resp = self
            .http
            .post("https://api.stripe.com/v1/checkout/sessions")
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create hosted track checkout").await?;

        #[derive(Deserialize)]
        struct CheckoutResp {
            id: String,
            url: Option<String>,
            payment_intent: Option<String>,
        }

        let parsed: CheckoutResp = resp.json().await?;
        let url = parsed
            .url
            .ok_or_else(|| anyhow::anyhow!("Stripe Checkout session URL is missing"))?;

        Ok(CreatedCheckoutSession {
            id: parsed.id,
            url,
            payment_intent: parsed.payment_intent,
        })
    }

    /// Creates a mode=subscription Checkout Session against a configured
    /// price. `client_reference_id` carries the user id for attribution.
    pub async fn create_subscription_checkout(
        &self,
        price_id: String,
        client_reference_id: String,
        success_url: String,
        cancel_url: String,
    ) -> Result<String> {
        let body: Vec<(String, String)> = vec![
            ("mode".to_string(), "subscription".to_string()),
            ("line_items[0][price]".to_string(), price_id),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "client_reference_id".to_string(),
                client_reference_id.clone(),
            ),
            ("metadata[user_id]".to_string(), client_reference_id),
            ("success_url".to_string(), success_url),
            ("cancel_url".to_string(), cancel_url),
        ];

        let resp = self
            .http
            .post("https://api.stripe.com/v1/checkout/sessions")
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create subscription checkout").await?;

        #[derive(Deserialize)]
        struct CheckoutResp {
            url: Option<String>,
        }

        let parsed: CheckoutResp = resp.json().await?;
        parsed
            .url
            .ok_or_else(|| anyhow::anyhow!("Stripe Checkout session URL is missing"))
    }

    /// Looks up a customer by email, first match only.
    /// https://stripe.com/docs/api/customers/list
    pub async fn find_customer_by_email(&self, email: String) -> Result<Option<String>> {
        let resp = self
            .http
            .get("https://api.stripe.com/v1/customers")
            .query(&[("email", email.as_str()), ("limit", "1")])
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "find customer by email").await?;

        #[derive(Deserialize)]
        struct CustomerListResp {
            data: Vec<CustomerResp>,
        }

        #[derive(Deserialize)]
        struct CustomerResp {
            id: String,
        }

        let parsed: CustomerListResp = resp.json().await?;
        Ok(parsed.data.into_iter().next().map(|customer| customer.id))
    }

    /// Opens a self-service Billing Portal session for an existing customer.
    /// https://stripe.com/docs/api/customer_portal/sessions/create
    pub async fn create_billing_portal_session(
        &self,
        customer_id: String,
        return_url: String,
    ) -> Result<String> {
        let body = [
            ("customer", customer_id),
            ("return_url", return_url),
        ];

        let resp = self
            .http
            .post("https://api.stripe.com/v1/billing_portal/sessions")
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create billing portal session").await?;

        #[derive(Deserialize)]
        struct PortalResp {
            url: String,
        }

        let parsed: PortalResp = resp.json().await?;
        Ok(parsed.url)
    }

    /// Verifies the webhook signature. https://stripe.com/docs/webhooks/signatures
    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent> {
        let mut timestamp: Option<String> = None;
        let mut signature: Option<String> = None;

        for part in signature_header.split(',') {
            if let Some(rest) = part.strip_prefix("t=") {
                timestamp = Some(rest.to_string());
            } else if let Some(rest) = part.strip_prefix("v1=") {
                signature = Some(rest.to_string());
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| anyhow::anyhow!("missing timestamp in stripe-signature"))?;
        let signature =
            signature.ok_or_else(|| anyhow::anyhow!("missing v1 in stripe-signature"))?;

        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())?;
        mac.update(signed_payload.as_bytes());
        let expected = mac.finalize().into_bytes();
        let provided = hex::decode(signature)?;

        if expected[..] != provided[..] {
            anyhow::bail!("invalid webhook signature");
        }

        let event: StripeEvent = serde_json::from_slice(payload)?;
        Ok(event)
    }

    pub fn extract_checkout_session(event: &StripeEvent) -> Option<StripeCheckoutSession> {
        serde_json::from_value(event.data.object.clone()).ok()
    }

    pub fn extract_payment_intent(event: &StripeEvent) -> Option<StripePaymentIntent> {
        serde_json::from_value(event.data.object.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEBHOOK_SECRET: &str = "whsec_test_secret";

    fn sign(payload: &[u8], timestamp: &str, secret: &str) -> String {
        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed_payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn client() -> StripeClient {
        StripeClient::new("sk_test_key".to_string(), WEBHOOK_SECRET.to_string())
    }

    #[test]
    fn accepts_a_correctly_signed_payload() {
        let payload =
            br#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{}}}"#;
        let header = format!("t=1700000000,v1={}", sign(payload, "1700000000", WEBHOOK_SECRET));

        let event = client()
            .verify_webhook_signature(payload, &header)
            .expect("valid signature should verify");
        assert_eq!(event.type_, "checkout.session.completed");
    }

    #[test]
    fn rejects_a_signature_made_with_another_secret() {
        let payload = br#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{}}}"#;
        let header = format!("t=1700000000,v1={}", sign(payload, "1700000000", "whsec_other"));

        assert!(client().verify_webhook_signature(payload, &header).is_err());
    }

    #[test]
    fn rejects_a_tampered_payload() {
        let payload = br#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{}}}"#;
        let header = format!("t=1700000000,v1={}", sign(payload, "1700000000", WEBHOOK_SECRET));
        let tampered =
            br#"{"id":"evt_2","type":"checkout.session.completed","data":{"object":{}}}"#;

        assert!(client().verify_webhook_signature(tampered, &header).is_err());
    }

    #[test]
    fn rejects_a_header_without_v1() {
        let payload = br#"{}"#;
        assert!(
            client()
                .verify_webhook_signature(payload, "t=1700000000")
                .is_err()
        );
    }

    #[test]
    fn extracts_checkout_session_fields_from_the_event_object() {
        let payload = br#"{
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": "cs_test_1",
                "mode": "payment",
                "payment_intent": "pi_1",
                "amount_total": 1500,
                "metadata": {"release_payment_id": "4b824c2e-6a81-4532-8c4e-1fcba54e5b4c"}
            }}
        }"#;
        let header = format!("t=1700000000,v1={}", sign(payload, "1700000000", WEBHOOK_SECRET));

        let event = client().verify_webhook_signature(payload, &header).unwrap();
        let session = StripeClient::extract_checkout_session(&event).unwrap();

        assert_eq!(session.id.as_deref(), Some("cs_test_1"));
        assert_eq!(session.mode.as_deref(), Some("payment"));
        assert_eq!(session.payment_intent.as_deref(), Some("pi_1"));
        assert_eq!(
            session
                .metadata
                .as_ref()
                .and_then(|metadata| metadata.get("release_payment_id"))
                .map(String::as_str),
            Some("4b824c2e-6a81-4532-8c4e-1fcba54e5b4c")
        );
    }
}
