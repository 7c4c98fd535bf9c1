use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionModel {
    pub release_id: Uuid,
    pub band_id: Uuid,
    pub hosted_track_count: i32,
}

/// `checkout_url` is None when nothing new is billable (idempotent replay
/// of an already-covered count, or the billing kill switch).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionDto {
    pub checkout_url: Option<String>,
    pub already_paid: i64,
    pub new_billable: i64,
    pub amount_cents: i64,
}

impl CheckoutSessionDto {
    pub fn fully_covered(already_paid: i64) -> Self {
        Self {
            checkout_url: None,
            already_paid,
            new_billable: 0,
            amount_cents: 0,
        }
    }
}
