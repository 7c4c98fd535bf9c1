use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckoutUrlDto {
    pub url: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpsertSubscriptionModel {
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}
