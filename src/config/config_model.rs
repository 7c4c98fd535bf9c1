#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub supabase: Supabase,
    pub stripe: Stripe,
    pub billing: Billing,
    pub features: Features,
    pub notifications: Notifications,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Supabase {
    pub project_url: String,
    pub jwt_secret: String,
    pub service_role_key: String,
    pub storage: SupabaseStorage,
}

#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

/// Stripe keys are optional on purpose: a missing key is a configuration
/// error surfaced by the billing usecases, not a startup panic.
#[derive(Debug, Clone, Default)]
pub struct Stripe {
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub subscription_price_id: Option<String>,
    pub app_base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Billing {
    /// Price of one hosted track in major currency units.
    pub hosted_track_price: i64,
    /// Kill switch: treats every checkout request as already fully paid.
    pub billing_disabled: bool,
}

#[derive(Debug, Clone)]
pub struct Features {
    pub invite_required: bool,
}

#[derive(Debug, Clone)]
pub struct Notifications {
    pub member_request_webhook_url: Option<String>,
}
