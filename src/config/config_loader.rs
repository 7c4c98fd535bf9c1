use anyhow::{Ok, Result};

use super::config_model::{
    Billing, Database, DotEnvyConfig, Features, Notifications, Server, Stripe, Supabase,
    SupabaseStorage,
};
use super::stage::Stage;

const DEFAULT_HOSTED_TRACK_PRICE: i64 = 5;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let supabase = Supabase {
        project_url: std::env::var("SUPABASE_PROJECT_URL")
            .expect("SUPABASE_PROJECT_URL is invalid"),
        jwt_secret: std::env::var("SUPABASE_JWT_SECRET").expect("SUPABASE_JWT_SECRET is invalid"),
        service_role_key: std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .expect("SUPABASE_SERVICE_ROLE_KEY is invalid"),
        storage: SupabaseStorage {
            endpoint: std::env::var("SUPABASE_STORAGE_ENDPOINT")
                .expect("SUPABASE_STORAGE_ENDPOINT is invalid"),
            region: std::env::var("SUPABASE_STORAGE_REGION")
                .unwrap_or_else(|_| "us-east-1".to_string()),
            access_key: std::env::var("SUPABASE_STORAGE_ACCESS_KEY")
                .expect("SUPABASE_STORAGE_ACCESS_KEY is invalid"),
            secret_key: std::env::var("SUPABASE_STORAGE_SECRET_KEY")
                .expect("SUPABASE_STORAGE_SECRET_KEY is invalid"),
        },
    };

    let stripe = Stripe {
        secret_key: std::env::var("STRIPE_SECRET_KEY").ok(),
        webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").ok(),
        subscription_price_id: std::env::var("STRIPE_SUBSCRIPTION_PRICE_ID").ok(),
        app_base_url: std::env::var("APP_BASE_URL").ok(),
    };

    let billing = Billing {
        hosted_track_price: std::env::var("HOSTED_TRACK_PRICE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_HOSTED_TRACK_PRICE),
        billing_disabled: env_flag("BILLING_DISABLED"),
    };

    let features = Features {
        invite_required: env_flag("INVITE_REQUIRED"),
    };

    let notifications = Notifications {
        member_request_webhook_url: std::env::var("MEMBER_REQUEST_WEBHOOK_URL").ok(),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        supabase,
        stripe,
        billing,
        features,
        notifications,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(stage_str.as_str()).unwrap_or_default()
}

pub fn get_supabase_jwt_secret() -> Result<String> {
    dotenvy::dotenv().ok();

    Ok(std::env::var("SUPABASE_JWT_SECRET").expect("SUPABASE_JWT_SECRET is invalid"))
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
