use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::config_model::DotEnvyConfig;
use crate::infrastructure::axum_http::{default_routers, routers};
use crate::infrastructure::postgres::postgres_connection::PgPoolSquad;
use crate::infrastructure::storage::supabase_storage::SupabaseStorageClient;

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let storage_client = Arc::new(SupabaseStorageClient::new(&config.supabase.storage).await?);

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/release-payments",
            routers::release_payments::routes(Arc::clone(&db_pool), Arc::clone(&config)),
        )
        .nest(
            "/api/stripe",
            routers::stripe_webhook::routes(Arc::clone(&db_pool), Arc::clone(&config)),
        )
        .nest(
            "/api/subscribe",
            routers::subscriptions::routes(Arc::clone(&db_pool), Arc::clone(&config)),
        )
        .nest(
            "/api/band-memberships",
            routers::band_memberships::routes(Arc::clone(&db_pool), Arc::clone(&config)),
        )
        .nest("/api/bands", routers::ratings::routes(Arc::clone(&db_pool)))
        .nest(
            "/api/account",
            routers::accounts::routes(Arc::clone(&db_pool), Arc::clone(&config)),
        )
        .merge(routers::meta::routes(Arc::clone(&config)))
        .merge(routers::storage_upload::routes(storage_client))
        .route("/api/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(RequestBodyLimitLayer::new(
            (config.server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any), // TODO Add the domain later
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
