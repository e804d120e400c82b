//! Memberdesk API server.

use std::sync::Arc;

use axum::http::HeaderName;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use memberdesk::adapters::auth::HeaderIdentityProvider;
use memberdesk::adapters::http::{router, AppState};
use memberdesk::adapters::mail::ResendMailTransport;
use memberdesk::adapters::postgres::{
    PostgresAuditLog, PostgresContentRepository, PostgresNotificationHistory,
    PostgresOrganizationRepository, PostgresProcessedEventStore, PostgresSubscriptionRepository,
};
use memberdesk::adapters::templates::BuiltinTemplateRenderer;
use memberdesk::application::handlers::NotificationDelivery;
use memberdesk::config::{AppConfig, ServerConfig};

const REQUEST_ID_HEADER: &str = "x-request-id";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        "Starting Memberdesk v{}",
        env!("CARGO_PKG_VERSION")
    );

    tracing::info!("Connecting to database...");
    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    tracing::info!("Database connection established");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let mut transport =
        ResendMailTransport::new(config.email.resend_api_key.clone(), config.email.from_header());
    if let Some(base_url) = &config.email.resend_base_url {
        transport = transport.with_base_url(base_url.clone());
    }

    let notifications = NotificationDelivery::new(
        Arc::new(BuiltinTemplateRenderer::new(config.email.product_name.clone())),
        Arc::new(transport),
        Arc::new(PostgresNotificationHistory::new(pool.clone())),
        config.email.delivery_timeouts(),
    );

    let state = AppState {
        identity: Arc::new(HeaderIdentityProvider),
        subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        organizations: Arc::new(PostgresOrganizationRepository::new(pool.clone())),
        content: Arc::new(PostgresContentRepository::new(pool.clone())),
        audit_log: Arc::new(PostgresAuditLog::new(pool.clone())),
        processed_events: Arc::new(PostgresProcessedEventStore::new(pool.clone())),
        notifications,
        verifier: config.payment.webhook_verifier(),
        policy: config.payment.billing_policy(),
    };

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let app = router(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON output in production or when asked for, human-readable otherwise.
/// `RUST_LOG` overrides the configured filter.
fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if server.log_json || server.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
