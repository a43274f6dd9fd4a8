//! Shutter Ledger HTTP server.
//!
//! Loads configuration from the environment, connects to Postgres, builds
//! every adapter once, and serves the marketplace API until SIGINT/SIGTERM.

use std::str::FromStr;
use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use shutter_ledger::adapters::{
    build_router, HmacUrlSigner, HttpSettings, JwtConfig, JwtSessionValidator,
    MarketplaceAppState, PostgresCatalog, PostgresEntitlementStore, PostgresOrderRepository,
    PostgresPlanGrantRepository, PostgresWebhookEventRepository, RazorpayConfig, RazorpayGateway,
};
use shutter_ledger::config::{AppConfig, ConfigError, DatabaseConfig, ValidationError};
use shutter_ledger::domain::payment::SignatureVerifier;
use shutter_ledger::ports::{PaymentError, SessionValidator};

/// Anything that stops the server from starting.
#[derive(Debug, Error)]
enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("database unavailable: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("payment gateway client: {0}")]
    Gateway(#[from] PaymentError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("fatal: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Fatal startup error");
        std::process::exit(1);
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    config.validate()?;

    let addr = config.server.bind_addr;
    let settings = HttpSettings {
        request_timeout: config.server.request_timeout(),
        max_body_bytes: config.server.max_body_bytes,
        cors_origins: config.server.cors_origins_list(),
    };

    let pool = connect(&config.database).await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let AppConfig {
        gateway,
        auth,
        storage,
        ..
    } = config;

    let razorpay = RazorpayGateway::new(
        RazorpayConfig::new(gateway.key_id, gateway.key_secret.expose_secret().clone())
            .with_base_url(gateway.api_base_url)
            .with_timeout(std::time::Duration::from_secs(gateway.timeout_secs)),
    )?;
    let signatures = Arc::new(SignatureVerifier::new(
        gateway.key_secret,
        gateway.webhook_secret,
    ));
    let validator: Arc<dyn SessionValidator> = Arc::new(JwtSessionValidator::new(
        JwtConfig::new(auth.issuer, auth.audience, auth.jwt_secret),
    ));
    let entitlements = Arc::new(PostgresEntitlementStore::new(pool.clone()));

    let state = MarketplaceAppState {
        catalog: Arc::new(PostgresCatalog::new(pool.clone())),
        orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
        entitlements: entitlements.clone(),
        purchases: entitlements,
        plan_grants: Arc::new(PostgresPlanGrantRepository::new(pool.clone())),
        webhook_events: Arc::new(PostgresWebhookEventRepository::new(pool.clone())),
        gateway: Arc::new(razorpay),
        objects: Arc::new(HmacUrlSigner::new(
            storage.download_base_url,
            storage.signing_secret,
        )),
        signatures,
        download_ttl_secs: storage.download_url_ttl_secs,
    };

    let app = build_router(state, validator, &settings);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn connect(config: &DatabaseConfig) -> Result<PgPool, StartupError> {
    let statement_timeout = config.statement_timeout_option();
    let options = PgConnectOptions::from_str(config.url.expose_secret())?
        .options([("statement_timeout", statement_timeout.as_str())]);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_with(options)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        statement_timeout_ms = %statement_timeout,
        "Database pool ready"
    );
    Ok(pool)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
