mod accounts;
mod config;
mod db;
mod errors;
mod jobs;
mod mailer;
mod models;
mod organizations;
mod routes;
mod state;
mod store;
mod tags;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::accounts::manager::PasswordAccounts;
use crate::accounts::session::TokenIssuer;
use crate::config::Config;
use crate::db::create_pool;
use crate::mailer::SendGridMailer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Nest API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs pending migrations)
    let pool = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(pool));

    // Initialize outbound email
    let mailer = Arc::new(SendGridMailer::new(config.sendgrid_api_key.clone())?);
    info!("SendGrid mailer initialized (from: {})", config.email_from);

    let tokens = TokenIssuer::new(&config.jwt_secret, config.jwt_ttl_hours);

    // Build app state
    let state = AppState {
        store,
        accounts: Arc::new(PasswordAccounts),
        mailer,
        tokens,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the web client's origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
