use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gateway::config::AppConfig;
use gateway::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;

    tracing::info!("Starting login gateway");
    tracing::info!("Auth mode: {}", config.auth.mode.as_str());
    match &config.allowed_email_domain {
        Some(domain) => tracing::info!("Allowed email domain: @{}", domain),
        None => tracing::warn!("ALLOWED_EMAIL_DOMAIN not set, any email address is accepted"),
    }
    if config.jwt.secret.is_none() {
        tracing::warn!("JWT_SECRET not set, successful logins cannot be redirected");
    }
    if config.other_site_url.is_none() {
        tracing::warn!("OTHER_SITE_URL not set, successful logins cannot be redirected");
    }
    if std::env::var_os("FLASK_SECRET_KEY").is_some() {
        tracing::debug!("FLASK_SECRET_KEY is set but unused: the gateway keeps no session cookie");
    }

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    let app = build_router(AppState::from_config(config));
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
