//! Minimal authentication gateway.
//!
//! Renders a login form, gates emails on an allowed domain, checks
//! credentials through a pluggable verifier, records analytics events and,
//! on success, redirects to an external site with a short-lived signed
//! assertion. Shareable prefill links live in a JSON file managed by the
//! `gateway-cli` binary.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod analytics;
pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
mod files;
pub mod handlers;
pub mod pages;
pub mod site;
pub mod store;

use analytics::AnalyticsSink;
use auth::{verifier, AssertionIssuer, CredentialVerifier, EmailPolicy};
use config::AppConfig;
use store::TokenStore;

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub email_policy: EmailPolicy,
    pub tokens: TokenStore,
    pub analytics: AnalyticsSink,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub issuer: AssertionIssuer,
}

impl AppState {
    /// Build state using the verifier selected by `AUTH_MODE`.
    pub fn from_config(config: AppConfig) -> Self {
        let verifier = verifier::from_settings(&config.auth);
        Self::with_verifier(config, verifier)
    }

    /// Build state with an integrator-supplied verifier.
    pub fn with_verifier(config: AppConfig, verifier: Arc<dyn CredentialVerifier>) -> Self {
        let email_policy = EmailPolicy::new(config.allowed_email_domain.clone());
        Self {
            tokens: TokenStore::new(config.tokens_file.clone(), email_policy.clone()),
            analytics: AnalyticsSink::new(config.analytics_file.clone()),
            issuer: AssertionIssuer::new(config.jwt.clone(), config.other_site_url.clone()),
            email_policy,
            verifier,
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::login_form))
        .route(
            "/login",
            get(handlers::login_form).post(handlers::login_submit),
        )
        .route("/t/:token", get(handlers::token_visit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
