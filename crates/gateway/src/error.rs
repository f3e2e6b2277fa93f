//! Unified error handling for the gateway.
//!
//! Every failure the gateway can hit is a `GatewayError`. It implements
//! `IntoResponse`, rendering a small HTML error page with a status code per
//! kind, so handlers can use `?` directly.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::pages;

/// Unified error type for the gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Email is malformed or outside the allowed domain
    #[error("{0}")]
    InvalidEmail(String),

    /// Email or password missing from the submission
    #[error("{0}")]
    MissingCredentials(String),

    /// Verifier rejected the credentials
    #[error("Invalid credentials.")]
    VerificationFailed,

    /// No link token with this value
    #[error("Token not found")]
    TokenNotFound,

    /// `JWT_SECRET` is not configured, so no assertion can be signed
    #[error("Signing key is not configured")]
    SigningKeyAbsent,

    /// Any other missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O on the token store, analytics log, or site config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON document on disk
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Signing or decoding an assertion failed
    #[error("Token signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl GatewayError {
    /// Create a config error for missing env vars
    pub fn missing_env(var_name: &str) -> Self {
        GatewayError::Config(format!("{} environment variable must be set", var_name))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidEmail(_) | GatewayError::MissingCredentials(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::VerificationFailed => StatusCode::UNAUTHORIZED,
            GatewayError::TokenNotFound => StatusCode::NOT_FOUND,
            GatewayError::SigningKeyAbsent
            | GatewayError::Config(_)
            | GatewayError::Io(_)
            | GatewayError::Json(_)
            | GatewayError::Jwt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            GatewayError::InvalidEmail(msg) | GatewayError::MissingCredentials(msg) => msg.clone(),
            GatewayError::VerificationFailed | GatewayError::TokenNotFound => self.to_string(),
            GatewayError::SigningKeyAbsent | GatewayError::Config(_) => {
                tracing::error!("Configuration error: {}", self);
                "Sign-in is temporarily unavailable. Please contact the administrator.".to_string()
            }
            GatewayError::Io(e) => {
                tracing::error!("I/O error: {:?}", e);
                "Internal server error".to_string()
            }
            GatewayError::Json(e) => {
                tracing::error!("JSON error: {:?}", e);
                "Internal server error".to_string()
            }
            GatewayError::Jwt(e) => {
                tracing::error!("Token signing error: {:?}", e);
                "Internal server error".to_string()
            }
        };

        (status, Html(pages::error_page(status, &message))).into_response()
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_per_kind() {
        assert_eq!(
            GatewayError::InvalidEmail("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::MissingCredentials("Password is required.".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::VerificationFailed.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(GatewayError::TokenNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            GatewayError::SigningKeyAbsent.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_config_errors_do_not_leak_details() {
        let response = GatewayError::missing_env("OTHER_SITE_URL").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("temporarily unavailable"));
        assert!(!html.contains("OTHER_SITE_URL"));
    }
}
