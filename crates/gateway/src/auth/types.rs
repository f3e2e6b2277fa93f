//! Auth-related types.

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Claims of the signed assertion handed to the external site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (validated email)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Random per-assertion value
    pub nonce: String,
}

/// Credential verification policy selected by `AUTH_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Accept iff the password equals `DEMO_PASSWORD`.
    Demo,
    /// Accept everything.
    AllowAll,
    /// Reject everything. Used when no mode is configured.
    Disabled,
}

impl AuthMode {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "demo" => AuthMode::Demo,
            "allow_all" => AuthMode::AllowAll,
            _ => AuthMode::Disabled,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AuthMode::Demo => "demo",
            AuthMode::AllowAll => "allow_all",
            AuthMode::Disabled => "disabled",
        }
    }
}

/// HMAC algorithms accepted for `JWT_ALG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    HS256,
    HS384,
    HS512,
}

/// `JWT_ALG` named something other than an HMAC algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported signing algorithm: {0}")]
pub struct UnsupportedAlgorithm(pub String);

impl FromStr for SigningAlgorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HS256" => Ok(SigningAlgorithm::HS256),
            "HS384" => Ok(SigningAlgorithm::HS384),
            "HS512" => Ok(SigningAlgorithm::HS512),
            other => Err(UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl From<SigningAlgorithm> for Algorithm {
    fn from(alg: SigningAlgorithm) -> Self {
        match alg {
            SigningAlgorithm::HS256 => Algorithm::HS256,
            SigningAlgorithm::HS384 => Algorithm::HS384,
            SigningAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}
