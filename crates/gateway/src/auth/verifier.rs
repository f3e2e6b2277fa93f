//! Pluggable credential verification.
//!
//! The shipped policies are placeholders; integrators supply their own
//! `CredentialVerifier` when building the `AppState`.

use std::sync::Arc;

use crate::config::AuthSettings;

use super::types::AuthMode;

/// Decides whether an email/password pair may sign in.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, email: &str, password: &str) -> bool;
}

/// Accepts iff the password equals a configured constant.
pub struct DemoPasswordVerifier {
    expected: String,
}

impl DemoPasswordVerifier {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl CredentialVerifier for DemoPasswordVerifier {
    fn verify(&self, _email: &str, password: &str) -> bool {
        password == self.expected
    }
}

/// Accepts every submission.
pub struct AllowAllVerifier;

impl CredentialVerifier for AllowAllVerifier {
    fn verify(&self, _email: &str, _password: &str) -> bool {
        true
    }
}

/// Rejects every submission.
pub struct DenyAllVerifier;

impl CredentialVerifier for DenyAllVerifier {
    fn verify(&self, _email: &str, _password: &str) -> bool {
        false
    }
}

/// Build the verifier selected by `AUTH_MODE`.
pub fn from_settings(settings: &AuthSettings) -> Arc<dyn CredentialVerifier> {
    match settings.mode {
        AuthMode::Demo => Arc::new(DemoPasswordVerifier::new(settings.demo_password.clone())),
        AuthMode::AllowAll => {
            tracing::warn!("AUTH_MODE=allow_all: every login will be accepted");
            Arc::new(AllowAllVerifier)
        }
        AuthMode::Disabled => {
            tracing::warn!("AUTH_MODE not set: every login will be rejected");
            Arc::new(DenyAllVerifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_verifier() {
        let verifier = DemoPasswordVerifier::new("demo1234");
        assert!(verifier.verify("user@keepa.ir", "demo1234"));
        assert!(!verifier.verify("user@keepa.ir", "wrong"));
        assert!(!verifier.verify("user@keepa.ir", ""));
    }

    #[test]
    fn test_from_settings() {
        let mut settings = AuthSettings {
            mode: AuthMode::AllowAll,
            demo_password: "demo1234".to_string(),
        };
        assert!(from_settings(&settings).verify("a@b.c", "anything"));

        settings.mode = AuthMode::Disabled;
        assert!(!from_settings(&settings).verify("a@b.c", "demo1234"));

        settings.mode = AuthMode::Demo;
        let verifier = from_settings(&settings);
        assert!(verifier.verify("a@b.c", "demo1234"));
        assert!(!verifier.verify("a@b.c", "demo12345"));
    }
}
