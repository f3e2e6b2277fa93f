//! Allowed-domain gate applied before token creation and login.

use crate::error::{GatewayError, GatewayResult};

#[derive(Debug, Clone, Default)]
pub struct EmailPolicy {
    /// Lowercased domain without the leading `@`.
    allowed_domain: Option<String>,
}

impl EmailPolicy {
    pub fn new(allowed_domain: Option<String>) -> Self {
        let allowed_domain = allowed_domain
            .map(|d| d.trim().trim_start_matches('@').to_lowercase())
            .filter(|d| !d.is_empty());
        Self { allowed_domain }
    }

    pub fn allowed_domain(&self) -> Option<&str> {
        self.allowed_domain.as_deref()
    }

    /// Check if the text after the last `@` matches the allowed domain.
    ///
    /// Every email passes when no domain is configured.
    pub fn is_allowed(&self, email: &str) -> bool {
        match &self.allowed_domain {
            None => true,
            Some(domain) => email
                .rsplit_once('@')
                .is_some_and(|(_, d)| d.eq_ignore_ascii_case(domain)),
        }
    }

    /// Validate a trimmed email, returning the user-visible reason on failure.
    pub fn validate(&self, email: &str) -> GatewayResult<()> {
        match &self.allowed_domain {
            Some(domain) if !self.is_allowed(email) => Err(GatewayError::InvalidEmail(format!(
                "Email must be a @{} address.",
                domain
            ))),
            None if !email.contains('@') => Err(GatewayError::InvalidEmail(
                "Email address must contain @".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
