//! Signed assertion issuance and validation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;

use crate::config::JwtSettings;
use crate::error::{GatewayError, GatewayResult};

use super::types::Claims;

/// Issues short-lived assertions for the external site and builds the
/// redirect that carries them.
#[derive(Debug, Clone)]
pub struct AssertionIssuer {
    settings: JwtSettings,
    other_site_url: Option<String>,
}

impl AssertionIssuer {
    pub fn new(settings: JwtSettings, other_site_url: Option<String>) -> Self {
        Self {
            settings,
            other_site_url,
        }
    }

    /// Build and sign the claims for `email`.
    pub fn issue(&self, email: &str) -> GatewayResult<String> {
        let secret = self
            .settings
            .secret
            .as_deref()
            .ok_or(GatewayError::SigningKeyAbsent)?;

        let now = Utc::now();
        let lifetime = self.settings.lifetime_seconds;
        let exp = Duration::try_seconds(lifetime)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                GatewayError::Config(format!(
                    "JWT lifetime of {} seconds is out of range",
                    lifetime
                ))
            })?;

        let claims = Claims {
            sub: email.to_string(),
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nonce: nonce(),
        };

        let token = encode(
            &Header::new(self.settings.algorithm.into()),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Issue an assertion for `email` and append it to the external site URL
    /// as the `token` query parameter.
    pub fn redirect_url(&self, email: &str) -> GatewayResult<String> {
        let base = self
            .other_site_url
            .as_deref()
            .ok_or_else(|| GatewayError::missing_env("OTHER_SITE_URL"))?;
        let token = self.issue(email)?;

        let separator = if base.contains('?') { '&' } else { '?' };
        Ok(format!(
            "{}{}token={}",
            base,
            separator,
            urlencoding::encode(&token)
        ))
    }

    /// Decode an assertion, checking signature, expiry, issuer and audience.
    pub fn verify(&self, token: &str) -> GatewayResult<Claims> {
        let secret = self
            .settings
            .secret
            .as_deref()
            .ok_or(GatewayError::SigningKeyAbsent)?;

        let mut validation = Validation::new(self.settings.algorithm.into());
        validation.set_issuer(&[&self.settings.issuer]);
        validation.set_audience(&[&self.settings.audience]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;

        Ok(token_data.claims)
    }
}

fn nonce() -> String {
    let mut bytes = [0u8; 8];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::types::SigningAlgorithm;

    fn test_settings() -> JwtSettings {
        JwtSettings {
            secret: Some("test-secret-key-for-testing-only".to_string()),
            issuer: "login-app".to_string(),
            audience: "other-site".to_string(),
            lifetime_seconds: 900,
            algorithm: SigningAlgorithm::HS256,
        }
    }

    fn test_issuer() -> AssertionIssuer {
        AssertionIssuer::new(
            test_settings(),
            Some("https://other.example.com/welcome".to_string()),
        )
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = test_issuer();
        let token = issuer.issue("user@keepa.ir").expect("should issue token");

        let claims = issuer.verify(&token).expect("should validate token");
        assert_eq!(claims.sub, "user@keepa.ir");
        assert_eq!(claims.iss, "login-app");
        assert_eq!(claims.aud, "other-site");
        assert_eq!(claims.exp - claims.iat, 900);
        assert!(!claims.nonce.is_empty());
    }

    #[test]
    fn test_assertions_are_unique() {
        let issuer = test_issuer();
        let first = issuer.issue("user@keepa.ir").unwrap();
        let second = issuer.issue("user@keepa.ir").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_missing_secret_fails_closed() {
        let mut settings = test_settings();
        settings.secret = None;
        let issuer = AssertionIssuer::new(settings, Some("https://other.example.com".into()));

        assert!(matches!(
            issuer.issue("user@keepa.ir"),
            Err(GatewayError::SigningKeyAbsent)
        ));
        assert!(matches!(
            issuer.redirect_url("user@keepa.ir"),
            Err(GatewayError::SigningKeyAbsent)
        ));
    }

    #[test]
    fn test_missing_other_site_fails_closed() {
        let issuer = AssertionIssuer::new(test_settings(), None);
        assert!(matches!(
            issuer.redirect_url("user@keepa.ir"),
            Err(GatewayError::Config(_))
        ));
    }

    #[test]
    fn test_redirect_url_appends_token() {
        let issuer = test_issuer();
        let url = issuer.redirect_url("user@keepa.ir").unwrap();
        let token = url
            .strip_prefix("https://other.example.com/welcome?token=")
            .expect("should carry token parameter");
        assert_eq!(issuer.verify(token).unwrap().sub, "user@keepa.ir");

        let with_query = AssertionIssuer::new(
            test_settings(),
            Some("https://other.example.com/in?src=login".to_string()),
        );
        let url = with_query.redirect_url("user@keepa.ir").unwrap();
        assert!(url.starts_with("https://other.example.com/in?src=login&token="));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let issuer = test_issuer();
        let token = issuer.issue("user@keepa.ir").unwrap();

        let mut settings = test_settings();
        settings.audience = "someone-else".to_string();
        let other = AssertionIssuer::new(settings, None);
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = test_issuer();
        let token = issuer.issue("user@keepa.ir").unwrap();

        let mut settings = test_settings();
        settings.secret = Some("wrong-secret".to_string());
        let other = AssertionIssuer::new(settings, None);
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_oversized_lifetime_is_an_error() {
        let mut settings = test_settings();
        settings.lifetime_seconds = 1_000_000_000_000_000;
        let issuer = AssertionIssuer::new(settings, Some("https://other.example.com".into()));

        assert!(matches!(
            issuer.issue("user@keepa.ir"),
            Err(GatewayError::Config(_))
        ));
        assert!(matches!(
            issuer.redirect_url("user@keepa.ir"),
            Err(GatewayError::Config(_))
        ));

        let mut settings = test_settings();
        settings.lifetime_seconds = i64::MAX;
        let issuer = AssertionIssuer::new(settings, None);
        assert!(issuer.issue("user@keepa.ir").is_err());
    }

    #[test]
    fn test_hs512_round_trip() {
        let mut settings = test_settings();
        settings.algorithm = SigningAlgorithm::HS512;
        let issuer = AssertionIssuer::new(settings, None);
        let token = issuer.issue("user@keepa.ir").unwrap();
        assert_eq!(issuer.verify(&token).unwrap().sub, "user@keepa.ir");
    }
}
