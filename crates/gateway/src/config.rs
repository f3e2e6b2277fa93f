use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

use crate::auth::types::{AuthMode, SigningAlgorithm};

/// Upper bound for `JWT_LIFETIME_SECONDS`. Assertions are meant to be
/// consumed within minutes.
pub const MAX_JWT_LIFETIME_SECONDS: i64 = 24 * 60 * 60;

/// Variable lookup used by the loaders; `std::env` in production.
type Vars<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Process configuration, loaded once at startup and passed explicitly into
/// every component constructor.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub tokens_file: PathBuf,
    pub analytics_file: PathBuf,
    pub site_config_file: PathBuf,
    pub allowed_email_domain: Option<String>,
    pub auth: AuthSettings,
    pub jwt: JwtSettings,
    /// External site that receives the signed assertion.
    pub other_site_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub mode: AuthMode,
    pub demo_password: String,
}

#[derive(Debug, Clone)]
pub struct JwtSettings {
    /// `None` when `JWT_SECRET` is unset or blank; issuance then fails closed.
    pub secret: Option<String>,
    pub issuer: String,
    pub audience: String,
    pub lifetime_seconds: i64,
    pub algorithm: SigningAlgorithm,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&|name: &str| env::var(name).ok())
    }

    pub fn from_vars(var: Vars<'_>) -> Result<Self> {
        let lifetime_seconds: i64 = var("JWT_LIFETIME_SECONDS")
            .unwrap_or_else(|| "900".to_string())
            .trim()
            .parse()
            .context("JWT_LIFETIME_SECONDS must be a valid number")?;
        if !(1..=MAX_JWT_LIFETIME_SECONDS).contains(&lifetime_seconds) {
            bail!(
                "JWT_LIFETIME_SECONDS must be between 1 and {}",
                MAX_JWT_LIFETIME_SECONDS
            );
        }

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            tokens_file: path_var(var, "TOKENS_FILE", "tokens.json"),
            analytics_file: path_var(var, "ANALYTICS_FILE", "analytics.jsonl"),
            site_config_file: path_var(var, "SITE_CONFIG_FILE", "site_config.json"),
            allowed_email_domain: non_empty_var(var, "ALLOWED_EMAIL_DOMAIN"),
            auth: AuthSettings {
                mode: AuthMode::parse(&var("AUTH_MODE").unwrap_or_default()),
                demo_password: var("DEMO_PASSWORD").unwrap_or_else(|| "demo1234".to_string()),
            },
            jwt: JwtSettings {
                secret: non_empty_var(var, "JWT_SECRET"),
                issuer: var("JWT_ISS").unwrap_or_else(|| "login-app".to_string()),
                audience: var("JWT_AUD").unwrap_or_else(|| "other-site".to_string()),
                lifetime_seconds,
                algorithm: var("JWT_ALG")
                    .unwrap_or_else(|| "HS256".to_string())
                    .parse::<SigningAlgorithm>()
                    .context("JWT_ALG must be one of HS256, HS384, HS512")?,
            },
            other_site_url: non_empty_var(var, "OTHER_SITE_URL"),
        })
    }
}

/// The subset of configuration the operator CLI needs. Loading it never
/// fails, so a server-only setting such as `PORT` cannot block file edits.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Public origin used when printing shareable links.
    pub app_origin: String,
    pub tokens_file: PathBuf,
    pub site_config_file: PathBuf,
    /// Dotenv file that `site domain` rewrites.
    pub env_file: PathBuf,
    pub allowed_email_domain: Option<String>,
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_vars(&|name: &str| env::var(name).ok())
    }

    pub fn from_vars(var: Vars<'_>) -> Self {
        Self {
            app_origin: var("APP_ORIGIN")
                .unwrap_or_else(|| "http://127.0.0.1:5000".to_string())
                .trim_end_matches('/')
                .to_string(),
            tokens_file: path_var(var, "TOKENS_FILE", "tokens.json"),
            site_config_file: path_var(var, "SITE_CONFIG_FILE", "site_config.json"),
            env_file: path_var(var, "ENV_FILE", ".env"),
            allowed_email_domain: non_empty_var(var, "ALLOWED_EMAIL_DOMAIN"),
        }
    }

    /// Shareable URL for a link token.
    pub fn link_url(&self, token: &str) -> String {
        format!("{}/t/{}", self.app_origin, token)
    }
}

fn path_var(var: Vars<'_>, name: &str, default: &str) -> PathBuf {
    PathBuf::from(var(name).unwrap_or_else(|| default.to_string()))
}

fn non_empty_var(var: Vars<'_>, name: &str) -> Option<String> {
    var(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    fn test_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gateway-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("should create temp dir");
        dir
    }

    /// Configuration for tests; files live under a unique temp directory.
    pub(crate) fn test_config() -> AppConfig {
        let dir = test_dir();

        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            tokens_file: dir.join("tokens.json"),
            analytics_file: dir.join("analytics.jsonl"),
            site_config_file: dir.join("site_config.json"),
            allowed_email_domain: Some("keepa.ir".to_string()),
            auth: AuthSettings {
                mode: AuthMode::Demo,
                demo_password: "demo1234".to_string(),
            },
            jwt: JwtSettings {
                secret: Some("test-secret-key-for-testing-only".to_string()),
                issuer: "login-app".to_string(),
                audience: "other-site".to_string(),
                lifetime_seconds: 900,
                algorithm: SigningAlgorithm::HS256,
            },
            other_site_url: Some("https://other.example.com/welcome".to_string()),
        }
    }

    /// CLI configuration for tests, rooted in a unique temp directory.
    pub(crate) fn test_cli_config() -> CliConfig {
        let dir = test_dir();

        CliConfig {
            app_origin: "http://127.0.0.1:5000".to_string(),
            tokens_file: dir.join("tokens.json"),
            site_config_file: dir.join("site_config.json"),
            env_file: dir.join(".env"),
            allowed_email_domain: Some("keepa.ir".to_string()),
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let map = vars(pairs);
        AppConfig::from_vars(&|name: &str| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).expect("defaults should load");
        assert_eq!(config.port, 5000);
        assert_eq!(config.tokens_file, Path::new("tokens.json"));
        assert_eq!(config.auth.mode, AuthMode::Disabled);
        assert_eq!(config.jwt.lifetime_seconds, 900);
        assert_eq!(config.jwt.algorithm, SigningAlgorithm::HS256);
        assert!(config.jwt.secret.is_none());
        assert!(config.other_site_url.is_none());
    }

    #[test]
    fn test_signing_algorithm_from_env() {
        let config = load(&[("JWT_ALG", "hs512")]).unwrap();
        assert_eq!(config.jwt.algorithm, SigningAlgorithm::HS512);

        let err = load(&[("JWT_ALG", "RS256")]).unwrap_err();
        assert!(err.to_string().contains("JWT_ALG"));
    }

    #[test]
    fn test_lifetime_bounds() {
        assert_eq!(
            load(&[("JWT_LIFETIME_SECONDS", "86400")])
                .unwrap()
                .jwt
                .lifetime_seconds,
            MAX_JWT_LIFETIME_SECONDS
        );
        for raw in ["0", "-5", "86401", "1000000000000000000", "soon"] {
            assert!(
                load(&[("JWT_LIFETIME_SECONDS", raw)]).is_err(),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = load(&[("JWT_SECRET", "  "), ("ALLOWED_EMAIL_DOMAIN", "")]).unwrap();
        assert!(config.jwt.secret.is_none());
        assert!(config.allowed_email_domain.is_none());
    }

    #[test]
    fn test_cli_config_ignores_server_settings() {
        let map = vars(&[
            ("PORT", "not-a-port"),
            ("JWT_ALG", "RS256"),
            ("APP_ORIGIN", "https://login.keepa.ir/"),
            ("TOKENS_FILE", "/srv/tokens.json"),
        ]);
        let config = CliConfig::from_vars(&|name: &str| map.get(name).cloned());

        assert_eq!(config.app_origin, "https://login.keepa.ir");
        assert_eq!(config.tokens_file, Path::new("/srv/tokens.json"));
        assert_eq!(config.env_file, Path::new(".env"));
        assert!(AppConfig::from_vars(&|name: &str| map.get(name).cloned()).is_err());
    }

    #[test]
    fn test_link_url() {
        let config = test_cli_config();
        assert_eq!(
            config.link_url("abc123"),
            "http://127.0.0.1:5000/t/abc123"
        );
    }
}
