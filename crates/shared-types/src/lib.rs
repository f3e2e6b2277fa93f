use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shareable link that prefills the login form with a stored email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkToken {
    pub token: String,
    pub email: String,
}

/// Kinds of analytics events written by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TokenVisit,
    LoginInvalidInput,
    LoginFailed,
    LoginSuccess,
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::TokenVisit => "token_visit",
            EventKind::LoginInvalidInput => "login_invalid_input",
            EventKind::LoginFailed => "login_failed",
            EventKind::LoginSuccess => "login_success",
        }
    }
}

/// One line of `analytics.jsonl`.
///
/// Never carries a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    pub ip: String,
    #[serde(rename = "ua")]
    pub user_agent: String,
    pub event: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AnalyticsEvent {
    pub fn new(event: EventKind, ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            ip: ip.into(),
            user_agent: user_agent.into(),
            event,
            email: None,
            token: None,
            reason: None,
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

// ============================================================================
// Site presentation settings
// ============================================================================

pub const DEFAULT_ACCENT: &str = "#facc15";

/// Operator-edited presentation settings stored in `site_config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub rtl: bool,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Accent colour used for buttons and focus rings. Older files call it `yellow`.
    #[serde(default = "default_accent", alias = "yellow")]
    pub accent: String,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            accent: default_accent(),
        }
    }
}

fn default_accent() -> String {
    DEFAULT_ACCENT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_wire_names() {
        for kind in [
            EventKind::TokenVisit,
            EventKind::LoginInvalidInput,
            EventKind::LoginFailed,
            EventKind::LoginSuccess,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_event_omits_absent_fields() {
        let event = AnalyticsEvent::new(EventKind::LoginFailed, "10.0.0.1", "curl/8.0")
            .with_email(Some("user@keepa.ir".to_string()));
        let value: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["event"], "login_failed");
        assert_eq!(value["ip"], "10.0.0.1");
        assert_eq!(value["ua"], "curl/8.0");
        assert_eq!(value["email"], "user@keepa.ir");
        assert!(value.get("ts").is_some());
        assert!(value.get("token").is_none());
        assert!(value.get("reason").is_none());
    }

    #[test]
    fn test_site_config_defaults_and_legacy_key() {
        let parsed: SiteConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, SiteConfig::default());

        let legacy: SiteConfig =
            serde_json::from_str(r##"{"rtl": true, "theme": {"yellow": "#ffcc00"}}"##).unwrap();
        assert!(legacy.rtl);
        assert_eq!(legacy.theme.accent, "#ffcc00");
    }
}
