//! Append-only analytics log (`analytics.jsonl`).

use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use shared_types::{AnalyticsEvent, EventKind};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Writes one JSON object per line. The running service never reads it back.
#[derive(Debug, Clone)]
pub struct AnalyticsSink {
    path: PathBuf,
}

impl AnalyticsSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event. Failures are logged and swallowed so they never
    /// interrupt the user flow.
    pub async fn record(&self, event: AnalyticsEvent) {
        if let Err(e) = self.append(&event).await {
            tracing::warn!(
                "Failed to write {} analytics event to {}: {}",
                event.event.as_str(),
                self.path.display(),
                e
            );
        }
    }

    async fn append(&self, event: &AnalyticsEvent) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Client details attached to every analytics event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub ip: String,
    pub user_agent: String,
}

impl RequestMeta {
    pub fn event(&self, kind: EventKind) -> AnalyticsEvent {
        AnalyticsEvent::new(kind, self.ip.clone(), self.user_agent.clone())
    }

    fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let ip = forwarded
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| "unknown".to_string());

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Self { ip, user_agent }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(RequestMeta::from_parts(&parts.headers, peer))
    }
}
