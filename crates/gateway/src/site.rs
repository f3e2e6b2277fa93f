//! Operator-edited presentation settings (`site_config.json`).

use shared_types::SiteConfig;
use std::path::Path;

use crate::error::{GatewayError, GatewayResult};
use crate::files;

/// Read the site config, falling back to defaults when the file is missing
/// or unreadable. Called on every render so edits apply without a restart.
pub async fn load(path: &Path) -> SiteConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return SiteConfig::default(),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            return SiteConfig::default();
        }
    };

    if content.trim().is_empty() {
        return SiteConfig::default();
    }

    match serde_json::from_str::<SiteConfig>(&content) {
        Ok(config) if is_valid_colour(&config.theme.accent) => config,
        Ok(mut config) => {
            tracing::warn!(
                "Ignoring invalid accent colour {:?} in {}",
                config.theme.accent,
                path.display()
            );
            config.theme = Default::default();
            config
        }
        Err(e) => {
            tracing::warn!("Invalid site config {}: {}", path.display(), e);
            SiteConfig::default()
        }
    }
}

/// Strict load used by the CLI before editing: a malformed file is an error
/// rather than being silently replaced with defaults.
async fn load_for_edit(path: &Path) -> GatewayResult<SiteConfig> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(SiteConfig::default()),
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SiteConfig::default()),
        Err(e) => Err(e.into()),
    }
}

async fn save(path: &Path, config: &SiteConfig) -> GatewayResult<()> {
    let json = serde_json::to_string_pretty(config)?;
    files::write_atomic(path, json.as_bytes()).await?;
    Ok(())
}

pub async fn set_rtl(path: &Path, enabled: bool) -> GatewayResult<SiteConfig> {
    let mut config = load_for_edit(path).await?;
    config.rtl = enabled;
    save(path, &config).await?;
    Ok(config)
}

pub async fn set_accent(path: &Path, colour: &str) -> GatewayResult<SiteConfig> {
    let colour = colour.trim();
    if !is_valid_colour(colour) {
        return Err(GatewayError::Config(format!(
            "invalid colour {:?}; use #RRGGBB or a CSS colour name",
            colour
        )));
    }

    let mut config = load_for_edit(path).await?;
    config.theme.accent = colour.to_string();
    save(path, &config).await?;
    Ok(config)
}

/// Hex colours, CSS names and `rgb(..)`-style functions; nothing that could
/// break out of a style attribute.
pub fn is_valid_colour(colour: &str) -> bool {
    !colour.is_empty()
        && colour.len() <= 64
        && colour
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '(' | ')' | ',' | '.' | '%' | ' '))
}
