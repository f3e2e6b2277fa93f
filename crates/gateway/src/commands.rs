//! Operator commands run by `gateway-cli`.
//!
//! Each command writes its human-readable output to `out` and returns the
//! process exit status: [`EXIT_OK`], or [`EXIT_USAGE`] when the operator's
//! input was rejected. I/O and parse failures propagate as errors.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::auth::EmailPolicy;
use crate::config::CliConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::files;
use crate::site;
use crate::store::TokenStore;

pub const EXIT_OK: u8 = 0;
pub const EXIT_USAGE: u8 = 2;

const DOMAIN_KEY: &str = "ALLOWED_EMAIL_DOMAIN";

fn token_store(config: &CliConfig) -> TokenStore {
    TokenStore::new(
        config.tokens_file.clone(),
        EmailPolicy::new(config.allowed_email_domain.clone()),
    )
}

/// Create a link token for `email` and print it with its shareable URL.
pub async fn add(config: &CliConfig, email: &str, out: &mut impl Write) -> GatewayResult<u8> {
    let email = email.trim();
    if !email.contains('@') {
        writeln!(out, "Email address must contain @")?;
        return Ok(EXIT_USAGE);
    }

    match token_store(config).create(email).await {
        Ok(token) => {
            writeln!(out, "Created token: {}", token)?;
            writeln!(out, "Shareable link: {}", config.link_url(&token))?;
            Ok(EXIT_OK)
        }
        Err(GatewayError::InvalidEmail(reason)) => {
            writeln!(out, "{}", reason)?;
            Ok(EXIT_USAGE)
        }
        Err(e) => Err(e),
    }
}

pub async fn list(config: &CliConfig, out: &mut impl Write) -> GatewayResult<u8> {
    let tokens = token_store(config).list().await?;
    if tokens.is_empty() {
        writeln!(out, "No tokens saved.")?;
    }
    for link in tokens {
        writeln!(out, "{}\t{}", link.token, link.email)?;
    }
    Ok(EXIT_OK)
}

pub async fn delete(config: &CliConfig, token: &str, out: &mut impl Write) -> GatewayResult<u8> {
    match token_store(config).delete(token.trim()).await {
        Ok(()) => {
            writeln!(out, "Deleted.")?;
            Ok(EXIT_OK)
        }
        Err(GatewayError::TokenNotFound) => {
            writeln!(out, "Token not found.")?;
            Ok(EXIT_USAGE)
        }
        Err(e) => Err(e),
    }
}

pub async fn set_rtl(
    config: &CliConfig,
    enabled: bool,
    out: &mut impl Write,
) -> GatewayResult<u8> {
    let updated = site::set_rtl(&config.site_config_file, enabled).await?;
    writeln!(out, "RTL set to: {}", updated.rtl)?;
    Ok(EXIT_OK)
}

pub async fn set_accent(
    config: &CliConfig,
    colour: &str,
    out: &mut impl Write,
) -> GatewayResult<u8> {
    match site::set_accent(&config.site_config_file, colour).await {
        Ok(updated) => {
            writeln!(out, "Accent colour set to: {}", updated.theme.accent)?;
            Ok(EXIT_OK)
        }
        Err(GatewayError::Config(reason)) => {
            writeln!(out, "{}", reason)?;
            Ok(EXIT_USAGE)
        }
        Err(e) => Err(e),
    }
}

/// Persist `ALLOWED_EMAIL_DOMAIN` in the dotenv file, replacing any previous
/// value and keeping every other line. Takes effect on the next start.
pub async fn set_domain(
    config: &CliConfig,
    domain: &str,
    out: &mut impl Write,
) -> GatewayResult<u8> {
    let domain = domain.trim().to_lowercase();
    if !is_bare_domain(&domain) {
        writeln!(out, "Provide a bare domain like keepa.ir (no @).")?;
        return Ok(EXIT_USAGE);
    }

    let existing = match tokio::fs::read_to_string(&config.env_file).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let entry = format!("{}={}", DOMAIN_KEY, domain);
    let mut lines: Vec<&str> = existing
        .lines()
        .filter(|line| {
            line.split_once('=')
                .map_or(true, |(key, _)| key.trim() != DOMAIN_KEY)
        })
        .collect();
    lines.push(&entry);

    let mut contents = lines.join("\n");
    contents.push('\n');
    files::write_atomic(&config.env_file, contents.as_bytes()).await?;

    tracing::info!("Set {} in {}", DOMAIN_KEY, config.env_file.display());
    writeln!(out, "{} set to: {}", DOMAIN_KEY, domain)?;
    Ok(EXIT_OK)
}

fn is_bare_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain.contains('.')
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Copy `<name>.sample.json` next to each working file that does not exist
/// yet. Existing files are never overwritten.
pub async fn init_samples(config: &CliConfig, out: &mut impl Write) -> GatewayResult<u8> {
    let mut created = 0;
    for target in [&config.site_config_file, &config.tokens_file] {
        let sample = sample_path(target);
        if tokio::fs::try_exists(target).await? || !tokio::fs::try_exists(&sample).await? {
            continue;
        }

        tokio::fs::copy(&sample, target).await?;
        writeln!(out, "Created {} from {}", target.display(), sample.display())?;
        created += 1;
    }

    if created == 0 {
        writeln!(out, "Nothing to initialise.")?;
    }
    Ok(EXIT_OK)
}

/// `site_config.json` -> `site_config.sample.json`, in the same directory.
pub fn sample_path(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!("{}.sample.json", stem))
}
