//! File-backed store of shareable link tokens.
//!
//! The whole `tokens.json` document is read, modified and written back on
//! every mutation. There is no cross-process locking, so a CLI write racing a
//! server write can lose one of them; writes are operator-driven and rare.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use shared_types::LinkToken;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::auth::EmailPolicy;
use crate::error::{GatewayError, GatewayResult};
use crate::files;

/// Random bytes per token before encoding.
const TOKEN_BYTES: usize = 10;

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
    policy: EmailPolicy,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>, policy: EmailPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a token for `email` and persist it.
    pub async fn create(&self, email: &str) -> GatewayResult<String> {
        let email = email.trim();
        self.policy.validate(email)?;

        let mut tokens = self.load().await?;
        let token = loop {
            let candidate = generate_token();
            if !tokens.contains_key(&candidate) {
                break candidate;
            }
        };
        tokens.insert(token.clone(), email.to_string());
        self.save(&tokens).await?;

        tracing::info!("Created link token for {}", email);
        Ok(token)
    }

    /// All tokens, ordered by token.
    pub async fn list(&self) -> GatewayResult<Vec<LinkToken>> {
        let tokens = self.load().await?;
        Ok(tokens
            .into_iter()
            .map(|(token, email)| LinkToken { token, email })
            .collect())
    }

    /// Remove a token. Returns `TokenNotFound` if it was not present.
    pub async fn delete(&self, token: &str) -> GatewayResult<()> {
        let mut tokens = self.load().await?;
        if tokens.remove(token).is_none() {
            return Err(GatewayError::TokenNotFound);
        }
        self.save(&tokens).await?;

        tracing::info!("Deleted link token {}", token);
        Ok(())
    }

    pub async fn lookup(&self, token: &str) -> GatewayResult<String> {
        let mut tokens = self.load().await?;
        tokens.remove(token).ok_or(GatewayError::TokenNotFound)
    }

    async fn load(&self) -> GatewayResult<BTreeMap<String, String>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, tokens: &BTreeMap<String, String>) -> GatewayResult<()> {
        let json = serde_json::to_string_pretty(tokens)?;
        files::write_atomic(&self.path, json.as_bytes()).await?;
        Ok(())
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
