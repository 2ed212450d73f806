//! Entry-screen handling of the movie database API key.

use std::sync::Arc;

use anyhow::{Context, Result};
use shared::error::GameError;
use storage::{CredentialStore, TMDB_API_KEY_SLOT};
use tracing::{info, warn};

use crate::provider::MovieProvider;

#[derive(Debug)]
pub enum RestoreOutcome {
    /// Stored key is still accepted by the provider.
    Valid(String),
    /// Stored key was rejected and has been removed.
    Revoked,
    Missing,
}

pub struct CredentialGate {
    store: Arc<dyn CredentialStore>,
    provider: Arc<dyn MovieProvider>,
}

impl CredentialGate {
    pub fn new(store: Arc<dyn CredentialStore>, provider: Arc<dyn MovieProvider>) -> Self {
        Self { store, provider }
    }

    /// Revalidates a previously stored key.
    ///
    /// A network failure keeps the stored key and returns the error so the caller can
    /// decide whether to prompt anyway.
    pub async fn restore(&self) -> Result<RestoreOutcome> {
        let Some(stored) = self
            .store
            .get(TMDB_API_KEY_SLOT)
            .await
            .context("failed to read stored API key")?
        else {
            return Ok(RestoreOutcome::Missing);
        };

        if self.provider.authenticate(&stored).await? {
            info!("restored stored API key");
            return Ok(RestoreOutcome::Valid(stored));
        }

        warn!("stored API key was rejected, removing it");
        self.store
            .remove(TMDB_API_KEY_SLOT)
            .await
            .context("failed to remove rejected API key")?;
        Ok(RestoreOutcome::Revoked)
    }

    /// Validates a key typed by the user and persists it when accepted.
    ///
    /// Rejections come back as [`GameError`] values (`EmptyCredential`,
    /// `CredentialInvalid`, `Network`) so the entry screen can show them.
    pub async fn submit(&self, raw_key: &str) -> Result<String> {
        let key = raw_key.trim();
        if key.is_empty() {
            return Err(GameError::EmptyCredential.into());
        }

        if !self.provider.authenticate(key).await? {
            return Err(GameError::CredentialInvalid.into());
        }

        self.store
            .set(TMDB_API_KEY_SLOT, key)
            .await
            .context("failed to store API key")?;
        info!("API key accepted and stored");
        Ok(key.to_string())
    }

    pub async fn reset(&self) -> Result<()> {
        self.store
            .remove(TMDB_API_KEY_SLOT)
            .await
            .context("failed to remove stored API key")?;
        info!("stored API key removed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/credentials_tests.rs"]
mod tests;
