use anyhow::Context;
use chrono::Duration;
use reqwest::Client;
use tokio::sync::{Mutex, RwLock};

use super::token;
use super::types::{Credential, Identity};
use crate::config::Config;
use crate::error::Result;

/// Lead time before the declared expiry at which a token is regenerated
/// proactively, so a token handed to a caller is never found expired
/// mid-flight (default: 300 = 5 minutes)
pub const DEFAULT_REFRESH_MARGIN_SECS: u64 = 300;

/// Validity in minutes requested from the portal per token
pub const DEFAULT_TOKEN_EXPIRATION_MINUTES: u32 = 60;

/// Credential manager
/// Maintains at most one live portal token per identity, regenerating it
/// on demand when it is missing, expiring soon, or explicitly invalidated
pub struct CredentialManager {
    /// Fixed identity used against the portal
    identity: Identity,

    /// HTTP client for token requests
    client: Client,

    /// Current token, absent until first issuance
    credential: RwLock<Option<Credential>>,

    /// Held for the duration of a regeneration so concurrent callers
    /// wait for the in-flight result instead of racing the portal
    regeneration: Mutex<()>,

    /// Safety margin before expiry
    refresh_margin: Duration,

    /// Validity requested from the portal
    token_expiration_minutes: u32,
}

impl CredentialManager {
    /// Create a manager with the default refresh margin and token validity
    pub fn new(identity: Identity) -> Result<Self> {
        Self::with_options(
            identity,
            DEFAULT_REFRESH_MARGIN_SECS,
            DEFAULT_TOKEN_EXPIRATION_MINUTES,
        )
    }

    /// Create a manager with explicit refresh margin and token validity
    pub fn with_options(
        identity: Identity,
        refresh_margin_secs: u64,
        token_expiration_minutes: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            identity,
            client,
            credential: RwLock::new(None),
            regeneration: Mutex::new(()),
            refresh_margin: Duration::seconds(refresh_margin_secs as i64),
            token_expiration_minutes,
        })
    }

    /// Create a manager from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_options(
            config.identity(),
            config.refresh_margin_secs,
            config.token_expiration_minutes,
        )
    }

    /// Base URL of the Velocity instance this identity targets
    pub fn base_url(&self) -> &str {
        &self.identity.base_url
    }

    /// Cached token if it still has the safety margin of validity left
    async fn fresh_credential(&self) -> Option<Credential> {
        let credential = self.credential.read().await;
        credential
            .clone()
            .filter(|c| c.is_fresh(self.refresh_margin))
    }

    /// Cached token if it has not actually expired yet
    async fn unexpired_credential(&self) -> Option<Credential> {
        let credential = self.credential.read().await;
        credential.clone().filter(|c| !c.is_expired())
    }

    /// Request a new token from the portal and store it.
    /// A failed request leaves the previous token untouched.
    async fn regenerate(&self) -> Result<Credential> {
        let credential =
            token::generate(&self.client, &self.identity, self.token_expiration_minutes).await?;

        let mut slot = self.credential.write().await;
        *slot = Some(credential.clone());
        Ok(credential)
    }

    /// Get a valid token, regenerating it if necessary.
    /// At most one regeneration is in flight at a time; callers arriving
    /// during one wait for its result rather than starting their own.
    pub async fn get_credential(&self) -> Result<Credential> {
        if let Some(credential) = self.fresh_credential().await {
            return Ok(credential);
        }

        let _guard = self.regeneration.lock().await;

        // Re-check: a concurrent caller may have regenerated while we waited
        if let Some(credential) = self.fresh_credential().await {
            return Ok(credential);
        }

        match self.regenerate().await {
            Ok(credential) => Ok(credential),
            Err(e) => {
                // Graceful degradation: the previous token may still be
                // usable even though proactive regeneration failed
                if let Some(credential) = self.unexpired_credential().await {
                    tracing::warn!(
                        error = %e,
                        expires_at = %credential.expires_at.to_rfc3339(),
                        "Token regeneration failed, using existing token (not yet expired)"
                    );
                    return Ok(credential);
                }
                tracing::error!(error = %e, "Token regeneration failed and no valid token available");
                Err(e)
            }
        }
    }

    /// Discard the cached token unconditionally, without a network call.
    /// The next `get_credential` will regenerate.
    pub async fn invalidate(&self) {
        let mut slot = self.credential.write().await;
        if slot.take().is_some() {
            tracing::debug!("Cached token discarded");
        }
    }
}
