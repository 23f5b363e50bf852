// Authentication types

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Fixed identity used to obtain tokens from the portal.
/// Supplied once at startup and immutable for the process lifetime.
#[derive(Clone)]
pub struct Identity {
    /// Portal account name
    pub username: String,

    /// Portal account password
    pub password: String,

    /// Portal URL for token generation (e.g. https://www.arcgis.com)
    pub portal_url: String,

    /// Base URL of the Velocity instance, also sent as the token referer
    pub base_url: String,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("portal_url", &self.portal_url)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// A bearer token together with its validity window
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// True while the token has at least `margin` of validity left
    pub fn is_fresh(&self, margin: Duration) -> bool {
        Utc::now() < self.expires_at - margin
    }

    /// True once the declared expiry has passed
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Portal generateToken response.
/// The portal answers HTTP 200 for both outcomes: a token on success,
/// an error object on rejection.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub token: Option<String>,

    /// Expiry as epoch milliseconds
    pub expires: Option<i64>,

    pub error: Option<PortalError>,
}

/// Error object embedded in a portal response body
#[derive(Deserialize)]
pub struct PortalError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential_expiring_in(seconds: i64) -> Credential {
        Credential {
            token: "token".to_string(),
            issued_at: Utc::now(),
            expires_at: Utc::now() + Duration::seconds(seconds),
        }
    }

    #[test]
    fn test_freshness_respects_margin() {
        let credential = credential_expiring_in(600);

        // 10 minutes left, 5 minute margin - still fresh
        assert!(credential.is_fresh(Duration::seconds(300)));

        // 10 minutes left, 15 minute margin - needs regeneration
        assert!(!credential.is_fresh(Duration::seconds(900)));
    }

    #[test]
    fn test_fresh_token_is_not_expired() {
        let credential = credential_expiring_in(600);
        assert!(!credential.is_expired());
    }

    #[test]
    fn test_expired_token() {
        let credential = credential_expiring_in(-60);
        assert!(credential.is_expired());
        assert!(!credential.is_fresh(Duration::zero()));
    }

    #[test]
    fn test_identity_debug_redacts_password() {
        let identity = Identity {
            username: "analyst".to_string(),
            password: "hunter2".to_string(),
            portal_url: "https://www.arcgis.com".to_string(),
            base_url: "https://velocity.arcgis.com".to_string(),
        };

        let output = format!("{:?}", identity);
        assert!(output.contains("analyst"));
        assert!(output.contains("<redacted>"));
        assert!(!output.contains("hunter2"));
    }
}
