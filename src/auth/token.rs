// Portal token generation

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;

use super::types::{Credential, Identity, TokenResponse};
use crate::error::{Result, VelocityError};

/// Validity window assumed when the portal response carries no expiry
const FALLBACK_VALIDITY_MINUTES: i64 = 55;

/// Build the generateToken URL for a portal
fn generate_token_url(portal_url: &str) -> String {
    format!("{}/sharing/rest/generateToken", portal_url)
}

/// Request a new token from the portal for the given identity.
///
/// The portal distinguishes outcomes inside a 200 body: a rejection is an
/// `error` object, not an HTTP error status. Transport failures and server
/// errors map to [`VelocityError::Provider`]; a rejection of the stored
/// username/password maps to [`VelocityError::Authentication`].
pub(super) async fn generate(
    client: &Client,
    identity: &Identity,
    expiration_minutes: u32,
) -> Result<Credential> {
    let url = generate_token_url(&identity.portal_url);
    tracing::debug!(url = %url, username = %identity.username, "Requesting portal token");

    let expiration = expiration_minutes.to_string();
    let form = [
        ("username", identity.username.as_str()),
        ("password", identity.password.as_str()),
        ("referer", identity.base_url.as_str()),
        ("f", "json"),
        ("expiration", expiration.as_str()),
    ];

    let response = client
        .post(&url)
        .form(&form)
        .send()
        .await
        .map_err(|e| VelocityError::Provider(format!("portal request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), body = %body, "Portal returned error status");
        return Err(VelocityError::Provider(format!(
            "portal returned {}: {}",
            status, body
        )));
    }

    let data: TokenResponse = response
        .json()
        .await
        .map_err(|e| VelocityError::Provider(format!("invalid portal response: {}", e)))?;

    let credential = credential_from_response(data)?;
    tracing::info!(expires_at = %credential.expires_at.to_rfc3339(), "Issued new portal token");
    Ok(credential)
}

/// Turn a parsed portal response into a Credential
fn credential_from_response(response: TokenResponse) -> Result<Credential> {
    if let Some(error) = response.error {
        let message = if error.details.is_empty() {
            error.message
        } else {
            format!("{} ({})", error.message, error.details.join("; "))
        };
        return Err(VelocityError::Authentication(format!(
            "portal rejected credentials: {} (code {})",
            message, error.code
        )));
    }

    let token = match response.token {
        Some(token) if !token.is_empty() => token,
        _ => {
            return Err(VelocityError::Provider(
                "portal response contains neither token nor error".to_string(),
            ))
        }
    };

    let issued_at = Utc::now();
    let expires_at = response
        .expires
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(|| issued_at + Duration::minutes(FALLBACK_VALIDITY_MINUTES));

    Ok(Credential {
        token,
        issued_at,
        expires_at,
    })
}
