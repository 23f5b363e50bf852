use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::{json, Value};

use crate::auth::CredentialManager;
use crate::error::{Result, VelocityError};

/// HTTP client for the Velocity API with transparent token handling.
///
/// Every request obtains a valid token from the credential manager first.
/// If the API still rejects the request as unauthenticated, the cached
/// token is invalidated and the request retried exactly once with a
/// freshly generated token. This owns only the authentication-retry
/// dimension: rate limits and server errors are surfaced as-is.
pub struct VelocityHttpClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Credential manager for the target identity
    credentials: Arc<CredentialManager>,

    /// Velocity instance base URL
    base_url: String,
}

impl VelocityHttpClient {
    /// Create a new HTTP client
    pub fn new(
        credentials: Arc<CredentialManager>,
        max_connections: usize,
        connect_timeout: u64,
        request_timeout: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(max_connections)
            .connect_timeout(Duration::from_secs(connect_timeout))
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = credentials.base_url().to_string();

        Ok(Self {
            client,
            credentials,
            base_url,
        })
    }

    /// Execute a request against the API with the single auth retry.
    ///
    /// `path` is appended to the instance base URL. Empty and 204
    /// responses yield `{"success": true}`; everything else is parsed
    /// as JSON.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.endpoint_url(path);
        tracing::debug!(method = %method, url = %url, "Sending Velocity API request");

        let credential = self.credentials.get_credential().await?;
        let response = self
            .send(&method, &url, query, body, &credential.token)
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::handle_response(response, &url).await;
        }

        // The token was rejected even though the clock considered it valid
        // (expired early or revoked out-of-band). Force regeneration and
        // retry exactly once; a second rejection is terminal.
        tracing::warn!(url = %url, "Authentication rejected, regenerating token and retrying");
        self.credentials.invalidate().await;
        let credential = self.credentials.get_credential().await?;

        let response = self
            .send(&method, &url, query, body, &credential.token)
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(url = %url, "Request still unauthenticated after token regeneration");
            return Err(VelocityError::Authentication(format!(
                "request to {} rejected after token regeneration: {}",
                url, message
            )));
        }

        Self::handle_response(response, &url).await
    }

    /// GET with optional query parameters
    pub async fn get(&self, path: &str, query: Option<&[(&str, &str)]>) -> Result<Value> {
        self.request(Method::GET, path, query, None).await
    }

    /// POST with optional JSON body
    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
        self.request(Method::POST, path, None, body).await
    }

    /// PUT with a JSON body
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, path, None, Some(body)).await
    }

    /// DELETE
    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, None, None).await
    }

    /// Single request attempt with the given token attached
    async fn send(
        &self,
        method: &Method,
        url: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
        token: &str,
    ) -> Result<Response> {
        let mut builder = self
            .client
            .request(method.clone(), url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json");

        if let Some(query) = query {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        Ok(response)
    }

    /// Convert a non-401 response into a result
    async fn handle_response(response: Response, url: &str) -> Result<Value> {
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                url = %url,
                response_body = %message,
                "Velocity API request failed"
            );
            return Err(VelocityError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // Some endpoints answer with no content
        if status == StatusCode::NO_CONTENT {
            return Ok(json!({"success": true}));
        }

        let bytes = response
            .bytes()
            .await
            .context("failed to read response body")?;
        if bytes.is_empty() {
            return Ok(json!({"success": true}));
        }

        let value =
            serde_json::from_slice(&bytes).context("failed to parse response body as JSON")?;
        Ok(value)
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;

    fn test_client() -> VelocityHttpClient {
        let identity = Identity {
            username: "analyst".to_string(),
            password: "secret".to_string(),
            portal_url: "https://www.arcgis.com".to_string(),
            base_url: "https://velocity.arcgis.com".to_string(),
        };
        let credentials = Arc::new(CredentialManager::new(identity).unwrap());
        VelocityHttpClient::new(credentials, 20, 30, 30).unwrap()
    }

    #[test]
    fn test_endpoint_url_joins_base_and_path() {
        let client = test_client();
        assert_eq!(
            client.endpoint_url("/iot/feed"),
            "https://velocity.arcgis.com/iot/feed"
        );
    }
}
