use std::str::FromStr;

use crate::auth::{Identity, DEFAULT_REFRESH_MARGIN_SECS, DEFAULT_TOKEN_EXPIRATION_MINUTES};
use crate::error::{Result, VelocityError};

/// Velocity client configuration
#[derive(Clone, Debug)]
pub struct Config {
    // Identity
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub portal_url: String,

    // Token lifecycle
    pub token_expiration_minutes: u32,
    pub refresh_margin_secs: u64,

    // HTTP client
    pub http_max_connections: usize,
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,
}

impl Config {
    /// Load configuration from the environment, honoring a .env file
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config {
            base_url: normalize_url(&required_env("VELOCITY_BASE_URL")?),
            username: required_env("VELOCITY_USERNAME")?,
            password: required_env("VELOCITY_PASSWORD")?,
            portal_url: normalize_url(&required_env("VELOCITY_PORTAL_URL")?),

            token_expiration_minutes: env_or(
                "VELOCITY_TOKEN_EXPIRATION_MINUTES",
                DEFAULT_TOKEN_EXPIRATION_MINUTES,
            ),
            refresh_margin_secs: env_or("VELOCITY_REFRESH_MARGIN_SECS", DEFAULT_REFRESH_MARGIN_SECS),

            http_max_connections: env_or("HTTP_MAX_CONNECTIONS", 20),
            http_connect_timeout: env_or("HTTP_CONNECT_TIMEOUT", 30),
            http_request_timeout: env_or("HTTP_REQUEST_TIMEOUT", 30),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("VELOCITY_BASE_URL", &self.base_url),
            ("VELOCITY_PORTAL_URL", &self.portal_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(VelocityError::Configuration(format!(
                    "{} must be an http(s) URL, got: {}",
                    name, value
                )));
            }
        }

        if self.username.is_empty() {
            return Err(VelocityError::Configuration(
                "VELOCITY_USERNAME must not be empty".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(VelocityError::Configuration(
                "VELOCITY_PASSWORD must not be empty".to_string(),
            ));
        }
        if self.token_expiration_minutes == 0 {
            return Err(VelocityError::Configuration(
                "VELOCITY_TOKEN_EXPIRATION_MINUTES must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Identity fields used to obtain portal tokens
    pub fn identity(&self) -> Identity {
        Identity {
            username: self.username.clone(),
            password: self.password.clone(),
            portal_url: self.portal_url.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

/// Read a required environment variable, rejecting missing or blank values
fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(VelocityError::Configuration(format!(
            "{} environment variable is required",
            name
        ))),
    }
}

/// Read an optional environment variable, falling back on missing or unparsable values
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Strip trailing slashes so paths can be appended directly
fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
