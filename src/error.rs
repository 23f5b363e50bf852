// Error handling module
// Defines the error taxonomy for configuration, authentication and API calls

use thiserror::Error;

/// Errors that can occur while configuring the client or talking to
/// the portal and the Velocity API
#[derive(Error, Debug)]
pub enum VelocityError {
    /// Required configuration is missing or malformed (fatal at startup)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The portal rejected the stored credentials, or a request still
    /// failed authentication after a forced token regeneration
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The portal was unreachable or returned a server error while a
    /// token was being generated; any previously cached token is kept
    #[error("Identity provider unavailable: {0}")]
    Provider(String),

    /// Non-authentication error response from the Velocity API
    #[error("Velocity API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, VelocityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = VelocityError::Configuration("VELOCITY_BASE_URL is required".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: VELOCITY_BASE_URL is required"
        );

        let err = VelocityError::Authentication("Invalid username or password".to_string());
        assert_eq!(
            err.to_string(),
            "Authentication failed: Invalid username or password"
        );

        let err = VelocityError::Provider("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "Identity provider unavailable: connection refused"
        );

        let err = VelocityError::Api {
            status: 429,
            message: "Rate limit exceeded".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Velocity API error: 429 - Rate limit exceeded"
        );
    }

    #[test]
    fn test_internal_error_message() {
        let err = VelocityError::Internal(anyhow::anyhow!("Something went wrong"));
        assert_eq!(err.to_string(), "Internal error: Something went wrong");
    }

    #[test]
    fn test_internal_error_from_anyhow() {
        fn fails() -> Result<()> {
            Err(anyhow::anyhow!("glue failure"))?;
            Ok(())
        }

        assert!(matches!(fails(), Err(VelocityError::Internal(_))));
    }
}
