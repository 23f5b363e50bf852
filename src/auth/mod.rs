// Authentication module
// Owns the portal token lifecycle: generation, caching, proactive refresh

mod manager;
mod token;
mod types;

pub use manager::{
    CredentialManager, DEFAULT_REFRESH_MARGIN_SECS, DEFAULT_TOKEN_EXPIRATION_MINUTES,
};
pub use types::{Credential, Identity};
