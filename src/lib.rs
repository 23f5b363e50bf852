// ArcGIS Velocity client core
// Portal token lifecycle management and authenticated request plumbing

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;

pub use api::VelocityApi;
pub use auth::{Credential, CredentialManager, Identity};
pub use client::VelocityHttpClient;
pub use config::Config;
pub use error::{Result, VelocityError};
