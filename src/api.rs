// Thin endpoint wrappers over the authenticated HTTP client.
// Covers feed management and the version probe; further endpoint groups
// follow the same shape.

use std::sync::Arc;

use serde_json::Value;

use crate::client::VelocityHttpClient;
use crate::error::Result;

/// Velocity REST API surface
pub struct VelocityApi {
    http: Arc<VelocityHttpClient>,
}

impl VelocityApi {
    pub fn new(http: Arc<VelocityHttpClient>) -> Self {
        Self { http }
    }

    /// Velocity API version
    pub async fn version(&self) -> Result<Value> {
        self.http.get("/iot/api/version", None).await
    }

    // ========== Feed Management ==========

    /// All feeds
    pub async fn feeds(&self) -> Result<Value> {
        self.http.get("/iot/feed", None).await
    }

    /// A specific feed by ID
    pub async fn feed(&self, feed_id: &str) -> Result<Value> {
        self.http.get(&format!("/iot/feed/{}", feed_id), None).await
    }

    /// Create a new feed
    pub async fn create_feed(&self, definition: &Value) -> Result<Value> {
        self.http.post("/iot/feed", Some(definition)).await
    }

    /// Update an existing feed
    pub async fn update_feed(&self, feed_id: &str, definition: &Value) -> Result<Value> {
        self.http
            .put(&format!("/iot/feed/{}", feed_id), definition)
            .await
    }

    /// Delete a feed
    pub async fn delete_feed(&self, feed_id: &str) -> Result<Value> {
        self.http.delete(&format!("/iot/feed/{}", feed_id)).await
    }

    /// Start a feed
    pub async fn start_feed(&self, feed_id: &str) -> Result<Value> {
        self.http
            .get(&format!("/iot/feed/{}/start", feed_id), None)
            .await
    }

    /// Stop a feed
    pub async fn stop_feed(&self, feed_id: &str) -> Result<Value> {
        self.http
            .get(&format!("/iot/feed/{}/stop", feed_id), None)
            .await
    }

    /// Status of a feed
    pub async fn feed_status(&self, feed_id: &str) -> Result<Value> {
        self.http
            .get(&format!("/iot/feed/{}/status", feed_id), None)
            .await
    }

    /// Status of all feeds, optionally filtered by item IDs
    pub async fn all_feed_status(&self, item_ids: Option<&str>) -> Result<Value> {
        let query = item_ids.map(|ids| [("itemIds", ids)]);
        self.http
            .get("/iot/feed/status", query.as_ref().map(|q| q.as_slice()))
            .await
    }
}
