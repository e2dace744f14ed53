//! Mock catalog client for testing.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::remote::{CatalogClient, FetchError, RawPluginPayload, VersionRequest};

/// Mock implementation of the [`CatalogClient`] trait.
///
/// Provides controllable behavior for testing:
/// - Return a configured payload per product key
/// - Fail specific products with injected errors
/// - Track requests for assertions
#[derive(Default)]
pub struct MockCatalogClient {
    payloads: RwLock<HashMap<String, RawPluginPayload>>,
    errors: RwLock<HashMap<String, FetchError>>,
    requests: RwLock<Vec<VersionRequest>>,
}

impl MockCatalogClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the payload returned for a product key. Clears any
    /// injected error for that key.
    pub fn set_payload(&self, key: &str, payload: RawPluginPayload) {
        self.errors.write().unwrap().remove(key);
        self.payloads
            .write()
            .unwrap()
            .insert(key.to_string(), payload);
    }

    /// Fail every fetch for a product key with the given error.
    pub fn set_error(&self, key: &str, error: FetchError) {
        self.errors.write().unwrap().insert(key.to_string(), error);
    }

    /// Requests recorded so far.
    pub fn recorded_requests(&self) -> Vec<VersionRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Number of fetches performed.
    pub fn fetch_count(&self) -> usize {
        self.requests.read().unwrap().len()
    }
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_plugin_version(
        &self,
        request: &VersionRequest,
    ) -> Result<RawPluginPayload, FetchError> {
        self.requests.write().unwrap().push(request.clone());

        if let Some(error) = self.errors.read().unwrap().get(&request.key) {
            return Err(error.clone());
        }

        self.payloads
            .read()
            .unwrap()
            .get(&request.key)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                body: format!("no payload configured for '{}'", request.key),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn request(key: &str) -> VersionRequest {
        VersionRequest {
            key: key.to_string(),
            channel: "stable".to_string(),
            theme_channel: "stable".to_string(),
            installed_version: None,
            host_version: "6.4.2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_configured_payload_is_returned() {
        let client = MockCatalogClient::new();
        client.set_payload("plugsync-backup", fixtures::raw_payload("PlugSync Backup", "1.1.0"));

        let payload = client
            .fetch_plugin_version(&request("plugsync-backup"))
            .await
            .unwrap();
        assert_eq!(payload.version.as_deref(), Some("1.1.0"));
        assert_eq!(client.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_error_injection_persists() {
        let client = MockCatalogClient::new();
        client.set_error("plugsync-backup", FetchError::Timeout);

        for _ in 0..2 {
            let result = client.fetch_plugin_version(&request("plugsync-backup")).await;
            assert!(matches!(result, Err(FetchError::Timeout)));
        }
    }

    #[tokio::test]
    async fn test_unconfigured_key_is_not_found() {
        let client = MockCatalogClient::new();
        let result = client.fetch_plugin_version(&request("mystery")).await;
        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_recorded_requests() {
        let client = MockCatalogClient::new();
        client.set_payload("plugsync-backup", fixtures::raw_payload("PlugSync Backup", "1.1.0"));

        client
            .fetch_plugin_version(&request("plugsync-backup"))
            .await
            .unwrap();

        let recorded = client.recorded_requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].key, "plugsync-backup");
    }
}
