//! HTTP implementation of the catalog client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{ApiResponse, CatalogClient, FetchError, RawPluginPayload, VersionRequest};

/// Path of the plugin-version endpoint under the API base.
pub const PLUGIN_VERSION_ENDPOINT: &str = "/api/open/getPluginVersion";

/// reqwest-based catalog client.
pub struct HttpCatalogClient {
    client: Client,
    api_base: String,
}

impl HttpCatalogClient {
    /// Create a new client for the given API base URL.
    pub fn new(api_base: &str, timeout_secs: u32) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()
            .map_err(|e| FetchError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.api_base, PLUGIN_VERSION_ENDPOINT)
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_plugin_version(
        &self,
        request: &VersionRequest,
    ) -> Result<RawPluginPayload, FetchError> {
        let url = self.endpoint();
        debug!(product = %request.key, "Fetching plugin version");

        let response = self
            .client
            .post(&url)
            .form(&request.params())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let envelope: ApiResponse = response
            .json()
            .await
            .map_err(|e| FetchError::MalformedBody(e.to_string()))?;

        debug!(
            product = %request.key,
            version = ?envelope.result.data.version,
            "Plugin version fetched"
        );

        Ok(envelope.result.data)
    }
}

/// Map reqwest transport failures onto the fetch error taxonomy.
fn map_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::ConnectionFailed(e.to_string())
    } else {
        FetchError::MalformedBody(e.to_string())
    }
}
