//! Remote catalog service client.
//!
//! One request per product against the catalog's `getPluginVersion`
//! endpoint. No retry lives here; callers own the retry/retention policy.

mod http;
mod types;

pub use http::HttpCatalogClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from one remote catalog call.
///
/// Everything the transport can do wrong surfaces as one of these; nothing
/// escapes this boundary untyped.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Could not reach the service.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The transport's own timeout elapsed.
    #[error("Request timeout")]
    Timeout,

    /// Non-2xx response.
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx response with a body that does not match the envelope.
    #[error("Malformed response body: {0}")]
    MalformedBody(String),
}

/// Trait for remote catalog backends.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Fetch the latest metadata for one product.
    async fn fetch_plugin_version(
        &self,
        request: &VersionRequest,
    ) -> Result<RawPluginPayload, FetchError>;
}
