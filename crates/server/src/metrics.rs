//! Prometheus metrics exposition.
//!
//! Registers the engine's metrics in one registry and renders the text
//! format for the `/metrics` endpoint.

use once_cell::sync::Lazy;
use prometheus::{Encoder, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    for metric in plugsync_core::metrics::all_metrics() {
        registry
            .register(metric)
            .expect("Failed to register core metric");
    }
    registry
});

/// Render all registered metrics in the Prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&REGISTRY.gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
