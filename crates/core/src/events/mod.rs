//! Typed event bus for host-facing notifications.
//!
//! The engine publishes named events with typed payloads; the host (or the
//! server wiring) subscribes to react, e.g. invalidating cache slots when a
//! managed plugin changes version. The bus knows nothing about the UI layer.

use std::sync::RwLock;

/// Events published by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A catalog-managed plugin was installed or changed version locally.
    PluginUpdated { slug: String, version: String },
    /// At least one `PluginUpdated` fired during a check pass.
    PluginsUpdated,
    /// A snapshot refresh committed.
    CatalogRefreshed {
        fetched: usize,
        retained: usize,
        failed: usize,
    },
}

type Subscriber = Box<dyn Fn(&Event) + Send + Sync>;

/// Synchronous publish/subscribe bus.
///
/// Subscribers run inline on `emit`; handlers are expected to be cheap
/// (cache invalidation, counters). Cheaply shareable behind an `Arc`.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for all events.
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.subscribers.write().unwrap().push(Box::new(handler));
    }

    /// Publish an event to all subscribers, in registration order.
    pub fn emit(&self, event: &Event) {
        for handler in self.subscribers.read().unwrap().iter() {
            handler(event);
        }
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().unwrap().len()
    }
}
