use std::sync::Arc;

use plugsync_core::{
    CatalogSync, Config, DirectorySync, EventBus, LocalPlugins, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    catalog_sync: CatalogSync,
    directory_sync: Option<DirectorySync>,
    local: Arc<dyn LocalPlugins>,
    events: Arc<EventBus>,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog_sync: CatalogSync,
        directory_sync: Option<DirectorySync>,
        local: Arc<dyn LocalPlugins>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            config,
            catalog_sync,
            directory_sync,
            local,
            events,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn catalog_sync(&self) -> &CatalogSync {
        &self.catalog_sync
    }

    pub fn directory_sync(&self) -> Option<&DirectorySync> {
        self.directory_sync.as_ref()
    }

    pub fn local(&self) -> &dyn LocalPlugins {
        self.local.as_ref()
    }

    #[allow(dead_code)]
    pub fn events(&self) -> &EventBus {
        self.events.as_ref()
    }
}
