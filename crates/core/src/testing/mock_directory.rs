//! Mock directory client for testing.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::catalog::CatalogEntry;
use crate::directory::DirectoryClient;
use crate::remote::FetchError;

/// Mock implementation of the [`DirectoryClient`] trait.
#[derive(Default)]
pub struct MockDirectoryClient {
    entries: RwLock<HashMap<String, CatalogEntry>>,
    errors: RwLock<HashMap<String, FetchError>>,
    requests: RwLock<Vec<String>>,
}

impl MockDirectoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the entry returned for a slug. Clears any injected error.
    pub fn set_entry(&self, slug: &str, entry: CatalogEntry) {
        self.errors.write().unwrap().remove(slug);
        self.entries.write().unwrap().insert(slug.to_string(), entry);
    }

    /// Fail every fetch for a slug with the given error.
    pub fn set_error(&self, slug: &str, error: FetchError) {
        self.errors.write().unwrap().insert(slug.to_string(), error);
    }

    /// Number of fetches performed.
    pub fn fetch_count(&self) -> usize {
        self.requests.read().unwrap().len()
    }
}

#[async_trait]
impl DirectoryClient for MockDirectoryClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn plugin_information(&self, slug: &str) -> Result<CatalogEntry, FetchError> {
        self.requests.write().unwrap().push(slug.to_string());

        if let Some(error) = self.errors.read().unwrap().get(slug) {
            return Err(error.clone());
        }

        self.entries
            .read()
            .unwrap()
            .get(slug)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                body: format!("no entry configured for '{}'", slug),
            })
    }
}
