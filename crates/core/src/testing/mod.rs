//! Test doubles and fixtures.
//!
//! Mock implementations of the client and host traits, plus fixture
//! builders, shared between unit tests and the integration suites.

pub mod fixtures;
mod mock_catalog_client;
mod mock_directory;
mod mock_local_plugins;

pub use mock_catalog_client::MockCatalogClient;
pub use mock_directory::MockDirectoryClient;
pub use mock_local_plugins::MockLocalPlugins;
