pub mod catalog;
pub mod checker;
pub mod config;
pub mod directory;
pub mod events;
pub mod host;
pub mod listing;
pub mod merge;
pub mod metrics;
pub mod normalize;
pub mod remote;
pub mod sync;
pub mod testing;

pub use catalog::{
    CatalogEntry, CatalogError, CatalogSnapshot, IconSet, SnapshotStore, Slot,
    SqliteSnapshotStore, DEFAULT_TTL_SECS,
};
pub use checker::{CheckerError, SeenVersions, SqliteSeenVersions, UpdateChecker};
pub use config::{
    load_config, load_config_from_str, validate_config, CatalogConfig, Config, ConfigError,
    DirectoryConfig, HostConfig, ProductConfig, RecommendedConfig, SanitizedConfig,
};
pub use directory::{DirectoryClient, DirectorySync, HttpDirectoryClient};
pub use events::{Event, EventBus};
pub use host::{hydrate_installed_versions, FsLocalPlugins, InstalledPlugin, LocalPlugins};
pub use listing::{merge_recommended, order_by_priority, DEFAULT_PRIORITY};
pub use merge::{merge, UpdateRecord, UpdateRegistry};
pub use normalize::{normalize, NormalizeError};
pub use remote::{CatalogClient, FetchError, HttpCatalogClient, RawPluginPayload, VersionRequest};
pub use sync::{CatalogSync, FailureRecord, RefreshOutcome};
