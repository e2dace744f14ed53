use std::collections::HashSet;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Catalog section exists (enforced by serde)
/// - Access key is set when products are configured
/// - Product keys are unique and non-empty
/// - TTLs are non-zero
/// - Server port is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.catalog.ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.ttl_secs cannot be 0".to_string(),
        ));
    }

    if !config.catalog.products.is_empty() && config.catalog.access_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.access_key is required when products are configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for product in &config.catalog.products {
        if product.key.is_empty() {
            return Err(ConfigError::ValidationError(
                "catalog product key cannot be empty".to_string(),
            ));
        }
        if product.local_file.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "catalog product '{}' has an empty local_file",
                product.key
            )));
        }
        if !seen.insert(product.key.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate catalog product key '{}'",
                product.key
            )));
        }
    }

    if let Some(directory) = &config.directory {
        if directory.ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "directory.ttl_secs cannot be 0".to_string(),
            ));
        }
        for recommended in &directory.recommended {
            if recommended.slug.is_empty() {
                return Err(ConfigError::ValidationError(
                    "recommended plugin slug cannot be empty".to_string(),
                ));
            }
        }
    }

    Ok(())
}
