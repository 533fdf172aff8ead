//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. The two read-policy flags exist because the legacy system
//! is deliberately inconsistent about soft-delete filtering; the
//! defaults reproduce its behavior (see `mercado_db::ReadPolicy`).

use mercado_db::ReadPolicy;
use std::env;

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP port to listen on.
    pub port: u16,

    /// Path to the SQLite database file.
    pub database_path: String,

    /// Whether the product list-all read keeps soft-deleted rows.
    pub product_list_includes_deleted: bool,

    /// Whether the sale-update existence check requires a live row.
    pub sale_update_checks_deleted: bool,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./mercado.db".to_string()),

            product_list_includes_deleted: env::var("PRODUCT_LIST_INCLUDES_DELETED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("PRODUCT_LIST_INCLUDES_DELETED".to_string())
                })?,

            sale_update_checks_deleted: env::var("SALE_UPDATE_CHECKS_DELETED")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SALE_UPDATE_CHECKS_DELETED".to_string()))?,
        };

        Ok(config)
    }

    /// The soft-delete read policy implied by this configuration.
    pub fn read_policy(&self) -> ReadPolicy {
        ReadPolicy {
            product_list_includes_deleted: self.product_list_includes_deleted,
            sale_update_checks_deleted: self.sale_update_checks_deleted,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_legacy_behavior() {
        // No env manipulation here; the test relies on the variables
        // being unset in the test environment.
        let config = ApiConfig::load().unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.product_list_includes_deleted);
        assert!(!config.sale_update_checks_deleted);
    }
}
