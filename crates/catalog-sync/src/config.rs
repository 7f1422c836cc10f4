//! # Catalog Configuration
//!
//! Explicit configuration handed to every store and reconciler.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CATALOG_DEFAULT_CURRENCY=EUR                                       │
//! │     CATALOG_MAX_OBJECTS_PER_BATCH=500                                  │
//! │     CATALOG_MAX_TOTAL_OBJECTS=5000                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/catalog-sync/catalog.toml (Linux)                        │
//! │     ~/Library/Application Support/com.catalog.catalog-sync/… (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     USD, 1000 objects per batch, 10000 per request                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # catalog.toml
//! [catalog]
//! default_currency = "USD"
//! max_objects_per_batch = 1000
//! max_total_objects = 10000
//! ```
//!
//! There is no process-wide default client or config. Callers load a
//! `CatalogConfig` once and pass it (usually as `Arc<CatalogConfig>`) to
//! each store they build.

use catalog_core::money::validate_currency_code;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Catalog Settings
// =============================================================================

/// Catalog behavior settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Currency stamped onto money values that carry none.
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Maximum objects in one batch of a batch upsert.
    #[serde(default = "default_max_objects_per_batch")]
    pub max_objects_per_batch: usize,

    /// Maximum objects across all batches of one batch upsert.
    #[serde(default = "default_max_total_objects")]
    pub max_total_objects: usize,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_max_objects_per_batch() -> usize {
    1000
}

fn default_max_total_objects() -> usize {
    10_000
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            default_currency: default_currency(),
            max_objects_per_batch: default_max_objects_per_batch(),
            max_total_objects: default_max_total_objects(),
        }
    }
}

// =============================================================================
// Main Catalog Configuration
// =============================================================================

/// Complete catalog configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub catalog: CatalogSettings,
}

impl CatalogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the settings a store or reconciler runs with.
    ///
    /// Built-in defaults are replaced by `catalog.toml` (from `config_path`
    /// or the platform config directory), which is replaced in turn by any
    /// `CATALOG_*` environment variable. A bad currency code or batch limit
    /// fails here instead of on the first write.
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => Self::read_file(&path)?,
            Some(path) => {
                debug!(?path, "No catalog.toml, starting from built-in settings");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        info!(
            default_currency = %config.catalog.default_currency,
            max_objects_per_batch = config.catalog.max_objects_per_batch,
            max_total_objects = config.catalog.max_total_objects,
            "Catalog settings loaded"
        );
        Ok(config)
    }

    fn read_file(path: &Path) -> SyncResult<Self> {
        info!(?path, "Reading catalog settings");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Like [`load`](Self::load), but an unreadable or invalid file falls
    /// back to USD and the default batch limits.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        match Self::load(config_path) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "Catalog settings rejected, using USD and default batch limits");
                Self::default()
            }
        }
    }

    /// Writes the settings as `catalog.toml`, creating its directory.
    ///
    /// Settings that would fail [`validate`](Self::validate) are refused, so
    /// a saved file always loads back.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        self.validate()?;
        let path = config_path.or_else(Self::default_config_path).ok_or_else(|| {
            SyncError::ConfigSaveFailed("no platform directory for catalog.toml".into())
        })?;

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, default_currency = %self.catalog.default_currency, "Catalog settings saved");
        Ok(())
    }

    /// Checks the currency code and that the batch limits are usable together.
    pub fn validate(&self) -> SyncResult<()> {
        let settings = &self.catalog;

        validate_currency_code("default_currency", &settings.default_currency)
            .map_err(|e| SyncError::InvalidConfig(e.to_string()))?;

        if settings.max_objects_per_batch == 0 {
            return Err(SyncError::InvalidConfig(
                "max_objects_per_batch must be greater than 0".into(),
            ));
        }

        if settings.max_total_objects < settings.max_objects_per_batch {
            return Err(SyncError::InvalidConfig(format!(
                "max_total_objects ({}) must be at least max_objects_per_batch ({})",
                settings.max_total_objects, settings.max_objects_per_batch
            )));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Overrides settings from `CATALOG_*` variables found through `var`.
    ///
    /// Limits that are not a number are logged and skipped.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(currency) = var("CATALOG_DEFAULT_CURRENCY") {
            debug!(currency = %currency, "Default currency taken from environment");
            self.catalog.default_currency = currency;
        }
        if let Some(n) = limit_override(&var, "CATALOG_MAX_OBJECTS_PER_BATCH") {
            self.catalog.max_objects_per_batch = n;
        }
        if let Some(n) = limit_override(&var, "CATALOG_MAX_TOTAL_OBJECTS") {
            self.catalog.max_total_objects = n;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "catalog", "catalog-sync")
            .map(|dirs| dirs.config_dir().join("catalog.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn default_currency(&self) -> &str {
        &self.catalog.default_currency
    }

    pub fn max_objects_per_batch(&self) -> usize {
        self.catalog.max_objects_per_batch
    }

    pub fn max_total_objects(&self) -> usize {
        self.catalog.max_total_objects
    }
}

fn limit_override(var: &impl Fn(&str) -> Option<String>, name: &str) -> Option<usize> {
    let raw = var(name)?;
    match raw.parse::<usize>() {
        Ok(n) => {
            debug!(variable = name, limit = n, "Batch limit taken from environment");
            Some(n)
        }
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring non-numeric batch limit");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CatalogConfig::default();
        assert_eq!(config.default_currency(), "USD");
        assert_eq!(config.max_objects_per_batch(), 1000);
        assert_eq!(config.max_total_objects(), 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CatalogConfig::default();

        config.catalog.default_currency = "usd".into();
        assert!(matches!(config.validate(), Err(SyncError::InvalidConfig(_))));

        config.catalog.default_currency = "EUR".into();
        config.catalog.max_objects_per_batch = 0;
        assert!(config.validate().is_err());

        config.catalog.max_objects_per_batch = 500;
        config.catalog.max_total_objects = 100;
        assert!(config.validate().is_err());

        config.catalog.max_total_objects = 500;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_file_uses_defaults() {
        let config: CatalogConfig = toml::from_str(
            r#"
            [catalog]
            default_currency = "CAD"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_currency(), "CAD");
        assert_eq!(config.max_objects_per_batch(), 1000);

        let empty: CatalogConfig = toml::from_str("").unwrap();
        assert_eq!(empty, CatalogConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("catalog-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("catalog.toml");

        let mut config = CatalogConfig::default();
        config.catalog.default_currency = "JPY".into();
        config.catalog.max_objects_per_batch = 250;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[catalog]"));

        let parsed: CatalogConfig = toml::from_str(&contents).unwrap();
        assert_eq!(parsed, config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = std::env::temp_dir().join(format!("catalog-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.toml");
        std::fs::write(&path, "[catalog\nbroken").unwrap();

        assert!(matches!(
            CatalogConfig::load(Some(path.clone())),
            Err(SyncError::ConfigLoadFailed(_))
        ));
        // load_or_default falls back instead of failing
        assert_eq!(
            CatalogConfig::load_or_default(Some(path)).default_currency(),
            CatalogConfig::default().default_currency()
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_overrides_replace_file_settings() {
        let vars: std::collections::HashMap<&str, &str> = [
            ("CATALOG_DEFAULT_CURRENCY", "EUR"),
            ("CATALOG_MAX_OBJECTS_PER_BATCH", "250"),
            ("CATALOG_MAX_TOTAL_OBJECTS", "lots"),
        ]
        .into_iter()
        .collect();

        let mut config = CatalogConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.default_currency(), "EUR");
        assert_eq!(config.max_objects_per_batch(), 250);
        // Non-numeric limit leaves the previous value in place
        assert_eq!(config.max_total_objects(), 10_000);
    }

    #[test]
    fn test_save_refuses_invalid_settings() {
        let dir = std::env::temp_dir().join(format!("catalog-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("catalog.toml");

        let mut config = CatalogConfig::default();
        config.catalog.max_objects_per_batch = 0;

        assert!(matches!(
            config.save(Some(path.clone())),
            Err(SyncError::InvalidConfig(_))
        ));
        assert!(!path.exists());
    }
}
