//! Engine configuration.
//!
//! Loaded from YAML files and `STOREFRONT__*` environment variables. Every
//! field has a default so an empty configuration is valid.

use serde::Deserialize;

use crate::errors::CommerceResult;

/// Default configuration file name (extension resolved by the loader).
pub const DEFAULT_CONFIG_FILE: &str = "storefront";
/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "STOREFRONT_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "STOREFRONT";
/// Flat platform fee charged on transfer orders.
pub const DEFAULT_ADMIN_FEE: u64 = 1500;

/// Fee settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Admin fee added to every transfer order.
    pub admin_fee: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self { admin_fee: DEFAULT_ADMIN_FEE }
    }
}

/// Collection names in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Orders collection.
    pub orders:   String,
    /// Products collection.
    pub products: String,
    /// User profiles collection.
    pub users:    String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            orders:   "orders".to_string(),
            products: "products".to_string(),
            users:    "users".to_string(),
        }
    }
}

/// Stock adjustment policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Fail the whole adjustment when a product is missing instead of skipping it.
    pub strict:              bool,
    /// Reduce stock when a seller accepts a cash-on-delivery order.
    pub reduce_stock_on_cod: bool,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self { strict: false, reduce_stock_on_cod: true }
    }
}

/// Storefront order engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommerceConfig {
    /// Fee settings.
    pub fees:        FeeConfig,
    /// Collection names.
    pub collections: CollectionConfig,
    /// Inventory policy.
    pub inventory:   InventoryConfig,
}

impl CommerceConfig {
    /// Load configuration from file and environment.
    ///
    /// Sources, later overriding earlier:
    /// 1. `storefront.yaml` in the current directory (if present)
    /// 2. the file at `path` (required when given)
    /// 3. the file named by `STOREFRONT_CONFIG` (required when set)
    /// 4. `STOREFRONT__SECTION__FIELD` environment variables
    pub fn load(path: Option<&str>) -> CommerceResult<Self> {
        use ::config::{Config, Environment, File, FileFormat};

        let mut builder = Config::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
