//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE_KEY` - Key of the snapshot slot (default: products)
//! - `CART_DATA_DIR` - Directory used by the JSON file store (default: .pocket-cart)
//! - `CART_MERGE_POLICY` - What adding an existing product does to its details:
//!   `keep_existing` or `refresh_details` (default: `keep_existing`)

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Default key of the snapshot slot.
pub const DEFAULT_STORAGE_KEY: &str = "products";

/// Default directory for the JSON file store.
pub const DEFAULT_DATA_DIR: &str = ".pocket-cart";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// What `add_to_cart` does with the incoming descriptor when the product is
/// already in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Keep the stored title, image and price; only the quantity changes.
    #[default]
    KeepExisting,
    /// Replace the stored title, image and price with the incoming ones.
    RefreshDetails,
}

impl MergePolicy {
    /// Returns the policy name as used in `CART_MERGE_POLICY`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::KeepExisting => "keep_existing",
            Self::RefreshDetails => "refresh_details",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep_existing" => Ok(Self::KeepExisting),
            "refresh_details" => Ok(Self::RefreshDetails),
            other => Err(format!(
                "unknown merge policy '{other}', expected keep_existing or refresh_details"
            )),
        }
    }
}

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Key the cart snapshot is stored under
    pub storage_key: String,
    /// Directory for the JSON file store
    pub data_dir: PathBuf,
    /// Merge behavior for re-adding a product
    pub merge_policy: MergePolicy,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            merge_policy: MergePolicy::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(get_optional_env)
    }

    /// Build configuration from an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_key = lookup("CART_STORAGE_KEY")
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let data_dir = lookup("CART_DATA_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let merge_policy = match lookup("CART_MERGE_POLICY") {
            Some(value) => value
                .parse::<MergePolicy>()
                .map_err(|e| ConfigError::InvalidEnvVar("CART_MERGE_POLICY".to_string(), e))?,
            None => MergePolicy::default(),
        };

        Ok(Self {
            storage_key,
            data_dir,
            merge_policy,
        })
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
