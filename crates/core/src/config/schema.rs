//! Configuration schema definitions
//!
//! Tool-level settings read from `.droidcfg.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub signing: SigningConfig,
}

/// Input locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Build declaration for the app module
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Flutter-generated `local.properties`
    #[serde(default = "default_local_properties")]
    pub local_properties: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            local_properties: default_local_properties(),
        }
    }
}

fn default_manifest() -> String {
    "android/app/droidcfg.toml".to_string()
}

fn default_local_properties() -> String {
    "android/local.properties".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Signing profile registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Register the implicit `debug` profile backed by the debug keystore
    #[serde(default = "default_true")]
    pub include_debug: bool,

    /// Named profiles
    #[serde(default)]
    pub profiles: BTreeMap<String, SigningProfileConfig>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            include_debug: true,
            profiles: BTreeMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// A single signing profile.
///
/// Passwords are never stored here, only the environment variables that hold them.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SigningProfileConfig {
    /// Keystore path
    #[serde(default)]
    pub store_file: Option<String>,

    /// Key alias inside the keystore
    #[serde(default)]
    pub key_alias: Option<String>,

    /// Environment variable holding the store password
    #[serde(default)]
    pub store_password_env: Option<String>,

    /// Environment variable holding the key password
    #[serde(default)]
    pub key_password_env: Option<String>,
}
