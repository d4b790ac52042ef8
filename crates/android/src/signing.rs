//! Signing profile registry
//!
//! Build types reference signing profiles by name. A reference is only valid
//! when the profile has been registered.

use crate::model::BuildTypeProfile;
use droidcfg_core::config::SigningConfig;
use droidcfg_core::error::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Name of the implicit debug profile
pub const DEBUG_PROFILE: &str = "debug";

/// Key alias Android uses in the generated debug keystore
pub const DEBUG_KEY_ALIAS: &str = "androiddebugkey";

/// A named signing credential reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningProfile {
    /// Registry name
    pub name: String,
    /// Keystore path; `None` means the platform's debug keystore
    pub store_file: Option<PathBuf>,
    /// Key alias inside the keystore
    pub key_alias: Option<String>,
    /// Environment variable holding the store password
    pub store_password_env: Option<String>,
    /// Environment variable holding the key password
    pub key_password_env: Option<String>,
}

impl SigningProfile {
    /// A profile with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store_file: None,
            key_alias: None,
            store_password_env: None,
            key_password_env: None,
        }
    }

    /// The debug profile Android creates on first build
    pub fn debug() -> Self {
        Self {
            key_alias: Some(DEBUG_KEY_ALIAS.to_string()),
            ..Self::named(DEBUG_PROFILE)
        }
    }
}

/// Registered signing profiles
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SigningRegistry {
    profiles: BTreeMap<String, SigningProfile>,
}

impl SigningRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the debug profile
    pub fn with_debug() -> Self {
        let mut registry = Self::new();
        registry.insert(SigningProfile::debug());
        registry
    }

    /// Build from the `[signing]` section of `.droidcfg.toml`
    pub fn from_config(config: &SigningConfig) -> Result<Self> {
        let mut registry = if config.include_debug {
            Self::with_debug()
        } else {
            Self::new()
        };

        for (name, profile) in &config.profiles {
            registry.register(SigningProfile {
                name: name.clone(),
                store_file: profile.store_file.as_ref().map(PathBuf::from),
                key_alias: profile.key_alias.clone(),
                store_password_env: profile.store_password_env.clone(),
                key_password_env: profile.key_password_env.clone(),
            })?;
        }

        Ok(registry)
    }

    /// Register a profile; names must be unique
    pub fn register(&mut self, profile: SigningProfile) -> Result<()> {
        if profile.name.trim().is_empty() {
            return Err(Error::config("Signing profile name must not be empty"));
        }
        if self.profiles.contains_key(&profile.name) {
            return Err(Error::config(format!(
                "Signing profile '{}' is already registered",
                profile.name
            ))
            .with_suggestion("Set include_debug = false to replace the implicit debug profile"));
        }
        self.insert(profile);
        Ok(())
    }

    fn insert(&mut self, profile: SigningProfile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Look up a profile by name
    pub fn get(&self, name: &str) -> Option<&SigningProfile> {
        self.profiles.get(name)
    }

    /// Registered profile names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Number of registered profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no profile is registered
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Associate `build_type` with the registered profile `profile_name`
    pub fn bind_signing_profile(
        &self,
        build_type: &str,
        profile_name: &str,
    ) -> Result<BuildTypeProfile> {
        if !self.contains(profile_name) {
            let registered: Vec<&str> = self.names().collect();
            let registered = if registered.is_empty() {
                "none".to_string()
            } else {
                registered.join(", ")
            };
            return Err(Error::unknown_signing_profile(build_type, profile_name)
                .with_context(format!("Registered profiles: {}", registered)));
        }

        tracing::debug!(build_type, profile = profile_name, "Bound signing profile");

        Ok(BuildTypeProfile {
            build_type: build_type.to_string(),
            signing_profile: Some(profile_name.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidcfg_core::config::SigningProfileConfig;
    use droidcfg_core::ErrorCode;

    #[test]
    fn test_bind_release_to_debug() {
        let registry = SigningRegistry::with_debug();
        let profile = registry.bind_signing_profile("release", "debug").unwrap();

        assert_eq!(profile.build_type, "release");
        assert_eq!(profile.signing_profile.as_deref(), Some("debug"));
        assert!(profile.is_signed());
    }

    #[test]
    fn test_bind_unknown_profile() {
        let registry = SigningRegistry::with_debug();
        let err = registry
            .bind_signing_profile("release", "nonexistent")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownSigningProfile);
        assert_eq!(err.context.as_deref(), Some("Registered profiles: debug"));
    }

    #[test]
    fn test_bind_fails_on_empty_registry() {
        let registry = SigningRegistry::new();
        let err = registry.bind_signing_profile("release", "debug").unwrap_err();
        assert_eq!(err.context.as_deref(), Some("Registered profiles: none"));
    }

    #[test]
    fn test_from_config() {
        let mut config = SigningConfig::default();
        config.profiles.insert(
            "upload".to_string(),
            SigningProfileConfig {
                store_file: Some("keys/upload.jks".to_string()),
                key_alias: Some("upload".to_string()),
                ..Default::default()
            },
        );

        let registry = SigningRegistry::from_config(&config).unwrap();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, ["debug", "upload"]);
        assert_eq!(
            registry.get("upload").unwrap().store_file,
            Some(PathBuf::from("keys/upload.jks"))
        );
        assert_eq!(
            registry.get("debug").unwrap().key_alias.as_deref(),
            Some(DEBUG_KEY_ALIAS)
        );
    }

    #[test]
    fn test_from_config_without_debug() {
        let config = SigningConfig {
            include_debug: false,
            ..Default::default()
        };
        let registry = SigningRegistry::from_config(&config).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_debug_name_collision() {
        let mut config = SigningConfig::default();
        config
            .profiles
            .insert("debug".to_string(), SigningProfileConfig::default());

        let err = SigningRegistry::from_config(&config).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }
}
