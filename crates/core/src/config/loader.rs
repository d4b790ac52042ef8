//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    /// Parsed settings
    pub schema: ConfigSchema,
    /// File the settings came from, `None` when defaults are used
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist. Without one, the standard locations are
    /// searched and defaults are used when nothing is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(Path::new(".")),
        };

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations under `root`
fn find_config_file(root: &Path) -> Option<PathBuf> {
    let candidates = [".droidcfg.toml", "droidcfg.toml", ".config/droidcfg.toml"];

    candidates
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|p| p.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::from(e).with_context(format!("Failed to read config file {}", path.display()))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::from(e).with_context(format!("Failed to parse config file {}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_schema_defaults() {
        let schema = ConfigSchema::default();
        assert_eq!(schema.general.local_properties, "android/local.properties");
        assert!(schema.signing.include_debug);
        assert_eq!(schema.logging.level, "warn");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_load_signing_profiles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".droidcfg.toml");
        fs::write(
            &path,
            r#"
[general]
manifest = "app/droidcfg.toml"

[signing]
include_debug = false

[signing.profiles.upload]
store_file = "keys/upload.jks"
key_alias = "upload"
store_password_env = "UPLOAD_STORE_PASSWORD"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.path.as_deref(), Some(path.as_path()));
        assert_eq!(config.schema.general.manifest, "app/droidcfg.toml");
        assert_eq!(config.schema.general.local_properties, "android/local.properties");
        assert!(!config.schema.signing.include_debug);

        let upload = &config.schema.signing.profiles["upload"];
        assert_eq!(upload.key_alias.as_deref(), Some("upload"));
        assert_eq!(upload.key_password_env, None);
    }

    #[test]
    fn test_parse_error_carries_context() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[general\nmanifest = ").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert!(err.context.unwrap().contains("broken.toml"));
    }

    #[test]
    fn test_find_config_file_prefers_dotfile() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".config")).unwrap();
        fs::write(dir.path().join(".config/droidcfg.toml"), "").unwrap();
        assert_eq!(
            find_config_file(dir.path()),
            Some(dir.path().join(".config/droidcfg.toml"))
        );

        fs::write(dir.path().join(".droidcfg.toml"), "").unwrap();
        assert_eq!(
            find_config_file(dir.path()),
            Some(dir.path().join(".droidcfg.toml"))
        );
    }
}
