//! Toolkit handles
//!
//! The cross-platform toolkit computes `compileSdk`, `targetSdk`,
//! `versionCode` and `versionName` when the build declaration leaves them out.
//! [`FlutterToolkit`] reads them the way the Flutter Gradle plugin does, from
//! the project's `local.properties`.

use crate::model::{ConfigKey, OptionValue, Overrides};
use droidcfg_core::error::{Error, ErrorCode, Result, ResultExt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// `compileSdkVersion` bundled with the Flutter Gradle plugin
pub const FLUTTER_DEFAULT_COMPILE_SDK: u32 = 35;

/// `targetSdkVersion` bundled with the Flutter Gradle plugin
pub const FLUTTER_DEFAULT_TARGET_SDK: u32 = 35;

/// Fallback when `flutter.versionCode` is absent
pub const FLUTTER_DEFAULT_VERSION_CODE: u32 = 1;

/// Fallback when `flutter.versionName` is absent
pub const FLUTTER_DEFAULT_VERSION_NAME: &str = "1.0";

/// Values a toolkit computes for the build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformDefaults {
    /// Default `compileSdk`
    pub compile_sdk: u32,
    /// Default `targetSdk`
    pub target_sdk: u32,
    /// Default `versionCode`
    pub version_code: u32,
    /// Default `versionName`
    pub version_name: String,
}

impl PlatformDefaults {
    /// Defaults as configuration values
    pub fn to_values(&self) -> Overrides {
        let mut values = Overrides::new();
        values.insert(ConfigKey::CompileSdk, OptionValue::Integer(self.compile_sdk));
        values.insert(ConfigKey::TargetSdk, OptionValue::Integer(self.target_sdk));
        values.insert(ConfigKey::VersionCode, OptionValue::Integer(self.version_code));
        values.insert(
            ConfigKey::VersionName,
            OptionValue::Text(self.version_name.clone()),
        );
        values
    }
}

/// Build-time object of the external toolkit
pub trait ToolkitHandle {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Whether the toolkit has been set up and can answer queries
    fn is_initialized(&self) -> bool;

    /// Computed `compileSdk`
    fn compile_sdk_version(&self) -> Result<u32>;

    /// Computed `targetSdk`
    fn target_sdk_version(&self) -> Result<u32>;

    /// Computed `versionCode`
    fn version_code(&self) -> Result<u32>;

    /// Computed `versionName`
    fn version_name(&self) -> Result<String>;
}

/// Flutter toolkit backed by `local.properties`
#[derive(Debug, Clone, Default)]
pub struct FlutterToolkit {
    properties: BTreeMap<String, String>,
    source: Option<PathBuf>,
}

impl FlutterToolkit {
    /// Build from already-parsed properties
    pub fn from_properties(properties: BTreeMap<String, String>) -> Self {
        Self {
            properties,
            source: None,
        }
    }

    /// Parse `local.properties` content
    pub fn parse(content: &str) -> Self {
        Self::from_properties(parse_properties(content))
    }

    /// Load `local.properties` from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::file_not_found(path)
                .with_suggestion("Run `flutter pub get` to generate local.properties"));
        }
        let content = std::fs::read_to_string(path)
            .map_err(Error::from)
            .context(format!("Failed to read {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Loaded Flutter local.properties");

        let mut toolkit = Self::parse(&content);
        toolkit.source = Some(path.to_path_buf());
        Ok(toolkit)
    }

    /// Flutter SDK location, if set
    pub fn sdk_path(&self) -> Option<&str> {
        self.property("flutter.sdk")
    }

    fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn integer_property(&self, key: &str, default: u32) -> Result<u32> {
        match self.property(key) {
            None => Ok(default),
            Some(raw) => raw.parse::<u32>().map_err(|e| {
                Error::new(
                    ErrorCode::InvalidConfigValue,
                    format!("{} must be a non-negative integer, got '{}'", key, raw),
                )
                .with_source(e)
                .with_context(self.location())
            }),
        }
    }

    fn location(&self) -> String {
        match &self.source {
            Some(path) => format!("In {}", path.display()),
            None => "In local.properties".to_string(),
        }
    }
}

impl ToolkitHandle for FlutterToolkit {
    fn name(&self) -> &str {
        "flutter"
    }

    fn is_initialized(&self) -> bool {
        self.sdk_path().is_some()
    }

    fn compile_sdk_version(&self) -> Result<u32> {
        self.integer_property("flutter.compileSdkVersion", FLUTTER_DEFAULT_COMPILE_SDK)
    }

    fn target_sdk_version(&self) -> Result<u32> {
        self.integer_property("flutter.targetSdkVersion", FLUTTER_DEFAULT_TARGET_SDK)
    }

    fn version_code(&self) -> Result<u32> {
        self.integer_property("flutter.versionCode", FLUTTER_DEFAULT_VERSION_CODE)
    }

    fn version_name(&self) -> Result<String> {
        Ok(self
            .property("flutter.versionName")
            .unwrap_or(FLUTTER_DEFAULT_VERSION_NAME)
            .to_string())
    }
}

/// In-memory toolkit with fixed answers
#[derive(Debug, Clone, Default)]
pub struct StaticToolkit {
    defaults: Option<PlatformDefaults>,
}

impl StaticToolkit {
    /// An initialized handle answering with `defaults`
    pub fn new(defaults: PlatformDefaults) -> Self {
        Self {
            defaults: Some(defaults),
        }
    }

    /// A handle that was never initialized
    pub fn uninitialized() -> Self {
        Self { defaults: None }
    }

    fn defaults(&self) -> Result<&PlatformDefaults> {
        self.defaults
            .as_ref()
            .ok_or_else(|| Error::missing_toolkit_binding("static toolkit has no values"))
    }
}

impl ToolkitHandle for StaticToolkit {
    fn name(&self) -> &str {
        "static"
    }

    fn is_initialized(&self) -> bool {
        self.defaults.is_some()
    }

    fn compile_sdk_version(&self) -> Result<u32> {
        Ok(self.defaults()?.compile_sdk)
    }

    fn target_sdk_version(&self) -> Result<u32> {
        Ok(self.defaults()?.target_sdk)
    }

    fn version_code(&self) -> Result<u32> {
        Ok(self.defaults()?.version_code)
    }

    fn version_name(&self) -> Result<String> {
        Ok(self.defaults()?.version_name.clone())
    }
}

/// Parse Java `.properties` content (`key=value` / `key:value` lines)
pub fn parse_properties(content: &str) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let Some(split_at) = find_separator(line) else {
            properties.insert(unescape(line), String::new());
            continue;
        };

        let key = unescape(line[..split_at].trim());
        let value = unescape(line[split_at + 1..].trim());
        properties.insert(key, value);
    }

    properties
}

/// First unescaped `=` or `:`
fn find_separator(line: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        match ch {
            '\\' if !escaped => escaped = true,
            '=' | ':' if !escaped => return Some(idx),
            _ => escaped = false,
        }
    }
    None
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LOCAL_PROPERTIES: &str = r"
## This file must *NOT* be checked into Version Control Systems,
sdk.dir=/home/dev/Android/Sdk
flutter.sdk=/home/dev/flutter
flutter.buildMode=release
flutter.versionName=1.2.0
flutter.versionCode=7
";

    #[test]
    fn test_parse_properties_basic() {
        let props = parse_properties(LOCAL_PROPERTIES);
        assert_eq!(props["sdk.dir"], "/home/dev/Android/Sdk");
        assert_eq!(props["flutter.versionCode"], "7");
        assert!(!props.keys().any(|k| k.starts_with('#')));
    }

    #[test]
    fn test_parse_properties_windows_escapes() {
        let props = parse_properties("flutter.sdk=C\\:\\\\src\\\\flutter\nkey : spaced value\n");
        assert_eq!(props["flutter.sdk"], "C:\\src\\flutter");
        assert_eq!(props["key"], "spaced value");
    }

    #[test]
    fn test_flutter_toolkit_reads_values() {
        let toolkit = FlutterToolkit::parse(LOCAL_PROPERTIES);

        assert!(toolkit.is_initialized());
        assert_eq!(toolkit.version_code().unwrap(), 7);
        assert_eq!(toolkit.version_name().unwrap(), "1.2.0");
        assert_eq!(toolkit.compile_sdk_version().unwrap(), FLUTTER_DEFAULT_COMPILE_SDK);
        assert_eq!(toolkit.target_sdk_version().unwrap(), FLUTTER_DEFAULT_TARGET_SDK);
    }

    #[test]
    fn test_flutter_toolkit_fallbacks() {
        let toolkit = FlutterToolkit::parse("flutter.sdk=/opt/flutter\nflutter.versionName=\n");
        assert_eq!(toolkit.version_code().unwrap(), 1);
        assert_eq!(toolkit.version_name().unwrap(), "1.0");
    }

    #[test]
    fn test_flutter_toolkit_without_sdk_is_uninitialized() {
        let toolkit = FlutterToolkit::parse("sdk.dir=/home/dev/Android/Sdk\n");
        assert!(!toolkit.is_initialized());
    }

    #[test]
    fn test_flutter_toolkit_bad_version_code() {
        let toolkit = FlutterToolkit::parse("flutter.sdk=/opt/flutter\nflutter.versionCode=1.0\n");
        let err = toolkit.version_code().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
        assert!(err.message.contains("flutter.versionCode"));
    }

    #[test]
    fn test_flutter_toolkit_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local.properties");
        fs::write(&path, LOCAL_PROPERTIES).unwrap();

        let toolkit = FlutterToolkit::load(&path).unwrap();
        assert_eq!(toolkit.sdk_path(), Some("/home/dev/flutter"));

        fs::write(&path, "flutter.sdk=/opt/flutter\nflutter.versionCode=x\n").unwrap();
        let err = FlutterToolkit::load(&path).unwrap().version_code().unwrap_err();
        assert!(err.context.unwrap().contains("local.properties"));
    }

    #[test]
    fn test_flutter_toolkit_load_missing() {
        let dir = TempDir::new().unwrap();
        let err = FlutterToolkit::load(&dir.path().join("local.properties")).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileNotFound);
    }

    #[test]
    fn test_static_toolkit() {
        let toolkit = StaticToolkit::new(PlatformDefaults {
            compile_sdk: 34,
            target_sdk: 34,
            version_code: 3,
            version_name: "0.3.0".to_string(),
        });
        assert!(toolkit.is_initialized());
        assert_eq!(toolkit.compile_sdk_version().unwrap(), 34);

        let empty = StaticToolkit::uninitialized();
        assert!(!empty.is_initialized());
        assert_eq!(
            empty.version_name().unwrap_err().code,
            ErrorCode::MissingToolkitBinding
        );
    }

    #[test]
    fn test_platform_defaults_to_values() {
        let values = PlatformDefaults {
            compile_sdk: 34,
            target_sdk: 33,
            version_code: 2,
            version_name: "2.0".to_string(),
        }
        .to_values();

        assert_eq!(values.len(), 4);
        assert!(values.keys().all(ConfigKey::is_delegated));
        assert_eq!(values[&ConfigKey::TargetSdk], OptionValue::Integer(33));
    }
}
