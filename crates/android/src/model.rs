//! Build variant data model
//!
//! The resolved configuration is a map from [`ConfigKey`] to a typed
//! [`OptionValue`], each entry tagged with the source it came from.

use droidcfg_core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Plugin id of the Flutter Gradle plugin, which provides toolkit defaults
pub const TOOLKIT_PLUGIN_ID: &str = "dev.flutter.flutter-gradle-plugin";

/// Configuration option names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigKey {
    /// `defaultConfig.applicationId`
    ApplicationId,
    /// `android.namespace`
    Namespace,
    /// `defaultConfig.minSdk`
    MinSdk,
    /// `defaultConfig.targetSdk`
    TargetSdk,
    /// `android.compileSdk`
    CompileSdk,
    /// `defaultConfig.versionCode`
    VersionCode,
    /// `defaultConfig.versionName`
    VersionName,
    /// `android.ndkVersion`
    NdkVersion,
    /// `compileOptions.sourceCompatibility`
    SourceCompatibility,
    /// `compileOptions.targetCompatibility`
    TargetCompatibility,
    /// `kotlinOptions.jvmTarget`
    JvmTarget,
}

impl ConfigKey {
    /// Every known key
    pub const ALL: [ConfigKey; 11] = [
        ConfigKey::ApplicationId,
        ConfigKey::Namespace,
        ConfigKey::MinSdk,
        ConfigKey::TargetSdk,
        ConfigKey::CompileSdk,
        ConfigKey::VersionCode,
        ConfigKey::VersionName,
        ConfigKey::NdkVersion,
        ConfigKey::SourceCompatibility,
        ConfigKey::TargetCompatibility,
        ConfigKey::JvmTarget,
    ];

    /// Keys the toolkit computes when no literal is given
    pub const DELEGATED: [ConfigKey; 4] = [
        ConfigKey::CompileSdk,
        ConfigKey::TargetSdk,
        ConfigKey::VersionCode,
        ConfigKey::VersionName,
    ];

    /// Gradle DSL name of the option
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ApplicationId => "applicationId",
            ConfigKey::Namespace => "namespace",
            ConfigKey::MinSdk => "minSdk",
            ConfigKey::TargetSdk => "targetSdk",
            ConfigKey::CompileSdk => "compileSdk",
            ConfigKey::VersionCode => "versionCode",
            ConfigKey::VersionName => "versionName",
            ConfigKey::NdkVersion => "ndkVersion",
            ConfigKey::SourceCompatibility => "sourceCompatibility",
            ConfigKey::TargetCompatibility => "targetCompatibility",
            ConfigKey::JvmTarget => "jvmTarget",
        }
    }

    /// Whether the toolkit supplies this key by default
    pub fn is_delegated(&self) -> bool {
        Self::DELEGATED.contains(self)
    }

    /// Whether the value must be an integer
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ConfigKey::MinSdk | ConfigKey::TargetSdk | ConfigKey::CompileSdk | ConfigKey::VersionCode
        )
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::config(format!("Unknown configuration key: {}", s)))
    }
}

/// Java language level, as exposed by Gradle's `JavaVersion`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum JavaVersion {
    /// `VERSION_1_8`
    Version1_8,
    /// `VERSION_11`
    Version11,
    /// `VERSION_17`
    Version17,
    /// `VERSION_21`
    Version21,
}

impl JavaVersion {
    /// Gradle constant name (`VERSION_11`)
    pub fn gradle_name(&self) -> &'static str {
        match self {
            JavaVersion::Version1_8 => "VERSION_1_8",
            JavaVersion::Version11 => "VERSION_11",
            JavaVersion::Version17 => "VERSION_17",
            JavaVersion::Version21 => "VERSION_21",
        }
    }

    /// `JavaVersion.toString()` form, used for Kotlin's `jvmTarget`
    pub fn jvm_target(&self) -> &'static str {
        match self {
            JavaVersion::Version1_8 => "1.8",
            JavaVersion::Version11 => "11",
            JavaVersion::Version17 => "17",
            JavaVersion::Version21 => "21",
        }
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.gradle_name())
    }
}

impl FromStr for JavaVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().trim_start_matches("JavaVersion.");
        match normalized {
            "VERSION_1_8" | "1.8" | "8" => Ok(JavaVersion::Version1_8),
            "VERSION_11" | "11" => Ok(JavaVersion::Version11),
            "VERSION_17" | "17" => Ok(JavaVersion::Version17),
            "VERSION_21" | "21" => Ok(JavaVersion::Version21),
            _ => Err(Error::new(
                droidcfg_core::ErrorCode::InvalidConfigValue,
                format!("Unsupported Java version: {}", s),
            )
            .with_suggestion("Use one of VERSION_1_8, VERSION_11, VERSION_17, VERSION_21")),
        }
    }
}

impl TryFrom<String> for JavaVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<JavaVersion> for String {
    fn from(value: JavaVersion) -> Self {
        value.gradle_name().to_string()
    }
}

/// A configuration value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// SDK levels and version codes
    Integer(u32),
    /// Identifiers, version names, `jvmTarget`
    Text(String),
    /// Compile options
    Java(JavaVersion),
}

impl OptionValue {
    /// Integer payload, if this is an integer
    pub fn as_integer(&self) -> Option<u32> {
        match self {
            OptionValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Text payload, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Java version payload, if this is a Java version
    pub fn as_java(&self) -> Option<JavaVersion> {
        match self {
            OptionValue::Java(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Integer(n) => write!(f, "{}", n),
            OptionValue::Text(s) => f.write_str(s),
            OptionValue::Java(v) => write!(f, "{}", v),
        }
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Integer(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<JavaVersion> for OptionValue {
    fn from(value: JavaVersion) -> Self {
        OptionValue::Java(value)
    }
}

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueOrigin {
    /// Written in the build declaration
    Literal,
    /// Computed by the toolkit
    Toolkit,
}

impl fmt::Display for ValueOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueOrigin::Literal => f.write_str("literal"),
            ValueOrigin::Toolkit => f.write_str("toolkit"),
        }
    }
}

/// A resolved value with provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    /// Effective value
    pub value: OptionValue,
    /// Source of the value
    pub origin: ValueOrigin,
}

/// Literal values keyed by option
pub type Overrides = BTreeMap<ConfigKey, OptionValue>;

/// The effective configuration of one build variant.
///
/// Built once by the resolver and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigurationSet {
    entries: BTreeMap<ConfigKey, ConfigEntry>,
}

impl ConfigurationSet {
    pub(crate) fn from_entries(entries: BTreeMap<ConfigKey, ConfigEntry>) -> Self {
        Self { entries }
    }

    /// Look up a value
    pub fn get(&self, key: ConfigKey) -> Option<&OptionValue> {
        self.entries.get(&key).map(|e| &e.value)
    }

    /// Integer value of `key`, if present and an integer
    pub fn get_integer(&self, key: ConfigKey) -> Option<u32> {
        self.get(key).and_then(OptionValue::as_integer)
    }

    /// Text value of `key`, if present and text
    pub fn get_text(&self, key: ConfigKey) -> Option<&str> {
        self.get(key).and_then(OptionValue::as_text)
    }

    /// Origin of `key`, if present
    pub fn origin(&self, key: ConfigKey) -> Option<ValueOrigin> {
        self.entries.get(&key).map(|e| e.origin)
    }

    /// Whether `key` was resolved
    pub fn contains(&self, key: ConfigKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Number of resolved keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was resolved
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (ConfigKey, &ConfigEntry)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

/// A build type and the signing profile it uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTypeProfile {
    /// Build type name (`release`, `debug`)
    pub build_type: String,
    /// Registered signing profile, `None` when unsigned
    pub signing_profile: Option<String>,
}

impl BuildTypeProfile {
    /// An unsigned build type
    pub fn unsigned(build_type: impl Into<String>) -> Self {
        Self {
            build_type: build_type.into(),
            signing_profile: None,
        }
    }

    /// Whether a signing profile is bound
    pub fn is_signed(&self) -> bool {
        self.signing_profile.is_some()
    }
}

/// Ordered, duplicate-free list of applied plugin ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PluginSet {
    ids: Vec<String>,
}

impl PluginSet {
    /// Build from declaration order, rejecting repeated ids
    pub fn new<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for id in ids {
            let id = id.into();
            let id = id.trim();
            if id.is_empty() {
                return Err(Error::config("Plugin id must not be empty"));
            }
            if set.contains(id) {
                return Err(Error::duplicate_plugin(id));
            }
            set.ids.push(id.to_string());
        }
        Ok(set)
    }

    /// Whether plugin `id` is applied
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|p| p == id)
    }

    /// Whether the Flutter plugin is applied
    pub fn applies_toolkit(&self) -> bool {
        self.contains(TOOLKIT_PLUGIN_ID)
    }

    /// Plugin ids in application order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Number of applied plugins
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no plugin is applied
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidcfg_core::ErrorCode;

    #[test]
    fn test_config_key_roundtrip_names() {
        for key in ConfigKey::ALL {
            assert_eq!(key.as_str().parse::<ConfigKey>().unwrap(), key);
        }
        assert!("minSDK".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_delegated_keys() {
        assert!(ConfigKey::VersionName.is_delegated());
        assert!(!ConfigKey::MinSdk.is_delegated());
        assert!(!ConfigKey::ApplicationId.is_delegated());
    }

    #[test]
    fn test_java_version_forms() {
        assert_eq!("VERSION_11".parse::<JavaVersion>().unwrap(), JavaVersion::Version11);
        assert_eq!(
            "JavaVersion.VERSION_17".parse::<JavaVersion>().unwrap(),
            JavaVersion::Version17
        );
        assert_eq!("1.8".parse::<JavaVersion>().unwrap(), JavaVersion::Version1_8);
        assert_eq!(JavaVersion::Version11.jvm_target(), "11");
        assert_eq!(JavaVersion::Version1_8.to_string(), "VERSION_1_8");

        let err = "VERSION_9".parse::<JavaVersion>().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
    }

    #[test]
    fn test_option_value_accessors() {
        assert_eq!(OptionValue::from(23).as_integer(), Some(23));
        assert_eq!(OptionValue::from("1.0").as_text(), Some("1.0"));
        assert_eq!(OptionValue::from("1.0").as_integer(), None);
        assert_eq!(
            OptionValue::from(JavaVersion::Version11).to_string(),
            "VERSION_11"
        );
    }

    #[test]
    fn test_configuration_set_serializes_with_dsl_names() {
        let mut entries = BTreeMap::new();
        entries.insert(
            ConfigKey::MinSdk,
            ConfigEntry {
                value: OptionValue::Integer(23),
                origin: ValueOrigin::Literal,
            },
        );
        entries.insert(
            ConfigKey::SourceCompatibility,
            ConfigEntry {
                value: OptionValue::Java(JavaVersion::Version11),
                origin: ValueOrigin::Literal,
            },
        );
        let set = ConfigurationSet::from_entries(entries);

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["minSdk"]["value"], 23);
        assert_eq!(json["minSdk"]["origin"], "literal");
        assert_eq!(json["sourceCompatibility"]["value"], "VERSION_11");
    }

    #[test]
    fn test_plugin_set_preserves_order() {
        let plugins = PluginSet::new([
            "com.android.application",
            "kotlin-android",
            TOOLKIT_PLUGIN_ID,
        ])
        .unwrap();

        let ids: Vec<&str> = plugins.iter().collect();
        assert_eq!(ids, ["com.android.application", "kotlin-android", TOOLKIT_PLUGIN_ID]);
        assert!(plugins.applies_toolkit());
    }

    #[test]
    fn test_plugin_set_rejects_duplicates() {
        let err = PluginSet::new(["kotlin-android", " kotlin-android "]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicatePlugin);
    }

    #[test]
    fn test_plugin_set_rejects_empty_id() {
        assert!(PluginSet::new(["com.android.application", ""]).is_err());
    }
}
