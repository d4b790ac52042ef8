//! Build declaration for an app module
//!
//! The declaration mirrors the `plugins {}`, `android {}` and `flutter {}`
//! blocks of a module build script, written as TOML.

use crate::model::{ConfigKey, JavaVersion, OptionValue, Overrides};
use droidcfg_core::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Module build declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildDeclaration {
    /// Plugin ids in application order
    #[serde(default)]
    pub plugins: Vec<String>,

    /// `android {}` block
    #[serde(default)]
    pub android: AndroidBlock,

    /// `flutter {}` block, present for Flutter modules
    #[serde(default)]
    pub flutter: Option<FlutterBlock>,
}

/// `android {}` block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AndroidBlock {
    /// Package used for generated `R` and `BuildConfig` classes
    #[serde(default)]
    pub namespace: Option<String>,

    /// Overrides the toolkit's `compileSdk`
    #[serde(default)]
    pub compile_sdk: Option<u32>,

    /// NDK version pinned for native code
    #[serde(default)]
    pub ndk_version: Option<String>,

    /// `compileOptions {}`
    #[serde(default)]
    pub compile_options: CompileOptions,

    /// `kotlinOptions {}`
    #[serde(default)]
    pub kotlin_options: KotlinOptions,

    /// `defaultConfig {}`
    #[serde(default)]
    pub default_config: DefaultConfig,

    /// `buildTypes {}` keyed by build type name
    #[serde(default)]
    pub build_types: BTreeMap<String, BuildTypeBlock>,
}

/// `compileOptions {}` block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompileOptions {
    /// Java source level
    #[serde(default)]
    pub source_compatibility: Option<JavaVersion>,

    /// Java bytecode level
    #[serde(default)]
    pub target_compatibility: Option<JavaVersion>,
}

/// `kotlinOptions {}` block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KotlinOptions {
    /// Rendered with `JavaVersion.toString()`, e.g. `"11"`
    #[serde(default)]
    pub jvm_target: Option<JavaVersion>,
}

/// `defaultConfig {}` block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultConfig {
    /// Unique application id
    #[serde(default)]
    pub application_id: Option<String>,

    /// Lowest supported API level
    #[serde(default)]
    pub min_sdk: Option<u32>,

    /// Overrides the toolkit's `targetSdk`
    #[serde(default)]
    pub target_sdk: Option<u32>,

    /// Overrides the toolkit's `versionCode`
    #[serde(default)]
    pub version_code: Option<u32>,

    /// Overrides the toolkit's `versionName`
    #[serde(default)]
    pub version_name: Option<String>,
}

/// One entry of `buildTypes {}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildTypeBlock {
    /// Name of the signing profile to use
    #[serde(default)]
    pub signing_config: Option<String>,
}

/// `flutter {}` block
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlutterBlock {
    /// Flutter project root, relative to the module directory
    pub source: String,
}

impl BuildDeclaration {
    /// Parse a declaration from TOML
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a declaration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::file_not_found(path)
                .with_suggestion("Pass --manifest or set general.manifest in .droidcfg.toml"));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).context(format!("While parsing {}", path.display()))
    }

    /// Literal values written in the declaration
    pub fn literal_overrides(&self) -> Overrides {
        let android = &self.android;
        let default_config = &android.default_config;
        let mut literals = Overrides::new();

        let text = |value: &Option<String>| value.as_ref().map(|v| OptionValue::Text(v.clone()));
        let integer = |value: Option<u32>| value.map(OptionValue::Integer);
        let java = |value: Option<JavaVersion>| value.map(OptionValue::Java);

        let candidates = [
            (ConfigKey::Namespace, text(&android.namespace)),
            (ConfigKey::CompileSdk, integer(android.compile_sdk)),
            (ConfigKey::NdkVersion, text(&android.ndk_version)),
            (
                ConfigKey::SourceCompatibility,
                java(android.compile_options.source_compatibility),
            ),
            (
                ConfigKey::TargetCompatibility,
                java(android.compile_options.target_compatibility),
            ),
            (
                ConfigKey::JvmTarget,
                android
                    .kotlin_options
                    .jvm_target
                    .map(|v| OptionValue::Text(v.jvm_target().to_string())),
            ),
            (ConfigKey::ApplicationId, text(&default_config.application_id)),
            (ConfigKey::MinSdk, integer(default_config.min_sdk)),
            (ConfigKey::TargetSdk, integer(default_config.target_sdk)),
            (ConfigKey::VersionCode, integer(default_config.version_code)),
            (ConfigKey::VersionName, text(&default_config.version_name)),
        ];

        for (key, value) in candidates {
            if let Some(value) = value {
                literals.insert(key, value);
            }
        }

        literals
    }

    /// `local.properties` of the Flutter project, relative to `module_dir`
    pub fn local_properties_path(&self, module_dir: &Path) -> Option<PathBuf> {
        self.flutter.as_ref().map(|flutter| {
            module_dir
                .join(&flutter.source)
                .join("android")
                .join("local.properties")
        })
    }
}
