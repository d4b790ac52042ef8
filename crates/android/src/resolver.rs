//! Build configuration resolution
//!
//! Resolution is one-shot: plugin check, toolkit defaults, literal
//! overrides, validation, then signing binding for every build type. The
//! first failure aborts the whole resolution.

use crate::manifest::BuildDeclaration;
use crate::model::{
    BuildTypeProfile, ConfigEntry, ConfigKey, ConfigurationSet, Overrides, PluginSet,
    ValueOrigin, TOOLKIT_PLUGIN_ID,
};
use crate::signing::{SigningRegistry, DEBUG_PROFILE};
use crate::toolkit::{PlatformDefaults, ToolkitHandle};
use droidcfg_core::error::{Error, Result, ResultExt};
use droidcfg_core::validation::{ValidationError, ValidationResult, Validator};
use serde::Serialize;
use std::collections::BTreeMap;

/// Highest API level accepted for SDK values
pub const MAX_SDK_LEVEL: u32 = 100;

/// Build types every Android module has, even when not declared
pub const IMPLICIT_BUILD_TYPES: [&str; 2] = ["debug", "release"];

/// Fetch the toolkit's computed defaults.
///
/// Fails with `MissingToolkitBinding` when no handle is bound or the handle
/// is not initialized.
pub fn resolve_platform_defaults(toolkit: Option<&dyn ToolkitHandle>) -> Result<PlatformDefaults> {
    let toolkit = toolkit.ok_or_else(|| Error::missing_toolkit_binding("no toolkit handle bound"))?;

    if !toolkit.is_initialized() {
        return Err(Error::missing_toolkit_binding(format!(
            "{} toolkit handle is uninitialized",
            toolkit.name()
        )));
    }

    let defaults = PlatformDefaults {
        compile_sdk: toolkit
            .compile_sdk_version()
            .context("Resolving compileSdk")?,
        target_sdk: toolkit.target_sdk_version().context("Resolving targetSdk")?,
        version_code: toolkit.version_code().context("Resolving versionCode")?,
        version_name: toolkit.version_name().context("Resolving versionName")?,
    };

    tracing::debug!(
        toolkit = toolkit.name(),
        compile_sdk = defaults.compile_sdk,
        target_sdk = defaults.target_sdk,
        version_code = defaults.version_code,
        version_name = %defaults.version_name,
        "Resolved toolkit defaults"
    );

    Ok(defaults)
}

/// Merge toolkit defaults with literal values; literals always win.
pub fn apply_overrides(defaults: Option<&PlatformDefaults>, literals: &Overrides) -> ConfigurationSet {
    let mut entries = BTreeMap::new();

    if let Some(defaults) = defaults {
        for (key, value) in defaults.to_values() {
            entries.insert(
                key,
                ConfigEntry {
                    value,
                    origin: ValueOrigin::Toolkit,
                },
            );
        }
    }

    for (key, value) in literals {
        if let Some(previous) = entries.get(key) {
            tracing::debug!(key = %key, default = %previous.value, literal = %value, "Literal overrides toolkit default");
        }
        entries.insert(
            *key,
            ConfigEntry {
                value: value.clone(),
                origin: ValueOrigin::Literal,
            },
        );
    }

    ConfigurationSet::from_entries(entries)
}

/// Collect every finding for `config` without failing.
///
/// Missing keys cannot be checked yet and are reported as warnings.
pub fn check(config: &ConfigurationSet) -> ValidationResult {
    let mut validator = Validator::new();

    for key in ConfigKey::ALL.into_iter().filter(ConfigKey::is_integer) {
        let wrong_type = config.get(key).is_some() && config.get_integer(key).is_none();
        validator = validator.custom(key.as_str(), || {
            wrong_type.then(|| "Must be an integer".to_string())
        });
    }

    let min = config.get_integer(ConfigKey::MinSdk);
    let target = config.get_integer(ConfigKey::TargetSdk);
    let compile = config.get_integer(ConfigKey::CompileSdk);

    for (key, level) in [
        (ConfigKey::MinSdk, min),
        (ConfigKey::TargetSdk, target),
        (ConfigKey::CompileSdk, compile),
    ] {
        match level {
            Some(level) => validator = validator.range(key.as_str(), level, 1, MAX_SDK_LEVEL),
            None => {
                validator = validator.warn_if(
                    key.as_str(),
                    !config.contains(key),
                    "Not resolved, ordering check skipped",
                );
            }
        }
    }

    if let (Some(min), Some(target)) = (min, target) {
        validator = validator.not_greater("minSdk", min, "targetSdk", target);
    }
    if let (Some(target), Some(compile)) = (target, compile) {
        validator = validator.not_greater("targetSdk", target, "compileSdk", compile);
    }
    if let (Some(min), Some(compile), None) = (min, compile, target) {
        validator = validator.not_greater("minSdk", min, "compileSdk", compile);
    }

    if let Some(code) = config.get_integer(ConfigKey::VersionCode) {
        validator = validator.range("versionCode", code, 1, i32::MAX as u32);
    }

    for key in [ConfigKey::ApplicationId, ConfigKey::Namespace] {
        match config.get(key) {
            Some(value) => match value.as_text() {
                Some(text) => validator = validator.package_name(key.as_str(), text),
                None => {
                    validator = validator.custom(key.as_str(), || Some("Must be text".to_string()));
                }
            },
            None => {
                validator = validator.warn_if(key.as_str(), true, "Not set");
            }
        }
    }

    if let Some(name) = config.get(ConfigKey::VersionName) {
        validator = validator.required("versionName", &name.to_string());
    }

    let target_compat = config
        .get(ConfigKey::TargetCompatibility)
        .and_then(|v| v.as_java());
    let source_compat = config
        .get(ConfigKey::SourceCompatibility)
        .and_then(|v| v.as_java());

    if let (Some(source), Some(target)) = (source_compat, target_compat) {
        validator = validator.custom("sourceCompatibility", || {
            (source > target).then(|| {
                format!(
                    "sourceCompatibility ({}) must not exceed targetCompatibility ({})",
                    source, target
                )
            })
        });
    }

    if let (Some(jvm_target), Some(target)) = (config.get(ConfigKey::JvmTarget), target_compat) {
        let jvm_target = match jvm_target.as_java() {
            Some(version) => version.jvm_target().to_string(),
            None => jvm_target.to_string(),
        };
        validator = validator.custom("jvmTarget", || {
            (jvm_target != target.jvm_target()).then(|| {
                format!(
                    "jvmTarget ({}) must match targetCompatibility ({})",
                    jvm_target,
                    target.jvm_target()
                )
            })
        });
    }

    validator.validate()
}

/// Validate `config`, failing on the first class of error found.
///
/// Ordering problems fail with `InvalidVersionOrdering`.
pub fn validate(config: &ConfigurationSet) -> Result<()> {
    let result = check(config);
    for warning in result.warnings() {
        tracing::warn!(field = %warning.field, "{}", warning.message);
    }
    result.to_result()
}

/// Outcome of a successful resolution
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedBuild {
    /// Applied plugins
    pub plugins: PluginSet,
    /// Effective configuration
    pub config: ConfigurationSet,
    /// Every build type with its signing binding
    pub build_types: BTreeMap<String, BuildTypeProfile>,
    /// Checks that were skipped because a value was unresolved
    pub warnings: Vec<ValidationError>,
}

impl ResolvedBuild {
    /// Look up a build type
    pub fn build_type(&self, name: &str) -> Option<&BuildTypeProfile> {
        self.build_types.get(name)
    }
}

/// Resolves a [`BuildDeclaration`] against a toolkit and signing registry
pub struct BuildConfigResolver<'a> {
    registry: &'a SigningRegistry,
    toolkit: Option<&'a dyn ToolkitHandle>,
}

impl<'a> BuildConfigResolver<'a> {
    /// Resolver with no toolkit bound
    pub fn new(registry: &'a SigningRegistry) -> Self {
        Self {
            registry,
            toolkit: None,
        }
    }

    /// Bind the toolkit handle used for delegated values
    pub fn with_toolkit(mut self, toolkit: &'a dyn ToolkitHandle) -> Self {
        self.toolkit = Some(toolkit);
        self
    }

    /// Run the full resolution
    pub fn resolve(&self, declaration: &BuildDeclaration) -> Result<ResolvedBuild> {
        let plugins = PluginSet::new(declaration.plugins.iter().cloned())?;
        let literals = declaration.literal_overrides();

        let missing: Vec<ConfigKey> = ConfigKey::DELEGATED
            .into_iter()
            .filter(|key| !literals.contains_key(key))
            .collect();

        let defaults = if missing.is_empty() {
            tracing::debug!("Every delegated value is literal, toolkit not consulted");
            None
        } else {
            let toolkit = if plugins.applies_toolkit() {
                self.toolkit
            } else {
                None
            };
            let missing_names: Vec<&str> = missing.iter().map(ConfigKey::as_str).collect();
            let defaults = resolve_platform_defaults(toolkit).map_err(|e| {
                let e = e.with_context(format!("Needed for {}", missing_names.join(", ")));
                if plugins.applies_toolkit() {
                    e
                } else {
                    e.with_suggestion(format!(
                        "Apply {} or set these values in the declaration",
                        TOOLKIT_PLUGIN_ID
                    ))
                }
            })?;
            Some(defaults)
        };

        let config = apply_overrides(defaults.as_ref(), &literals);

        let result = check(&config);
        for warning in result.warnings() {
            tracing::debug!(field = %warning.field, "{}", warning.message);
        }
        let warnings = result.warnings().to_vec();
        result.to_result()?;

        let build_types = self.bind_build_types(declaration)?;

        tracing::info!(
            entries = config.len(),
            build_types = build_types.len(),
            plugins = plugins.len(),
            "Resolved build configuration"
        );

        Ok(ResolvedBuild {
            plugins,
            config,
            build_types,
            warnings,
        })
    }

    fn bind_build_types(
        &self,
        declaration: &BuildDeclaration,
    ) -> Result<BTreeMap<String, BuildTypeProfile>> {
        let mut build_types = BTreeMap::new();

        for name in IMPLICIT_BUILD_TYPES {
            let profile = if name == "debug" && self.registry.contains(DEBUG_PROFILE) {
                self.registry.bind_signing_profile(name, DEBUG_PROFILE)?
            } else {
                BuildTypeProfile::unsigned(name)
            };
            build_types.insert(name.to_string(), profile);
        }

        for (name, block) in &declaration.android.build_types {
            let profile = match &block.signing_config {
                Some(profile_name) => self.registry.bind_signing_profile(name, profile_name)?,
                None => match build_types.get(name) {
                    Some(inherited) => inherited.clone(),
                    None => BuildTypeProfile::unsigned(name.as_str()),
                },
            };
            build_types.insert(name.clone(), profile);
        }

        Ok(build_types)
    }
}
