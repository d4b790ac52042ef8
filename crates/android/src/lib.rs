//! Android build variant resolution for droidcfg
//!
//! This crate resolves the effective configuration of an Android app module:
//! - Build declarations (plugins, `android {}` block, build types)
//! - Toolkit defaults from Flutter's `local.properties`
//! - Signing profile registry and build-type binding
//! - Validation of SDK ordering and identifiers
//! - Gradle argument rendering

#![warn(missing_docs)]

pub mod gradle;
pub mod manifest;
pub mod model;
pub mod resolver;
pub mod signing;
pub mod toolkit;

#[cfg(test)]
mod fixtures;

pub use manifest::BuildDeclaration;
pub use model::{BuildTypeProfile, ConfigKey, ConfigurationSet, OptionValue, PluginSet};
pub use resolver::{
    apply_overrides, resolve_platform_defaults, validate, BuildConfigResolver, ResolvedBuild,
};
pub use signing::{SigningProfile, SigningRegistry};
pub use toolkit::{FlutterToolkit, PlatformDefaults, StaticToolkit, ToolkitHandle};
