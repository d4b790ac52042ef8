//! Gradle invocation rendering
//!
//! Turns a resolved build into the wrapper, task name and `-P` project
//! properties a Gradle invocation needs.

use crate::resolver::ResolvedBuild;
use droidcfg_core::error::{Error, ErrorCode, Result};

/// Prefix for every emitted project property
pub const PROPERTY_PREFIX: &str = "droidcfg";

/// Gradle wrapper for the current platform
pub fn wrapper() -> &'static str {
    if cfg!(windows) {
        "gradlew.bat"
    } else {
        "./gradlew"
    }
}

/// Task producing the artifact for `build_type` (`assembleRelease`, `bundleDebug`)
pub fn task_name(build_type: &str, bundle: bool) -> String {
    let verb = if bundle { "bundle" } else { "assemble" };
    let mut chars = build_type.chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", verb, first.to_uppercase(), chars.as_str()),
        None => verb.to_string(),
    }
}

/// Resolved values as `-Pdroidcfg.<key>=<value>`, sorted by key
pub fn config_properties(resolved: &ResolvedBuild) -> Vec<String> {
    resolved
        .config
        .iter()
        .map(|(key, entry)| format!("-P{}.{}={}", PROPERTY_PREFIX, key, entry.value))
        .collect()
}

/// Full argument list for building `build_type`
pub fn gradle_args(resolved: &ResolvedBuild, build_type: &str, bundle: bool) -> Result<Vec<String>> {
    let profile = resolved.build_type(build_type).ok_or_else(|| {
        let known: Vec<&str> = resolved.build_types.keys().map(String::as_str).collect();
        Error::new(
            ErrorCode::GradleError,
            format!("Unknown build type: {}", build_type),
        )
        .with_suggestion(format!("Use one of: {}", known.join(", ")))
    })?;

    let mut args = vec![task_name(build_type, bundle)];
    args.extend(config_properties(resolved));
    if let Some(signing) = &profile.signing_profile {
        args.push(format!("-P{}.signingConfig={}", PROPERTY_PREFIX, signing));
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{CHATBOT_DECLARATION, CHATBOT_LOCAL_PROPERTIES};
    use crate::manifest::BuildDeclaration;
    use crate::resolver::BuildConfigResolver;
    use crate::signing::SigningRegistry;
    use crate::toolkit::FlutterToolkit;

    fn chatbot() -> ResolvedBuild {
        let declaration = BuildDeclaration::parse(CHATBOT_DECLARATION).unwrap();
        let toolkit = FlutterToolkit::parse(CHATBOT_LOCAL_PROPERTIES);
        let registry = SigningRegistry::with_debug();
        BuildConfigResolver::new(&registry)
            .with_toolkit(&toolkit)
            .resolve(&declaration)
            .unwrap()
    }

    #[test]
    fn test_gradle_wrapper_path() {
        assert!(wrapper().starts_with("./") || wrapper().ends_with(".bat"));
    }

    #[test]
    fn test_task_name() {
        assert_eq!(task_name("release", false), "assembleRelease");
        assert_eq!(task_name("debug", true), "bundleDebug");
        assert_eq!(task_name("", false), "assemble");
    }

    #[test]
    fn test_release_args() {
        let args = gradle_args(&chatbot(), "release", false).unwrap();

        assert_eq!(args[0], "assembleRelease");
        assert!(args.contains(&"-Pdroidcfg.minSdk=23".to_string()));
        assert!(args.contains(&"-Pdroidcfg.sourceCompatibility=VERSION_11".to_string()));
        assert!(args.contains(&"-Pdroidcfg.jvmTarget=11".to_string()));
        assert_eq!(args.last().unwrap(), "-Pdroidcfg.signingConfig=debug");
    }

    #[test]
    fn test_properties_are_key_ordered() {
        let props = config_properties(&chatbot());
        assert_eq!(props.len(), 11);
        assert_eq!(
            props[0],
            "-Pdroidcfg.applicationId=com.example.neuroverse_chatbot"
        );
    }

    #[test]
    fn test_unknown_build_type() {
        let err = gradle_args(&chatbot(), "staging", false).unwrap_err();
        assert_eq!(err.code, ErrorCode::GradleError);
        assert!(err.suggestion.unwrap().contains("debug, release"));
    }
}
