//! Structured error handling with codes, context and recovery suggestions
//!
//! Every failure raised while resolving a build variant carries:
//! - An error code for programmatic handling
//! - Optional context describing what was being resolved
//! - An optional recovery suggestion
//! - A serializable report form for `--json` output

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // IO errors (2xxx)
    /// Other IO failure
    IoError = 2000,
    /// Input file is missing
    FileNotFound = 2001,
    /// Input file is not readable
    PermissionDenied = 2002,

    // Configuration errors (3xxx)
    /// Invalid tool configuration
    ConfigError = 3000,
    /// Explicit `--config` path is missing
    ConfigNotFound = 3001,
    /// TOML could not be parsed
    ConfigParseError = 3002,
    /// A value has the wrong form
    InvalidConfigValue = 3004,
    /// A plugin id is applied twice
    DuplicatePlugin = 3005,

    // Validation errors (6xxx)
    /// Resolved values failed validation
    ValidationError = 6000,
    /// `minSdk <= targetSdk <= compileSdk` does not hold
    InvalidVersionOrdering = 6004,

    // Platform errors (8xxx)
    /// Gradle invocation cannot be rendered
    GradleError = 8002,
    /// Toolkit defaults requested without an initialized toolkit
    MissingToolkitBinding = 8010,
    /// Build type references an unregistered signing profile
    UnknownSigningProfile = 8020,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            2 => "IO",
            3 => "Configuration",
            6 => "Validation",
            8 => "Platform",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    ///
    /// Context added later describes an outer step and is prepended to any
    /// context already present.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = Some(match self.context.take() {
            Some(inner) => format!("{}: {}", context, inner),
            None => context,
        });
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    /// Missing input file
    pub fn file_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::FileNotFound,
            format!("File not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Check that the file exists and you have read permissions")
    }

    /// Invalid tool configuration
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Missing explicit config file
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .droidcfg.toml file or use --config to specify a path")
    }

    /// Plugin applied twice
    pub fn duplicate_plugin(id: &str) -> Self {
        Self::new(
            ErrorCode::DuplicatePlugin,
            format!("Plugin applied more than once: {}", id),
        )
        .with_suggestion("Remove the repeated entry from the plugins list")
    }

    /// Toolkit defaults are unavailable
    pub fn missing_toolkit_binding(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::MissingToolkitBinding,
            format!("Toolkit binding is not initialized: {}", reason.into()),
        )
        .with_suggestion(
            "Run `flutter pub get` so local.properties gets flutter.sdk, \
             or set every delegated value in the build declaration",
        )
    }

    /// Signing profile `profile` is not registered
    pub fn unknown_signing_profile(build_type: &str, profile: &str) -> Self {
        Self::new(
            ErrorCode::UnknownSigningProfile,
            format!(
                "Build type '{}' references unknown signing profile '{}'",
                build_type, profile
            ),
        )
        .with_suggestion(format!(
            "Register [signing.profiles.{}] in .droidcfg.toml",
            profile
        ))
    }

    /// SDK levels are out of order
    pub fn invalid_version_ordering(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidVersionOrdering, message)
            .with_suggestion("SDK levels must satisfy minSdk <= targetSdk <= compileSdk")
    }
}

/// Serializable error report for logging and `--json` output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ErrorReport {
    pub code: ErrorCode,
    /// `E8010` form of `code`
    pub code_str: String,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
#[allow(missing_docs)]
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;

    use super::Error;

    /// Map an error to the exit code a CLI should terminate with
    pub fn for_error(err: &Error) -> i32 {
        match err.code.code() / 1000 {
            3 => CONFIG_ERROR,
            6 => VALIDATION_ERROR,
            _ => FAILURE,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to the error, if any
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::MissingToolkitBinding.to_string(), "E8010");
        assert_eq!(ErrorCode::InvalidVersionOrdering.to_string(), "E6004");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::IoError.category(), "IO");
        assert_eq!(ErrorCode::DuplicatePlugin.category(), "Configuration");
        assert_eq!(ErrorCode::UnknownSigningProfile.category(), "Platform");
    }

    #[test]
    fn test_unknown_signing_profile_message() {
        let err = Error::unknown_signing_profile("release", "upload");

        assert_eq!(err.code, ErrorCode::UnknownSigningProfile);
        assert!(err.message.contains("'release'"));
        assert!(err.message.contains("'upload'"));
        assert!(err.suggestion.as_deref().unwrap().contains("signing.profiles.upload"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::file_not_found("/path/to/local.properties")
            .with_context("While loading toolkit defaults");

        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert!(err.context.is_some());
        assert!(err.suggestion.is_some());
        assert!(err.to_string().contains("Context: While loading toolkit defaults"));
    }

    #[test]
    fn test_error_report_serialization() {
        let err = Error::missing_toolkit_binding("flutter.sdk is not set")
            .with_context("Resolving compileSdk");

        let report = err.to_report();
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("E8010"));
        assert!(json.contains("MISSING_TOOLKIT_BINDING"));
        assert!(json.contains("Platform"));
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(
            exit_codes::for_error(&Error::invalid_version_ordering("x")),
            exit_codes::VALIDATION_ERROR
        );
        assert_eq!(
            exit_codes::for_error(&Error::duplicate_plugin("kotlin-android")),
            exit_codes::CONFIG_ERROR
        );
        assert_eq!(
            exit_codes::for_error(&Error::unknown_signing_profile("release", "x")),
            exit_codes::FAILURE
        );
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<()> = Err(Error::config("bad"));
        let err = result.context("loading .droidcfg.toml").unwrap_err();
        assert_eq!(err.context.as_deref(), Some("loading .droidcfg.toml"));
    }

    #[test]
    fn test_context_chains_outer_first() {
        let err = Error::config("bad value")
            .with_context("In android/local.properties")
            .with_context("Resolving targetSdk");
        assert_eq!(
            err.context.as_deref(),
            Some("Resolving targetSdk: In android/local.properties")
        );
    }
}
