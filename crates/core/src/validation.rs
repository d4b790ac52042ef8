//! Configuration value validation
//!
//! Provides a fluent validator used to check resolved build values:
//! - Required and non-empty values
//! - Patterns (package names, version strings)
//! - Numeric ranges (SDK levels, version codes)
//! - Ordering between related values (`minSdk <= targetSdk`)
//!
//! # Example
//!
//! ```rust
//! use droidcfg_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("versionName", "1.0.0")
//!     .range("minSdk", 23, 1, 100)
//!     .not_greater("minSdk", 23, "targetSdk", 34)
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use crate::error::{Error, ErrorCode, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Code attached to ordering violations
pub const ORDERING_CODE: &str = "ORDERING";

/// Pattern for dotted Java package names (`com.example.app`)
pub const PACKAGE_NAME_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9_]*(\.[a-zA-Z][a-zA-Z0-9_]*)+$";

/// Validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Convert to Result type
    ///
    /// Ordering violations take precedence and surface as
    /// [`ErrorCode::InvalidVersionOrdering`]; everything else is a plain
    /// validation error.
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }

        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        let joined = messages.join("; ");

        if self.errors.iter().any(|e| e.code == ORDERING_CODE) {
            Err(Error::invalid_version_ordering(format!(
                "Invalid version ordering: {}",
                joined
            )))
        } else {
            Err(Error::new(
                ErrorCode::ValidationError,
                format!("Validation failed: {}", joined),
            ))
        }
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Field is required".to_string(),
                code: "REQUIRED".to_string(),
                expected: Some("non-empty value".to_string()),
                actual: Some("empty".to_string()),
            });
        }
        self
    }

    /// Validate against a regex pattern
    pub fn pattern(mut self, field: &str, value: &str, pattern: &str, description: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(value) {
                    self.result.add_error(ValidationError {
                        field: field.to_string(),
                        message: format!("Must match {}", description),
                        code: "PATTERN".to_string(),
                        expected: Some(description.to_string()),
                        actual: Some(value.to_string()),
                    });
                }
            }
            Err(_) => {
                self.result.add_error(ValidationError {
                    field: field.to_string(),
                    message: "Invalid validation pattern".to_string(),
                    code: "INTERNAL".to_string(),
                    expected: None,
                    actual: None,
                });
            }
        }
        self
    }

    /// Validate a dotted Java package name
    pub fn package_name(self, field: &str, value: &str) -> Self {
        self.pattern(
            field,
            value,
            PACKAGE_NAME_PATTERN,
            "a dotted package name (com.example.app)",
        )
    }

    /// Validate a numeric range
    pub fn range<T: PartialOrd + std::fmt::Display>(
        mut self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        if value < min || value > max {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be between {} and {}", min, max),
                code: "RANGE".to_string(),
                expected: Some(format!("{} - {}", min, max)),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate that `lower` does not exceed `upper`
    pub fn not_greater<T: PartialOrd + std::fmt::Display>(
        mut self,
        lower_field: &str,
        lower: T,
        upper_field: &str,
        upper: T,
    ) -> Self {
        if lower > upper {
            self.result.add_error(ValidationError {
                field: lower_field.to_string(),
                message: format!(
                    "{} ({}) must not exceed {} ({})",
                    lower_field, lower, upper_field, upper
                ),
                code: ORDERING_CODE.to_string(),
                expected: Some(format!("<= {}", upper)),
                actual: Some(lower.to_string()),
            });
        }
        self
    }

    /// Add a custom validation
    pub fn custom<F>(mut self, field: &str, f: F) -> Self
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(message) = f() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message,
                code: "CUSTOM".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Add a warning (non-blocking)
    pub fn warn_if(mut self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result.add_warning(ValidationError {
                field: field.to_string(),
                message: message.to_string(),
                code: "WARNING".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}
