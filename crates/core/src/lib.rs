//! Core utilities for droidcfg
//!
//! Shared functionality used by the resolver and the CLI:
//!
//! - **Error handling**: errors with codes, context, and recovery suggestions
//! - **Validation**: fluent checks for resolved build values
//! - **Configuration**: TOML-based tool configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use droidcfg_core::{config::Config, validation::Validator};
//!
//! let config = Config::load(None).expect("Invalid .droidcfg.toml");
//! println!("manifest: {}", config.schema.general.manifest);
//!
//! let result = Validator::new()
//!     .package_name("applicationId", "com.example.app")
//!     .validate();
//! assert!(result.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};
