//! Terminal output helpers for droidcfg
//!
//! - Status messages
//! - Aligned key/value tables
//! - Error rendering

#![warn(missing_docs)]

pub mod output;
