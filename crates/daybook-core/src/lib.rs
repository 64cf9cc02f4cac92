//! # daybook-core
//!
//! Core types, traits, and configuration for daybook.
//!
//! This crate provides the foundational data structures and trait
//! definitions that the other daybook crates depend on.

pub mod config;
pub mod defaults;
pub mod error;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::{config_path, Config, CorsConfig, LlmConfig, ValidationError, ValidationReport};
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
