// src/config/mod.rs

//! Run configuration.
//!
//! - [`model`] holds [`RunOptions`] and the raw TOML shape.
//! - [`validate`] turns the raw shape into checked options.
//! - [`loader`] parses TOML text and the environment override.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{from_env_or_default, from_toml_str};
pub use model::{RawConfigFile, RunOptions, RunSection, DEFAULT_TIMEOUT};
