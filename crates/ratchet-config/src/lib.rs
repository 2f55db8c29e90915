#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Layered configuration for the ratchet record store and its tools.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ratchet_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! println!("Storing records in {}", resolved.config.storage.path.display());
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Config file** (`--config`, or `config.toml` in the platform config dir)
//! 2. **Environment variables** (`RATCHET_*`), fallback only
//! 3. **Embedded defaults** (`defaults.toml` compiled into binary)
//!
//! This crate has no dependencies on other internal crates. Conversion to
//! store and telemetry types happens at the binary edge.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered configuration merging with source tracking.
pub mod merge;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ResolvedConfig;
pub use merge::ConfigLayer;
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// See [`loader::load`] for the algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the config file is malformed or the
    /// final configuration fails validation.
    pub fn load(config_path: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(config_path)
    }

    /// Load configuration from a single file (no layering).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
