//! Ratchet Telemetry - logging for the ratchet store tools.
//!
//! Configurable `tracing` subscriber setup with several output formats.
//!
//! # Example
//!
//! ```rust,no_run
//! use ratchet_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), ratchet_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("ratchet_store=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("store opened");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
