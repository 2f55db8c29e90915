//! Ratchet Test - shared test utilities for the ratchet crates.
//!
//! Mock backends, record fixtures and temp-dir helpers used as a
//! dev-dependency.
//!
//! ```toml
//! [dev-dependencies]
//! ratchet-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use ratchet_test::prelude::*;
//!
//! #[tokio::test]
//! async fn test_partial_bulk_write() {
//!     let backend = FailingBackend::failing_after(2);
//!     let store = ProtocolStore::new(backend.shared());
//!     // ...
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
