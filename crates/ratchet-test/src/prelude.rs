//! Commonly used test helpers.
//!
//! Use `use ratchet_test::prelude::*;` to import fixtures, mocks and the
//! store types they work with.

pub use crate::fixtures::*;
pub use crate::harness::*;
pub use crate::mocks::*;

pub use ratchet_store::{ProtocolStore, Record, RecordStore, Value};
