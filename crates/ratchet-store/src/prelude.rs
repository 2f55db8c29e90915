//! Commonly used types.
//!
//! ```rust,ignore
//! use ratchet_store::prelude::*;
//! ```

pub use crate::{
    Backend, FileBackend, IdPolicy, MemoryBackend, Namespace, OpenOptions, ProtocolStore, Record,
    RecordId, RecordStore, StoreError, StoreResult, Value,
};
