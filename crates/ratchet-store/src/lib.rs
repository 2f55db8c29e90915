//! Ratchet Store: persistence for end-to-end encrypted messaging state.
//!
//! The messaging protocol keeps identity keys, sessions, pre-keys, queued
//! messages and a few application records in a single string-valued
//! key-value backend. This crate provides:
//!
//! - [`Backend`]: the storage primitive, with an in-memory
//!   ([`MemoryBackend`]) and a file-per-key ([`FileBackend`]) implementation
//! - [`Codec`]: JSON encoding of [`Record`]s that keeps binary key material
//!   intact through the string-only backend
//! - [`RecordStore`]: namespaced put/get/list/remove on top of both
//! - [`ProtocolStore`]: the root handle exposing one facade per record kind
//!
//! # Key layout
//!
//! Every record lives under `"{namespace}@{id}"`:
//!
//! | Kind | Namespace | Example key |
//! |------|-----------|-------------|
//! | Identity key | `identityKey` | `identityKey@+15550001` |
//! | Session | `session` | `session@+15550001.1` |
//! | Pre-key | `25519KeypreKey` | `25519KeypreKey@7` |
//! | Signed pre-key | `25519KeysignedKey` | `25519KeysignedKey@3` |
//! | Unprocessed | `unprocessed` | `unprocessed@1700000000-abc` |
//! | Item | `configuration` | `configuration@number_id` |
//! | Conversation | `conversation` | `conversation@group-1` |
//!
//! # Example
//!
//! ```rust,ignore
//! use ratchet_store::{ProtocolStore, Record};
//!
//! let store = ProtocolStore::in_memory();
//! store
//!     .identity_keys()
//!     .create_or_update(&Record::with_id("+15550001").with("publicKey", key_bytes))
//!     .await?;
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod backend;
pub mod codec;
pub mod collections;
pub mod error;
pub mod namespace;
pub mod store;
pub mod value;

mod finite;
mod protocol_store;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use codec::{Codec, KEY_MATERIAL_FIELDS, RecordSchema};
pub use collections::{
    Collection, Conversations, IdentityKeys, Items, PreKeys, Sessions, SignedPreKeys, Unprocessed,
};
pub use error::{
    BackendError, BackendResult, CodecError, CodecResult, StoreError, StoreResult,
};
pub use namespace::{IdPolicy, Namespace, RecordId};
pub use protocol_store::{BackendOptions, OpenOptions, ProtocolStore};
pub use store::RecordStore;
pub use value::{FieldMap, ID_FIELD, Record, Value};
