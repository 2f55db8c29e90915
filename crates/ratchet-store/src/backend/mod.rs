//! Raw string-keyed storage backends.
//!
//! The [`Backend`] trait is the narrow surface the record store consumes:
//! flat `get`/`set`/`remove` on string keys and values, a full `clear`,
//! and enumeration of the keys currently stored. Implementations:
//!
//! - [`MemoryBackend`]: for tests and ephemeral data
//! - [`FileBackend`]: one file per key inside a directory
//!
//! Backends serialize their own reads and writes. Nothing above them adds
//! locking, so a backend shared by several stores sees last-write-wins.

use async_trait::async_trait;

use crate::error::BackendResult;

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

/// Flat string-keyed store.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the value stored at `key`.
    ///
    /// Returns `None` if the key does not exist.
    async fn get_item(&self, key: &str) -> BackendResult<Option<String>>;

    /// Store `value` at `key`, overwriting any existing value.
    async fn set_item(&self, key: &str, value: String) -> BackendResult<()>;

    /// Remove `key`.
    ///
    /// Returns `true` if the key existed.
    async fn remove_item(&self, key: &str) -> BackendResult<bool>;

    /// Remove every key. Returns the number of keys removed.
    async fn clear(&self) -> BackendResult<u64>;

    /// All keys currently stored, in unspecified order.
    async fn keys(&self) -> BackendResult<Vec<String>>;

    /// Keys starting with `prefix`, in unspecified order.
    async fn keys_with_prefix(&self, prefix: &str) -> BackendResult<Vec<String>> {
        Ok(self
            .keys()
            .await?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }

    /// Release resources held by the backend.
    async fn close(&self) -> BackendResult<()> {
        Ok(())
    }
}
