//! The store handed to the messaging protocol.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::backend::{Backend, FileBackend, MemoryBackend};
use crate::collections::{
    Conversations, IdentityKeys, Items, PreKeys, Sessions, SignedPreKeys, Unprocessed,
};
use crate::error::StoreResult;
use crate::store::RecordStore;

/// Which backend to open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackendOptions {
    /// Volatile in-memory storage.
    #[default]
    Memory,
    /// One file per key under the given directory.
    File {
        /// Directory holding the entries.
        path: PathBuf,
    },
}

/// Options for [`ProtocolStore::open`].
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    /// Backend to store records in.
    pub backend: BackendOptions,
}

impl OpenOptions {
    /// In-memory options.
    #[must_use]
    pub fn memory() -> Self {
        Self::default()
    }

    /// File-backed options rooted at `path`.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendOptions::File { path: path.into() },
        }
    }
}

/// Root handle owning the record store and handing out the per-kind
/// collections.
///
/// Cloning is cheap; clones share the same store.
#[derive(Debug, Clone)]
pub struct ProtocolStore {
    store: Arc<RecordStore>,
}

impl ProtocolStore {
    /// Wrap an existing backend.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::from_record_store(RecordStore::new(backend))
    }

    /// Wrap a configured [`RecordStore`], e.g. one with schema overrides.
    #[must_use]
    pub fn from_record_store(store: RecordStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// A store backed by a fresh [`MemoryBackend`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Open the backend described by `options`.
    ///
    /// # Errors
    ///
    /// Returns a backend error if a file backend's directory cannot be
    /// created.
    pub fn open(options: &OpenOptions) -> StoreResult<Self> {
        let backend: Arc<dyn Backend> = match &options.backend {
            BackendOptions::Memory => Arc::new(MemoryBackend::new()),
            BackendOptions::File { path } => Arc::new(FileBackend::open(path)?),
        };
        info!(backend = ?options.backend, "opened protocol store");
        Ok(Self::new(backend))
    }

    /// The shared namespaced record store.
    #[must_use]
    pub fn records(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Identity keys.
    #[must_use]
    pub fn identity_keys(&self) -> IdentityKeys {
        IdentityKeys::new(Arc::clone(&self.store))
    }

    /// Sessions.
    #[must_use]
    pub fn sessions(&self) -> Sessions {
        Sessions::new(Arc::clone(&self.store))
    }

    /// One-time pre-keys.
    #[must_use]
    pub fn pre_keys(&self) -> PreKeys {
        PreKeys::new(Arc::clone(&self.store))
    }

    /// Signed pre-keys.
    #[must_use]
    pub fn signed_pre_keys(&self) -> SignedPreKeys {
        SignedPreKeys::new(Arc::clone(&self.store))
    }

    /// Queued unprocessed messages.
    #[must_use]
    pub fn unprocessed(&self) -> Unprocessed {
        Unprocessed::new(Arc::clone(&self.store))
    }

    /// Configuration items.
    #[must_use]
    pub fn items(&self) -> Items {
        Items::new(Arc::clone(&self.store))
    }

    /// Conversations.
    #[must_use]
    pub fn conversations(&self) -> Conversations {
        Conversations::new(Arc::clone(&self.store))
    }

    /// Wipe the entire backend, every namespace included.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the clear fails.
    pub async fn remove_all(&self) -> StoreResult<u64> {
        self.store.remove_everything().await
    }

    /// Close the backend. Other clones of this handle must not be used
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the backend fails to close.
    pub async fn close(self) -> StoreResult<()> {
        self.store.close().await?;
        info!("closed protocol store");
        Ok(())
    }
}
