//! Test harness helpers.

use std::sync::Arc;

use ratchet_store::{FileBackend, ProtocolStore};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Create a temporary directory for testing.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
#[must_use]
pub fn test_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Set up test logging with the given filter.
///
/// Safe to call from several tests; only the first call installs the
/// subscriber.
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// A file-backed [`ProtocolStore`] rooted in a temporary directory.
///
/// The directory is removed when the context is dropped.
#[derive(Debug)]
pub struct FileStoreContext {
    /// Temporary directory holding the store.
    pub dir: TempDir,
    /// Store opened over `dir/store`.
    pub store: ProtocolStore,
}

impl FileStoreContext {
    /// Open a store in a fresh temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the directory or backend cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = test_dir();
        let store = open_file_store(&dir);
        Self { dir, store }
    }

    /// Open a second handle over the same directory, as a restarted
    /// process would.
    ///
    /// # Panics
    ///
    /// Panics if the backend cannot be opened.
    #[must_use]
    pub fn reopen(&self) -> ProtocolStore {
        open_file_store(&self.dir)
    }
}

impl Default for FileStoreContext {
    fn default() -> Self {
        Self::new()
    }
}

fn open_file_store(dir: &TempDir) -> ProtocolStore {
    let backend = FileBackend::open(dir.path().join("store")).expect("Failed to open file backend");
    ProtocolStore::new(Arc::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_identity_key;

    #[tokio::test]
    async fn test_file_store_context_reopens() {
        let ctx = FileStoreContext::new();
        ctx.store
            .identity_keys()
            .create_or_update(&test_identity_key("+15550001"))
            .await
            .unwrap();

        let reopened = ctx.reopen();
        assert!(
            reopened
                .identity_keys()
                .get_by_id("+15550001")
                .await
                .unwrap()
                .is_some()
        );
    }
}
