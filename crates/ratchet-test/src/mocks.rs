//! Mock backends for testing.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use ratchet_store::{Backend, BackendError, BackendResult, MemoryBackend};

/// In-memory backend that fails on demand.
///
/// Writes succeed until the configured budget is spent; every later
/// `set_item` returns an I/O error without storing anything. Removals can
/// be made to fail independently. Reads always go to the wrapped
/// [`MemoryBackend`], so tests can inspect what was written before the
/// failure.
#[derive(Debug, Default)]
pub struct FailingBackend {
    inner: MemoryBackend,
    writes: AtomicUsize,
    write_budget: Option<usize>,
    fail_removes: AtomicBool,
}

impl FailingBackend {
    /// A backend that never fails until told to.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `set_item` fails once `n` writes have succeeded.
    #[must_use]
    pub fn failing_after(n: usize) -> Self {
        Self {
            write_budget: Some(n),
            ..Self::default()
        }
    }

    /// Make every subsequent `remove_item` and `clear` fail.
    pub fn fail_removes(&self) {
        self.fail_removes.store(true, Ordering::SeqCst);
    }

    /// Number of successful `set_item` calls so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Wrap in an `Arc` usable wherever a backend is expected.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn injected(op: &str) -> BackendError {
        BackendError::Io(io::Error::other(format!("injected {op} failure")))
    }
}

#[async_trait]
impl Backend for FailingBackend {
    async fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: String) -> BackendResult<()> {
        let spent = self
            .write_budget
            .is_some_and(|budget| self.writes.load(Ordering::SeqCst) >= budget);
        if spent {
            return Err(Self::injected("write"));
        }
        self.inner.set_item(key, value).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> BackendResult<bool> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(Self::injected("remove"));
        }
        self.inner.remove_item(key).await
    }

    async fn clear(&self) -> BackendResult<u64> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(Self::injected("clear"));
        }
        self.inner.clear().await
    }

    async fn keys(&self) -> BackendResult<Vec<String>> {
        self.inner.keys().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_after_budget() {
        let backend = FailingBackend::failing_after(1);
        backend.set_item("a", "1".into()).await.unwrap();
        assert!(backend.set_item("b", "2".into()).await.is_err());
        assert_eq!(backend.write_count(), 1);
        assert_eq!(backend.keys().await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_fail_removes() {
        let backend = FailingBackend::new();
        backend.set_item("a", "1".into()).await.unwrap();
        backend.fail_removes();
        assert!(backend.remove_item("a").await.is_err());
        assert!(backend.clear().await.is_err());
        assert!(backend.get_item("a").await.unwrap().is_some());
    }
}
