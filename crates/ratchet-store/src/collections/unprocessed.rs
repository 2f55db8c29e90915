use std::sync::Arc;

use tracing::debug;

use super::Collection;
use crate::error::StoreResult;
use crate::namespace::{IdPolicy, Namespace, RecordId};
use crate::store::RecordStore;
use crate::value::Record;

/// Field counting decryption attempts of a queued message.
pub const ATTEMPTS_FIELD: &str = "attempts";

/// Inbound envelopes that arrived but have not been decrypted yet.
///
/// Messages are retried across restarts; [`update_attempts`] records how
/// many times decryption was tried.
///
/// [`update_attempts`]: Self::update_attempts
#[derive(Debug, Clone)]
pub struct Unprocessed {
    inner: Collection,
}

impl Unprocessed {
    /// Bind the facade to `store`.
    #[must_use]
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self {
            inner: Collection::new(store, Namespace::UNPROCESSED, IdPolicy::Opaque),
        }
    }

    /// The underlying namespace-scoped collection.
    #[must_use]
    pub fn collection(&self) -> &Collection {
        &self.inner
    }

    /// Fetch a queued message by id.
    ///
    /// # Errors
    ///
    /// Returns a codec error for malformed stored data.
    pub async fn get_by_id(&self, id: impl Into<RecordId>) -> StoreResult<Option<Record>> {
        self.inner.get(id).await
    }

    /// Number of queued messages.
    ///
    /// # Errors
    ///
    /// Returns a backend error if enumeration fails.
    pub async fn count(&self) -> StoreResult<u64> {
        self.inner.count().await
    }

    /// Queue a message under its own `id`.
    ///
    /// # Errors
    ///
    /// Returns an id, codec or backend error.
    pub async fn save(&self, record: &Record) -> StoreResult<RecordId> {
        self.inner.put(record).await
    }

    /// Queue several messages, in order.
    ///
    /// # Errors
    ///
    /// Returns the first failure; earlier messages stay queued.
    pub async fn save_all(&self, records: &[Record]) -> StoreResult<usize> {
        self.inner.put_all(records).await
    }

    /// Set the `attempts` counter of a queued message.
    ///
    /// A missing message is treated as an empty record, so this creates an
    /// entry holding only `attempts`. The read-modify-write is serialized
    /// against other updates through the same store.
    ///
    /// # Errors
    ///
    /// Returns a codec or backend error.
    pub async fn update_attempts(
        &self,
        id: impl Into<RecordId>,
        attempts: u32,
    ) -> StoreResult<Record> {
        let id = id.into();
        debug!(id = %id, attempts, "updating unprocessed attempts");
        self.inner
            .store()
            .modify(self.inner.namespace(), id, |record| {
                record.insert(ATTEMPTS_FIELD, attempts);
            })
            .await
    }

    /// Replace the stored message under `id` with `record`.
    ///
    /// # Errors
    ///
    /// Returns a codec or backend error.
    pub async fn update_with_data(&self, id: impl Into<RecordId>, record: &Record) -> StoreResult<()> {
        self.inner.put_with_id(id, record).await
    }

    /// Replace several messages, each under its own `id`.
    ///
    /// # Errors
    ///
    /// Returns the first failure; earlier replacements stay written.
    pub async fn update_all_with_data(&self, records: &[Record]) -> StoreResult<usize> {
        self.inner.put_all(records).await
    }

    /// Remove a queued message.
    ///
    /// # Errors
    ///
    /// Returns a backend error.
    pub async fn remove(&self, id: impl Into<RecordId>) -> StoreResult<bool> {
        self.inner.remove(id).await
    }

    /// Drop every queued message.
    ///
    /// # Errors
    ///
    /// Returns the first backend failure.
    pub async fn remove_all(&self) -> StoreResult<u64> {
        self.inner.clear().await
    }

    /// All queued messages, in unspecified order.
    ///
    /// # Errors
    ///
    /// Returns a codec error if any stored message is malformed.
    pub async fn get_all(&self) -> StoreResult<Vec<Record>> {
        self.inner.get_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::value::Value;

    fn unprocessed() -> Unprocessed {
        Unprocessed::new(Arc::new(RecordStore::new(Arc::new(MemoryBackend::new()))))
    }

    #[tokio::test]
    async fn test_update_attempts_keeps_other_fields() {
        let queue = unprocessed();
        queue
            .save(&Record::with_id("m1").with("envelope", "abc").with(ATTEMPTS_FIELD, 0u32))
            .await
            .unwrap();

        queue.update_attempts("m1", 3).await.unwrap();

        let stored = queue.get_by_id("m1").await.unwrap().unwrap();
        assert_eq!(stored.get_str("envelope"), Some("abc"));
        assert_eq!(stored.get(ATTEMPTS_FIELD).and_then(Value::as_u64), Some(3));
    }

    #[tokio::test]
    async fn test_update_attempts_on_missing_message() {
        let queue = unprocessed();
        let record = queue.update_attempts("ghost", 1).await.unwrap();
        assert_eq!(record, Record::new().with(ATTEMPTS_FIELD, 1u32));
        assert_eq!(queue.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_attempt_updates_do_not_lose_writes() {
        let queue = unprocessed();
        queue
            .save(&Record::with_id("m1").with("envelope", "abc"))
            .await
            .unwrap();

        let a = queue.clone();
        let b = queue.clone();
        let (ra, rb) = tokio::join!(a.update_attempts("m1", 1), b.update_attempts("m1", 2));
        ra.unwrap();
        rb.unwrap();

        let stored = queue.get_by_id("m1").await.unwrap().unwrap();
        assert_eq!(stored.get_str("envelope"), Some("abc"));
        assert!(matches!(stored.get(ATTEMPTS_FIELD).and_then(Value::as_u64), Some(1 | 2)));
    }

    #[tokio::test]
    async fn test_update_with_data_replaces_record() {
        let queue = unprocessed();
        queue
            .save(&Record::with_id("m1").with("envelope", "old").with(ATTEMPTS_FIELD, 2u32))
            .await
            .unwrap();
        let replacement = Record::with_id("m1").with("decrypted", "hello");
        queue.update_with_data("m1", &replacement).await.unwrap();

        assert_eq!(queue.get_by_id("m1").await.unwrap(), Some(replacement));
    }

    #[tokio::test]
    async fn test_save_all_count_and_remove_all() {
        let queue = unprocessed();
        queue
            .save_all(&[Record::with_id("a"), Record::with_id("b"), Record::with_id("c")])
            .await
            .unwrap();
        assert_eq!(queue.count().await.unwrap(), 3);
        queue
            .update_all_with_data(&[Record::with_id("a").with("done", true)])
            .await
            .unwrap();
        assert!(queue.remove("b").await.unwrap());
        assert_eq!(queue.get_all().await.unwrap().len(), 2);
        assert_eq!(queue.remove_all().await.unwrap(), 2);
        assert_eq!(queue.count().await.unwrap(), 0);
    }
}
