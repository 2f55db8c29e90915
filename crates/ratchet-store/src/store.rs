//! Namespaced record store.
//!
//! [`RecordStore`] turns `(namespace, id, record)` triples into backend
//! entries: it composes the key `"{tag}@{id}"`, runs the record through the
//! namespace's [`Codec`], and hands the text to the [`Backend`].
//!
//! Bulk operations apply one backend call per record. They are not atomic:
//! if the third write of a batch fails, the first two stay written and the
//! error is returned.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::codec::{Codec, RecordSchema};
use crate::error::StoreResult;
use crate::namespace::{IdPolicy, Namespace, RecordId};
use crate::value::Record;

/// Codec, backend and per-namespace schemas behind every collection.
pub struct RecordStore {
    backend: Arc<dyn Backend>,
    default_codec: Codec,
    codecs: HashMap<Namespace, Codec>,
    // Serializes read-modify-write sequences issued through this store.
    rmw_lock: Mutex<()>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("schemas", &self.codecs.len())
            .finish_non_exhaustive()
    }
}

impl RecordStore {
    /// Create a store over `backend` using the key-material schema for
    /// every namespace.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            default_codec: Codec::default(),
            codecs: HashMap::new(),
            rmw_lock: Mutex::new(()),
        }
    }

    /// Override the schema used for one namespace.
    #[must_use]
    pub fn with_schema(mut self, namespace: Namespace, schema: RecordSchema) -> Self {
        self.codecs.insert(namespace, Codec::new(schema));
        self
    }

    /// The codec applied to `namespace`.
    #[must_use]
    pub fn codec(&self, namespace: &Namespace) -> &Codec {
        self.codecs.get(namespace).unwrap_or(&self.default_codec)
    }

    /// The backend this store writes to.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Create or update the record stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the record cannot be encoded (nothing is
    /// written), or a backend error if the write fails.
    pub async fn put(
        &self,
        namespace: &Namespace,
        id: impl Into<RecordId>,
        record: &Record,
    ) -> StoreResult<()> {
        let id = id.into();
        let text = self.codec(namespace).encode(record)?;
        self.backend
            .set_item(&namespace.key_for(&id), text)
            .await?;
        debug!(namespace = %namespace, id = %id, "stored record");
        Ok(())
    }

    /// Store each record under its own `id`, in order.
    ///
    /// Returns the number of records written.
    ///
    /// # Errors
    ///
    /// Returns the first failure. Records before it remain written.
    pub async fn put_all(
        &self,
        namespace: &Namespace,
        records: &[Record],
        ids: IdPolicy,
    ) -> StoreResult<usize> {
        for record in records {
            let (id, record) = ids.normalize_record(namespace, record)?;
            self.put(namespace, id, &record).await?;
        }
        Ok(records.len())
    }

    /// Fetch the record stored under `id`.
    ///
    /// Returns `Ok(None)` if there is none.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the stored text is malformed.
    pub async fn get(
        &self,
        namespace: &Namespace,
        id: impl Into<RecordId>,
    ) -> StoreResult<Option<Record>> {
        let key = namespace.key_for(&id.into());
        self.get_by_key(namespace, &key).await
    }

    async fn get_by_key(&self, namespace: &Namespace, key: &str) -> StoreResult<Option<Record>> {
        match self.backend.get_item(key).await? {
            Some(text) => Ok(Some(self.codec(namespace).decode(&text)?)),
            None => Ok(None),
        }
    }

    /// Backend keys belonging to `namespace`.
    async fn namespace_keys(&self, namespace: &Namespace) -> StoreResult<Vec<String>> {
        Ok(self.backend.keys_with_prefix(&namespace.prefix()).await?)
    }

    /// Every record in `namespace`, in backend enumeration order.
    ///
    /// Binary fields are restored exactly as in [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Returns a codec error if any stored record is malformed.
    pub async fn get_all(&self, namespace: &Namespace) -> StoreResult<Vec<Record>> {
        Ok(self
            .entries(namespace)
            .await?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// Every `(id, record)` pair in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns a codec error if any stored record is malformed.
    pub async fn entries(&self, namespace: &Namespace) -> StoreResult<Vec<(RecordId, Record)>> {
        let keys = self.namespace_keys(namespace).await?;
        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(id) = namespace.id_from_key(&key) else {
                continue;
            };
            let id = RecordId::from(id);
            // A concurrent remove between listing and reading is not an error.
            match self.get_by_key(namespace, &key).await? {
                Some(record) => entries.push((id, record)),
                None => warn!(namespace = %namespace, id = %id, "entry vanished during scan"),
            }
        }
        Ok(entries)
    }

    /// Identifiers of every record in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns a backend error if enumeration fails.
    pub async fn ids(&self, namespace: &Namespace) -> StoreResult<Vec<RecordId>> {
        Ok(self
            .namespace_keys(namespace)
            .await?
            .iter()
            .filter_map(|key| namespace.id_from_key(key))
            .map(RecordId::from)
            .collect())
    }

    /// Number of records in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns a backend error if enumeration fails.
    pub async fn count(&self, namespace: &Namespace) -> StoreResult<u64> {
        Ok(self.namespace_keys(namespace).await?.len() as u64)
    }

    /// Whether a record is stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the read fails.
    pub async fn contains(
        &self,
        namespace: &Namespace,
        id: impl Into<RecordId>,
    ) -> StoreResult<bool> {
        let key = namespace.key_for(&id.into());
        Ok(self.backend.get_item(&key).await?.is_some())
    }

    /// Remove the record stored under `id`.
    ///
    /// Returns `true` if it existed. Removing a missing record is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the removal fails.
    pub async fn remove(&self, namespace: &Namespace, id: impl Into<RecordId>) -> StoreResult<bool> {
        let id = id.into();
        let existed = self.backend.remove_item(&namespace.key_for(&id)).await?;
        debug!(namespace = %namespace, id = %id, existed, "removed record");
        Ok(existed)
    }

    /// Remove every record in `namespace`, leaving other namespaces intact.
    ///
    /// # Errors
    ///
    /// Returns the first backend failure. Records removed before it stay
    /// removed.
    pub async fn remove_all_in_namespace(&self, namespace: &Namespace) -> StoreResult<u64> {
        let mut removed: u64 = 0;
        for key in self.namespace_keys(namespace).await? {
            if self.backend.remove_item(&key).await? {
                removed = removed.saturating_add(1);
            }
        }
        info!(namespace = %namespace, removed, "cleared namespace");
        Ok(removed)
    }

    /// Remove every record in `namespace` for which `predicate` holds.
    ///
    /// # Errors
    ///
    /// Returns a codec error if a stored record is malformed, or the first
    /// backend failure.
    pub async fn remove_where<F>(&self, namespace: &Namespace, predicate: F) -> StoreResult<u64>
    where
        F: Fn(&Record) -> bool + Send,
    {
        let mut removed: u64 = 0;
        for (id, record) in self.entries(namespace).await? {
            if predicate(&record) && self.remove(namespace, id).await? {
                removed = removed.saturating_add(1);
            }
        }
        Ok(removed)
    }

    /// Read the record under `id` (an empty record if absent), apply
    /// `update`, and write it back.
    ///
    /// Calls through the same store are serialized; writers in other
    /// processes are not, and the last write wins.
    ///
    /// # Errors
    ///
    /// Returns a codec or backend error from the read or the write.
    pub async fn modify<F>(
        &self,
        namespace: &Namespace,
        id: impl Into<RecordId>,
        update: F,
    ) -> StoreResult<Record>
    where
        F: FnOnce(&mut Record) + Send,
    {
        let id = id.into();
        let _guard = self.rmw_lock.lock().await;
        let mut record = self.get(namespace, &id).await?.unwrap_or_default();
        update(&mut record);
        self.put(namespace, id, &record).await?;
        Ok(record)
    }

    /// Wipe the entire backend, across all namespaces.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the clear fails.
    pub async fn remove_everything(&self) -> StoreResult<u64> {
        let removed = self.backend.clear().await?;
        info!(removed, "wiped record store");
        Ok(removed)
    }

    /// Release the backend.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the backend fails to close.
    pub async fn close(&self) -> StoreResult<()> {
        self.backend.close().await?;
        Ok(())
    }
}
