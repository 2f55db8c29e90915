//! Per-kind record collections.
//!
//! A [`Collection`] is a namespace-scoped view into a [`RecordStore`], the
//! way a plugin sees only its own slice of a shared key-value store. The
//! typed facades ([`IdentityKeys`], [`Sessions`], ...) wrap one collection
//! each and add the operations specific to their record kind.
//!
//! # Example
//!
//! ```rust,ignore
//! use ratchet_store::{ProtocolStore, Record};
//!
//! let store = ProtocolStore::in_memory();
//! let pre_keys = store.pre_keys();
//!
//! pre_keys.create_or_update(&Record::with_id(7u32).with("pubKey", key)).await?;
//! let same = pre_keys.get_by_id("7").await?;
//! ```

use std::sync::Arc;

use crate::error::StoreResult;
use crate::namespace::{IdPolicy, Namespace, RecordId};
use crate::store::RecordStore;
use crate::value::Record;

mod conversation;
mod identity;
mod item;
mod pre_key;
mod session;
mod unprocessed;

pub use conversation::Conversations;
pub use identity::IdentityKeys;
pub use item::Items;
pub use pre_key::{PreKeys, SignedPreKeys};
pub use session::{CONVERSATION_ID_FIELD, Sessions};
pub use unprocessed::{ATTEMPTS_FIELD, Unprocessed};

/// A namespace-scoped view into a [`RecordStore`].
#[derive(Debug, Clone)]
pub struct Collection {
    store: Arc<RecordStore>,
    namespace: Namespace,
    ids: IdPolicy,
}

impl Collection {
    /// Create a view of `namespace` with the given identifier policy.
    #[must_use]
    pub fn new(store: Arc<RecordStore>, namespace: Namespace, ids: IdPolicy) -> Self {
        Self {
            store,
            namespace,
            ids,
        }
    }

    /// The namespace this collection is scoped to.
    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The identifier policy of this collection.
    #[must_use]
    pub fn id_policy(&self) -> IdPolicy {
        self.ids
    }

    /// The shared store behind this collection.
    #[must_use]
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    fn normalize(&self, id: impl Into<RecordId>) -> StoreResult<RecordId> {
        self.ids.normalize(id.into())
    }

    /// Create or update a record under its own `id` field.
    ///
    /// Returns the normalized id the record was stored under; the stored
    /// `id` field carries the same form.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingId`](crate::StoreError::MissingId) if the
    /// record has no usable `id`, or any codec/backend error.
    pub async fn put(&self, record: &Record) -> StoreResult<RecordId> {
        let (id, record) = self.ids.normalize_record(&self.namespace, record)?;
        self.store.put(&self.namespace, id.clone(), &record).await?;
        Ok(id)
    }

    /// Create or update a record under an explicit id.
    ///
    /// # Errors
    ///
    /// Returns an id, codec or backend error.
    pub async fn put_with_id(&self, id: impl Into<RecordId>, record: &Record) -> StoreResult<()> {
        let id = self.normalize(id)?;
        self.store.put(&self.namespace, id, record).await
    }

    /// Store each record under its own `id`, in order.
    ///
    /// # Errors
    ///
    /// Returns the first failure; earlier records stay written.
    pub async fn put_all(&self, records: &[Record]) -> StoreResult<usize> {
        self.store.put_all(&self.namespace, records, self.ids).await
    }

    /// Fetch a record by id.
    ///
    /// # Errors
    ///
    /// Returns an id error or a codec error for malformed stored data.
    pub async fn get(&self, id: impl Into<RecordId>) -> StoreResult<Option<Record>> {
        let id = self.normalize(id)?;
        self.store.get(&self.namespace, id).await
    }

    /// All records in the collection, in unspecified order.
    ///
    /// # Errors
    ///
    /// Returns a codec error if any stored record is malformed.
    pub async fn get_all(&self) -> StoreResult<Vec<Record>> {
        self.store.get_all(&self.namespace).await
    }

    /// Identifiers of all records in the collection.
    ///
    /// # Errors
    ///
    /// Returns a backend error if enumeration fails.
    pub async fn ids(&self) -> StoreResult<Vec<RecordId>> {
        self.store.ids(&self.namespace).await
    }

    /// Number of records in the collection.
    ///
    /// # Errors
    ///
    /// Returns a backend error if enumeration fails.
    pub async fn count(&self) -> StoreResult<u64> {
        self.store.count(&self.namespace).await
    }

    /// Remove a record by id. Missing records are not an error.
    ///
    /// # Errors
    ///
    /// Returns an id or backend error.
    pub async fn remove(&self, id: impl Into<RecordId>) -> StoreResult<bool> {
        let id = self.normalize(id)?;
        self.store.remove(&self.namespace, id).await
    }

    /// Remove every record in the collection.
    ///
    /// # Errors
    ///
    /// Returns the first backend failure.
    pub async fn clear(&self) -> StoreResult<u64> {
        self.store.remove_all_in_namespace(&self.namespace).await
    }
}

/// Generates a facade type over one namespace with the create-or-update,
/// get, bulk-add, remove and list operations every record kind shares.
macro_rules! record_collection {
    (
        $(#[$meta:meta])*
        $name:ident, $namespace:expr, $ids:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            inner: $crate::collections::Collection,
        }

        impl $name {
            /// Bind the facade to `store`.
            #[must_use]
            pub fn new(store: ::std::sync::Arc<$crate::store::RecordStore>) -> Self {
                Self {
                    inner: $crate::collections::Collection::new(store, $namespace, $ids),
                }
            }

            /// The underlying namespace-scoped collection.
            #[must_use]
            pub fn collection(&self) -> &$crate::collections::Collection {
                &self.inner
            }

            /// Create or update a record under its own `id` field.
            ///
            /// # Errors
            ///
            /// Returns an id, codec or backend error.
            pub async fn create_or_update(
                &self,
                record: &$crate::value::Record,
            ) -> $crate::error::StoreResult<$crate::namespace::RecordId> {
                self.inner.put(record).await
            }

            /// Fetch a record by id.
            ///
            /// # Errors
            ///
            /// Returns an id error or a codec error for malformed stored data.
            pub async fn get_by_id(
                &self,
                id: impl Into<$crate::namespace::RecordId>,
            ) -> $crate::error::StoreResult<Option<$crate::value::Record>> {
                self.inner.get(id).await
            }

            /// Store each record under its own `id`, in order.
            ///
            /// # Errors
            ///
            /// Returns the first failure; earlier records stay written.
            pub async fn bulk_add(
                &self,
                records: &[$crate::value::Record],
            ) -> $crate::error::StoreResult<usize> {
                self.inner.put_all(records).await
            }

            /// Remove a record by id.
            ///
            /// # Errors
            ///
            /// Returns an id or backend error.
            pub async fn remove_by_id(
                &self,
                id: impl Into<$crate::namespace::RecordId>,
            ) -> $crate::error::StoreResult<bool> {
                self.inner.remove(id).await
            }

            /// Remove every record of this kind.
            ///
            /// # Errors
            ///
            /// Returns the first backend failure.
            pub async fn remove_all(&self) -> $crate::error::StoreResult<u64> {
                self.inner.clear().await
            }

            /// All records of this kind, in unspecified order.
            ///
            /// # Errors
            ///
            /// Returns a codec error if any stored record is malformed.
            pub async fn get_all(
                &self,
            ) -> $crate::error::StoreResult<Vec<$crate::value::Record>> {
                self.inner.get_all().await
            }
        }
    };
}

pub(crate) use record_collection;
