use super::record_collection;
use crate::namespace::{IdPolicy, Namespace};

record_collection! {
    /// One-time Curve25519 pre-keys.
    ///
    /// Ids are integers: `7` and `"7"` address the same record. Key bytes
    /// live in `pubKey` and `privKey`, directly or inside a nested key pair.
    PreKeys, Namespace::PRE_KEY, IdPolicy::Numeric
}

record_collection! {
    /// Signed Curve25519 pre-keys, with the same integer ids as [`PreKeys`].
    SignedPreKeys, Namespace::SIGNED_PRE_KEY, IdPolicy::Numeric
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::store::RecordStore;
    use crate::{Record, StoreError};

    fn store() -> Arc<RecordStore> {
        Arc::new(RecordStore::new(Arc::new(MemoryBackend::new())))
    }

    #[tokio::test]
    async fn test_integer_and_string_ids_match() {
        let pre_keys = PreKeys::new(store());
        let record = Record::with_id(7u32).with("pubKey", vec![1u8, 2, 3]);
        pre_keys.create_or_update(&record).await.unwrap();

        assert_eq!(pre_keys.get_by_id("7").await.unwrap(), Some(record.clone()));
        assert_eq!(pre_keys.get_by_id(7u32).await.unwrap(), Some(record));
        assert!(pre_keys.remove_by_id("7").await.unwrap());
        assert!(pre_keys.get_by_id(7u32).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_string_id_in_record_is_normalized() {
        let signed = SignedPreKeys::new(store());
        signed
            .create_or_update(&Record::with_id("12").with("privKey", vec![9u8]))
            .await
            .unwrap();
        assert!(signed.get_by_id(12u32).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_pre_keys_and_signed_pre_keys_are_separate() {
        let shared = store();
        let pre_keys = PreKeys::new(Arc::clone(&shared));
        let signed = SignedPreKeys::new(shared);

        pre_keys
            .bulk_add(&[Record::with_id(1u32), Record::with_id(2u32)])
            .await
            .unwrap();
        signed.create_or_update(&Record::with_id(1u32)).await.unwrap();

        assert_eq!(pre_keys.get_all().await.unwrap().len(), 2);
        assert_eq!(signed.get_all().await.unwrap().len(), 1);
        assert_eq!(pre_keys.remove_all().await.unwrap(), 2);
        assert!(signed.get_by_id(1u32).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_non_integer_id_is_rejected() {
        let pre_keys = PreKeys::new(store());
        let err = pre_keys
            .create_or_update(&Record::with_id("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidId { .. }));
    }
}
