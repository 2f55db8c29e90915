use tracing::debug;

use super::record_collection;
use crate::error::StoreResult;
use crate::namespace::{IdPolicy, Namespace};
use crate::value::Value;

/// Field linking a session to its conversation.
pub const CONVERSATION_ID_FIELD: &str = "conversationId";

record_collection! {
    /// Ratchet session state, one record per remote device address.
    Sessions, Namespace::SESSION, IdPolicy::Opaque
}

impl Sessions {
    /// Remove every session whose `conversationId` equals
    /// `conversation_id`. Returns the number removed.
    ///
    /// Sessions are scanned and removed one at a time; a failure partway
    /// leaves earlier removals in place.
    ///
    /// # Errors
    ///
    /// Returns a codec error if a stored session is malformed, or the first
    /// backend failure.
    pub async fn remove_by_conversation(&self, conversation_id: &str) -> StoreResult<u64> {
        let removed = self
            .inner
            .store()
            .remove_where(self.inner.namespace(), |session| {
                matches!(
                    session.get(CONVERSATION_ID_FIELD),
                    Some(Value::Text(id)) if id == conversation_id
                )
            })
            .await?;
        debug!(conversation_id, removed, "removed sessions for conversation");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::Record;
    use crate::backend::MemoryBackend;
    use crate::store::RecordStore;

    fn session(id: &str, conversation: &str) -> Record {
        Record::with_id(id).with(CONVERSATION_ID_FIELD, conversation)
    }

    #[tokio::test]
    async fn test_remove_by_conversation() {
        let sessions = Sessions::new(Arc::new(RecordStore::new(Arc::new(MemoryBackend::new()))));
        sessions
            .bulk_add(&[session("s1", "A"), session("s2", "A"), session("s3", "B")])
            .await
            .unwrap();

        assert_eq!(sessions.remove_by_conversation("A").await.unwrap(), 2);

        let remaining = sessions.get_all().await.unwrap();
        assert_eq!(remaining, vec![session("s3", "B")]);
    }

    #[tokio::test]
    async fn test_remove_by_conversation_without_matches() {
        let sessions = Sessions::new(Arc::new(RecordStore::new(Arc::new(MemoryBackend::new()))));
        sessions
            .create_or_update(&Record::with_id("s1"))
            .await
            .unwrap();
        assert_eq!(sessions.remove_by_conversation("A").await.unwrap(), 0);
        assert!(sessions.get_by_id("s1").await.unwrap().is_some());
    }
}
