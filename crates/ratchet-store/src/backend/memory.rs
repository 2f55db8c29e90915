use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::Backend;
use crate::error::{BackendError, BackendResult};

/// In-memory backend for tests and ephemeral data.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> BackendError {
    BackendError::Poisoned(e.to_string())
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> BackendResult<()> {
        let mut data = self.data.write().map_err(poisoned)?;
        data.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> BackendResult<bool> {
        let mut data = self.data.write().map_err(poisoned)?;
        Ok(data.remove(key).is_some())
    }

    async fn clear(&self) -> BackendResult<u64> {
        let mut data = self.data.write().map_err(poisoned)?;
        let count = data.len() as u64;
        data.clear();
        Ok(count)
    }

    async fn keys(&self) -> BackendResult<Vec<String>> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.keys().cloned().collect())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> BackendResult<Vec<String>> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
