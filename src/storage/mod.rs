//! # Durable Storage
//!
//! The widget remembers exactly one thing across restarts: the identifier of
//! the last order it created. This module provides the key/value seam for that
//! ([`KeyValueStore`]) and a typed wrapper ([`SessionStore`]) that knows the
//! key and the value encoding.
//!
//! Backends:
//! - [`FileStore`] keeps a small JSON object on disk.
//! - [`MemoryStore`] keeps values in a map, for tests and throwaway sessions.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::model::OrderId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Key under which the last created order identifier is stored.
pub const LAST_ORDER_KEY: &str = "last_order_id";

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorageError {
    /// The backend could not read or write its medium.
    #[error("Storage I/O error: {0}")]
    Io(String),

    /// Stored data could not be encoded or decoded.
    #[error("Storage serialization error: {0}")]
    Serialization(String),
}

/// Low-level string key/value interface implemented by every backend.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if it was never set.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Typed access to the persisted session.
///
/// Nothing ever clears the last order; a new one replaces it.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Identifier of the last created order, if one was ever stored.
    ///
    /// An empty stored value counts as absent.
    pub async fn last_order(&self) -> Result<Option<OrderId>, StorageError> {
        let value = self.backend.get(LAST_ORDER_KEY).await?;
        debug!(?value, "Loaded last order");
        Ok(value.filter(|v| !v.is_empty()).map(OrderId::from))
    }

    pub async fn remember(&self, id: &OrderId) -> Result<(), StorageError> {
        debug!(%id, "Persisting last order");
        self.backend.set(LAST_ORDER_KEY, id.as_str()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_store_round_trip() {
        let backend = Arc::new(MemoryStore::new());
        let store = SessionStore::new(backend.clone());

        assert_eq!(store.last_order().await.unwrap(), None);

        store.remember(&OrderId::new("A1")).await.unwrap();
        assert_eq!(store.last_order().await.unwrap(), Some(OrderId::new("A1")));
        assert_eq!(
            backend.get(LAST_ORDER_KEY).await.unwrap().as_deref(),
            Some("A1")
        );
    }

    #[tokio::test]
    async fn test_empty_value_is_absent() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(LAST_ORDER_KEY, "").await.unwrap();
        let store = SessionStore::new(backend);
        assert_eq!(store.last_order().await.unwrap(), None);
    }
}
