//! Vector storage seam.
//!
//! The relational store owns persisted vectors under its own transaction
//! discipline. The codec never holds a transaction: callers encode first
//! and hand the finished bytes to [`VectorStore::insert`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tracing::debug;

use crate::error::VectorError;
use crate::quantized::QuantizedVector;

/// Trait for vector stores.
///
/// Implementations must be thread-safe for concurrent request handling.
pub trait VectorStore: Send + Sync {
    /// Persist an encoded vector and return it with its assigned id.
    fn insert(&self, dim: usize, data: Vec<u8>) -> Result<QuantizedVector, VectorError>;

    /// Fetch a vector by id.
    fn get(&self, id: u64) -> Result<Option<QuantizedVector>, VectorError>;

    /// Number of stored vectors
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store, used by the CLI and tests.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    vectors: RwLock<HashMap<u64, QuantizedVector>>,
    next_id: AtomicU64,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            vectors: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorStore for InMemoryVectorStore {
    fn insert(&self, dim: usize, data: Vec<u8>) -> Result<QuantizedVector, VectorError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let vector = QuantizedVector::new(id, dim, data)?;

        let mut vectors = self
            .vectors
            .write()
            .map_err(|e| VectorError::Store(format!("Store lock error: {}", e)))?;
        vectors.insert(id, vector.clone());

        debug!(vector_id = id, dim, "Stored vector");
        Ok(vector)
    }

    fn get(&self, id: u64) -> Result<Option<QuantizedVector>, VectorError> {
        let vectors = self
            .vectors
            .read()
            .map_err(|e| VectorError::Store(format!("Store lock error: {}", e)))?;
        Ok(vectors.get(&id).cloned())
    }

    fn len(&self) -> usize {
        self.vectors.read().map(|v| v.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_ids() {
        let store = InMemoryVectorStore::new();
        assert!(store.is_empty());

        let a = store.insert(2, vec![1, 2]).unwrap();
        let b = store.insert(2, vec![3, 4]).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(b.id).unwrap().unwrap().data(), &[3, 4]);
    }

    #[test]
    fn test_get_missing() {
        let store = InMemoryVectorStore::new();
        assert!(store.get(42).unwrap().is_none());
    }

    #[test]
    fn test_insert_rejects_bad_length() {
        let store = InMemoryVectorStore::new();
        assert!(store.insert(3, vec![1, 2]).is_err());
        assert!(store.is_empty());
    }
}
