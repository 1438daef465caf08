//! Content-addressed cache capability.
//!
//! Entries are opaque blobs keyed by the `ObjectHash` of the inputs that
//! produced them. The store is append-only: writing a key that already exists
//! replaces it (last writer wins), which is safe because equal keys imply
//! equal content. Callers receive the store as an injected trait object.

pub mod fs;

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

use crate::util::hash::ObjectHash;

pub use fs::FsCacheStore;

#[derive(Debug, Error)]
pub enum CacheError {
  #[error("io error on cache entry {key}: {source}")]
  Io {
    key: String,
    #[source]
    source: std::io::Error,
  },

  #[error("cache lock poisoned")]
  Poisoned,
}

pub trait CacheStore: Send + Sync {
  /// Returns the blob stored under `key`, if any.
  fn get(&self, key: &ObjectHash) -> Result<Option<Vec<u8>>, CacheError>;

  /// Stores `value` under `key`, replacing any previous entry.
  fn put(&self, key: &ObjectHash, value: &[u8]) -> Result<(), CacheError>;

  fn contains(&self, key: &ObjectHash) -> Result<bool, CacheError> {
    Ok(self.get(key)?.is_some())
  }
}

/// In-memory cache for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
  entries: Mutex<HashMap<ObjectHash, Vec<u8>>>,
}

impl MemoryCacheStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries.lock().map(|e| e.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl CacheStore for MemoryCacheStore {
  fn get(&self, key: &ObjectHash) -> Result<Option<Vec<u8>>, CacheError> {
    let entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
    Ok(entries.get(key).cloned())
  }

  fn put(&self, key: &ObjectHash, value: &[u8]) -> Result<(), CacheError> {
    let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
    entries.insert(key.clone(), value.to_vec());
    Ok(())
  }
}
