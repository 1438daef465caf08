use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::{CacheError, CacheStore};
use crate::util::hash::ObjectHash;

/// Filesystem cache with 2-character sharding.
///
/// Layout: `<root>/<first 2 chars>/<remaining chars>`. Writes go to a temp
/// file in the shard directory and are renamed into place, so readers never
/// observe a partial entry and concurrent writers need no lock.
#[derive(Debug, Clone)]
pub struct FsCacheStore {
  root: PathBuf,
}

impl FsCacheStore {
  pub fn new(root: impl AsRef<Path>) -> Self {
    Self {
      root: root.as_ref().to_path_buf(),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn entry_path(&self, key: &ObjectHash) -> PathBuf {
    let (shard, rest) = key.0.split_at(key.0.len().min(2));
    self.root.join(shard).join(rest)
  }
}

impl CacheStore for FsCacheStore {
  fn get(&self, key: &ObjectHash) -> Result<Option<Vec<u8>>, CacheError> {
    match fs::read(self.entry_path(key)) {
      Ok(bytes) => Ok(Some(bytes)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(source) => Err(CacheError::Io {
        key: key.0.clone(),
        source,
      }),
    }
  }

  fn put(&self, key: &ObjectHash, value: &[u8]) -> Result<(), CacheError> {
    let io_err = |source| CacheError::Io {
      key: key.0.clone(),
      source,
    };

    let path = self.entry_path(key);
    let shard_dir = path.parent().unwrap_or(&self.root);
    fs::create_dir_all(shard_dir).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(shard_dir).map_err(io_err)?;
    tmp.write_all(value).map_err(io_err)?;
    tmp.persist(&path).map_err(|e| io_err(e.error))?;

    debug!(key = %key, path = ?path, "cache entry written");
    Ok(())
  }
}
