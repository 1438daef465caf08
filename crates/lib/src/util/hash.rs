//! Hashing for content addressing.
//!
//! - `ObjectHash`: truncated hash of a serialized value, used to name store
//!   directories and cache entries
//! - `ContentHash`: full SHA-256 of file or directory contents
//! - `hash_directory()` / `hash_file()` / `hash_bytes()`

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::consts::OBJ_HASH_PREFIX_LEN;

pub type HashError = serde_json::Error;

/// Key of a content-addressed object: the first 20 hex characters of the
/// SHA-256 of the value's JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHash(pub String);

impl std::fmt::Display for ObjectHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Anything serializable can be keyed by its `ObjectHash`.
///
/// Field order of the serialized struct is part of the key, so inputs that
/// feed a hash should use ordered collections (`Vec`, `BTreeMap`).
pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<ObjectHash, HashError> {
    let serialized = serde_json::to_string(self)?;
    let full = hash_bytes(serialized.as_bytes());
    Ok(ObjectHash(full.0[..OBJ_HASH_PREFIX_LEN].to_string()))
  }
}

/// Full 64-character lowercase hex SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum DirHashError {
  #[error("failed to walk {path}: {message}")]
  WalkDir { path: String, message: String },

  #[error("failed to read file {path}: {message}")]
  ReadFile { path: String, message: String },

  #[error("failed to read symlink {path}: {message}")]
  ReadSymlink { path: String, message: String },
}

/// Hash a directory tree by content.
///
/// Covers relative paths, file contents, and symlink targets. Timestamps and
/// permissions are ignored. Direct children of `path` whose file name appears
/// in `exclude` are skipped together with everything beneath them; deeper
/// entries with the same name are hashed normally.
pub fn hash_directory(path: &Path, exclude: &[&str]) -> Result<ContentHash, DirHashError> {
  let mut entries: Vec<(String, String)> = Vec::new();

  let walker = WalkDir::new(path)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| e.depth() != 1 || e.file_name().to_str().is_none_or(|name| !exclude.contains(&name)));

  for entry in walker {
    let entry = entry.map_err(|e| DirHashError::WalkDir {
      path: path.display().to_string(),
      message: e.to_string(),
    })?;
    let entry_path = entry.path();

    let rel_path = entry_path
      .strip_prefix(path)
      .unwrap_or(entry_path)
      .to_string_lossy()
      .replace('\\', "/");

    if rel_path.is_empty() {
      continue;
    }

    let file_type = entry.file_type();
    let line = if file_type.is_file() {
      format!("F:{}:{}", rel_path, hash_file(entry_path)?)
    } else if file_type.is_dir() {
      format!("D:{}", rel_path)
    } else if file_type.is_symlink() {
      let target = fs::read_link(entry_path).map_err(|e| DirHashError::ReadSymlink {
        path: entry_path.display().to_string(),
        message: e.to_string(),
      })?;
      format!("L:{}:{}", rel_path, hash_bytes(target.to_string_lossy().as_bytes()))
    } else {
      // sockets, fifos, devices
      continue;
    };

    entries.push((rel_path, line));
  }

  entries.sort_by(|a, b| a.0.cmp(&b.0));

  let mut hasher = Sha256::new();
  for (_, line) in entries {
    hasher.update(line.as_bytes());
    hasher.update(b"\n");
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}

/// Hash a single file's contents, streaming.
pub fn hash_file(path: &Path) -> Result<ContentHash, DirHashError> {
  let read_err = |e: std::io::Error| DirHashError::ReadFile {
    path: path.display().to_string(),
    message: e.to_string(),
  };

  let mut file = fs::File::open(path).map_err(read_err)?;
  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let n = file.read(&mut buffer).map_err(read_err)?;
    if n == 0 {
      break;
    }
    hasher.update(&buffer[..n]);
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}

pub fn hash_bytes(data: &[u8]) -> ContentHash {
  ContentHash(hex::encode(Sha256::digest(data)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[derive(Serialize)]
  struct Inputs {
    name: String,
    args: Vec<String>,
  }

  impl Hashable for Inputs {}

  #[test]
  fn hash_bytes_matches_known_digest() {
    assert_eq!(
      hash_bytes(b"hello world").0,
      "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
  }

  #[test]
  fn object_hash_is_truncated_and_stable() {
    let inputs = Inputs {
      name: "node".to_string(),
      args: vec!["a".to_string(), "b".to_string()],
    };

    let h1 = inputs.compute_hash().unwrap();
    let h2 = inputs.compute_hash().unwrap();

    assert_eq!(h1, h2);
    assert_eq!(h1.0.len(), OBJ_HASH_PREFIX_LEN);
  }

  #[test]
  fn object_hash_depends_on_order() {
    let ab = Inputs {
      name: "node".to_string(),
      args: vec!["a".to_string(), "b".to_string()],
    };
    let ba = Inputs {
      name: "node".to_string(),
      args: vec!["b".to_string(), "a".to_string()],
    };

    assert_ne!(ab.compute_hash().unwrap(), ba.compute_hash().unwrap());
  }

  #[test]
  fn directory_hash_is_deterministic() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("Cargo.toml"), "[package]").unwrap();
    fs::create_dir(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/main.rs"), "fn main() {}").unwrap();

    let h1 = hash_directory(temp.path(), &[]).unwrap();
    let h2 = hash_directory(temp.path(), &[]).unwrap();

    assert_eq!(h1, h2);
    assert_eq!(h1.0.len(), 64);
  }

  #[test]
  fn directory_hash_changes_with_content() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("main.rs"), "fn main() {}").unwrap();
    let before = hash_directory(temp.path(), &[]).unwrap();

    fs::write(temp.path().join("main.rs"), "fn main() { loop {} }").unwrap();
    let after = hash_directory(temp.path(), &[]).unwrap();

    assert_ne!(before, after);
  }

  #[test]
  fn directory_hash_skips_excluded_names() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("main.rs"), "fn main() {}").unwrap();
    let clean = hash_directory(temp.path(), &["target", ".git"]).unwrap();

    fs::create_dir_all(temp.path().join("target/release")).unwrap();
    fs::write(temp.path().join("target/release/node"), "binary").unwrap();
    fs::create_dir(temp.path().join(".git")).unwrap();
    fs::write(temp.path().join(".git/HEAD"), "ref").unwrap();

    let dirty = hash_directory(temp.path(), &["target", ".git"]).unwrap();
    assert_eq!(clean, dirty);
  }

  #[test]
  fn nested_entries_with_excluded_names_are_hashed() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("src/target")).unwrap();
    fs::write(temp.path().join("src/target/mod.rs"), "pub fn a() {}").unwrap();
    fs::write(temp.path().join("src/result"), "one").unwrap();
    let before = hash_directory(temp.path(), &["target", "result"]).unwrap();

    fs::write(temp.path().join("src/target/mod.rs"), "pub fn b() {}").unwrap();
    let after_target = hash_directory(temp.path(), &["target", "result"]).unwrap();
    fs::write(temp.path().join("src/result"), "two").unwrap();
    let after_result = hash_directory(temp.path(), &["target", "result"]).unwrap();

    assert_ne!(before, after_target);
    assert_ne!(after_target, after_result);
  }

  #[test]
  fn excluded_name_at_root_is_still_hashed() {
    // The root itself is never filtered, even if its name is in the exclude list.
    let temp = tempdir().unwrap();
    let root = temp.path().join("target");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.txt"), "a").unwrap();
    let h1 = hash_directory(&root, &["target"]).unwrap();

    fs::write(root.join("a.txt"), "b").unwrap();
    let h2 = hash_directory(&root, &["target"]).unwrap();

    assert_ne!(h1, h2);
  }

  #[test]
  fn moving_a_file_changes_the_hash() {
    let flat = tempdir().unwrap();
    fs::write(flat.path().join("main.rs"), "fn main() {}").unwrap();

    let nested = tempdir().unwrap();
    fs::create_dir(nested.path().join("src")).unwrap();
    fs::write(nested.path().join("src/main.rs"), "fn main() {}").unwrap();

    assert_ne!(
      hash_directory(flat.path(), &[]).unwrap(),
      hash_directory(nested.path(), &[]).unwrap()
    );
  }

  #[test]
  fn hash_file_reports_missing_path() {
    let temp = tempdir().unwrap();
    let err = hash_file(&temp.path().join("missing")).unwrap_err();
    assert!(matches!(err, DirHashError::ReadFile { .. }));
  }
}
