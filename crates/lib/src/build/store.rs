//! Build store layout and completion markers.
//!
//! `<store>/build/<hash>/` holds one build: `bin/<name>` plus the
//! `.nodewrap-complete` marker, written last, recording the hash of
//! everything else in the directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::util::hash::{DirHashError, ObjectHash, hash_directory};

/// Marker file written after a build succeeds.
pub const BUILD_COMPLETE_MARKER: &str = ".nodewrap-complete";

/// Build scratch directory, removed on success.
pub const BUILD_TMP_DIR: &str = "tmp";

/// Excluded when hashing a build directory.
pub const BUILD_HASH_EXCLUSIONS: &[&str] = &[BUILD_COMPLETE_MARKER, BUILD_TMP_DIR];

/// Builds live under `<store>/build`.
pub const BUILD_DIR: &str = "build";

pub fn builds_root(store_root: &Path) -> PathBuf {
  store_root.join(BUILD_DIR)
}

pub fn build_dir_path(store_root: &Path, hash: &ObjectHash) -> PathBuf {
  builds_root(store_root).join(&hash.0)
}

pub fn executable_path(build_dir: &Path, name: &str) -> PathBuf {
  build_dir.join("bin").join(name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMarker {
  pub version: u32,
  pub status: String,
  /// Hash of the build directory, excluding the marker and scratch space.
  pub output_hash: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
  #[error("failed to hash build output: {0}")]
  Hash(#[from] DirHashError),

  #[error("failed to serialize marker: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("failed to write marker {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

pub fn write_marker(build_dir: &Path) -> Result<BuildMarker, MarkerError> {
  let output_hash = hash_directory(build_dir, BUILD_HASH_EXCLUSIONS)?;
  let marker = BuildMarker {
    version: 1,
    status: "complete".to_string(),
    output_hash: output_hash.0,
  };
  let path = build_dir.join(BUILD_COMPLETE_MARKER);
  let content = serde_json::to_string(&marker)?;
  std::fs::write(&path, format!("{}\n", content)).map_err(|source| MarkerError::Write { path, source })?;
  Ok(marker)
}

/// Reads the marker; `None` if absent or unparseable.
pub fn read_marker(build_dir: &Path) -> Option<BuildMarker> {
  let content = std::fs::read_to_string(build_dir.join(BUILD_COMPLETE_MARKER)).ok()?;
  match serde_json::from_str(&content) {
    Ok(marker) => Some(marker),
    Err(e) => {
      debug!(path = ?build_dir, error = %e, "unparseable build marker");
      None
    }
  }
}

/// True if `build_dir` holds a completed build whose contents still match its marker.
pub fn is_valid_build(build_dir: &Path) -> bool {
  let Some(marker) = read_marker(build_dir) else {
    return false;
  };

  match hash_directory(build_dir, BUILD_HASH_EXCLUSIONS) {
    Ok(current) if current.0 == marker.output_hash => true,
    Ok(current) => {
      warn!(
        path = ?build_dir,
        expected = %marker.output_hash,
        actual = %current.0,
        "build output corrupted"
      );
      false
    }
    Err(e) => {
      warn!(path = ?build_dir, error = %e, "failed to hash build output");
      false
    }
  }
}
