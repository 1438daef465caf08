//! Bundle wrappers.
//!
//! A wrapper is a small script that `exec`s a build artifact with a fixed
//! list of bundle identifiers in front of the caller's arguments. The
//! artifact itself is never copied.
//!
//! Layout:
//! ```text
//! <wrap_root>/<hash>/
//!   bin/<name>        the script (<name>.cmd on Windows)
//!   wrapper.json      the recorded WrappedExecutable
//! ```
//! `hash` covers the artifact's content hash and path plus the bundle ids,
//! so every distinct id list gets its own directory.

pub mod script;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::build::BuildArtifact;
use crate::error::PipelineError;
use crate::util::hash::{ContentHash, Hashable};

pub const WRAPPER_METADATA: &str = "wrapper.json";

const STAGING_PREFIX: &str = ".staging-";

/// The parts of a build artifact a wrapper depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
  pub name: String,
  pub version: String,
  pub content_hash: ContentHash,
  pub executable: PathBuf,
}

impl From<&BuildArtifact> for ArtifactRef {
  fn from(artifact: &BuildArtifact) -> Self {
    Self {
      name: artifact.name.clone(),
      version: artifact.version.clone(),
      content_hash: artifact.content_hash.clone(),
      executable: artifact.executable.clone(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedExecutable {
  /// The wrapper script.
  pub path: PathBuf,
  /// Arguments baked into the script, exactly as requested.
  pub bundle_ids: Vec<String>,
  pub artifact: ArtifactRef,
}

#[derive(Serialize)]
struct WrapInputs<'a> {
  content_hash: &'a ContentHash,
  executable: &'a Path,
  bundle_ids: &'a [String],
}

impl Hashable for WrapInputs<'_> {}

/// Produces (or reuses) the wrapper for `artifact` bound to `bundle_ids`.
pub fn wrap(
  artifact: &BuildArtifact,
  bundle_ids: &[String],
  wrap_root: &Path,
) -> Result<WrappedExecutable, PipelineError> {
  if !artifact.executable.is_file() {
    return Err(PipelineError::ArtifactNotFound {
      artifact: artifact.id(),
      path: artifact.executable.clone(),
    });
  }

  let inputs = WrapInputs {
    content_hash: &artifact.content_hash,
    executable: &artifact.executable,
    bundle_ids,
  };
  let hash = inputs.compute_hash().map_err(|source| PipelineError::Hash {
    what: format!("wrapper inputs of {}", artifact.id()),
    source,
  })?;

  let wrap_dir = wrap_root.join(&hash.0);
  let expected = WrappedExecutable {
    path: script_path(&wrap_dir, &artifact.name),
    bundle_ids: bundle_ids.to_vec(),
    artifact: ArtifactRef::from(artifact),
  };

  info!(artifact = %artifact, bundles = ?bundle_ids, "wrapping artifact");

  if existing_matches(&wrap_dir, &expected) {
    debug!(path = ?wrap_dir, "wrapper already exists");
    return Ok(expected);
  }

  let failure = |path: &Path, message: String| PipelineError::WrapFailure {
    bundles: bundle_ids.to_vec(),
    path: path.to_path_buf(),
    message,
  };

  std::fs::create_dir_all(wrap_root).map_err(|e| failure(wrap_root, e.to_string()))?;
  let staging = tempfile::Builder::new()
    .prefix(STAGING_PREFIX)
    .tempdir_in(wrap_root)
    .map_err(|e| failure(wrap_root, e.to_string()))?;

  write_wrapper(staging.path(), &artifact.name, &expected).map_err(|e| failure(staging.path(), e.to_string()))?;

  if wrap_dir.exists() {
    if existing_matches(&wrap_dir, &expected) {
      return Ok(expected);
    }
    debug!(path = ?wrap_dir, "replacing incomplete wrapper");
    std::fs::remove_dir_all(&wrap_dir).map_err(|e| failure(&wrap_dir, e.to_string()))?;
  }

  if let Err(e) = std::fs::rename(staging.path(), &wrap_dir) {
    // A concurrent wrap of the same ids may have won the rename.
    if existing_matches(&wrap_dir, &expected) {
      debug!(path = ?wrap_dir, "wrapper created concurrently");
      return Ok(expected);
    }
    return Err(failure(&wrap_dir, e.to_string()));
  }

  info!(path = ?expected.path, "wrapper created");
  Ok(expected)
}

/// Reads the recorded wrapper from its directory or its script path.
pub fn inspect(path: &Path) -> Result<WrappedExecutable, PipelineError> {
  let dir = if path.is_dir() {
    path.to_path_buf()
  } else {
    path
      .parent()
      .and_then(Path::parent)
      .map(Path::to_path_buf)
      .unwrap_or_else(|| path.to_path_buf())
  };
  let metadata = dir.join(WRAPPER_METADATA);
  let failure = |reason: String| PipelineError::NotAWrapper {
    path: path.to_path_buf(),
    reason,
  };

  let content =
    std::fs::read_to_string(&metadata).map_err(|e| failure(format!("cannot read {}: {}", WRAPPER_METADATA, e)))?;
  serde_json::from_str(&content).map_err(|e| failure(format!("unreadable {}: {}", WRAPPER_METADATA, e)))
}

fn script_path(wrap_dir: &Path, name: &str) -> PathBuf {
  let file = if cfg!(windows) {
    format!("{}.cmd", name)
  } else {
    name.to_string()
  };
  wrap_dir.join("bin").join(file)
}

fn existing_matches(wrap_dir: &Path, expected: &WrappedExecutable) -> bool {
  expected.path.is_file() && inspect(wrap_dir).is_ok_and(|found| &found == expected)
}

fn write_wrapper(dir: &Path, name: &str, wrapped: &WrappedExecutable) -> std::io::Result<()> {
  let script = script_path(dir, name);
  std::fs::create_dir_all(dir.join("bin"))?;

  let body = if cfg!(windows) {
    script::render_cmd(&wrapped.artifact.executable, &wrapped.bundle_ids)
  } else {
    script::render_posix(&wrapped.artifact.executable, &wrapped.bundle_ids)
  };
  std::fs::write(&script, body)?;
  make_executable(&script)?;

  let json = serde_json::to_string_pretty(wrapped)?;
  std::fs::write(dir.join(WRAPPER_METADATA), format!("{}\n", json))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
  use std::os::unix::fs::PermissionsExt;
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
  Ok(())
}

/// A build artifact bound to a wrap directory. Cheap to clone and share
/// across threads; each call produces an independent wrapper.
#[derive(Debug, Clone)]
pub struct BundleWrapper {
  artifact: Arc<BuildArtifact>,
  wrap_root: PathBuf,
}

impl BundleWrapper {
  pub fn new(artifact: Arc<BuildArtifact>, wrap_root: impl Into<PathBuf>) -> Self {
    Self {
      artifact,
      wrap_root: wrap_root.into(),
    }
  }

  pub fn artifact(&self) -> &BuildArtifact {
    &self.artifact
  }

  pub fn wrap_root(&self) -> &Path {
    &self.wrap_root
  }

  pub fn wrap_for_bundles(&self, bundle_ids: &[String]) -> Result<WrappedExecutable, PipelineError> {
    wrap(&self.artifact, bundle_ids, &self.wrap_root)
  }

  pub fn wrap_for_single_bundle(&self, bundle_id: &str) -> Result<WrappedExecutable, PipelineError> {
    self.wrap_for_bundles(&[bundle_id.to_string()])
  }
}
