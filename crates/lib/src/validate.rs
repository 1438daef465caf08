//! End-to-end validation against a synthetic bundle.
//!
//! Writes a minimal `happ.yaml` fixture and asks a wrap entry point to bind
//! it. The wrapper is produced but never run.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::bundle::{BundleDescriptor, bundle_args};
use crate::error::PipelineError;
use crate::wrap::{BundleWrapper, WrappedExecutable};

pub const FIXTURE_DIR: &str = "fixture";
pub const FIXTURE_MANIFEST: &str = "happ.yaml";
pub const FIXTURE_NAME: &str = "nodewrap-fixture";

/// Anything that can bind a list of bundle ids to a wrapper.
pub trait WrapEntryPoint {
  fn wrap_for_bundles(&self, bundle_ids: &[String]) -> Result<WrappedExecutable, PipelineError>;
}

impl WrapEntryPoint for BundleWrapper {
  fn wrap_for_bundles(&self, bundle_ids: &[String]) -> Result<WrappedExecutable, PipelineError> {
    BundleWrapper::wrap_for_bundles(self, bundle_ids)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
  Pass,
  Fail(String),
}

impl Validation {
  pub fn is_pass(&self) -> bool {
    matches!(self, Self::Pass)
  }
}

impl fmt::Display for Validation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Pass => write!(f, "pass"),
      Self::Fail(reason) => write!(f, "fail: {}", reason),
    }
  }
}

#[derive(Serialize)]
struct FixtureManifest {
  manifest_version: &'static str,
  name: &'static str,
  description: Option<String>,
  roles: Vec<String>,
}

/// Writes the fixture manifest under `workdir` and returns its path.
pub fn write_fixture(workdir: &Path) -> Result<PathBuf, String> {
  let dir = workdir.join(FIXTURE_DIR);
  std::fs::create_dir_all(&dir).map_err(|e| format!("cannot create {}: {}", dir.display(), e))?;

  let manifest = FixtureManifest {
    manifest_version: "1",
    name: FIXTURE_NAME,
    description: None,
    roles: Vec::new(),
  };
  let yaml = serde_yaml::to_string(&manifest).map_err(|e| format!("cannot serialize fixture: {}", e))?;

  let path = dir.join(FIXTURE_MANIFEST);
  std::fs::write(&path, yaml).map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
  Ok(path)
}

/// Passes iff `entry` can wrap the fixture bundle.
pub fn validate(entry: &dyn WrapEntryPoint, workdir: &Path) -> Validation {
  let fixture = match write_fixture(workdir) {
    Ok(path) => path,
    Err(reason) => {
      warn!(reason = %reason, "validation fixture could not be written");
      return Validation::Fail(reason);
    }
  };

  let bundle = BundleDescriptor::from_path(&fixture);
  match entry.wrap_for_bundles(&bundle_args(&[bundle])) {
    Ok(wrapped) => {
      info!(wrapper = ?wrapped.path, "validation passed");
      Validation::Pass
    }
    Err(e) => {
      warn!(error = %e, "validation failed");
      Validation::Fail(format!("{}: {}", e.kind(), e))
    }
  }
}
