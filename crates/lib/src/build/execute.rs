//! The crate builder.
//!
//! Reads the source manifest, hashes the source tree, and either reuses a
//! completed build from the store or runs the build command into a fresh
//! store directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use super::cmd::run_isolated;
use super::store::{BUILD_TMP_DIR, build_dir_path, builds_root, executable_path, is_valid_build, write_marker};
use super::{BuildArtifact, BuildInputs, BuildSettings};
use crate::consts::SOURCE_DATE_EPOCH;
use crate::error::PipelineError;
use crate::source::SourceManifest;
use crate::toolchain::ToolchainSpec;
use crate::util::hash::{ContentHash, Hashable, ObjectHash, hash_directory, hash_file};

/// Not part of the source identity: top-level build outputs and VCS metadata.
pub const SOURCE_HASH_EXCLUSIONS: &[&str] = &["target", ".git", "result"];

/// In-progress builds: `<store>/build/.staging-<hash>-XXXXXX`.
const STAGING_PREFIX: &str = ".staging-";

/// Replaced builds awaiting deletion.
const RETIRED_PREFIX: &str = ".retired-";

#[derive(Debug, Clone)]
pub struct CrateBuilder {
  store_root: PathBuf,
  settings: BuildSettings,
}

impl CrateBuilder {
  /// A relative `store_root` is resolved against the current directory.
  pub fn new(store_root: impl Into<PathBuf>, settings: BuildSettings) -> Self {
    let store_root = store_root.into();
    Self {
      store_root: std::path::absolute(&store_root).unwrap_or(store_root),
      settings,
    }
  }

  pub fn settings(&self) -> &BuildSettings {
    &self.settings
  }

  /// Computes the build inputs without building anything.
  pub fn inputs(&self, source_tree: &Path, toolchain: &ToolchainSpec) -> Result<BuildInputs, PipelineError> {
    let manifest = SourceManifest::read(source_tree)?;
    let source_hash = hash_source_tree(source_tree, &manifest, toolchain)?;
    Ok(BuildInputs {
      name: manifest.name,
      version: manifest.version,
      source_hash,
      toolchain: toolchain.clone(),
      command: self.settings.command.clone(),
    })
  }

  /// Builds the node artifact, reusing the store when the same inputs were built before.
  ///
  /// The build runs in a staging directory next to its final store path and is
  /// moved into place only once complete. `rebuild` ignores a cached build for
  /// these inputs but leaves it in place until the new one replaces it.
  pub async fn build(
    &self,
    source_tree: &Path,
    toolchain: &ToolchainSpec,
    rebuild: bool,
  ) -> Result<BuildArtifact, PipelineError> {
    let inputs = self.inputs(source_tree, toolchain)?;
    let package = format!("{}@{}", inputs.name, inputs.version);
    let failure = |diagnostic: String| PipelineError::BuildFailure {
      package: package.clone(),
      platform: toolchain.platform.clone(),
      diagnostic,
    };

    let hash = inputs.compute_hash().map_err(|source| PipelineError::Hash {
      what: format!("build inputs of {}", package),
      source,
    })?;
    let build_dir = build_dir_path(&self.store_root, &hash);
    let executable = executable_path(&build_dir, &inputs.name);

    info!(package = %package, platform = %toolchain.platform, hash = %hash, "building artifact");

    if !rebuild && build_dir.exists() && is_valid_build(&build_dir) && executable.is_file() {
      debug!(path = ?build_dir, "artifact already in store (cache hit)");
      return artifact(&inputs, &toolchain.platform, build_dir, executable, hash).map_err(failure);
    }

    let build_root = builds_root(&self.store_root);
    fs::create_dir_all(&build_root)
      .await
      .map_err(|e| failure(format!("cannot create {}: {}", build_root.display(), e)))?;

    // Removed on drop, so a failed build leaves nothing behind.
    let staging = tempfile::Builder::new()
      .prefix(&format!("{}{}-", STAGING_PREFIX, hash))
      .tempdir_in(&build_root)
      .map_err(|e| failure(format!("cannot create staging directory: {}", e)))?;
    let stage_dir = staging.path();
    let staged_executable = executable_path(stage_dir, &inputs.name);

    let tmp_dir = stage_dir.join(BUILD_TMP_DIR);
    fs::create_dir_all(&tmp_dir)
      .await
      .map_err(|e| failure(format!("cannot create {}: {}", tmp_dir.display(), e)))?;

    let env = build_env(&inputs, toolchain, stage_dir, &tmp_dir);
    let output = run_isolated(
      &self.settings.command,
      &env,
      &self.settings.pass_env,
      source_tree,
      self.settings.shell.as_deref(),
    )
    .await
    .map_err(|e| failure(format!("cannot spawn build command: {}", e)))?;

    if !output.success() {
      return Err(failure(output.diagnostic()));
    }

    if !staged_executable.is_file() {
      return Err(failure(format!(
        "build command succeeded but produced no executable at {}",
        staged_executable.display()
      )));
    }

    fs::remove_dir_all(&tmp_dir)
      .await
      .map_err(|e| failure(format!("cannot remove {}: {}", tmp_dir.display(), e)))?;
    make_executable(&staged_executable).map_err(|e| failure(format!("cannot mark executable: {}", e)))?;
    write_marker(stage_dir).map_err(|e| failure(e.to_string()))?;

    install(stage_dir, &build_dir).map_err(|e| failure(format!("cannot install {}: {}", build_dir.display(), e)))?;

    let artifact = artifact(&inputs, &toolchain.platform, build_dir, executable, hash).map_err(failure)?;
    info!(artifact = %artifact, path = ?artifact.executable, "build complete");
    Ok(artifact)
  }
}

/// Moves a completed staging directory to `build_dir`.
///
/// A previous entry is moved aside first and deleted only after the new one
/// is in place; if the final rename fails it is restored.
fn install(staged: &Path, build_dir: &Path) -> std::io::Result<()> {
  let Some(parent) = build_dir.parent() else {
    return std::fs::rename(staged, build_dir);
  };

  let retired = tempfile::Builder::new().prefix(RETIRED_PREFIX).tempdir_in(parent)?;
  let previous = retired.path().join("previous");
  let had_previous = match std::fs::rename(build_dir, &previous) {
    Ok(()) => true,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
    Err(e) => return Err(e),
  };

  if let Err(e) = std::fs::rename(staged, build_dir) {
    if had_previous {
      if let Err(restore) = std::fs::rename(&previous, build_dir) {
        warn!(path = ?build_dir, error = %restore, "failed to restore previous build");
      }
    }
    return Err(e);
  }

  if had_previous {
    debug!(path = ?build_dir, "replaced previous build");
  }
  Ok(())
}

fn hash_source_tree(
  source_tree: &Path,
  manifest: &SourceManifest,
  toolchain: &ToolchainSpec,
) -> Result<ContentHash, PipelineError> {
  hash_directory(source_tree, SOURCE_HASH_EXCLUSIONS).map_err(|e| PipelineError::BuildFailure {
    package: manifest.to_string(),
    platform: toolchain.platform.clone(),
    diagnostic: format!("cannot hash source tree: {}", e),
  })
}

/// The complete environment of the build command, apart from passthrough variables.
fn build_env(
  inputs: &BuildInputs,
  toolchain: &ToolchainSpec,
  build_dir: &Path,
  tmp_dir: &Path,
) -> BTreeMap<String, String> {
  let tmp = tmp_dir.to_string_lossy().to_string();
  let mut env = BTreeMap::new();
  env.insert("out".to_string(), build_dir.to_string_lossy().to_string());
  env.insert("TMPDIR".to_string(), tmp.clone());
  env.insert("TMP".to_string(), tmp.clone());
  env.insert("TEMP".to_string(), tmp.clone());
  env.insert(
    "CARGO_TARGET_DIR".to_string(),
    tmp_dir.join("target").to_string_lossy().to_string(),
  );
  env.insert("NODEWRAP_TARGET".to_string(), toolchain.target.clone());
  env.insert("NODEWRAP_PLATFORM".to_string(), toolchain.platform.clone());
  env.insert("NODEWRAP_PKG_NAME".to_string(), inputs.name.clone());
  env.insert("NODEWRAP_PKG_VERSION".to_string(), inputs.version.clone());
  env.insert("RUSTUP_TOOLCHAIN".to_string(), toolchain.version.clone());
  env.insert("LIBRARY_PATH".to_string(), toolchain.library_path_env());
  env.insert("RUSTFLAGS".to_string(), toolchain.rustflags());
  env.insert("SOURCE_DATE_EPOCH".to_string(), SOURCE_DATE_EPOCH.to_string());
  env.insert("LANG".to_string(), "C".to_string());
  env.insert("LC_ALL".to_string(), "C".to_string());
  env
}

fn artifact(
  inputs: &BuildInputs,
  platform: &str,
  store_path: PathBuf,
  executable: PathBuf,
  inputs_hash: ObjectHash,
) -> Result<BuildArtifact, String> {
  let content_hash = hash_file(&executable).map_err(|e| e.to_string())?;
  Ok(BuildArtifact {
    name: inputs.name.clone(),
    version: inputs.version.clone(),
    platform: platform.to_string(),
    executable,
    store_path,
    content_hash,
    inputs_hash,
  })
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
  use std::os::unix::fs::PermissionsExt;

  let mut perms = std::fs::metadata(path)?.permissions();
  perms.set_mode(perms.mode() | 0o755);
  std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
  Ok(())
}
