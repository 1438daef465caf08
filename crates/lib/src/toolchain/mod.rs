//! Toolchain resolution.
//!
//! Turns a declared compiler version and a target platform into a
//! `ToolchainSpec`: the compiler identity plus the native library closure the
//! node binary links against. Resolutions are recorded in an injected
//! [`CacheStore`](crate::cache::CacheStore).

mod resolve;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::util::hash::Hashable;

pub use resolve::{ToolchainResolver, default_search_dirs, has_prebuilt_toolchain};

/// A native library the node binary must link against, and who provides it
/// (e.g. `stdc++` from `gcc`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeLibrary {
  pub name: String,
  pub provider: String,
}

impl NativeLibrary {
  pub fn new(name: &str, provider: &str) -> Self {
    Self {
      name: name.to_string(),
      provider: provider.to_string(),
    }
  }
}

/// What the caller asks the resolver for. Its `ObjectHash` is the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainRequest {
  pub compiler: String,
  pub version: String,
  pub platform: String,
  pub native: Vec<NativeLibrary>,
  /// Searched before `LIBRARY_PATH` and the platform's system directories.
  pub library_paths: Vec<PathBuf>,
}

impl Hashable for ToolchainRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLibrary {
  pub name: String,
  pub provider: String,
  pub path: PathBuf,
}

/// A resolved build environment. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainSpec {
  pub compiler: String,
  pub version: String,
  /// `arch-os` platform string.
  pub platform: String,
  /// Rust target triple.
  pub target: String,
  /// Directories containing the resolved libraries, first-found order, no duplicates.
  pub library_paths: Vec<PathBuf>,
  pub libraries: Vec<ResolvedLibrary>,
}

impl ToolchainSpec {
  /// `LIBRARY_PATH` value for the linker.
  pub fn library_path_env(&self) -> String {
    std::env::join_paths(&self.library_paths)
      .map(|p| p.to_string_lossy().to_string())
      .unwrap_or_default()
  }

  /// `RUSTFLAGS` value adding each library directory as a native search path.
  pub fn rustflags(&self) -> String {
    self
      .library_paths
      .iter()
      .map(|p| format!("-L native={}", p.display()))
      .collect::<Vec<_>>()
      .join(" ")
  }

  /// True if every recorded library path still exists on disk.
  pub fn is_present(&self) -> bool {
    self.library_paths.iter().all(|p| p.is_dir()) && self.libraries.iter().all(|l| l.path.exists())
  }
}
