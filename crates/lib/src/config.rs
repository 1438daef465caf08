//! Pipeline configuration (`nodewrap.toml`).
//!
//! Every section is optional; a source tree without a config file builds with
//! the default cargo command, the host toolchain channel, and no wrap
//! variants.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::build::BuildSettings;
use crate::consts::{CONFIG_FILENAME, DEFAULT_COMPILER_VERSION};
use crate::error::PipelineError;
use crate::platform::Platform;
use crate::source::declared_toolchain_channel;
use crate::toolchain::{NativeLibrary, ToolchainRequest};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
  pub toolchain: ToolchainConfig,
  pub build: BuildSettings,
  pub wrap: Vec<WrapVariant>,
  /// Upper bound on concurrent wraps. Defaults to the number of CPUs.
  pub parallelism: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
  pub compiler: String,
  /// Falls back to the `rust-toolchain.toml` channel, then `stable`.
  pub version: Option<String>,
  pub native: Vec<NativeLibrary>,
  pub library_paths: Vec<PathBuf>,
}

impl Default for ToolchainConfig {
  fn default() -> Self {
    Self {
      compiler: "rustc".to_string(),
      version: None,
      native: Vec::new(),
      library_paths: Vec::new(),
    }
  }
}

/// One wrapper to produce: a label and the bundle ids baked into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WrapVariant {
  pub name: String,
  #[serde(default)]
  pub bundles: Vec<String>,
}

impl PipelineConfig {
  pub fn load(path: &Path) -> Result<Self, PipelineError> {
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Config {
      path: path.to_path_buf(),
      message: e.to_string(),
    })?;
    Self::parse(&content, path)
  }

  pub fn parse(content: &str, path: &Path) -> Result<Self, PipelineError> {
    let invalid = |message: String| PipelineError::Config {
      path: path.to_path_buf(),
      message,
    };

    let config: Self = toml::from_str(content).map_err(|e| invalid(e.to_string()))?;

    if config.build.command.trim().is_empty() {
      return Err(invalid("build.command must not be empty".to_string()));
    }
    if config.parallelism == Some(0) {
      return Err(invalid("parallelism must be at least 1".to_string()));
    }
    if let Some(variant) = config.wrap.iter().find(|v| v.name.trim().is_empty()) {
      return Err(invalid(format!("wrap variant with bundles {:?} has no name", variant.bundles)));
    }

    Ok(config)
  }

  /// Loads `explicit` if given, else `<source_tree>/nodewrap.toml` if present,
  /// else the defaults.
  pub fn discover(source_tree: &Path, explicit: Option<&Path>) -> Result<Self, PipelineError> {
    if let Some(path) = explicit {
      return Self::load(path);
    }
    let path = source_tree.join(CONFIG_FILENAME);
    if path.is_file() {
      debug!(path = ?path, "loading config");
      Self::load(&path)
    } else {
      debug!(source = ?source_tree, "no config file, using defaults");
      Ok(Self::default())
    }
  }

  /// The resolver request for `platform`.
  pub fn toolchain_request(&self, platform: &Platform, source_tree: &Path) -> ToolchainRequest {
    let version = self
      .toolchain
      .version
      .clone()
      .or_else(|| declared_toolchain_channel(source_tree))
      .unwrap_or_else(|| DEFAULT_COMPILER_VERSION.to_string());

    ToolchainRequest {
      compiler: self.toolchain.compiler.clone(),
      version,
      platform: platform.triple(),
      native: self.toolchain.native.clone(),
      library_paths: self.toolchain.library_paths.clone(),
    }
  }

  pub fn parallelism(&self) -> usize {
    self
      .parallelism
      .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
  }
}
