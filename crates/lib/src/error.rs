//! Pipeline error taxonomy.
//!
//! Every variant carries enough context (manifest path, `name@version`,
//! platform, or bundle ids) to reproduce the failing step on its own.

use std::path::PathBuf;

use thiserror::Error;

use crate::cache::CacheError;

#[derive(Debug, Error)]
pub enum PipelineError {
  /// No prebuilt toolchain exists for the platform.
  #[error("unsupported platform '{platform}': no prebuilt toolchain available")]
  UnsupportedPlatform { platform: String },

  /// A required native library could not be located.
  #[error(
    "cannot resolve native library '{library}' (provided by {provider}) for {platform}; searched: {}",
    format_paths(searched)
  )]
  DependencyResolution {
    library: String,
    provider: String,
    platform: String,
    searched: Vec<PathBuf>,
  },

  /// The source tree's manifest is missing, unparseable, or incomplete.
  #[error("invalid manifest {}: {reason}", path.display())]
  InvalidManifest { path: PathBuf, reason: String },

  /// The build command failed or produced no executable.
  #[error("build of {package} for {platform} failed: {diagnostic}")]
  BuildFailure {
    package: String,
    platform: String,
    diagnostic: String,
  },

  /// The artifact's executable is gone at wrap time.
  #[error("artifact {artifact} not found at {}", path.display())]
  ArtifactNotFound { artifact: String, path: PathBuf },

  /// Writing the wrapper failed.
  #[error("failed to wrap bundles [{}] at {}: {message}", bundles.join(", "), path.display())]
  WrapFailure {
    bundles: Vec<String>,
    path: PathBuf,
    message: String,
  },

  /// A path given for inspection is not a wrapper produced by this tool.
  #[error("not a wrapper {}: {reason}", path.display())]
  NotAWrapper { path: PathBuf, reason: String },

  /// The pipeline configuration file is invalid.
  #[error("invalid config {}: {message}", path.display())]
  Config { path: PathBuf, message: String },

  /// The toolchain cache could not be read or written.
  #[error("cache error: {0}")]
  Cache(#[from] CacheError),

  /// A hashing input could not be serialized.
  #[error("failed to hash {what}: {source}")]
  Hash {
    what: String,
    #[source]
    source: serde_json::Error,
  },
}

fn format_paths(paths: &[PathBuf]) -> String {
  if paths.is_empty() {
    return "(no directories)".to_string();
  }
  paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}

impl PipelineError {
  /// Short stable label for the error kind, used in CLI output.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::UnsupportedPlatform { .. } => "UnsupportedPlatform",
      Self::DependencyResolution { .. } => "DependencyResolutionError",
      Self::InvalidManifest { .. } => "InvalidManifest",
      Self::BuildFailure { .. } => "BuildFailure",
      Self::ArtifactNotFound { .. } => "ArtifactNotFound",
      Self::WrapFailure { .. } => "WrapFailure",
      Self::NotAWrapper { .. } => "NotAWrapper",
      Self::Config { .. } => "ConfigError",
      Self::Cache(_) => "CacheError",
      Self::Hash { .. } => "HashError",
    }
  }
}
