//! Source tree manifest.
//!
//! The only file format the builder requires: `Cargo.toml` at the source root
//! with a non-empty `package.name` and a semver `package.version`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{RUST_TOOLCHAIN_FILENAME, SOURCE_MANIFEST_FILENAME};
use crate::error::PipelineError;

/// Package identity read from the source tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceManifest {
  pub name: String,
  pub version: String,
}

#[derive(Deserialize)]
struct CargoToml {
  package: Option<CargoPackage>,
}

#[derive(Deserialize)]
struct CargoPackage {
  name: Option<String>,
  version: Option<toml::Value>,
}

impl SourceManifest {
  /// Reads `Cargo.toml` from the root of `source_tree`.
  pub fn read(source_tree: &Path) -> Result<Self, PipelineError> {
    let path = source_tree.join(SOURCE_MANIFEST_FILENAME);
    let content = std::fs::read_to_string(&path).map_err(|e| PipelineError::InvalidManifest {
      path: path.clone(),
      reason: format!("cannot read manifest: {}", e),
    })?;
    Self::parse(&content, &path)
  }

  /// Parses manifest text; `path` is only used for error context.
  pub fn parse(content: &str, path: &Path) -> Result<Self, PipelineError> {
    let invalid = |reason: String| PipelineError::InvalidManifest {
      path: path.to_path_buf(),
      reason,
    };

    let parsed: CargoToml = toml::from_str(content).map_err(|e| invalid(format!("not valid TOML: {}", e)))?;
    let package = parsed
      .package
      .ok_or_else(|| invalid("missing [package] table".to_string()))?;

    let name = package
      .name
      .map(|n| n.trim().to_string())
      .filter(|n| !n.is_empty())
      .ok_or_else(|| invalid("missing or empty package.name".to_string()))?;

    let version = match package.version {
      Some(toml::Value::String(v)) if !v.trim().is_empty() => v.trim().to_string(),
      // `version.workspace = true` cannot be resolved without the workspace root.
      Some(toml::Value::Table(_)) => {
        return Err(invalid("package.version must be a literal version string".to_string()));
      }
      _ => return Err(invalid("missing or empty package.version".to_string())),
    };

    semver::Version::parse(&version).map_err(|e| invalid(format!("package.version '{}' is not semver: {}", version, e)))?;

    Ok(Self { name, version })
  }
}

impl fmt::Display for SourceManifest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}@{}", self.name, self.version)
  }
}

#[derive(Deserialize)]
struct RustToolchainFile {
  toolchain: Option<RustToolchainSection>,
}

#[derive(Deserialize)]
struct RustToolchainSection {
  channel: Option<String>,
}

/// The `toolchain.channel` declared in the source tree's `rust-toolchain.toml`, if any.
pub fn declared_toolchain_channel(source_tree: &Path) -> Option<String> {
  let path: PathBuf = source_tree.join(RUST_TOOLCHAIN_FILENAME);
  let content = std::fs::read_to_string(path).ok()?;
  let parsed: RustToolchainFile = toml::from_str(&content).ok()?;
  parsed.toolchain?.channel.filter(|c| !c.trim().is_empty())
}
