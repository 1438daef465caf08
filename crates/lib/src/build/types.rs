use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::toolchain::ToolchainSpec;
use crate::util::hash::{ContentHash, Hashable, ObjectHash};

/// Compiles for `$NODEWRAP_TARGET` into the isolated `CARGO_TARGET_DIR` and
/// copies the binary to `$out/bin`.
pub const DEFAULT_BUILD_COMMAND: &str = concat!(
  r#"cargo build --release --locked --target "$NODEWRAP_TARGET" && "#,
  r#"mkdir -p "$out/bin" && "#,
  r#"cp "$CARGO_TARGET_DIR/$NODEWRAP_TARGET/release/$NODEWRAP_PKG_NAME" "$out/bin/$NODEWRAP_PKG_NAME""#
);

/// Host variables passed through to the build environment by default.
pub const DEFAULT_PASS_ENV: &[&str] = &["PATH", "HOME", "CARGO_HOME", "RUSTUP_HOME"];

/// How the build command is run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSettings {
  /// Shell command run in the source tree. Must leave the executable at `$out/bin/$NODEWRAP_PKG_NAME`.
  pub command: String,
  /// Host environment variables copied into the otherwise cleared build environment.
  pub pass_env: Vec<String>,
  /// Shell override; defaults to `/bin/sh`.
  pub shell: Option<String>,
}

impl Default for BuildSettings {
  fn default() -> Self {
    Self {
      command: DEFAULT_BUILD_COMMAND.to_string(),
      pass_env: DEFAULT_PASS_ENV.iter().map(|s| s.to_string()).collect(),
      shell: None,
    }
  }
}

/// Everything that determines a build's output. Its hash names the store directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInputs {
  pub name: String,
  pub version: String,
  pub source_hash: ContentHash,
  pub toolchain: ToolchainSpec,
  pub command: String,
}

impl Hashable for BuildInputs {}

/// The compiled node executable. Immutable; shared read-only by every wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildArtifact {
  pub name: String,
  pub version: String,
  pub platform: String,
  pub executable: PathBuf,
  pub store_path: PathBuf,
  pub content_hash: ContentHash,
  pub inputs_hash: ObjectHash,
}

impl BuildArtifact {
  /// `name@version`
  pub fn id(&self) -> String {
    format!("{}@{}", self.name, self.version)
  }
}

impl fmt::Display for BuildArtifact {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}@{}", self.name, self.version)
  }
}
