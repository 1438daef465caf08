//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Build command that writes a node script printing its arguments one per line.
pub const ECHO_BUILD_COMMAND: &str =
  r#"mkdir -p "$out/bin" && printf '#!/bin/sh\nfor a in "$@"; do printf "%%s\\n" "$a"; done\n' > "$out/bin/$NODEWRAP_PKG_NAME""#;

/// Isolated test environment.
///
/// Each test gets its own source tree, store, and toolchain cache.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// A source tree for `always-online-node` 0.1.0 built with `command`.
  pub fn with_build_command(command: &str) -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    env.write_file(
      "src/Cargo.toml",
      "[package]\nname = \"always-online-node\"\nversion = \"0.1.0\"\nedition = \"2024\"\n",
    );
    env.write_file("src/src/main.rs", "fn main() {}\n");
    env.write_file(
      "src/nodewrap.toml",
      &format!(
        "[toolchain]\nversion = \"1.83.0\"\n\n[build]\ncommand = '''{}'''\n\n[[wrap]]\nname = \"happ-store\"\nbundles = [\"happ-store\"]\n\n[[wrap]]\nname = \"pair\"\nbundles = [\"a\", \"b\"]\n",
        command
      ),
    );
    env
  }

  /// A source tree whose build produces the echo script.
  pub fn echo_node() -> Self {
    Self::with_build_command(ECHO_BUILD_COMMAND)
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn source_path(&self) -> PathBuf {
    let p = self.temp.path().join("src");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Store path (isolated per test).
  pub fn store_path(&self) -> PathBuf {
    let p = self.temp.path().join("store");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn cache_path(&self) -> PathBuf {
    let p = self.temp.path().join("cache");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// A `nodewrap` command pointed at this environment.
  ///
  /// Sets `NODEWRAP_STORE` and `NODEWRAP_CACHE` to isolated paths and passes
  /// `--source`.
  pub fn cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("nodewrap");
    cmd.env("NODEWRAP_STORE", self.store_path());
    cmd.env("NODEWRAP_CACHE", self.cache_path());
    cmd.arg("--source").arg(self.source_path());
    cmd
  }

  /// Runs `nodewrap realize -o json` and returns the parsed output.
  pub fn realize_json(&self) -> serde_json::Value {
    let output = self.cmd().args(["realize", "-o", "json"]).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
  }
}
