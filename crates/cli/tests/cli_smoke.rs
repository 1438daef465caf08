//! CLI smoke tests for nodewrap.
//!
//! These tests verify that commands parse and fail cleanly without a
//! working source tree.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

fn nodewrap_cmd() -> Command {
  cargo_bin_cmd!("nodewrap")
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  nodewrap_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  nodewrap_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("nodewrap"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["build", "wrap", "plan", "realize", "inspect", "validate", "info"] {
    nodewrap_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// Info
// =============================================================================

#[test]
#[serial]
fn info_shows_platform_and_directories() {
  let temp = TempDir::new().unwrap();
  let store = temp.path().join("store");

  nodewrap_cmd()
    .env("NODEWRAP_STORE", &store)
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("Platform:"))
    .stdout(predicate::str::contains(store.display().to_string()));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn missing_source_tree_fails() {
  let temp = TempDir::new().unwrap();

  nodewrap_cmd()
    .arg("--source")
    .arg(temp.path().join("nope"))
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Source tree not found"));
}

#[test]
fn source_without_manifest_fails() {
  let temp = TempDir::new().unwrap();

  nodewrap_cmd()
    .env("NODEWRAP_STORE", temp.path().join("store"))
    .env("NODEWRAP_CACHE", temp.path().join("cache"))
    .arg("--source")
    .arg(temp.path())
    .arg("plan")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Cargo.toml"));
}

#[test]
fn malformed_config_fails() {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("nodewrap.toml"), "[build]\nunknown = 1\n").unwrap();

  nodewrap_cmd()
    .arg("--source")
    .arg(temp.path())
    .arg("plan")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn unknown_platform_fails() {
  let temp = TempDir::new().unwrap();

  nodewrap_cmd()
    .env("NODEWRAP_STORE", temp.path().join("store"))
    .env("NODEWRAP_CACHE", temp.path().join("cache"))
    .args(["--platform", "riscv64-linux", "--source"])
    .arg(temp.path())
    .arg("plan")
    .assert()
    .failure()
    .stderr(predicate::str::contains("riscv64-linux"));
}

#[test]
fn inspect_missing_path_fails() {
  let temp = TempDir::new().unwrap();

  nodewrap_cmd()
    .arg("inspect")
    .arg(temp.path().join("missing"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to inspect"));
}
