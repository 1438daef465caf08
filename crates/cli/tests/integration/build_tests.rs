use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_prints_artifact_identity() {
  let env = TestEnv::echo_node();

  env
    .cmd()
    .arg("build")
    .assert()
    .success()
    .stdout(predicate::str::contains("Built always-online-node@0.1.0"))
    .stdout(predicate::str::contains("Content hash"));
}

#[test]
fn build_places_artifact_in_store() {
  let env = TestEnv::echo_node();

  env.cmd().arg("build").assert().success();

  let builds: Vec<_> = std::fs::read_dir(env.store_path().join("build")).unwrap().collect();
  assert_eq!(builds.len(), 1);
  let build_dir = builds[0].as_ref().unwrap().path();
  assert!(build_dir.join("bin/always-online-node").is_file());
  assert!(build_dir.join(".nodewrap-complete").is_file());
}

#[test]
fn repeated_build_reuses_store_entry() {
  let env = TestEnv::with_build_command(&format!(
    "echo built >> ../build-count && {}",
    super::common::ECHO_BUILD_COMMAND
  ));

  env.cmd().arg("build").assert().success();
  env.cmd().arg("build").assert().success();
  env.cmd().args(["build", "--rebuild"]).assert().success();

  let count = std::fs::read_to_string(env.temp.path().join("build-count")).unwrap();
  assert_eq!(count.lines().count(), 2);
}

#[test]
fn relative_store_is_resolved_against_working_directory() {
  let env = TestEnv::echo_node();

  env
    .cmd()
    .current_dir(env.temp.path())
    .env("NODEWRAP_STORE", "relstore")
    .arg("build")
    .assert()
    .success();

  assert!(env.temp.path().join("relstore/build").is_dir());
  assert!(!env.source_path().join("relstore").exists());
}

#[test]
fn failing_build_exits_non_zero_with_package() {
  let env = TestEnv::with_build_command("echo 'error[E0425]: cannot find value' >&2; exit 101");

  env
    .cmd()
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("always-online-node@0.1.0"))
    .stderr(predicate::str::contains("E0425"));
}

#[test]
fn invalid_manifest_is_reported() {
  let env = TestEnv::echo_node();
  env.write_file("src/Cargo.toml", "[package]\nname = \"always-online-node\"\n");

  env
    .cmd()
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid manifest"))
    .stderr(predicate::str::contains("package.version"));
}

#[test]
fn unsupported_platform_is_rejected() {
  let env = TestEnv::echo_node();

  env
    .cmd()
    .args(["--platform", "x86_64-windows", "build"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unsupported platform"));
}

#[test]
fn plan_lists_configured_wrappers_without_building() {
  let env = TestEnv::echo_node();

  env
    .cmd()
    .arg("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("Plan: always-online-node@0.1.0"))
    .stdout(predicate::str::contains("happ-store"))
    .stdout(predicate::str::contains("pair"));

  assert!(!env.store_path().join("build").exists());
}

#[test]
fn plan_json_is_valid() {
  let env = TestEnv::echo_node();

  let output = env.cmd().args(["plan", "-o", "json"]).output().unwrap();
  assert!(output.status.success());

  let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(plan["artifact"]["name"], "always-online-node");
  assert_eq!(plan["wrappers"][1]["bundle_ids"], serde_json::json!(["a", "b"]));
}
