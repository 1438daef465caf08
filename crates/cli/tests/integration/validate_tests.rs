use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn validate_passes_on_working_pipeline() {
  let env = TestEnv::echo_node();

  env
    .cmd()
    .arg("validate")
    .assert()
    .code(0)
    .stdout(predicate::str::contains("Validation passed"));

  assert!(!env.store_path().join("wrap").exists());
}

#[test]
fn validate_fails_when_build_fails() {
  let env = TestEnv::with_build_command("exit 1");

  env
    .cmd()
    .arg("validate")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Validation failed"))
    .stderr(predicate::str::contains("BuildFailure"));
}

#[test]
fn validate_fails_when_build_produces_nothing() {
  let env = TestEnv::with_build_command("true");

  env
    .cmd()
    .arg("validate")
    .assert()
    .failure()
    .stderr(predicate::str::contains("produced no executable"));
}
