use std::path::PathBuf;
use std::process::Command;

use predicates::prelude::*;

use super::common::TestEnv;

fn run_wrapper(path: &str, args: &[&str]) -> Vec<String> {
  let output = Command::new(path).args(args).output().unwrap();
  assert!(output.status.success());
  String::from_utf8(output.stdout).unwrap().lines().map(str::to_string).collect()
}

#[test]
fn wrap_binds_bundles_in_order() {
  let env = TestEnv::echo_node();

  env
    .cmd()
    .args(["wrap", "--bundle", "happ-store", "--bundle", "dna with space"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Wrapped always-online-node@0.1.0"))
    .stdout(predicate::str::contains("dna with space"));

  let wrap_root = env.store_path().join("wrap");
  let dirs: Vec<PathBuf> = std::fs::read_dir(&wrap_root).unwrap().map(|e| e.unwrap().path()).collect();
  assert_eq!(dirs.len(), 1);

  let script = dirs[0].join("bin/always-online-node");
  let lines = run_wrapper(script.to_str().unwrap(), &["--runtime"]);
  assert_eq!(lines, vec!["happ-store", "dna with space", "--runtime"]);
}

#[test]
fn realize_produces_every_variant() {
  let env = TestEnv::echo_node();

  let realization = env.realize_json();
  let wrappers = realization["wrappers"].as_array().unwrap();
  assert_eq!(wrappers.len(), 2);
  assert_eq!(wrappers[0]["label"], "happ-store");
  assert_eq!(wrappers[1]["label"], "pair");

  let store_path = wrappers[0]["wrapped"]["path"].as_str().unwrap();
  let pair_path = wrappers[1]["wrapped"]["path"].as_str().unwrap();
  assert_ne!(store_path, pair_path);
  assert_eq!(run_wrapper(store_path, &[]), vec!["happ-store"]);
  assert_eq!(run_wrapper(pair_path, &[]), vec!["a", "b"]);
  assert_eq!(
    wrappers[0]["wrapped"]["artifact"]["executable"],
    wrappers[1]["wrapped"]["artifact"]["executable"]
  );
}

#[test]
fn realize_twice_is_stable() {
  let env = TestEnv::echo_node();

  let first = env.realize_json();
  let second = env.realize_json();

  assert_eq!(first, second);
}

#[test]
fn inspect_shows_recorded_bundles() {
  let env = TestEnv::echo_node();
  let realization = env.realize_json();
  let pair_path = realization["wrappers"][1]["wrapped"]["path"].as_str().unwrap();

  env
    .cmd()
    .args(["inspect", pair_path])
    .assert()
    .success()
    .stdout(predicate::str::contains("always-online-node@0.1.0"))
    .stdout(predicate::str::contains("  a\n  b\n"));

  let output = env.cmd().args(["inspect", pair_path, "-o", "json"]).output().unwrap();
  let wrapped: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(wrapped["bundle_ids"], serde_json::json!(["a", "b"]));
}

#[test]
fn inspect_of_non_wrapper_fails() {
  let env = TestEnv::echo_node();

  env
    .cmd()
    .args(["inspect"])
    .arg(env.source_path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("not a wrapper"));
}
