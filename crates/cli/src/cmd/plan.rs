//! Implementation of the `nodewrap plan` command.
//!
//! Resolves the toolchain and hashes the source tree, then prints the
//! artifact and wrappers `realize` would produce. Nothing is built.

use anyhow::{Context, Result};

use super::GlobalArgs;
use crate::output::{OutputFormat, print_json, print_stat, print_wrapper, truncate_hash};

pub fn cmd_plan(global: &GlobalArgs, output: OutputFormat) -> Result<()> {
  let pipeline = global.pipeline()?;
  let platform = global.platform()?;

  let plan = pipeline.plan(&platform).context("Failed to compose plan")?;

  if output.is_json() {
    return print_json(&plan);
  }

  println!("Plan: {}@{}", plan.artifact.name, plan.artifact.version);
  print_stat("Platform", &plan.artifact.platform);
  print_stat("Inputs", truncate_hash(&plan.artifact.inputs_hash.0));
  print_stat("Wrappers", &plan.wrappers.len().to_string());
  for wrapper in &plan.wrappers {
    print_wrapper(&wrapper.label, &format!("{:?}", wrapper.bundle_ids));
  }

  Ok(())
}
