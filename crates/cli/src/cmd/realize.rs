//! Implementation of the `nodewrap realize` command.

use std::time::Instant;

use anyhow::{Context, Result};

use super::{GlobalArgs, runtime};
use crate::output::{OutputFormat, format_duration, print_info, print_json, print_stat, print_success, print_wrapper};

pub fn cmd_realize(global: &GlobalArgs, output: OutputFormat) -> Result<()> {
  let start = Instant::now();
  let pipeline = global.pipeline()?;
  let platform = global.platform()?;

  let realization = runtime()?
    .block_on(pipeline.realize(&platform))
    .context("Realize failed")?;

  if output.is_json() {
    return print_json(&realization);
  }

  print_success(&format!("Realized {}", realization.artifact));
  print_stat("Executable", &realization.artifact.executable.display().to_string());
  if realization.wrappers.is_empty() {
    print_info("No wrap variants configured");
  }
  for wrapper in &realization.wrappers {
    print_wrapper(&wrapper.label, &wrapper.wrapped.path.display().to_string());
  }
  print_stat("Duration", &format_duration(start.elapsed()));

  Ok(())
}
