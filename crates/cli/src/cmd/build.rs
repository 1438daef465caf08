//! Implementation of the `nodewrap build` command.

use std::time::Instant;

use anyhow::{Context, Result};

use super::{GlobalArgs, runtime};
use crate::output::{format_duration, print_stat, print_success};

pub fn cmd_build(global: &GlobalArgs, rebuild: bool) -> Result<()> {
  let start = Instant::now();
  let pipeline = global.pipeline()?;
  let platform = global.platform()?;

  let artifact = runtime()?
    .block_on(pipeline.build_artifact(&platform, rebuild))
    .context("Build failed")?;

  print_success(&format!("Built {}", artifact));
  print_stat("Platform", &artifact.platform);
  print_stat("Executable", &artifact.executable.display().to_string());
  print_stat("Content hash", &artifact.content_hash.0);
  print_stat("Duration", &format_duration(start.elapsed()));

  Ok(())
}
