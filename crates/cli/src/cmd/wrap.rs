//! Implementation of the `nodewrap wrap` command.

use anyhow::{Context, Result};

use super::{GlobalArgs, runtime};
use crate::output::{print_stat, print_success};

pub fn cmd_wrap(global: &GlobalArgs, bundles: &[String]) -> Result<()> {
  let pipeline = global.pipeline()?;
  let platform = global.platform()?;

  let artifact = runtime()?
    .block_on(pipeline.build_artifact(&platform, false))
    .context("Build failed")?;
  let wrapped = pipeline
    .wrapper(artifact)
    .wrap_for_bundles(bundles)
    .with_context(|| format!("Failed to wrap bundles {:?}", bundles))?;

  print_success(&format!(
    "Wrapped {}@{}",
    wrapped.artifact.name, wrapped.artifact.version
  ));
  print_stat("Wrapper", &wrapped.path.display().to_string());
  print_stat("Bundles", &format!("{:?}", wrapped.bundle_ids));

  Ok(())
}
