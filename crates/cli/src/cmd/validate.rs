//! Implementation of the `nodewrap validate` command.
//!
//! Builds the artifact and wraps a throwaway fixture bundle in a temporary
//! directory. Returns whether validation passed; the caller maps that to the
//! exit code.

use anyhow::{Context, Result};

use nodewrap_lib::validate::Validation;

use super::{GlobalArgs, runtime};
use crate::output::{print_error, print_success};

pub fn cmd_validate(global: &GlobalArgs) -> Result<bool> {
  let pipeline = global.pipeline()?;
  let platform = global.platform()?;
  let workdir = tempfile::tempdir().context("Failed to create validation directory")?;

  let result = runtime()?.block_on(pipeline.run_validation(&platform, workdir.path()));

  match result {
    Validation::Pass => {
      print_success("Validation passed");
      Ok(true)
    }
    Validation::Fail(reason) => {
      print_error(&format!("Validation failed: {}", reason));
      Ok(false)
    }
  }
}
