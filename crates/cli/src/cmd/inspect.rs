use std::path::Path;

use anyhow::{Context, Result};

use nodewrap_lib::wrap::inspect;

use crate::output::{OutputFormat, print_json, print_stat, truncate_hash};

pub fn cmd_inspect(path: &Path, output: OutputFormat) -> Result<()> {
  let wrapped = inspect(path).with_context(|| format!("Failed to inspect {}", path.display()))?;

  if output.is_json() {
    return print_json(&wrapped);
  }

  println!("Wrapper: {}", wrapped.path.display());
  print_stat(
    "Artifact",
    &format!("{}@{}", wrapped.artifact.name, wrapped.artifact.version),
  );
  print_stat("Executable", &wrapped.artifact.executable.display().to_string());
  print_stat("Content hash", truncate_hash(&wrapped.artifact.content_hash.0));
  println!("Bundles:");
  for id in &wrapped.bundle_ids {
    println!("  {}", id);
  }

  Ok(())
}
