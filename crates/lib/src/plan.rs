//! Build plans.
//!
//! [`compose`] describes what a pipeline run would produce (one artifact and
//! one wrapper per requested bundle set) without touching the filesystem.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::build::BuildInputs;
use crate::config::WrapVariant;
use crate::error::PipelineError;
use crate::source::SourceManifest;
use crate::toolchain::ToolchainSpec;
use crate::util::hash::{ContentHash, Hashable, ObjectHash};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPlan {
  pub name: String,
  pub version: String,
  pub platform: String,
  /// Names the artifact's store directory.
  pub inputs_hash: ObjectHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperPlan {
  pub label: String,
  pub bundle_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
  pub artifact: ArtifactPlan,
  pub wrappers: Vec<WrapperPlan>,
}

impl fmt::Display for BuildPlan {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "artifact {}@{} ({}) {}",
      self.artifact.name, self.artifact.version, self.artifact.platform, self.artifact.inputs_hash
    )?;
    for wrapper in &self.wrappers {
      writeln!(f, "  wrapper {}: [{}]", wrapper.label, wrapper.bundle_ids.join(", "))?;
    }
    Ok(())
  }
}

/// Composes the plan for one artifact and its wrappers.
///
/// Wrapper plans follow `variants` order. Duplicate variants are kept.
pub fn compose(
  toolchain: &ToolchainSpec,
  source: &SourceManifest,
  source_hash: &ContentHash,
  build_command: &str,
  variants: &[WrapVariant],
) -> Result<BuildPlan, PipelineError> {
  let inputs = BuildInputs {
    name: source.name.clone(),
    version: source.version.clone(),
    source_hash: source_hash.clone(),
    toolchain: toolchain.clone(),
    command: build_command.to_string(),
  };
  let inputs_hash = inputs.compute_hash().map_err(|source| PipelineError::Hash {
    what: format!("build inputs of {}@{}", inputs.name, inputs.version),
    source,
  })?;

  Ok(BuildPlan {
    artifact: ArtifactPlan {
      name: inputs.name,
      version: inputs.version,
      platform: toolchain.platform.clone(),
      inputs_hash,
    },
    wrappers: variants
      .iter()
      .map(|v| WrapperPlan {
        label: v.name.clone(),
        bundle_ids: v.bundles.clone(),
      })
      .collect(),
  })
}
