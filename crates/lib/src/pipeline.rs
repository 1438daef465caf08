//! The build/wrap pipeline.
//!
//! Ties the stages together for one source tree: resolve the toolchain,
//! build the artifact once, then bind it to any number of bundle sets.
//!
//! ```text
//! ToolchainResolver -> CrateBuilder -> BuildArtifact
//!                                         |
//!                 bundle ids -> BundleWrapper -> WrappedExecutable
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::build::{BuildArtifact, CrateBuilder};
use crate::cache::CacheStore;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::plan::{BuildPlan, compose};
use crate::platform::Platform;
use crate::source::SourceManifest;
use crate::toolchain::{ToolchainResolver, ToolchainSpec};
use crate::validate::{Validation, validate};
use crate::wrap::{BundleWrapper, WrappedExecutable};

/// Wrappers live next to builds: `<store>/wrap/<hash>`.
pub const WRAP_DIR: &str = "wrap";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealizedWrapper {
  pub label: String,
  pub wrapped: WrappedExecutable,
}

/// One artifact and every configured wrapper over it, in config order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realization {
  pub artifact: BuildArtifact,
  pub wrappers: Vec<RealizedWrapper>,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
  config: PipelineConfig,
  source_tree: PathBuf,
  store_root: PathBuf,
  resolver: ToolchainResolver,
  builder: CrateBuilder,
}

impl Pipeline {
  pub fn new(
    config: PipelineConfig,
    source_tree: impl Into<PathBuf>,
    store_root: impl Into<PathBuf>,
    cache: Arc<dyn CacheStore>,
  ) -> Self {
    let store_root = store_root.into();
    let store_root = std::path::absolute(&store_root).unwrap_or(store_root);
    let builder = CrateBuilder::new(&store_root, config.build.clone());
    Self {
      config,
      source_tree: source_tree.into(),
      store_root,
      resolver: ToolchainResolver::new(cache),
      builder,
    }
  }

  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  pub fn source_tree(&self) -> &Path {
    &self.source_tree
  }

  pub fn store_root(&self) -> &Path {
    &self.store_root
  }

  pub fn wrap_root(&self) -> PathBuf {
    self.store_root.join(WRAP_DIR)
  }

  pub fn toolchain(&self, platform: &Platform) -> Result<ToolchainSpec, PipelineError> {
    let request = self.config.toolchain_request(platform, &self.source_tree);
    self.resolver.resolve(&request)
  }

  /// Resolves the toolchain for `platform` and builds (or reuses) the artifact.
  pub async fn build_artifact(&self, platform: &Platform, rebuild: bool) -> Result<BuildArtifact, PipelineError> {
    let toolchain = self.toolchain(platform)?;
    self.builder.build(&self.source_tree, &toolchain, rebuild).await
  }

  pub fn wrapper(&self, artifact: BuildArtifact) -> BundleWrapper {
    BundleWrapper::new(Arc::new(artifact), self.wrap_root())
  }

  /// What `realize` would produce, without building.
  pub fn plan(&self, platform: &Platform) -> Result<BuildPlan, PipelineError> {
    let toolchain = self.toolchain(platform)?;
    let inputs = self.builder.inputs(&self.source_tree, &toolchain)?;
    let manifest = SourceManifest {
      name: inputs.name,
      version: inputs.version,
    };
    compose(
      &toolchain,
      &manifest,
      &inputs.source_hash,
      &inputs.command,
      &self.config.wrap,
    )
  }

  /// Builds once, then wraps every configured variant concurrently.
  ///
  /// At most `parallelism` wraps run at a time. If any wrap fails, the
  /// failure of the earliest variant is returned.
  pub async fn realize(&self, platform: &Platform) -> Result<Realization, PipelineError> {
    let artifact = self.build_artifact(platform, false).await?;
    let wrapper = self.wrapper(artifact.clone());
    let semaphore = Arc::new(Semaphore::new(self.config.parallelism()));

    info!(
      artifact = %artifact,
      variants = self.config.wrap.len(),
      parallelism = self.config.parallelism(),
      "realizing wrappers"
    );

    let mut join_set = JoinSet::new();
    for (index, variant) in self.config.wrap.iter().enumerate() {
      let wrapper = wrapper.clone();
      let semaphore = semaphore.clone();
      let variant = variant.clone();

      join_set.spawn(async move {
        let bundles = variant.bundles.clone();
        let result = match semaphore.acquire_owned().await {
          Ok(permit) => tokio::task::spawn_blocking(move || {
            let _permit = permit;
            wrapper.wrap_for_bundles(&bundles)
          })
          .await
          .unwrap_or_else(|e| Err(task_failure(&variant.bundles, e.to_string()))),
          Err(e) => Err(task_failure(&variant.bundles, e.to_string())),
        };
        (index, variant.name, result)
      });
    }

    let mut results = Vec::new();
    while let Some(joined) = join_set.join_next().await {
      match joined {
        Ok(entry) => results.push(entry),
        Err(e) => {
          error!(error = %e, "wrap task panicked");
          return Err(task_failure(&[], e.to_string()));
        }
      }
    }
    results.sort_by_key(|(index, _, _)| *index);

    let mut wrappers = Vec::with_capacity(results.len());
    for (_, label, result) in results {
      wrappers.push(RealizedWrapper { label, wrapped: result? });
    }

    info!(artifact = %artifact, wrappers = wrappers.len(), "realization complete");
    Ok(Realization { artifact, wrappers })
  }

  /// Builds the artifact and validates it against the fixture bundle.
  ///
  /// The fixture wrapper is written under `workdir`, never into the store.
  /// A failed build is reported as `Fail`, not as an error.
  pub async fn run_validation(&self, platform: &Platform, workdir: &Path) -> Validation {
    match self.build_artifact(platform, false).await {
      Ok(artifact) => validate(&BundleWrapper::new(Arc::new(artifact), workdir.join(WRAP_DIR)), workdir),
      Err(e) => {
        error!(error = %e, "build failed during validation");
        Validation::Fail(format!("{}: {}", e.kind(), e))
      }
    }
  }
}

fn task_failure(bundles: &[String], message: String) -> PipelineError {
  PipelineError::WrapFailure {
    bundles: bundles.to_vec(),
    path: PathBuf::new(),
    message: format!("wrap task failed: {}", message),
  }
}
