mod build;
mod info;
mod inspect;
mod plan;
mod realize;
mod validate;
mod wrap;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use nodewrap_lib::PipelineError;
use nodewrap_lib::cache::FsCacheStore;
use nodewrap_lib::config::PipelineConfig;
use nodewrap_lib::pipeline::Pipeline;
use nodewrap_lib::platform::Platform;
use nodewrap_lib::platform::paths::{cache_dir, store_dir};

pub use build::cmd_build;
pub use info::cmd_info;
pub use inspect::cmd_inspect;
pub use plan::cmd_plan;
pub use realize::cmd_realize;
pub use validate::cmd_validate;
pub use wrap::cmd_wrap;

/// Toolchain resolutions live under `<cache>/toolchains`.
pub const TOOLCHAIN_CACHE_DIR: &str = "toolchains";

/// Options shared by every pipeline command.
pub struct GlobalArgs {
  pub source: PathBuf,
  pub config: Option<PathBuf>,
  pub platform: Option<String>,
}

impl GlobalArgs {
  pub fn platform(&self) -> Result<Platform> {
    match &self.platform {
      Some(s) => s
        .parse::<Platform>()
        .map_err(|_| PipelineError::UnsupportedPlatform { platform: s.clone() })
        .context("Invalid --platform"),
      None => Platform::current().context("Could not detect the host platform"),
    }
  }

  pub fn pipeline(&self) -> Result<Pipeline> {
    let source = dunce::canonicalize(&self.source)
      .with_context(|| format!("Source tree not found: {}", self.source.display()))?;
    let config = PipelineConfig::discover(&source, self.config.as_deref()).context("Failed to load config")?;

    let store = store_dir();
    let cache = FsCacheStore::new(cache_dir().join(TOOLCHAIN_CACHE_DIR));
    debug!(source = ?source, store = ?store, cache = ?cache.root(), "pipeline directories");

    Ok(Pipeline::new(config, source, store, Arc::new(cache)))
  }
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
  tokio::runtime::Runtime::new().context("Failed to create async runtime")
}
