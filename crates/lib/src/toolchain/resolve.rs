use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{NativeLibrary, ResolvedLibrary, ToolchainRequest, ToolchainSpec};
use crate::cache::CacheStore;
use crate::error::PipelineError;
use crate::platform::Platform;
use crate::platform::os::Os;
use crate::util::hash::Hashable;

/// Platforms with a prebuilt compiler toolchain.
pub fn has_prebuilt_toolchain(platform: &Platform) -> bool {
  matches!(platform.os, Os::Linux | Os::MacOs)
}

/// System library directories probed after the configured paths and `LIBRARY_PATH`.
pub fn default_search_dirs(platform: &Platform) -> Vec<PathBuf> {
  match platform.os {
    Os::Linux => {
      let multiarch = platform.arch.multiarch_tuple();
      vec![
        PathBuf::from("/usr/local/lib"),
        PathBuf::from("/usr/lib").join(multiarch),
        PathBuf::from("/lib").join(multiarch),
        PathBuf::from("/usr/lib64"),
        PathBuf::from("/lib64"),
        PathBuf::from("/usr/lib"),
        PathBuf::from("/lib"),
      ]
    }
    Os::MacOs => vec![
      PathBuf::from("/opt/homebrew/lib"),
      PathBuf::from("/usr/local/lib"),
      PathBuf::from("/usr/lib"),
    ],
    Os::Windows => Vec::new(),
  }
}

/// Resolves toolchains, recording each resolution in the injected cache.
///
/// No locking: two resolutions of the same request may race, and whichever
/// writes last wins with identical content.
#[derive(Clone)]
pub struct ToolchainResolver {
  cache: Arc<dyn CacheStore>,
}

impl std::fmt::Debug for ToolchainResolver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ToolchainResolver").finish_non_exhaustive()
  }
}

impl ToolchainResolver {
  pub fn new(cache: Arc<dyn CacheStore>) -> Self {
    Self { cache }
  }

  pub fn resolve(&self, request: &ToolchainRequest) -> Result<ToolchainSpec, PipelineError> {
    let platform: Platform = request
      .platform
      .parse()
      .map_err(|_| PipelineError::UnsupportedPlatform {
        platform: request.platform.clone(),
      })?;

    if !has_prebuilt_toolchain(&platform) {
      return Err(PipelineError::UnsupportedPlatform {
        platform: platform.triple(),
      });
    }

    let key = request.compute_hash().map_err(|source| PipelineError::Hash {
      what: format!("toolchain request for {}", platform),
      source,
    })?;

    if let Some(bytes) = self.cache.get(&key)? {
      match serde_json::from_slice::<ToolchainSpec>(&bytes) {
        Ok(spec) if spec.is_present() => {
          debug!(key = %key, platform = %platform, "toolchain cache hit");
          return Ok(spec);
        }
        Ok(_) => {
          warn!(key = %key, "cached toolchain references missing libraries, re-resolving");
        }
        Err(e) => {
          warn!(key = %key, error = %e, "unreadable toolchain cache entry, re-resolving");
        }
      }
    }

    info!(
      compiler = %request.compiler,
      version = %request.version,
      platform = %platform,
      libraries = request.native.len(),
      "resolving toolchain"
    );

    let search_dirs = search_dirs(request, &platform);
    let mut libraries = Vec::with_capacity(request.native.len());
    let mut library_paths: Vec<PathBuf> = Vec::new();

    for library in &request.native {
      let path = locate_library(library, &platform, &search_dirs)?;
      if let Some(dir) = path.parent() {
        if !library_paths.iter().any(|p| p == dir) {
          library_paths.push(dir.to_path_buf());
        }
      }
      debug!(library = %library.name, path = ?path, "resolved native library");
      libraries.push(ResolvedLibrary {
        name: library.name.clone(),
        provider: library.provider.clone(),
        path,
      });
    }

    let spec = ToolchainSpec {
      compiler: request.compiler.clone(),
      version: request.version.clone(),
      platform: platform.triple(),
      target: platform.rust_target().to_string(),
      library_paths,
      libraries,
    };

    let bytes = serde_json::to_vec(&spec).map_err(|source| PipelineError::Hash {
      what: format!("toolchain spec for {}", platform),
      source,
    })?;
    self.cache.put(&key, &bytes)?;

    Ok(spec)
  }
}

fn search_dirs(request: &ToolchainRequest, platform: &Platform) -> Vec<PathBuf> {
  let mut dirs: Vec<PathBuf> = request.library_paths.clone();
  if let Some(library_path) = std::env::var_os("LIBRARY_PATH") {
    dirs.extend(std::env::split_paths(&library_path).filter(|p| !p.as_os_str().is_empty()));
  }
  dirs.extend(default_search_dirs(platform));

  let mut unique = Vec::with_capacity(dirs.len());
  for dir in dirs {
    if !unique.contains(&dir) {
      unique.push(dir);
    }
  }
  unique
}

fn locate_library(library: &NativeLibrary, platform: &Platform, dirs: &[PathBuf]) -> Result<PathBuf, PipelineError> {
  for dir in dirs {
    if let Some(found) = find_in_dir(dir, &library.name, platform) {
      return Ok(found);
    }
  }

  Err(PipelineError::DependencyResolution {
    library: library.name.clone(),
    provider: library.provider.clone(),
    platform: platform.triple(),
    searched: dirs.to_vec(),
  })
}

/// Looks for `lib<name>.<ext>` and, on Linux, versioned `lib<name>.so.<N>` files.
fn find_in_dir(dir: &Path, name: &str, platform: &Platform) -> Option<PathBuf> {
  for ext in platform.os.library_extensions() {
    let candidate = dir.join(format!("lib{}.{}", name, ext));
    if candidate.exists() {
      return Some(candidate);
    }
  }

  if platform.os == Os::Linux {
    let prefix = format!("lib{}.so.", name);
    let mut versioned: Vec<PathBuf> = std::fs::read_dir(dir)
      .ok()?
      .filter_map(|entry| entry.ok())
      .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
      .map(|entry| entry.path())
      .collect();
    versioned.sort();
    return versioned.into_iter().next();
  }

  None
}
