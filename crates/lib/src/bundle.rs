//! Bundle identifiers.
//!
//! A bundle names a distributed application (or one of its sub-components)
//! the node operates against. The pipeline never looks inside one: a bundle
//! is whatever string the node accepts as a positional argument, usually an
//! identifier or a path to a `happ`/`dna` manifest.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BundleDescriptor {
  pub id: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub components: Vec<String>,
}

impl BundleDescriptor {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      components: Vec::new(),
    }
  }

  pub fn from_path(path: &Path) -> Self {
    Self::new(path.to_string_lossy())
  }

  pub fn with_components(mut self, components: impl IntoIterator<Item = impl Into<String>>) -> Self {
    self.components = components.into_iter().map(Into::into).collect();
    self
  }
}

impl fmt::Display for BundleDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.id)
  }
}

/// The argument list handed to the wrapper: each descriptor's id, in order.
///
/// Duplicates and unusual characters are kept as given.
pub fn bundle_args(bundles: &[BundleDescriptor]) -> Vec<String> {
  bundles.iter().map(|b| b.id.clone()).collect()
}
