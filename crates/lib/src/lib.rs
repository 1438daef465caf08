//! nodewrap-lib: build once, wrap per bundle set.
//!
//! Compiles a node executable from a Rust source tree into a
//! content-addressed store and produces thin wrapper executables, each bound
//! to an ordered list of bundle identifiers:
//! - `toolchain`: compiler and native library resolution, cached in a `CacheStore`
//! - `build`: the `CrateBuilder` and the build store layout
//! - `wrap`: the `BundleWrapper` and wrapper inspection
//! - `plan`: pure composition of what a run will produce
//! - `pipeline`: the entry points tying the stages together
//! - `validate`: the end-to-end check against a synthetic bundle

pub mod build;
pub mod bundle;
pub mod cache;
pub mod config;
pub mod consts;
pub mod error;
pub mod pipeline;
pub mod plan;
pub mod platform;
pub mod source;
pub mod toolchain;
pub mod util;
pub mod validate;
pub mod wrap;

pub use error::PipelineError;
