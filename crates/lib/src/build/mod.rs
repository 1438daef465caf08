//! Building the node artifact.
//!
//! A build compiles the source tree once per (source content, toolchain)
//! pair and places the executable in the content-addressed store at
//! `<store>/build/<inputs-hash>/bin/<name>`. Identical inputs always map to
//! the same directory, so a completed build is never repeated.
//!
//! # Submodules
//!
//! - [`cmd`] - isolated execution of the build command
//! - [`execute`] - the `CrateBuilder`
//! - [`store`] - store path layout and completion markers

pub mod cmd;
pub mod execute;
pub mod store;
mod types;

pub use execute::CrateBuilder;
pub use types::*;
