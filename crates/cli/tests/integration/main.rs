//! End-to-end tests of the `nodewrap` binary against fake node builds.
//!
//! The fake builds are shell one-liners, so these run on Unix only.

#![cfg(unix)]

mod common;

mod build_tests;
mod validate_tests;
mod wrap_tests;
