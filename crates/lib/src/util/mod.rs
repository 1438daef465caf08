//! Shared utilities.
//!
//! Hashing for content-addressed storage and test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;
