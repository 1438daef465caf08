//! Platform identification and directory layout.
//!
//! Platforms are written `arch-os` (e.g. `x86_64-linux`, `aarch64-darwin`)
//! and map onto the Rust target triple the node binary is compiled for.

pub mod arch;
pub mod os;
pub mod paths;

use std::fmt;
use std::str::FromStr;

use arch::Arch;
use os::Os;

/// Platform identifier combining architecture and OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
  pub arch: Arch,
  pub os: Os,
}

/// Returned when a platform string names an unknown architecture or OS.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}', expected <arch>-<os> such as x86_64-linux")]
pub struct ParsePlatformError(pub String);

impl Platform {
  pub fn new(arch: Arch, os: Os) -> Self {
    Self { arch, os }
  }

  /// Detect the host platform. `None` if the host is not recognized.
  pub fn current() -> Option<Self> {
    Some(Self {
      arch: Arch::current()?,
      os: Os::current()?,
    })
  }

  /// The `arch-os` string, e.g. `aarch64-darwin`.
  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }

  /// The Rust target triple passed to `cargo build --target`.
  pub fn rust_target(&self) -> &'static str {
    match (self.arch, self.os) {
      (Arch::X86_64, Os::Linux) => "x86_64-unknown-linux-gnu",
      (Arch::Aarch64, Os::Linux) => "aarch64-unknown-linux-gnu",
      (Arch::X86_64, Os::MacOs) => "x86_64-apple-darwin",
      (Arch::Aarch64, Os::MacOs) => "aarch64-apple-darwin",
      (Arch::X86_64, Os::Windows) => "x86_64-pc-windows-msvc",
      (Arch::Aarch64, Os::Windows) => "aarch64-pc-windows-msvc",
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}

impl FromStr for Platform {
  type Err = ParsePlatformError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let err = || ParsePlatformError(s.to_string());
    let (arch, os) = s.split_once('-').ok_or_else(err)?;
    Ok(Self {
      arch: Arch::parse(arch).ok_or_else(err)?,
      os: Os::parse(os).ok_or_else(err)?,
    })
  }
}

/// The host's `arch-os` string, if the host is recognized.
pub fn platform_triple() -> Option<String> {
  Platform::current().map(|p| p.triple())
}
