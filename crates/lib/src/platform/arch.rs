use std::fmt;

/// Instruction sets a node binary can be compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X86_64,
  Aarch64,
}

impl Arch {
  pub fn current() -> Option<Self> {
    Self::parse(std::env::consts::ARCH)
  }

  /// `arm64` is what Apple tooling reports for `aarch64`.
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "x86_64" => Some(Self::X86_64),
      "aarch64" | "arm64" => Some(Self::Aarch64),
      _ => None,
    }
  }

  /// Name used in platform strings and as the first component of the Rust target.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "aarch64",
    }
  }

  /// Debian multiarch tuple, i.e. the `/usr/lib/<tuple>` directory holding native libraries.
  pub fn multiarch_tuple(&self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64-linux-gnu",
      Self::Aarch64 => "aarch64-linux-gnu",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
