//! Test helpers for nodewrap-lib.
//!
//! Fake source trees, fake toolchains, and build commands that produce a
//! small shell-script "node" instead of invoking cargo.

use std::path::{Path, PathBuf};

use crate::platform::Platform;
use crate::platform::arch::Arch;
use crate::platform::os::Os;
use crate::toolchain::ToolchainSpec;

/// Writes a minimal crate with the given `Cargo.toml` package fields.
pub fn write_source_tree(dir: &Path, name: &str, version: &str) {
  std::fs::create_dir_all(dir.join("src")).unwrap();
  std::fs::write(
    dir.join("Cargo.toml"),
    format!("[package]\nname = \"{}\"\nversion = \"{}\"\nedition = \"2024\"\n", name, version),
  )
  .unwrap();
  std::fs::write(dir.join("src/main.rs"), "fn main() {}\n").unwrap();
}

/// A resolved toolchain for the host, without any native libraries.
pub fn host_toolchain() -> ToolchainSpec {
  let platform = Platform::current().unwrap_or(Platform::new(Arch::X86_64, Os::Linux));
  ToolchainSpec {
    compiler: "rustc".to_string(),
    version: "1.83.0".to_string(),
    platform: platform.triple(),
    target: platform.rust_target().to_string(),
    library_paths: Vec::new(),
    libraries: Vec::new(),
  }
}

/// Build command that emits a node script echoing its arguments one per line.
#[cfg(unix)]
pub fn fake_build_command() -> String {
  r#"mkdir -p "$out/bin" && printf '#!/bin/sh\nfor a in "$@"; do printf "%%s\\n" "$a"; done\n' > "$out/bin/$NODEWRAP_PKG_NAME""#
    .to_string()
}

/// Build command like `fake_build_command` that also appends a line to `counter`
/// so tests can observe how many times the build actually ran.
#[cfg(unix)]
pub fn counting_build_command(counter: &Path) -> String {
  format!(
    "echo built >> '{}' && {}",
    counter.display(),
    fake_build_command()
  )
}

/// Writes an executable shell script at `path`.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path.to_path_buf()
}
