use nodewrap_lib::platform::paths::{cache_dir, store_dir};
use nodewrap_lib::platform::{Platform, platform_triple};
use nodewrap_lib::toolchain::has_prebuilt_toolchain;

use super::TOOLCHAIN_CACHE_DIR;

pub fn cmd_info() {
  println!("System:");
  match platform_triple() {
    Some(triple) => println!("Platform: {}", triple),
    _ => println!("Could not detect platform."),
  }
  if let Some(platform) = Platform::current() {
    println!("Rust target: {}", platform.rust_target());
    println!("Prebuilt toolchain: {}", if has_prebuilt_toolchain(&platform) { "yes" } else { "no" });
  }
  println!("Store: {}", store_dir().display());
  println!("Toolchain cache: {}", cache_dir().join(TOOLCHAIN_CACHE_DIR).display());
}
