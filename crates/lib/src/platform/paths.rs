//! Directory resolution.
//!
//! Follows the XDG base directory layout on Unix and `%APPDATA%` /
//! `%LOCALAPPDATA%` on Windows, with `NODEWRAP_STORE` and `NODEWRAP_CACHE`
//! overriding the store and cache roots.

use std::path::PathBuf;

use crate::consts::APP_NAME;

/// Returns the user's home directory, or the current directory if unset.
#[cfg(not(windows))]
pub fn home_dir() -> PathBuf {
  std::env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(windows)]
pub fn home_dir() -> PathBuf {
  std::env::var("USERPROFILE").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(not(windows))]
pub fn data_dir() -> PathBuf {
  let data_home = std::env::var("XDG_DATA_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".local").join("share"));
  data_home.join(APP_NAME)
}

#[cfg(windows)]
pub fn data_dir() -> PathBuf {
  std::env::var("APPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir())
    .join(APP_NAME)
}

#[cfg(not(windows))]
pub fn cache_dir() -> PathBuf {
  if let Ok(path) = std::env::var("NODEWRAP_CACHE") {
    return PathBuf::from(path);
  }
  let cache_home = std::env::var("XDG_CACHE_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".cache"));
  cache_home.join(APP_NAME)
}

#[cfg(windows)]
pub fn cache_dir() -> PathBuf {
  if let Ok(path) = std::env::var("NODEWRAP_CACHE") {
    return PathBuf::from(path);
  }
  std::env::var("LOCALAPPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir())
    .join(APP_NAME)
    .join("Cache")
}

/// Root of the content-addressed store holding artifacts and wrappers.
pub fn store_dir() -> PathBuf {
  if let Ok(path) = std::env::var("NODEWRAP_STORE") {
    return PathBuf::from(path);
  }
  data_dir().join("store")
}
