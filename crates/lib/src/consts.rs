/// Application name, used for directory names under the XDG base directories.
pub const APP_NAME: &str = "nodewrap";

/// Length of the truncated hex hash used for store and cache keys.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Name of the optional pipeline configuration file at the source root.
pub const CONFIG_FILENAME: &str = "nodewrap.toml";

/// Name of the package manifest at the source root.
pub const SOURCE_MANIFEST_FILENAME: &str = "Cargo.toml";

/// Name of the rustup toolchain file consulted when no version is configured.
pub const RUST_TOOLCHAIN_FILENAME: &str = "rust-toolchain.toml";

/// Compiler version used when neither the config nor the source tree declares one.
pub const DEFAULT_COMPILER_VERSION: &str = "stable";

/// Fixed timestamp exported to builds (January 1, 1980 00:00:00 UTC).
pub const SOURCE_DATE_EPOCH: &str = "315532800";
