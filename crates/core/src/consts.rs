//! Shared constants.

/// Directory (relative to the working directory) where all build
/// outputs are written. Created on demand.
pub const BUILD_DIR: &str = "build";

/// Compiler used when nothing else is configured.
pub const DEFAULT_COMPILER: &str = "cc";
