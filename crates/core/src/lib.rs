//! carp-core: the engine behind carp, a minimal incremental build
//! orchestrator.
//!
//! - `graph`: an arena of [`Artifact`]s (compilation targets) wired
//!   into a DAG by handle references.
//! - `stale`: recursive modification-time staleness evaluation.
//! - `driver`: depth-first rebuild of whatever is stale, dependencies
//!   first, one synchronous compiler subprocess per stale target.
//! - `bootstrap`: the self-rebuild protocol — recompile and re-invoke
//!   the tool itself when its own definition changed.

pub mod artifact;
pub mod bootstrap;
pub mod command;
pub mod consts;
pub mod driver;
pub mod error;
pub mod graph;
pub mod stale;

pub use artifact::{Artifact, ArtifactMode};
pub use bootstrap::SelfRebuild;
pub use command::ArgBuffer;
pub use driver::{BuildReport, Driver, Toolchain, clean, clean_executable};
pub use error::{BuildError, Result};
pub use graph::{ArtifactId, BuildGraph};
pub use stale::needs_rebuild;
