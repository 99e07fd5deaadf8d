//! Staleness evaluation: does an artifact need to be rebuilt?
//!
//! A pure function of filesystem state at call time. Results are not
//! memoized, so a shared dependency in a diamond may be re-evaluated
//! at each call site; the driver still compiles it at most once per
//! invocation.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use tracing::debug;

use crate::error::{BuildError, Result};
use crate::graph::{ArtifactId, BuildGraph};

/// Whether `id` (or anything it transitively depends on) must be
/// rebuilt.
///
/// An artifact is stale when its output is missing, when the output is
/// not strictly newer than its source, when any header dependency is
/// at least as new as the output, or when any dependency is itself
/// stale. Equal timestamps count as stale: never silently skip a
/// possibly out-of-date artifact.
///
/// # Errors
///
/// [`BuildError::Filesystem`] when a modification time cannot be read
/// after the output-existence check has passed (missing source file,
/// unreadable header). The evaluator never guesses.
pub fn needs_rebuild(graph: &BuildGraph, id: ArtifactId) -> Result<bool> {
  let artifact = graph.artifact(id);

  if !artifact.output_path().exists() {
    debug!(artifact = artifact.name(), "stale: output missing");
    return Ok(true);
  }

  let output_mtime = mtime(artifact.output_path())?;

  if output_mtime <= mtime(artifact.source_path())? {
    debug!(artifact = artifact.name(), "stale: source newer than output");
    return Ok(true);
  }

  for header in artifact.headers() {
    if output_mtime <= mtime(header)? {
      debug!(artifact = artifact.name(), header = %header.display(), "stale: header newer than output");
      return Ok(true);
    }
  }

  for &dep in artifact.dependencies() {
    if needs_rebuild(graph, dep)? {
      return Ok(true);
    }
  }

  Ok(false)
}

pub(crate) fn mtime(path: &Path) -> Result<SystemTime> {
  fs::metadata(path)
    .and_then(|meta| meta.modified())
    .map_err(|source| BuildError::Filesystem {
      path: path.to_path_buf(),
      source,
    })
}
