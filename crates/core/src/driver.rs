//! The build driver: depth-first, dependencies before dependents.
//!
//! Single-threaded and blocking throughout. Each stale artifact gets
//! exactly one compile command per invocation; the first failure
//! aborts the walk and propagates.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::artifact::{Artifact, ArtifactMode};
use crate::command::{self, ArgBuffer};
use crate::consts::DEFAULT_COMPILER;
use crate::error::{BuildError, Result};
use crate::graph::{ArtifactId, BuildGraph};
use crate::stale::needs_rebuild;

/// The external compiler every command is assembled for.
#[derive(Debug, Clone)]
pub struct Toolchain {
  pub compiler: String,
}

impl Default for Toolchain {
  fn default() -> Self {
    Self {
      compiler: DEFAULT_COMPILER.to_string(),
    }
  }
}

impl Toolchain {
  pub fn new(compiler: impl Into<String>) -> Self {
    Self {
      compiler: compiler.into(),
    }
  }
}

/// What one driver invocation actually did.
#[derive(Debug, Default)]
pub struct BuildReport {
  /// Artifacts whose compile command ran, in execution order.
  pub compiled: Vec<ArtifactId>,
}

impl BuildReport {
  /// True when everything was already fresh and nothing was invoked.
  pub fn is_noop(&self) -> bool {
    self.compiled.is_empty()
  }
}

/// Walks a [`BuildGraph`] from a root and rebuilds what is stale.
pub struct Driver<'g> {
  graph: &'g BuildGraph,
  toolchain: Toolchain,
  built: HashSet<ArtifactId>,
}

impl<'g> Driver<'g> {
  pub fn new(graph: &'g BuildGraph, toolchain: Toolchain) -> Self {
    Self {
      graph,
      toolchain,
      built: HashSet::new(),
    }
  }

  /// Build `root` and everything stale beneath it.
  ///
  /// Creates the output directory on demand, then recurses depth-first.
  /// A fresh root returns immediately without touching dependencies
  /// (the staleness check is itself transitive).
  pub fn build(&mut self, root: ArtifactId) -> Result<BuildReport> {
    let out_dir = self.graph.out_dir();
    if !out_dir.exists() {
      info!(dir = %out_dir.display(), "mkdir");
      fs::create_dir_all(out_dir).map_err(|source| BuildError::OutputDir {
        path: out_dir.to_path_buf(),
        source,
      })?;
    }

    let mut report = BuildReport::default();
    self.build_inner(root, &mut report)?;
    Ok(report)
  }

  fn build_inner(&mut self, id: ArtifactId, report: &mut BuildReport) -> Result<()> {
    let artifact = self.graph.artifact(id);

    if !needs_rebuild(self.graph, id)? {
      debug!(artifact = artifact.name(), "fresh");
      return Ok(());
    }

    // Dependencies first, left to right, aborting on the first failure
    // without attempting remaining siblings.
    for &dep in artifact.dependencies() {
      self.build_inner(dep, report)?;
    }

    // A shared dependency may be reached through several parents in
    // one invocation; compile it at most once.
    if self.built.contains(&id) {
      return Ok(());
    }

    let cmd = self.assemble(artifact)?;
    command::run(&cmd)?;

    self.built.insert(id);
    report.compiled.push(id);
    Ok(())
  }

  /// Assemble the compile command for one artifact:
  /// `<compiler> -o <output> [-c] [-L<p>]* [-l<n>]* [-I<p>]* [extra]*
  /// <source> [<dep output>]*`.
  ///
  /// Relative order within each flag group is insertion order; the
  /// group order itself is a fixed convention.
  fn assemble(&self, artifact: &Artifact) -> Result<ArgBuffer> {
    let mut cmd = ArgBuffer::new();
    cmd.push(self.toolchain.compiler.as_str())?;
    cmd.push("-o")?;
    cmd.push(artifact.output_path().display().to_string())?;

    if artifact.mode() == ArtifactMode::Object {
      cmd.push("-c")?;
    }

    for path in &artifact.lib_paths {
      cmd.push(format!("-L{path}"))?;
    }
    for lib in &artifact.libs {
      cmd.push(format!("-l{lib}"))?;
    }
    for path in &artifact.include_paths {
      cmd.push(format!("-I{path}"))?;
    }
    cmd.extend(artifact.extra_args().iter().cloned())?;

    cmd.push(artifact.source_path().display().to_string())?;
    for &dep in artifact.dependencies() {
      cmd.push(self.graph.artifact(dep).output_path().display().to_string())?;
    }

    Ok(cmd)
  }
}

/// Remove the graph's output directory. Returns `Ok(false)` when it
/// was already absent.
pub fn clean(graph: &BuildGraph) -> Result<bool> {
  remove(graph.out_dir(), |path| fs::remove_dir_all(path))
}

/// Remove a built executable (the `clean --all` qualifier). Returns
/// `Ok(false)` when it was already absent.
pub fn clean_executable(path: &Path) -> Result<bool> {
  remove(path, |path| fs::remove_file(path))
}

fn remove(path: &Path, op: fn(&Path) -> std::io::Result<()>) -> Result<bool> {
  match op(path) {
    Ok(()) => {
      info!(path = %path.display(), "removed");
      Ok(true)
    }
    Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
    Err(source) => Err(BuildError::Filesystem {
      path: path.to_path_buf(),
      source,
    }),
  }
}
