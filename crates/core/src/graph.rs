//! The dependency graph: an arena of artifacts addressed by stable
//! handles.
//!
//! Dependency edges are handle references into the arena, never owning
//! pointers, so one artifact can be a dependency of several parents
//! without any ownership ambiguity. Edges run from dependency to
//! dependent and the graph rejects anything that would close a cycle
//! at insertion time, so traversal never has to guard against
//! unbounded recursion.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::artifact::{Artifact, ArtifactMode, try_push};
use crate::consts::BUILD_DIR;
use crate::error::{BuildError, Result};

/// Stable handle to an artifact in a [`BuildGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactId(pub(crate) NodeIndex);

/// The set of artifacts for one build description and the dependency
/// DAG over them.
#[derive(Debug)]
pub struct BuildGraph {
  out_dir: PathBuf,
  graph: DiGraph<Artifact, ()>,
  by_output: HashMap<PathBuf, ArtifactId>,
}

impl BuildGraph {
  /// A graph writing outputs under the conventional `build/` directory.
  pub fn new() -> Self {
    Self::with_out_dir(BUILD_DIR)
  }

  /// A graph writing outputs under a caller-chosen directory.
  pub fn with_out_dir(out_dir: impl Into<PathBuf>) -> Self {
    Self {
      out_dir: out_dir.into(),
      graph: DiGraph::new(),
      by_output: HashMap::new(),
    }
  }

  pub fn out_dir(&self) -> &Path {
    &self.out_dir
  }

  /// Insert a new artifact.
  ///
  /// The output path is derived here, once, from name and mode. Two
  /// artifacts deriving the same output path are rejected with
  /// [`BuildError::DuplicateArtifact`].
  pub fn insert(
    &mut self,
    name: impl Into<String>,
    source_path: impl Into<PathBuf>,
    mode: ArtifactMode,
  ) -> Result<ArtifactId> {
    let artifact = Artifact::new(name, source_path, mode, &self.out_dir);
    let output = artifact.output_path().to_path_buf();

    if self.by_output.contains_key(&output) {
      return Err(BuildError::DuplicateArtifact { output });
    }

    let id = ArtifactId(self.graph.add_node(artifact));
    self.by_output.insert(output, id);
    Ok(id)
  }

  /// Record that `dependent` links against (and must be built after)
  /// `dependency`.
  ///
  /// # Errors
  ///
  /// [`BuildError::CyclicDependency`] when the edge is a self-edge or
  /// would make the graph cyclic.
  pub fn add_dependency(&mut self, dependent: ArtifactId, dependency: ArtifactId) -> Result<()> {
    // A path dependent -> dependency means dependency already builds
    // after dependent; adding this edge would close a cycle.
    if dependent == dependency || has_path_connecting(&self.graph, dependent.0, dependency.0, None)
    {
      return Err(BuildError::CyclicDependency {
        dependent: self.graph[dependent.0].name().to_string(),
        dependency: self.graph[dependency.0].name().to_string(),
      });
    }

    try_push(&mut self.graph[dependent.0].deps, dependency)?;
    self.graph.add_edge(dependency.0, dependent.0, ());
    Ok(())
  }

  /// Append a free-form compiler argument (e.g. `-O2`).
  pub fn add_extra_arg(&mut self, id: ArtifactId, arg: impl Into<String>) -> Result<()> {
    try_push(&mut self.graph[id.0].extra_args, arg.into())
  }

  /// Append an include path, rendered as `-I<path>`.
  pub fn add_include_path(&mut self, id: ArtifactId, path: impl Into<String>) -> Result<()> {
    try_push(&mut self.graph[id.0].include_paths, path.into())
  }

  /// Append a system library path, rendered as `-L<path>`.
  pub fn add_lib_path(&mut self, id: ArtifactId, path: impl Into<String>) -> Result<()> {
    try_push(&mut self.graph[id.0].lib_paths, path.into())
  }

  /// Append a system library, rendered as `-l<name>`.
  pub fn add_lib(&mut self, id: ArtifactId, name: impl Into<String>) -> Result<()> {
    try_push(&mut self.graph[id.0].libs, name.into())
  }

  /// Append a header dependency: a file that is never compiled itself
  /// but forces a rebuild when newer than the output.
  pub fn add_header(&mut self, id: ArtifactId, path: impl Into<PathBuf>) -> Result<()> {
    try_push(&mut self.graph[id.0].headers, path.into())
  }

  pub fn artifact(&self, id: ArtifactId) -> &Artifact {
    &self.graph[id.0]
  }

  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }
}
