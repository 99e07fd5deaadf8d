//! The built-in build description.
//!
//! Targets are declared here the way a carpfile would declare them:
//! construct the graph once at startup, fully initialized, then hand
//! it to the driver. Edit this module (or ship a `carp.c` next to the
//! binary) to change what carp builds.

use carp_core::{ArtifactId, ArtifactMode, BuildGraph, Result};

/// `hello`: a binary from `src/main.c`, linked against the `temp`
/// object, which is rebuilt whenever `src/temp.h` changes.
pub fn description() -> Result<(BuildGraph, ArtifactId)> {
  let mut graph = BuildGraph::new();

  let hello = graph.insert("hello", "src/main.c", ArtifactMode::Binary)?;
  let temp = graph.insert("temp", "src/temp.c", ArtifactMode::Object)?;
  graph.add_header(temp, "src/temp.h")?;
  graph.add_dependency(hello, temp)?;

  Ok((graph, hello))
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use super::*;

  #[test]
  fn description_is_well_formed() {
    let (graph, root) = description().unwrap();

    assert_eq!(graph.len(), 2);
    let hello = graph.artifact(root);
    assert_eq!(hello.name(), "hello");
    assert_eq!(hello.output_path(), Path::new("build/hello"));

    let [temp] = hello.dependencies() else {
      panic!("hello should have exactly one dependency");
    };
    assert_eq!(graph.artifact(*temp).output_path(), Path::new("build/temp.o"));
  }
}
