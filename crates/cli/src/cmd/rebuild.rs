use carp_core::{Result, clean};

use crate::description::description;
use crate::output::print_info;

/// Force a from-scratch build: drop the outputs, then build.
pub fn cmd_rebuild(verbose: bool) -> Result<()> {
  let (graph, _) = description()?;
  if clean(&graph)? {
    print_info(&format!("removed {}", graph.out_dir().display()));
  }

  super::cmd_build(verbose)
}
