use carp_core::{Driver, Result, Toolchain};

use crate::description::description;
use crate::output::{print_info, print_success};

pub fn cmd_build(verbose: bool) -> Result<()> {
  let (graph, root) = description()?;
  let mut driver = Driver::new(&graph, Toolchain::new(crate::compiler()));

  let report = driver.build(root)?;

  if report.is_noop() {
    print_info("nothing to do");
    return Ok(());
  }

  if verbose {
    for &id in &report.compiled {
      print_info(&format!("compiled {}", graph.artifact(id).output_path().display()));
    }
  }
  print_success(&format!("built {} target(s)", report.compiled.len()));
  Ok(())
}
