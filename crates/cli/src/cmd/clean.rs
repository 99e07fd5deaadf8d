use carp_core::{Result, clean, clean_executable};

use crate::description::description;
use crate::output::{print_info, print_success};

pub fn cmd_clean(all: bool) -> Result<()> {
  let (graph, _) = description()?;

  if clean(&graph)? {
    print_success(&format!("removed {}", graph.out_dir().display()));
  } else {
    print_info(&format!("{} already absent", graph.out_dir().display()));
  }

  if all {
    let exe = crate::current_binary();
    if clean_executable(&exe)? {
      print_success(&format!("removed {}", exe.display()));
    }
  }

  Ok(())
}
