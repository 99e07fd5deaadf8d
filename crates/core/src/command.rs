//! Command-line assembly and execution.
//!
//! `ArgBuffer` accumulates tokens in insertion order; the rendered line
//! is deterministic because nothing ever reorders or deduplicates what
//! was appended. Execution is synchronous: one subprocess, wait for it,
//! report the outcome.

use std::process::Command;

use tracing::{debug, info};

use crate::error::{BuildError, Result};

/// A growable ordered sequence of command-line tokens.
///
/// Growth is fallible: allocation failure surfaces as
/// [`BuildError::OutOfMemory`] and leaves already-appended tokens
/// untouched, it never truncates or aborts.
#[derive(Debug, Default, Clone)]
pub struct ArgBuffer {
  tokens: Vec<String>,
}

impl ArgBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a single token.
  pub fn push(&mut self, token: impl Into<String>) -> Result<()> {
    self.tokens.try_reserve(1)?;
    self.tokens.push(token.into());
    Ok(())
  }

  /// Append a sequence of tokens, preserving their order.
  pub fn extend<I, S>(&mut self, tokens: I) -> Result<()>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    for token in tokens {
      self.push(token)?;
    }
    Ok(())
  }

  /// The tokens as `[program, ...args]`.
  pub fn tokens(&self) -> &[String] {
    &self.tokens
  }

  pub fn len(&self) -> usize {
    self.tokens.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tokens.is_empty()
  }

  /// Render the buffer as a single line, tokens joined by one space in
  /// insertion order.
  pub fn render(&self) -> String {
    self.tokens.join(" ")
  }
}

/// Run an argument buffer as one subprocess and wait for it.
///
/// The rendered command line is logged before spawning so every
/// invoked command shows up in the operational log. Stdio is
/// inherited; nothing is captured or retried.
///
/// # Errors
///
/// [`BuildError::EmptyCommand`] when the buffer holds no program
/// token, [`BuildError::Spawn`] when the process cannot start, and
/// [`BuildError::CommandFailed`] on a non-zero exit.
pub fn run(buf: &ArgBuffer) -> Result<()> {
  let Some((program, args)) = buf.tokens().split_first() else {
    return Err(BuildError::EmptyCommand);
  };

  info!(command = %buf.render(), "exec");

  let status = Command::new(program)
    .args(args)
    .status()
    .map_err(|source| BuildError::Spawn {
      program: program.clone(),
      source,
    })?;

  if !status.success() {
    return Err(BuildError::CommandFailed {
      command: buf.render(),
      code: status.code(),
    });
  }

  debug!(program = %program, "exec ok");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn render_preserves_insertion_order() {
    let mut buf = ArgBuffer::new();
    buf.push("cc").unwrap();
    buf.push("-o").unwrap();
    buf.push("build/hello").unwrap();
    buf.extend(["src/main.c", "build/temp.o"]).unwrap();

    assert_eq!(buf.render(), "cc -o build/hello src/main.c build/temp.o");
    assert_eq!(buf.len(), 5);
  }

  #[test]
  fn tokens_stay_separate() {
    let mut buf = ArgBuffer::new();
    buf.extend(["-Ia", "-Ib", "-lm"]).unwrap();

    // Each flag is one token, never merged or re-split.
    assert_eq!(buf.tokens(), ["-Ia", "-Ib", "-lm"]);
  }

  #[test]
  fn empty_buffer_is_rejected() {
    let buf = ArgBuffer::new();
    assert!(matches!(run(&buf), Err(BuildError::EmptyCommand)));
  }

  #[test]
  #[cfg(unix)]
  fn successful_command() {
    let mut buf = ArgBuffer::new();
    buf.push("true").unwrap();
    run(&buf).unwrap();
  }

  #[test]
  #[cfg(unix)]
  fn failing_command_reports_exit_code() {
    let mut buf = ArgBuffer::new();
    buf.extend(["sh", "-c", "exit 3"]).unwrap();

    match run(&buf) {
      Err(BuildError::CommandFailed { code, .. }) => assert_eq!(code, Some(3)),
      other => panic!("expected CommandFailed, got {other:?}"),
    }
  }

  #[test]
  fn missing_program_is_spawn_failure() {
    let mut buf = ArgBuffer::new();
    buf.push("carp-test-no-such-program").unwrap();

    assert!(matches!(run(&buf), Err(BuildError::Spawn { .. })));
  }
}
