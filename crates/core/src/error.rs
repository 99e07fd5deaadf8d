//! Error types for carp-core.

use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while evaluating or executing a build.
#[derive(Debug, Error)]
pub enum BuildError {
  /// A buffer or list could not grow.
  #[error("out of memory: {0}")]
  OutOfMemory(#[from] TryReserveError),

  /// A required stat/access call failed unexpectedly.
  #[error("filesystem unavailable for {}: {source}", .path.display())]
  Filesystem {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The output directory could not be created.
  #[error("cannot create output directory {}: {source}", .path.display())]
  OutputDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A subprocess could not be spawned at all.
  #[error("failed to spawn {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// A compile command ran and returned failure.
  #[error("command failed with exit code {code:?}: {command}")]
  CommandFailed { command: String, code: Option<i32> },

  /// An argument buffer was executed without a program token.
  #[error("empty command line")]
  EmptyCommand,

  /// Two artifacts derived the same output path.
  #[error("duplicate artifact output: {}", .output.display())]
  DuplicateArtifact { output: PathBuf },

  /// Adding a dependency edge would close a cycle.
  #[error("dependency cycle: {dependent} -> {dependency}")]
  CyclicDependency {
    dependent: String,
    dependency: String,
  },
}

impl BuildError {
  /// Process exit code convention for the top level.
  ///
  /// Distinct codes per error kind so callers (and scripts around the
  /// CLI) can tell an out-of-memory abort from a failed compile.
  pub fn exit_code(&self) -> i32 {
    match self {
      BuildError::CommandFailed { .. } | BuildError::Spawn { .. } | BuildError::EmptyCommand => 1,
      BuildError::OutOfMemory(_) => 3,
      BuildError::Filesystem { .. } | BuildError::OutputDir { .. } => 4,
      BuildError::CyclicDependency { .. } | BuildError::DuplicateArtifact { .. } => 5,
    }
  }
}

pub type Result<T> = std::result::Result<T, BuildError>;
