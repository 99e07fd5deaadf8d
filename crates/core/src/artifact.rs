//! Compilation targets.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::graph::ArtifactId;

/// Whether a target produces a linkable intermediate or a final
/// executable. Object mode adds `-c` to the compile command and an
/// `.o` suffix to the output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactMode {
  Binary,
  Object,
}

/// One compilation unit: a named target with a single source file, a
/// derived output path, per-target flags, and edges to the targets it
/// links against.
///
/// The output path is a pure function of name and mode, computed once
/// at construction and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Artifact {
  name: String,
  source_path: PathBuf,
  output_path: PathBuf,
  mode: ArtifactMode,
  pub(crate) extra_args: Vec<String>,
  pub(crate) include_paths: Vec<String>,
  pub(crate) lib_paths: Vec<String>,
  pub(crate) libs: Vec<String>,
  pub(crate) headers: Vec<PathBuf>,
  pub(crate) deps: Vec<ArtifactId>,
}

impl Artifact {
  /// Construct a fully initialized artifact: `<out_dir>/<name>` for
  /// binaries, `<out_dir>/<name>.o` for objects.
  pub(crate) fn new(
    name: impl Into<String>,
    source_path: impl Into<PathBuf>,
    mode: ArtifactMode,
    out_dir: &Path,
  ) -> Self {
    let name = name.into();
    let output_path = match mode {
      ArtifactMode::Binary => out_dir.join(&name),
      ArtifactMode::Object => out_dir.join(format!("{name}.o")),
    };

    Self {
      name,
      source_path: source_path.into(),
      output_path,
      mode,
      extra_args: Vec::new(),
      include_paths: Vec::new(),
      lib_paths: Vec::new(),
      libs: Vec::new(),
      headers: Vec::new(),
      deps: Vec::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn source_path(&self) -> &Path {
    &self.source_path
  }

  pub fn output_path(&self) -> &Path {
    &self.output_path
  }

  pub fn mode(&self) -> ArtifactMode {
    self.mode
  }

  /// Extra free-form compiler arguments, in insertion order.
  pub fn extra_args(&self) -> &[String] {
    &self.extra_args
  }

  /// Header files that force a rebuild when newer than the output.
  pub fn headers(&self) -> &[PathBuf] {
    &self.headers
  }

  /// Targets this one links against, in insertion order.
  pub fn dependencies(&self) -> &[ArtifactId] {
    &self.deps
  }
}

/// Fallible push shared by every growable list on an artifact:
/// allocation failure is an error outcome, not an abort, and the list
/// is left unchanged.
pub(crate) fn try_push<T>(list: &mut Vec<T>, item: T) -> Result<()> {
  list.try_reserve(1)?;
  list.push(item);
  Ok(())
}
