//! Self-rebuild bootstrap.
//!
//! A build tool whose description is itself a program must not run
//! stale build logic: before anything else, compare the running
//! binary's age against its own definition sources and, when the
//! definition is newer, recompile the binary in place and re-invoke it
//! with the original arguments. The re-invocation's real exit code is
//! the outcome of the whole original invocation.
//!
//! Two phases: [`SelfRebuild::is_outdated`] is a pure function of
//! modification times; [`SelfRebuild::run`] performs the
//! build-then-replace step. The comparison is strictly-newer, so a
//! freshly rebuilt binary always observes itself up to date and the
//! protocol cannot recurse.

use std::path::PathBuf;
use std::process::Command;

use tracing::info;

use crate::command::{self, ArgBuffer};
use crate::consts::DEFAULT_COMPILER;
use crate::error::{BuildError, Result};
use crate::stale::mtime;

/// The self-rebuild protocol for one executable.
#[derive(Debug, Clone)]
pub struct SelfRebuild {
  exe: PathBuf,
  source: PathBuf,
  extra_sources: Vec<PathBuf>,
  compiler: String,
  forward_args: Vec<String>,
}

impl SelfRebuild {
  /// Protocol for `exe`, defined by `source`, compiled with the
  /// default compiler and re-invoked without arguments.
  pub fn new(exe: impl Into<PathBuf>, source: impl Into<PathBuf>) -> Self {
    Self {
      exe: exe.into(),
      source: source.into(),
      extra_sources: Vec::new(),
      compiler: DEFAULT_COMPILER.to_string(),
      forward_args: Vec::new(),
    }
  }

  /// Watch an auxiliary definition file (e.g. a header the description
  /// includes) in addition to the main source.
  pub fn watch(mut self, path: impl Into<PathBuf>) -> Self {
    self.extra_sources.push(path.into());
    self
  }

  pub fn compiler(mut self, compiler: impl Into<String>) -> Self {
    self.compiler = compiler.into();
    self
  }

  /// Arguments forwarded to the re-invocation.
  pub fn forward_args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.forward_args = args.into_iter().map(Into::into).collect();
    self
  }

  /// Phase 1: is any definition source strictly newer than the
  /// executable?
  ///
  /// # Errors
  ///
  /// [`BuildError::Filesystem`] when the executable or a watched
  /// source cannot be statted.
  pub fn is_outdated(&self) -> Result<bool> {
    let exe_mtime = mtime(&self.exe)?;

    for source in std::iter::once(&self.source).chain(&self.extra_sources) {
      if mtime(source)? > exe_mtime {
        return Ok(true);
      }
    }
    Ok(false)
  }

  /// Phase 2: rebuild and re-invoke when outdated.
  ///
  /// Returns `None` when the executable is already up to date and the
  /// caller should proceed with its own build logic. Otherwise the
  /// source is compiled over the executable's own path with a minimal
  /// `<compiler> -o <exe> <source>` invocation, the fresh binary is
  /// re-invoked synchronously with the forwarded arguments, and
  /// `Some(exit code)` of that re-invocation is returned — the caller
  /// must exit with it and run no further build logic.
  pub fn run(&self) -> Result<Option<i32>> {
    if !self.is_outdated()? {
      return Ok(None);
    }

    info!(exe = %self.exe.display(), source = %self.source.display(), "rebuilding self");

    let mut compile = ArgBuffer::new();
    compile.push(self.compiler.as_str())?;
    compile.push("-o")?;
    compile.push(self.exe.display().to_string())?;
    compile.push(self.source.display().to_string())?;
    command::run(&compile)?;

    info!(exe = %self.exe.display(), "re-invoking");
    let status = Command::new(&self.exe)
      .args(&self.forward_args)
      .status()
      .map_err(|source| BuildError::Spawn {
        program: self.exe.display().to_string(),
        source,
      })?;

    Ok(Some(status.code().unwrap_or(1)))
  }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
  use std::fs::File;
  use std::os::unix::fs::PermissionsExt;
  use std::path::Path;
  use std::time::{Duration, SystemTime};

  use tempfile::TempDir;

  use super::*;

  fn script(path: &Path, body: &str) {
    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
  }

  fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
      .append(true)
      .open(path)
      .unwrap()
      .set_modified(time)
      .unwrap();
  }

  #[test]
  fn fresh_executable_is_not_outdated() {
    let dir = TempDir::new().unwrap();
    let exe = dir.path().join("carp");
    let source = dir.path().join("carp.c");

    File::create(&source).unwrap();
    set_mtime(&source, SystemTime::now() - Duration::from_secs(60));
    File::create(&exe).unwrap();

    let rebuild = SelfRebuild::new(&exe, &source);
    assert!(!rebuild.is_outdated().unwrap());
    assert_eq!(rebuild.run().unwrap(), None);
  }

  #[test]
  fn equal_timestamps_do_not_trigger_rebuild() {
    // Strictly-newer comparison: a binary rebuilt within the mtime
    // granularity of its source must still see itself as fresh.
    let dir = TempDir::new().unwrap();
    let exe = dir.path().join("carp");
    let source = dir.path().join("carp.c");
    let stamp = SystemTime::now();

    File::create(&source).unwrap();
    set_mtime(&source, stamp);
    File::create(&exe).unwrap();
    set_mtime(&exe, stamp);

    assert!(!SelfRebuild::new(&exe, &source).is_outdated().unwrap());
  }

  #[test]
  fn newer_source_is_outdated() {
    let dir = TempDir::new().unwrap();
    let exe = dir.path().join("carp");
    let source = dir.path().join("carp.c");

    File::create(&exe).unwrap();
    set_mtime(&exe, SystemTime::now() - Duration::from_secs(60));
    File::create(&source).unwrap();

    assert!(SelfRebuild::new(&exe, &source).is_outdated().unwrap());
  }

  #[test]
  fn newer_watched_header_is_outdated() {
    let dir = TempDir::new().unwrap();
    let exe = dir.path().join("carp");
    let source = dir.path().join("carp.c");
    let header = dir.path().join("carp.h");

    let past = SystemTime::now() - Duration::from_secs(60);
    File::create(&source).unwrap();
    set_mtime(&source, past);
    File::create(&exe).unwrap();
    set_mtime(&exe, past + Duration::from_secs(10));
    File::create(&header).unwrap();

    let rebuild = SelfRebuild::new(&exe, &source).watch(&header);
    assert!(rebuild.is_outdated().unwrap());
  }

  #[test]
  fn missing_source_is_a_filesystem_error() {
    let dir = TempDir::new().unwrap();
    let exe = dir.path().join("carp");
    File::create(&exe).unwrap();

    let rebuild = SelfRebuild::new(&exe, dir.path().join("no-such.c"));
    assert!(matches!(
      rebuild.is_outdated(),
      Err(BuildError::Filesystem { .. })
    ));
  }

  #[test]
  fn outdated_exe_is_recompiled_and_rerun_with_args() {
    let dir = TempDir::new().unwrap();
    let exe = dir.path().join("carp");
    let source = dir.path().join("carp.c");
    let compiler = dir.path().join("fake-cc");
    let compile_log = dir.path().join("compile.log");
    let run_log = dir.path().join("run.log");

    // The "compiler" rewrites the exe as a script that records its
    // argv and exits 7, standing in for the freshly built binary.
    script(
      &compiler,
      &format!(
        "echo \"$@\" >> {}\nprintf '#!/bin/sh\\necho \"$@\" >> {}\\nexit 7\\n' > \"$2\"\nchmod +x \"$2\"",
        compile_log.display(),
        run_log.display()
      ),
    );

    script(&exe, "exit 0");
    set_mtime(&exe, SystemTime::now() - Duration::from_secs(60));
    File::create(&source).unwrap();

    let rebuild = SelfRebuild::new(&exe, &source)
      .compiler(compiler.display().to_string())
      .forward_args(["rebuild", "--verbose"]);

    // The inner exit code is propagated, not discarded.
    assert_eq!(rebuild.run().unwrap(), Some(7));

    let compile = std::fs::read_to_string(&compile_log).unwrap();
    assert_eq!(
      compile.trim(),
      format!("-o {} {}", exe.display(), source.display())
    );

    let rerun = std::fs::read_to_string(&run_log).unwrap();
    assert_eq!(rerun.trim(), "rebuild --verbose");
  }

  #[test]
  fn failed_self_compile_propagates() {
    let dir = TempDir::new().unwrap();
    let exe = dir.path().join("carp");
    let source = dir.path().join("carp.c");
    let compiler = dir.path().join("fake-cc");

    script(&compiler, "exit 1");
    script(&exe, "exit 0");
    set_mtime(&exe, SystemTime::now() - Duration::from_secs(60));
    File::create(&source).unwrap();

    let rebuild = SelfRebuild::new(&exe, &source).compiler(compiler.display().to_string());
    assert!(matches!(
      rebuild.run(),
      Err(BuildError::CommandFailed { .. })
    ));
  }
}
