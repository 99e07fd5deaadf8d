//! carp - a minimal self-bootstrapping build orchestrator.

mod cmd;
mod description;
mod output;

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use carp_core::consts::DEFAULT_COMPILER;
use carp_core::{BuildError, SelfRebuild};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Conventional path of a self-managed build description: when this
/// file exists next to the working directory, carp rebuilds and
/// re-executes itself before doing anything else if the description
/// is newer than the running binary.
const DESCRIPTION_SOURCE: &str = "carp.c";

/// Auxiliary definition file the description includes.
const DESCRIPTION_HEADER: &str = "src/carp.h";

/// carp - rebuild only what is stale, in dependency order
#[derive(Parser)]
#[command(name = "carp")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Build stale targets (the default when no subcommand is given)
  Build,

  /// Remove the build output directory
  Clean {
    /// Also remove the carp executable itself
    #[arg(long)]
    all: bool,
  },

  /// Remove build outputs, then build from scratch
  Rebuild,
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  // Self-rebuild runs before anything else, argument parsing included:
  // stale build logic must never decide a build.
  match self_rebuild() {
    Ok(None) => {}
    Ok(Some(code)) => return exit_code(code),
    Err(err) => {
      output::print_error(&err.to_string());
      return exit_code(err.exit_code());
    }
  }

  let cli = Cli::parse();

  let result = match cli.command.unwrap_or(Commands::Build) {
    Commands::Build => cmd::cmd_build(cli.verbose),
    Commands::Clean { all } => cmd::cmd_clean(all),
    Commands::Rebuild => cmd::cmd_rebuild(cli.verbose),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      output::print_error(&err.to_string());
      exit_code(err.exit_code())
    }
  }
}

/// Run the self-rebuild protocol when a self-managed description is
/// present. Returns the exit code of the re-invocation when one
/// happened; the process must exit with it and run no build logic of
/// its own.
fn self_rebuild() -> Result<Option<i32>, BuildError> {
  let source = Path::new(DESCRIPTION_SOURCE);
  if !source.exists() {
    debug!("no self-managed description, skipping bootstrap");
    return Ok(None);
  }

  let mut rebuild = SelfRebuild::new(current_binary(), source)
    .compiler(compiler())
    .forward_args(env::args().skip(1));

  let header = Path::new(DESCRIPTION_HEADER);
  if header.exists() {
    rebuild = rebuild.watch(header);
  }

  rebuild.run()
}

/// Path of the running executable, conventionally the first process
/// argument.
fn current_binary() -> PathBuf {
  env::args_os()
    .next()
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("carp"))
}

/// Compiler program: `CARP_CC` override, or `cc`.
fn compiler() -> String {
  env::var("CARP_CC").unwrap_or_else(|_| DEFAULT_COMPILER.to_string())
}

fn exit_code(code: i32) -> ExitCode {
  ExitCode::from(u8::try_from(code).unwrap_or(1))
}
