mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::GlobalArgs;
use crate::output::OutputFormat;

/// Build a node executable once and wrap it per bundle set
#[derive(Parser)]
#[command(name = "nodewrap")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Source tree containing Cargo.toml
  #[arg(short, long, global = true, default_value = ".")]
  source: PathBuf,

  /// Pipeline config (default: <source>/nodewrap.toml if present)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Target platform as arch-os, e.g. aarch64-darwin (default: host)
  #[arg(short, long, global = true)]
  platform: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the node artifact
  Build {
    /// Discard any cached build for the same inputs
    #[arg(long)]
    rebuild: bool,
  },

  /// Build (cached) and wrap the artifact for a bundle set
  Wrap {
    /// Bundle identifier or manifest path; repeat for several, order is kept
    #[arg(short, long = "bundle", value_name = "ID")]
    bundles: Vec<String>,
  },

  /// Show the artifact and wrappers a realize would produce
  Plan {
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Build once and wrap every configured variant
  Realize {
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show the bundle arguments recorded for a wrapper
  Inspect {
    /// Wrapper script or its directory
    path: PathBuf,

    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Run the pipeline against a synthetic bundle; exits non-zero on failure
  Validate,

  /// Show platform and directory information
  Info,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let global = GlobalArgs {
    source: cli.source,
    config: cli.config,
    platform: cli.platform,
  };

  match cli.command {
    Commands::Build { rebuild } => cmd::cmd_build(&global, rebuild),
    Commands::Wrap { bundles } => cmd::cmd_wrap(&global, &bundles),
    Commands::Plan { output } => cmd::cmd_plan(&global, output),
    Commands::Realize { output } => cmd::cmd_realize(&global, output),
    Commands::Inspect { path, output } => cmd::cmd_inspect(&path, output),
    Commands::Validate => {
      if !cmd::cmd_validate(&global)? {
        std::process::exit(1);
      }
      Ok(())
    }
    Commands::Info => {
      cmd::cmd_info();
      Ok(())
    }
  }
}
