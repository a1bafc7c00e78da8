mod cmd;
mod ingest;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use confrag_lib::config::Config;

use cmd::{cmd_compile, cmd_manifest};
use output::{OutputFormat, print_error};

/// confrag - compile producer services into per-destination config fragments
#[derive(Parser)]
#[command(name = "confrag")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Path to a config file (default: $XDG_CONFIG_HOME/confrag/config.json)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Apply resource documents and print the generated fragments
  Compile {
    /// Directory of resource documents (*.json)
    dir: PathBuf,
  },

  /// Apply resource documents and print the manifest of each destination
  Manifest {
    /// Directory of resource documents (*.json)
    dir: PathBuf,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy())
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

  match cli.command {
    Commands::Compile { dir } => cmd_compile(&dir, config, cli.output, cli.verbose),
    Commands::Manifest { dir } => cmd_manifest(&dir, config, cli.output),
  }
}
