//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use pyforge_types::ColorChoice;
use std::path::PathBuf;

/// pyforge - Python project scaffolder
#[derive(Parser)]
#[command(name = "pyforge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scaffold Python projects with a virtual environment and dependencies")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Args)]
pub struct GlobalArgs {
    /// Output events and results as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new Python project
    #[command(alias = "n")]
    New(NewArgs),

    /// List available package presets
    Presets,
}

/// Arguments for `pyforge new`
#[derive(Args)]
pub struct NewArgs {
    /// Project name (also the directory name)
    pub name: String,

    /// Directory to create the project in (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Package to install, pip style (repeatable; e.g. requests>=2.31)
    #[arg(short = 'p', long = "package", value_name = "SPEC")]
    pub packages: Vec<String>,

    /// Start from a named package preset
    #[arg(long, value_name = "NAME", conflicts_with = "no_preset")]
    pub preset: Option<String>,

    /// Ignore the configured default preset
    #[arg(long)]
    pub no_preset: bool,

    /// Generate a README.md
    #[arg(long, overrides_with = "no_readme")]
    pub readme: bool,

    /// Skip the README.md
    #[arg(long)]
    pub no_readme: bool,

    /// Initialize a git repository with an initial commit
    #[arg(long, overrides_with = "no_git")]
    pub git: bool,

    /// Skip git initialization
    #[arg(long)]
    pub no_git: bool,

    /// Leave a partially created project on disk after a failure
    #[arg(long)]
    pub keep_on_failure: bool,
}
