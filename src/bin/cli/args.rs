//! CLI Argument Structures
//!
//! Argument definitions and command structures for the testforge binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// NUnit/Moq test scaffold generator for C# sources
#[derive(Parser)]
#[command(name = "testforge")]
#[command(version = VERSION)]
#[command(about = "Testforge - NUnit/Moq test scaffolds from C# sources")]
#[command(long_about = "
Parse C# sources, extract their public surface and write one test scaffold
per file, with mocks for interface dependencies and a stub test per public
method.

Common Usage:

  # Scaffold every .cs file below ./src
  testforge generate ./src --out tests/generated

  # Use a configuration file and four workers per stage
  testforge generate ./src --config testforge.yml --jobs 4

  # Show the default configuration
  testforge print-default-config
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate test scaffolds for source files and directories
    Generate(GenerateArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Validate a testforge configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Source files or directories to scan
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory for generated scaffolds
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, env = "TESTFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Items each stage processes at once
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Summary format
    #[arg(long, value_enum, default_value = "pretty")]
    pub format: SummaryFormat,
}

#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Configuration file to validate
    pub config: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    /// Colored human-readable summary
    Pretty,
    /// Machine-readable JSON summary
    Json,
}
