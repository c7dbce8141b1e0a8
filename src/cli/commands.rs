//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Count recorded deaths per calendar year
#[derive(Parser, Debug)]
#[command(name = "deaths-per-year")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Source CSV file (overrides the config)
    #[arg(short, long, global = true)]
    pub source: Option<PathBuf>,

    /// Output artifact directory (overrides the config)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the pipeline
    Run,

    /// Print the compiled aggregate query without running it
    Plan,

    /// Print the rows of a written artifact
    Inspect {
        /// Artifact directory or Parquet file (defaults to the output path)
        path: Option<PathBuf>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::parse_from(["deaths-per-year"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::parse_from([
            "deaths-per-year",
            "run",
            "--source",
            "in.csv",
            "-o",
            "out",
            "-f",
            "pretty",
        ]);
        assert_eq!(cli.command, Some(Commands::Run));
        assert_eq!(cli.source, Some(PathBuf::from("in.csv")));
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert_eq!(cli.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_inspect_path() {
        let cli = Cli::parse_from(["deaths-per-year", "inspect", "data/output"]);
        assert_eq!(
            cli.command,
            Some(Commands::Inspect {
                path: Some(PathBuf::from("data/output"))
            })
        );
    }
}
