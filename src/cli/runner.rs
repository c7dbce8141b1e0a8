//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt};
use crate::output::read_artifact;
use crate::pipeline::{self, RunSummary};
use crate::types::YearCount;
use serde_json::json;
use std::path::PathBuf;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        let config = self.load_config()?;

        match self.cli.command.clone().unwrap_or(Commands::Run) {
            Commands::Run => self.run_pipeline(&config),
            Commands::Plan => self.plan(&config),
            Commands::Inspect { path } => self.inspect(path.unwrap_or(config.output.path)),
        }
    }

    /// Load the config file (if any) and apply path overrides
    pub fn load_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.cli.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(source) = &self.cli.source {
            config = config.with_source_path(source);
        }
        if let Some(output) = &self.cli.output {
            config = config.with_output_path(output);
        }

        config.validate()?;
        Ok(config)
    }

    fn run_pipeline(&self, config: &PipelineConfig) -> Result<()> {
        let summary = pipeline::run(config)?;
        self.emit_summary(&summary)
    }

    fn plan(&self, config: &PipelineConfig) -> Result<()> {
        let sql = pipeline::explain(config)?;
        match self.cli.format {
            OutputFormat::Json => {
                let msg = json!({"type": "PLAN", "sql": sql});
                println!("{}", serde_json::to_string(&msg)?);
            }
            OutputFormat::Pretty => println!("{sql}"),
        }
        Ok(())
    }

    fn inspect(&self, path: PathBuf) -> Result<()> {
        let rows = read_artifact(&path)?;
        match self.cli.format {
            OutputFormat::Json => {
                for (i, row) in rows.iter().enumerate() {
                    let msg = json!({"type": "RECORD", "record": row});
                    let line = serde_json::to_string(&msg)
                        .with_context(|| format!("Failed to encode record {i}"))?;
                    println!("{line}");
                }
            }
            OutputFormat::Pretty => print_table(&rows),
        }
        Ok(())
    }

    fn emit_summary(&self, summary: &RunSummary) -> Result<()> {
        match self.cli.format {
            OutputFormat::Json => {
                let msg = json!({"type": "SUMMARY", "summary": summary});
                let line = serde_json::to_string(&msg).context("Failed to encode run summary")?;
                println!("{line}");
            }
            OutputFormat::Pretty => {
                println!("Source:      {}", summary.source.display());
                println!("Output:      {}", summary.output.path.display());
                if summary.output.skipped {
                    println!("Write:       skipped (output exists)");
                } else {
                    println!("Year groups: {}", summary.output.rows);
                }
                println!(
                    "Null group:  {} missing, {} unparseable",
                    summary.quality.missing, summary.quality.unparseable
                );
                println!("Duration:    {}ms", summary.duration_ms);
            }
        }
        Ok(())
    }
}

fn print_table(rows: &[YearCount]) {
    println!("{:>6} {}", "year", "total_deaths");
    for row in rows {
        println!("{row}");
    }
    println!("({} rows)", rows.len());
}
