//! Command execution for the testforge CLI.

use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::info;

use testforge::io::loader::SourceLoader;
use testforge::{RunReport, TestforgeConfig, TestforgeEngine};

use crate::cli::args::{GenerateArgs, SummaryFormat, ValidateConfigArgs};

/// Machine-readable run summary
#[derive(Debug, Serialize)]
struct RunSummary {
    inputs: usize,
    written: Vec<PathBuf>,
    dropped_empty: usize,
    failures: Vec<FailureSummary>,
}

#[derive(Debug, Serialize)]
struct FailureSummary {
    stage: String,
    item: String,
    error: String,
}

impl RunSummary {
    fn new(inputs: usize, report: &RunReport) -> Self {
        Self {
            inputs,
            written: report.written.clone(),
            dropped_empty: report.dropped_empty,
            failures: report
                .failures
                .iter()
                .map(|failure| FailureSummary {
                    stage: failure.stage.clone(),
                    item: failure.item.clone(),
                    error: failure.error.to_string(),
                })
                .collect(),
        }
    }
}

/// Load configuration from a file, or defaults when none is given
pub fn load_configuration(path: Option<&Path>) -> anyhow::Result<TestforgeConfig> {
    let config = match path {
        Some(path) => TestforgeConfig::from_yaml_file(path)?,
        None => TestforgeConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Generate scaffolds for the given inputs
pub async fn generate_command(args: GenerateArgs) -> anyhow::Result<()> {
    let mut config = load_configuration(args.config.as_deref())?;
    if let Some(out) = args.out {
        config = config.with_output_directory(out);
    }
    if let Some(jobs) = args.jobs {
        config = config.with_max_parallelism(jobs);
    }

    let files = SourceLoader::new().discover(&args.inputs)?;
    info!(files = files.len(), "Discovered source files");

    let engine = TestforgeEngine::new(config)?;
    let inputs = files.len();
    let report = engine.run(files).await?;
    let summary = RunSummary::new(inputs, &report);

    match args.format {
        SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        SummaryFormat::Pretty => print_summary(&summary, engine.config()),
    }

    if !report.is_success() {
        anyhow::bail!("{} input(s) failed", report.failures.len());
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, config: &TestforgeConfig) {
    println!(
        "{} {} scaffold(s) from {} input(s) into {}",
        "✅ Generated".bright_green().bold(),
        summary.written.len(),
        summary.inputs,
        config.output.directory.display().to_string().cyan()
    );

    for path in &summary.written {
        println!("   {}", path.display());
    }

    if summary.dropped_empty > 0 {
        println!(
            "{}",
            format!(
                "   {} input(s) declared no namespace and were skipped",
                summary.dropped_empty
            )
            .dimmed()
        );
    }

    if !summary.failures.is_empty() {
        println!();
        println!("{}", "❌ Failures:".red().bold());
        for failure in &summary.failures {
            println!("   [{}] {}: {}", failure.stage, failure.item.yellow(), failure.error);
        }
    }
}

/// Print the default configuration as YAML
pub fn print_default_config() -> anyhow::Result<()> {
    println!("{}", "# Default testforge configuration".dimmed());
    println!(
        "{}",
        "# Usage: testforge generate --config your-config.yml <inputs>".dimmed()
    );
    println!();

    let yaml_output = serde_yaml::to_string(&TestforgeConfig::default())?;
    println!("{}", yaml_output);
    Ok(())
}

/// Validate a configuration file
pub fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    println!(
        "{} {}",
        "🔍 Validating configuration:".bright_blue().bold(),
        args.config.display().to_string().cyan()
    );

    match load_configuration(Some(&args.config)) {
        Ok(config) => {
            println!("{}", "✅ Configuration file is valid!".bright_green().bold());
            println!(
                "   output: {} (*.{})",
                config.output.directory.display(),
                config.output.extension
            );
            println!(
                "   workers per stage: {}",
                config.pipeline.effective_parallelism()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "❌ Configuration validation failed:".red(), e);
            println!(
                "{}",
                "💡 Tip: Use 'testforge print-default-config' to see valid format".dimmed()
            );
            Err(anyhow::anyhow!("Configuration validation failed: {}", e))
        }
    }
}
