//! URL Validator CLI
//!
//! Classifies the `url` column of a CSV file against a source's rules and
//! writes the valid and invalid partitions as separate CSV files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use url_validator::{export_file_name, read_url_column, render_partition_csv, Partition, RuleRegistry};

#[derive(Parser)]
#[command(name = "url-validator")]
#[command(about = "Validate URLs against per-source pattern rules")]
struct Cli {
    /// Rule table to use instead of the built-in one (.json or text format)
    #[arg(short, long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the known sources
    Sources,

    /// Classify the URLs of a CSV file
    Check {
        /// Source whose rules apply
        #[arg(short, long)]
        source: String,

        /// CSV file with a column named 'url'
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for the exported partition files
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn main() {
    init_logging();

    let cli = Cli::parse();

    let result = load_registry(cli.rules.as_deref()).and_then(|registry| match cli.command {
        Commands::Sources => cmd_sources(&registry),
        Commands::Check {
            source,
            input,
            out_dir,
        } => cmd_check(&registry, &source, &input, &out_dir),
    });

    if let Err(err) = result {
        eprintln!("url-validator error: {:#}", err);
        std::process::exit(1);
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_registry(path: Option<&Path>) -> Result<RuleRegistry> {
    let registry = match path {
        None => RuleRegistry::builtin().context("built-in rule table is invalid")?,
        Some(path) if path.extension().is_some_and(|ext| ext == "json") => {
            RuleRegistry::from_json_file(path)
                .with_context(|| format!("failed to load rules from {}", path.display()))?
        }
        Some(path) => RuleRegistry::from_file(path)
            .with_context(|| format!("failed to load rules from {}", path.display()))?,
    };
    Ok(registry)
}

fn cmd_sources(registry: &RuleRegistry) -> Result<()> {
    for source in registry.list_sources() {
        let rules = registry.rules_for(source)?;
        println!("{} ({} rules)", source, rules.len());
    }
    Ok(())
}

fn cmd_check(registry: &RuleRegistry, source: &str, input: &Path, out_dir: &Path) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let urls = read_url_column(&text).with_context(|| format!("in {}", input.display()))?;
    info!(source, count = urls.len(), "validating URLs");

    let result = registry.classify(source, urls)?;

    let timestamp = chrono::Local::now().naive_local();
    for partition in [Partition::Valid, Partition::Invalid] {
        let urls = result.get(partition);
        if urls.is_empty() {
            continue;
        }
        let path = out_dir.join(export_file_name(partition, timestamp));
        fs::write(&path, render_partition_csv(partition, urls))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("Valid URLs: {}", result.valid_count());
    println!("Invalid URLs: {}", result.invalid_count());
    if result.invalid_count() == 0 {
        println!("No invalid URLs found!");
    }
    Ok(())
}
