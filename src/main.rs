//! Command-line interface for ddt-keywords
//!
//! # Usage Examples
//!
//! ## Generate
//! ```bash
//! # Five random uppercase strings of 5 to 10 characters
//! ddt-keywords generate '[randstring{uppercase}{length=5-10}]' --count 5
//!
//! # Reproducible integers as JSON
//! ddt-keywords generate '[randint{range=-5:10}{even}]' --seed 42 --format json
//!
//! # Datetimes expressed in the system zone
//! ddt-keywords generate '[datetime{+1y}{-3d}]' --zone-policy system --system-zone Europe/Paris
//!
//! # Every keyword string in a fixture file
//! ddt-keywords generate --file fixtures/keywords.txt
//! ```
//!
//! ## Check
//! ```bash
//! # Report the family of each input
//! ddt-keywords check '[randint{range=1:5}]' 'plain text'
//!
//! # Fully validate, exiting non-zero if any input is malformed
//! ddt-keywords check --validate '[randint{even}{odd}]'
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use ddt_keywords::{config::collect_keywords, GeneratorOpts, OutputFormat};
use keyword_generator::{GeneratedValue, KeywordGenerator};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ddt-keywords")]
#[command(about = "Generate random values from data-driven test keyword strings")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate values for one or more keyword strings
    Generate {
        /// Keyword strings, e.g. '[randint{range=1:10}]'
        keywords: Vec<String>,

        /// File with one keyword string per line
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Number of values to generate per keyword string
        #[arg(long, default_value = "1")]
        count: u64,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Generator options
        #[command(flatten)]
        opts: GeneratorOpts,
    },

    /// Report the keyword family of each input
    Check {
        /// Keyword strings to check
        keywords: Vec<String>,

        /// File with one keyword string per line
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Also validate modifiers by generating a value
        #[arg(long)]
        validate: bool,

        /// Generator options
        #[command(flatten)]
        opts: GeneratorOpts,
    },
}

#[derive(Serialize)]
struct GeneratedRecord<'a> {
    keyword: &'a str,
    #[serde(flatten)]
    value: &'a GeneratedValue,
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            keywords,
            file,
            count,
            format,
            opts,
        } => {
            let keywords = collect_keywords(&keywords, file.as_deref())?;
            let mut generator = opts.build_generator()?;
            run_generate(&mut generator, &keywords, count, format)
        }
        Commands::Check {
            keywords,
            file,
            validate,
            opts,
        } => {
            let keywords = collect_keywords(&keywords, file.as_deref())?;
            let mut generator = opts.build_generator()?;
            run_check(&mut generator, &keywords, validate)
        }
    }
}

fn run_generate(
    generator: &mut KeywordGenerator,
    keywords: &[String],
    count: u64,
    format: OutputFormat,
) -> anyhow::Result<()> {
    for keyword in keywords {
        let values = generator
            .values(keyword, count)
            .with_context(|| format!("Failed to generate values for '{keyword}'"))?;

        for value in values {
            let value =
                value.with_context(|| format!("Failed to generate values for '{keyword}'"))?;
            match format {
                OutputFormat::Text => println!("{value}"),
                OutputFormat::Json => {
                    let record = GeneratedRecord {
                        keyword,
                        value: &value,
                    };
                    println!("{}", serde_json::to_string(&record)?);
                }
            }
        }
    }

    tracing::info!(
        keywords = keywords.len(),
        values = generator.generated_count(),
        "generation complete"
    );
    Ok(())
}

fn run_check(
    generator: &mut KeywordGenerator,
    keywords: &[String],
    validate: bool,
) -> anyhow::Result<()> {
    let mut invalid = 0;

    for keyword in keywords {
        let Some(family) = KeywordGenerator::family_of(keyword) else {
            println!("none\t{keyword}");
            invalid += 1;
            continue;
        };

        if !validate {
            println!("{family}\t{keyword}");
            continue;
        }

        match generator.generate(keyword) {
            Ok(_) => println!("{family}\t{keyword}\tok"),
            Err(e) => {
                println!("{family}\t{keyword}\tinvalid: {e}");
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        anyhow::bail!("{invalid} of {} keyword strings are invalid", keywords.len());
    }
    Ok(())
}
