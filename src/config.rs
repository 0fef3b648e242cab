//! Resolving command-line options into a configured generator.

use crate::GeneratorOpts;
use anyhow::Context;
use chrono_tz::Tz;
use keyword_generator::generators::datetime::{self, parse_zone};
use keyword_generator::{DateTimeGenerator, KeywordGenerator};
use std::path::Path;

impl GeneratorOpts {
    /// The zone standing in for the system zone.
    pub fn resolve_system_zone(&self) -> anyhow::Result<Tz> {
        match &self.system_zone {
            Some(zone) => {
                parse_zone(zone).with_context(|| format!("Invalid --system-zone value: {zone}"))
            }
            None => Ok(datetime::system_zone()),
        }
    }

    /// Build a keyword generator from these options.
    pub fn build_generator(&self) -> anyhow::Result<KeywordGenerator> {
        let datetime = DateTimeGenerator::new()
            .with_zone_policy(self.zone_policy.into())
            .with_system_zone(self.resolve_system_zone()?);

        let generator = match self.seed {
            Some(seed) => KeywordGenerator::with_seed(seed),
            None => KeywordGenerator::new(),
        };

        tracing::debug!(
            zone_policy = ?datetime.zone_policy(),
            system_zone = %datetime.system_zone(),
            seed = ?self.seed,
            "configured keyword generator"
        );
        Ok(generator.with_datetime(datetime))
    }
}

/// Collect keyword strings from the command line and an optional file.
///
/// The file holds one keyword string per line; blank lines are skipped.
pub fn collect_keywords(args: &[String], file: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let mut keywords = args.to_vec();

    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read keyword file {path:?}"))?;
        keywords.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }

    if keywords.is_empty() {
        anyhow::bail!("No keyword strings given; pass them as arguments or with --file");
    }
    Ok(keywords)
}
