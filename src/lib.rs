//! Command-line front end for keyword string generation.
//!
//! The option structs here are shared by the `generate` and `check`
//! subcommands of the `ddt-keywords` binary.

use clap::{Parser, ValueEnum};
use keyword_generator::ZonePolicy;

pub mod config;

/// Options controlling how values are generated.
#[derive(Parser, Clone, Debug)]
pub struct GeneratorOpts {
    /// Zone for `[datetime]` results without a `{zoneid}` modifier
    #[arg(
        long,
        value_enum,
        default_value = "start",
        env = "DDT_ZONE_POLICY"
    )]
    pub zone_policy: ZonePolicyArg,

    /// IANA zone id used as the system zone (default: $TZ, then UTC)
    #[arg(long, env = "DDT_SYSTEM_ZONE")]
    pub system_zone: Option<String>,

    /// Seed for reproducible strings and integers
    #[arg(long, env = "DDT_SEED")]
    pub seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ZonePolicyArg {
    /// Keep the zone of the `{start}` timestamp
    #[value(name = "start")]
    Start,
    /// Always use the system zone
    #[value(name = "system")]
    System,
}

impl From<ZonePolicyArg> for ZonePolicy {
    fn from(value: ZonePolicyArg) -> Self {
        match value {
            ZonePolicyArg::Start => ZonePolicy::StartInstant,
            ZonePolicyArg::System => ZonePolicy::SystemDefault,
        }
    }
}

/// How generated values are written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One value per line
    #[default]
    #[value(name = "text")]
    Text,
    /// One JSON object per line
    #[value(name = "json")]
    Json,
}
