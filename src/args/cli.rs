use clap::Parser;
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_positive_usize, parse_stages};
use super::types::{AccountSourceKind, PositiveUsize, ScenarioKind, StageList};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Role-aware load scenarios for the loop REST backend: provision accounts, open sessions, and drive ramped virtual users."
)]
pub struct LoadArgs {
    /// Scenario to run (smoke, load, stress, demo)
    #[arg(value_enum)]
    pub scenario: Option<ScenarioKind>,

    /// Base URL of the target service
    #[arg(long = "base-url", short = 'u', env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Path to config file (TOML or JSON). Defaults to ./loopload.toml or ./loopload.json
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Override ramp stages as 'duration:target' pairs (e.g. 30s:5,2m:15,30s:0)
    #[arg(long, value_parser = parse_stages)]
    pub stages: Option<StageList>,

    /// Cap the number of identities logged in during setup
    #[arg(long = "max-sessions", value_parser = parse_positive_usize)]
    pub max_sessions: Option<PositiveUsize>,

    /// Where test identities come from
    #[arg(long = "accounts", value_enum)]
    pub account_source: Option<AccountSourceKind>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "request-timeout", value_parser = parse_duration_arg)]
    pub request_timeout: Option<Duration>,

    /// Upper bound for the whole setup phase (supports ms/s/m/h)
    #[arg(long = "setup-timeout", value_parser = parse_duration_arg)]
    pub setup_timeout: Option<Duration>,

    /// Write the end-of-run summary as JSON to this path
    #[arg(long = "summary-export")]
    pub summary_export: Option<String>,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}
