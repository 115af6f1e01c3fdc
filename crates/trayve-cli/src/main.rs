//! trayve-resolve: resolve display decisions from media record snapshots.
//!
//! Reads one record or an array of records as JSON (from a file or
//! stdin) and prints the badge, preview URL and action state each viewer
//! tier would see. Useful for:
//!
//! - Reproducing a merchant's "stuck badge" report from a database row
//! - Comparing what each subscription tier sees for the same record
//! - Checking the effect of the failed-stage policy
//!
//! # Usage
//!
//! ```text
//! cargo run --bin trayve-resolve -- resolve record.json --tier professional
//! cargo run --bin trayve-resolve -- matrix - --json < records.json
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `warn`); logs go to stderr.

#![allow(clippy::print_stdout)]

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, error, info};
use trayve_display::{
    DecisionReport, DisplayError, DisplayRequest, FailedStagePolicy, MediaRecord, ResolverConfig,
    Tier, ViewerContext,
};

/// Resolve badges, preview URLs and action gates for try-on media records.
#[derive(Parser)]
#[command(name = "trayve-resolve", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve each record for a single tier.
    Resolve {
        #[command(flatten)]
        common: CommonArgs,

        /// Subscription tier of the viewer.
        #[arg(long, value_enum)]
        tier: TierArg,

        /// A background-removal request is already in flight.
        #[arg(long)]
        removing: bool,
    },
    /// Resolve each record for every tier.
    Matrix {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Path to a JSON record or array of records, or `-` for stdin.
    input: PathBuf,

    /// Clothing image shown until the pipeline produces output.
    #[arg(long, default_value = "")]
    fallback_url: String,

    /// How failed stages surface in the badge.
    #[arg(long, value_enum, default_value_t = PolicyArg::Degrade)]
    failed_policy: PolicyArg,

    /// Full resolver config as a JSON string.
    ///
    /// When provided, `--failed-policy` is ignored. The JSON must be a
    /// valid `ResolverConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Output reports as JSON instead of human-readable text.
    #[arg(long)]
    json: bool,
}

/// Subscription tier selection.
#[derive(Clone, Copy, ValueEnum)]
enum TierArg {
    Free,
    Creator,
    Professional,
    Enterprise,
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Free => Self::Free,
            TierArg::Creator => Self::Creator,
            TierArg::Professional => Self::Professional,
            TierArg::Enterprise => Self::Enterprise,
        }
    }
}

/// Failed-stage policy selection.
#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Failed stages read as not completed.
    Degrade,
    /// Failed stages the badge is waiting on read as stalled.
    Stalled,
}

/// Build a [`ResolverConfig`] from CLI arguments.
///
/// If `--config-json` is provided it is parsed directly and
/// `--failed-policy` is ignored.
fn config_from_cli(args: &CommonArgs) -> Result<ResolverConfig, DisplayError> {
    if let Some(ref json) = args.config_json {
        return serde_json::from_str(json).map_err(|e| DisplayError::InvalidConfig(e.to_string()));
    }

    Ok(ResolverConfig {
        failed_stage_policy: match args.failed_policy {
            PolicyArg::Degrade => FailedStagePolicy::Degrade,
            PolicyArg::Stalled => FailedStagePolicy::Stalled,
        },
    })
}

fn read_input(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Decode one record or an array of records.
///
/// The shape is decided up front so a malformed record reports its own
/// decode error instead of a generic untagged-enum mismatch.
fn parse_records(text: &str) -> serde_json::Result<Vec<MediaRecord>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|record| vec![record])
    }
}

fn load_records(path: &Path) -> Result<Vec<MediaRecord>, String> {
    let text = read_input(path).map_err(|e| format!("error reading {}: {e}", path.display()))?;
    parse_records(&text).map_err(|e| format!("error parsing records from {}: {e}", path.display()))
}

fn resolve_reports(
    records: &[MediaRecord],
    tiers: &[Tier],
    args: &CommonArgs,
    removing: bool,
    config: &ResolverConfig,
) -> Vec<DecisionReport> {
    let request = DisplayRequest {
        fallback_clothing_image_url: &args.fallback_url,
        is_removing_background: removing,
    };
    records
        .iter()
        .flat_map(|record| {
            tiers.iter().map(move |&tier| {
                DecisionReport::new(record, ViewerContext::new(tier), &request, config)
            })
        })
        .collect()
}

fn print_reports(reports: &[DecisionReport], json: bool) -> Result<(), String> {
    if json {
        let out = serde_json::to_string_pretty(reports)
            .map_err(|e| format!("error serializing reports: {e}"))?;
        println!("{out}");
    } else {
        let text: Vec<String> = reports.iter().map(DecisionReport::report).collect();
        println!("{}", text.join("\n\n"));
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), String> {
    let (common, tiers, removing) = match cli.command {
        Command::Resolve {
            common,
            tier,
            removing,
        } => (common, vec![Tier::from(tier)], removing),
        Command::Matrix { common } => (common, Tier::ALL.to_vec(), false),
    };

    let config = config_from_cli(&common).map_err(|e| e.to_string())?;
    debug!(?config, "resolver config");

    let records = load_records(&common.input)?;
    info!(
        count = records.len(),
        input = %common.input.display(),
        "loaded records"
    );

    let reports = resolve_reports(&records, &tiers, &common, removing, &config);
    print_reports(&reports, common.json)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            error!("{msg}");
            ExitCode::FAILURE
        }
    }
}
