//! paystream: command-line tools for the PayStream payroll engine.
//!
//! - `quote` previews rate, accrual and levy for a schedule
//! - `funding` totals the treasury funding a set of streams needs
//! - `replay` runs a JSON operation script against an in-memory engine
//!
//! Results go to stdout as JSON; logs go to stderr.

mod replay;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use paystream_core::accrual::{earned, schedule, split_levy};
use paystream_core::constants::UNIT;
use paystream_core::types::{AccountId, Amount, StreamRecord, StreamState, Timestamp};
use paystream_engine::{EngineConfig, PayrollTreasury};

/// PayStream command-line tools.
#[derive(Parser, Debug)]
#[command(
    name = "paystream",
    version,
    about = "Continuous payroll streaming with exact settlement"
)]
struct Cli {
    /// Engine config file (TOML or JSON); PAYSTREAM_* variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Preview rate, accrual and levy for a schedule at an instant.
    Quote(QuoteArgs),
    /// Treasury funding required to open streams with these amounts.
    Funding(FundingArgs),
    /// Apply a JSON operation script and print the resulting ledger.
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct QuoteArgs {
    /// Total amount committed to the stream
    #[arg(long)]
    amount: Amount,

    /// Amounts are whole tokens (18 decimals) rather than base units
    #[arg(long)]
    tokens: bool,

    /// Schedule start (unix seconds or RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    start: Timestamp,

    /// Schedule end (unix seconds or RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    end: Timestamp,

    /// Observation instant; defaults to the schedule end
    #[arg(long, value_parser = parse_instant)]
    at: Option<Timestamp>,

    /// Levy in basis points; defaults to the configured default levy
    #[arg(long)]
    levy_bps: Option<u16>,

    /// Seconds spent paused and since resumed
    #[arg(long, default_value_t = 0)]
    paused: u64,
}

#[derive(Args, Debug)]
struct FundingArgs {
    /// Stream amounts
    #[arg(required = true)]
    amounts: Vec<Amount>,

    /// Amounts are whole tokens (18 decimals) rather than base units
    #[arg(long)]
    tokens: bool,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// Script file, or `-` for stdin
    script: PathBuf,

    /// Stop at the first failing operation
    #[arg(long)]
    strict: bool,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
struct Quote {
    rate_per_sec: Amount,
    remainder: Amount,
    duration: u64,
    at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    at_utc: Option<String>,
    earned: Amount,
    levy_bps: u16,
    net: Amount,
    levy: Amount,
}

#[derive(Serialize, Debug)]
struct Funding {
    streams: usize,
    required: Amount,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    let config = EngineConfig::load(cli.config.as_deref()).context("failed to load engine config")?;
    debug!(?config, "engine config loaded");

    match cli.command {
        Commands::Quote(args) => print_json(&quote(&args, &config)?),
        Commands::Funding(args) => print_json(&funding(&args)?),
        Commands::Replay(args) => {
            let text = if args.script.as_os_str() == "-" {
                std::io::read_to_string(std::io::stdin()).context("failed to read script from stdin")?
            } else {
                fs::read_to_string(&args.script)
                    .with_context(|| format!("failed to read {}", args.script.display()))?
            };
            let script = replay::parse(&text)?;
            info!(ops = script.ops.len(), strict = args.strict, "replaying script");
            print_json(&replay::run(&script, config, args.strict)?)
        }
    }
}

fn quote(args: &QuoteArgs, config: &EngineConfig) -> Result<Quote> {
    let amount = scale(args.amount, args.tokens)?;
    let (rate, remainder) = schedule(amount, args.start, args.end)?;
    let levy_bps = args.levy_bps.unwrap_or(config.default_levy_bps);
    if levy_bps > config.max_levy_bps {
        bail!("levy {levy_bps} bps exceeds the configured maximum {}", config.max_levy_bps);
    }

    let at = args.at.unwrap_or(args.end);
    let record = StreamRecord {
        payee: AccountId::ZERO,
        levy_bps,
        start_time: args.start,
        end_time: args.end,
        rate_per_sec: rate,
        deposited: amount,
        withdrawn: 0,
        remainder,
        full_term_rule: config.full_term_rule,
        state: StreamState::Active {
            total_paused: args.paused,
        },
    };
    let accrued = earned(&record, at);
    let split = split_levy(accrued, levy_bps)?;

    Ok(Quote {
        rate_per_sec: rate,
        remainder,
        duration: record.duration(),
        at,
        at_utc: to_utc(at),
        earned: accrued,
        levy_bps,
        net: split.net,
        levy: split.levy,
    })
}

fn funding(args: &FundingArgs) -> Result<Funding> {
    let amounts = args
        .amounts
        .iter()
        .map(|&a| scale(a, args.tokens))
        .collect::<Result<Vec<_>>>()?;
    let required = PayrollTreasury::required_funding(&amounts).context("funding total overflows")?;
    Ok(Funding {
        streams: amounts.len(),
        required,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn scale(amount: Amount, tokens: bool) -> Result<Amount> {
    if !tokens {
        return Ok(amount);
    }
    amount
        .checked_mul(UNIT)
        .with_context(|| format!("{amount} tokens overflows base units"))
}

/// Unix seconds, or an RFC 3339 date-time at or after the epoch.
fn parse_instant(s: &str) -> Result<Timestamp, String> {
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    let dt = DateTime::parse_from_rfc3339(s)
        .map_err(|e| format!("expected unix seconds or RFC 3339 ({e})"))?;
    u64::try_from(dt.timestamp()).map_err(|_| format!("{s} is before the unix epoch"))
}

fn to_utc(secs: Timestamp) -> Option<String> {
    let secs = i64::try_from(secs).ok()?;
    DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.to_rfc3339())
}

/// Initialize tracing on stderr with the given level and format.
///
/// `RUST_LOG` takes precedence over `level_str` when set. Pass
/// `format = "json"` for structured output.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
