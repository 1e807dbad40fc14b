//! randwalk CLI
//!
//! Runs a distributed random walk, either as a whole topology in this
//! process (`--transport local`) or as one rank of a multi-process run
//! started by an external launcher (`--transport tcp`).

use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use randwalk_env::{Rank, SystemContext, Transport, WalkContext};
use randwalk_sim::{
    AggregateResult, RankOutcome, RankRunner, SeededContext, SimError, SimulationConfig,
    StdoutReporter, TcpTransport,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE: &str = "Usage: randwalk <domain_half_width> <max_steps> [OPTIONS]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TransportKind {
    /// All ranks as tasks in this process
    Local,
    /// This process is one rank; rank 0 listens, walkers connect
    Tcp,
}

/// Distributed random-walk simulation
#[derive(Parser, Debug)]
#[command(name = "randwalk", version)]
#[command(
    about = "Walker ranks run bounded random walks and report to one coordinator",
    long_about = None
)]
#[command(allow_negative_numbers = true)]
struct Args {
    /// Walk ends once |position| exceeds this value
    domain_half_width: i64,

    /// Step budget per walker
    max_steps: i64,

    /// Number of walker ranks (local transport only)
    #[arg(short, long, default_value = "4")]
    workers: u32,

    /// Master seed for reproducible walks (0 = seed from the clock)
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// How ranks are laid out
    #[arg(short, long, value_enum, default_value = "local")]
    transport: TransportKind,

    /// This process's rank (tcp transport)
    #[arg(long, env = "RANDWALK_RANK")]
    rank: Option<u32>,

    /// Number of ranks in the run, coordinator included (tcp transport)
    #[arg(long, env = "RANDWALK_WORLD_SIZE")]
    world_size: Option<u32>,

    /// Coordinator listen/connect address (tcp transport)
    #[arg(long, env = "RANDWALK_COORDINATOR", default_value = "127.0.0.1:7070")]
    coordinator: String,

    /// Give up if no walker reports within this many milliseconds
    #[arg(long)]
    collect_timeout_ms: Option<u64>,

    /// JSON summary of the aggregate on stdout
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Decides whether this process prints the usage message.
///
/// Under a launcher only the coordinator rank reports usage. The rank comes
/// from a `--rank` flag if one is present (it wins over the environment, as
/// in clap), then from `RANDWALK_RANK`. Without either, the process is
/// assumed to be the coordinator.
fn reports_usage(argv: &[String], env_rank: Option<&str>) -> bool {
    let flag_rank = argv.iter().enumerate().rev().find_map(|(i, arg)| {
        match arg.strip_prefix("--rank") {
            Some(rest) if rest.starts_with('=') => Some(rest[1..].to_string()),
            Some("") => Some(argv.get(i + 1).cloned().unwrap_or_default()),
            _ => None,
        }
    });

    match flag_rank.as_deref().or(env_rank) {
        Some(rank) => rank.trim() == "0",
        None => true,
    }
}

/// Parses arguments; bad usage exits with status 1.
fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let argv: Vec<String> = std::env::args().collect();
            let env_rank = std::env::var("RANDWALK_RANK").ok();
            if reports_usage(&argv, env_rank.as_deref()) {
                eprintln!("error: {}", e.kind().as_str().unwrap_or("invalid arguments"));
                eprintln!("{}", USAGE);
            }
            std::process::exit(1);
        }
    }
}

fn print_summary(config: &SimulationConfig, seed: u64, aggregate: &AggregateResult) {
    let summary = serde_json::json!({
        "config": config,
        "seed": seed,
        "aggregate": aggregate,
    });

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to encode summary: {}", e),
    }
}

async fn run(args: Args) -> Result<(), SimError> {
    let ctx: Arc<dyn WalkContext> = if args.seed == 0 {
        SystemContext::shared()
    } else {
        SeededContext::shared(args.seed)
    };
    let collect_timeout = args.collect_timeout_ms.map(Duration::from_millis);
    let reporter = Arc::new(StdoutReporter);

    match args.transport {
        TransportKind::Local => {
            let config =
                SimulationConfig::new(args.domain_half_width, args.max_steps, args.workers);
            let result = RankRunner::new(config)
                .with_collect_timeout(collect_timeout)
                .run_local(Arc::clone(&ctx), reporter)
                .await?;

            if args.json {
                print_summary(&config, ctx.seed(), &result.aggregate);
            }
        }
        TransportKind::Tcp => {
            let (rank, world_size) = match (args.rank, args.world_size) {
                (Some(rank), Some(world_size)) => (Rank(rank), world_size),
                _ => {
                    return Err(SimError::InvalidTopology(
                        "tcp transport needs --rank and --world-size \
                         (or RANDWALK_RANK / RANDWALK_WORLD_SIZE)"
                            .to_string(),
                    ))
                }
            };

            let transport = if rank.is_coordinator() {
                let transport = TcpTransport::listen(args.coordinator.as_str(), world_size).await?;
                info!(addr = ?transport.local_addr(), world_size, "coordinator listening");
                transport
            } else {
                TcpTransport::connect(args.coordinator.as_str(), rank, world_size).await?
            };

            let config = SimulationConfig::for_world(
                args.domain_half_width,
                args.max_steps,
                transport.world_size(),
            )?;
            let outcome = RankRunner::new(config)
                .with_collect_timeout(collect_timeout)
                .run_rank(&transport, ctx.as_ref(), reporter.as_ref())
                .await?;

            if let (true, RankOutcome::Coordinator(aggregate)) = (args.json, &outcome) {
                print_summary(&config, ctx.seed(), aggregate);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = parse_args();

    // Initialize logging (stderr; stdout carries the report lines)
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("randwalk v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args).await {
        error!("Run failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_missing_positional_is_usage_error() {
        assert!(Args::try_parse_from(["randwalk", "1"]).is_err());
        assert!(Args::try_parse_from(["randwalk"]).is_err());
    }

    #[test]
    fn test_extra_positional_is_usage_error() {
        assert!(Args::try_parse_from(["randwalk", "1", "2", "3"]).is_err());
    }

    #[test]
    fn test_non_integer_positional_is_usage_error() {
        assert!(Args::try_parse_from(["randwalk", "wide", "2"]).is_err());
        assert!(Args::try_parse_from(["randwalk", "1", "2.5"]).is_err());
    }

    #[test]
    fn test_negative_and_zero_values_accepted() {
        let args = Args::try_parse_from(["randwalk", "-3", "0"]).unwrap();
        assert_eq!((args.domain_half_width, args.max_steps), (-3, 0));

        let args = Args::try_parse_from(["randwalk", "-9223372036854775808", "-1"]).unwrap();
        assert_eq!((args.domain_half_width, args.max_steps), (i64::MIN, -1));
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["randwalk", "5", "100", "--transport", "local"]).unwrap();
        assert_eq!(args.workers, 4);
        assert_eq!(args.seed, 0);
        assert_eq!(args.transport, TransportKind::Local);
        assert!(args.collect_timeout_ms.is_none());
    }

    #[test]
    fn test_only_coordinator_reports_usage() {
        assert!(reports_usage(&argv(&["randwalk", "1"]), None));
        assert!(reports_usage(&argv(&["randwalk", "1"]), Some("0")));
        assert!(!reports_usage(&argv(&["randwalk", "1"]), Some("3")));
    }

    #[test]
    fn test_rank_flag_decides_usage_reporting() {
        let walker = argv(&["randwalk", "--transport", "tcp", "--rank", "2", "1"]);
        assert!(!reports_usage(&walker, None));
        assert!(!reports_usage(&walker, Some("0")));

        let walker_eq = argv(&["randwalk", "--rank=2", "1"]);
        assert!(!reports_usage(&walker_eq, None));

        let coordinator = argv(&["randwalk", "--rank", "0", "1"]);
        assert!(reports_usage(&coordinator, Some("2")));
    }
}
