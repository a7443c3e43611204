use std::net::TcpListener;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wombat::StalemateRule;
use wombat_server::{serve, Config};

/// Hosts Wombats & Jackals games over TCP, one JSON event per line.
#[derive(Parser)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// RNG seed, used for game codes and ids
    #[arg(long)]
    seed: Option<u64>,

    /// What happens when the side to move cannot move: "continue", "pass" or "forfeit"
    #[arg(long, default_value = "continue")]
    stalemate: StalemateRule,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, stalemate = ?args.stalemate);
    let config = Config {
        rng: StdRng::seed_from_u64(seed),
        stalemate: args.stalemate,
    };

    let listener = TcpListener::bind((args.host.as_str(), args.port))?;
    serve(listener, config)
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().event_format(format))
        .with(filter)
        .init();
}
