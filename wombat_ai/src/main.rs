use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wombat_ai::{run, Difficulty};

/// Plays one networked game of Wombats & Jackals.
#[derive(Parser)]
struct Args {
    /// Address of the game server
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Code of the game to join
    #[arg(short, long)]
    code: String,

    #[arg(short, long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, difficulty = %args.difficulty);
    let mut bot = args.difficulty.bot(StdRng::seed_from_u64(seed));

    match run(&mut bot, args.addr.as_str(), &args.code)? {
        Some(winner) => info!(%winner, "Finished"),
        None => info!("Abandoned"),
    }
    Ok(())
}

fn initialize_logging(level: LevelFilter) {
    // Logs go to stderr, the terminal may be shared with other output
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
