use std::io::BufRead;
use std::time::Duration;

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wombat::{ServerEvent, Side, StalemateRule};
use wombat_ai::Difficulty;
use wombat_server::{parse_move, Config, LocalMatch};

/// Play Wombats & Jackals against the computer in the terminal.
#[derive(Parser)]
struct Args {
    #[arg(short, long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,

    /// The side you play, "wombat" or "jackal"
    #[arg(short, long, default_value = "wombat")]
    side: Side,

    /// How long the computer waits before answering
    #[arg(long, default_value_t = 1000)]
    ai_delay_ms: u64,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// What happens when the side to move cannot move: "continue", "pass" or "forfeit"
    #[arg(long, default_value = "continue")]
    stalemate: StalemateRule,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "warn")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let bot = args.difficulty.bot(StdRng::seed_from_u64(rng.gen()));
    let config = Config {
        rng,
        stalemate: args.stalemate,
    };
    let mut game = LocalMatch::new(config, bot, args.side)?;
    let delay = Duration::from_millis(args.ai_delay_ms);

    println!("You play the {} side. Enter moves as 'row,col row,col [move|dig]'.", args.side);
    let mut lines = std::io::stdin().lock().lines();
    loop {
        println!("\n{}", game.presenter().render());
        if game.is_finished() {
            break;
        }

        if game.computer_to_move() {
            std::thread::sleep(delay);
            match game.play_computer() {
                (Some(mv), _) => {
                    debug!(%mv, "Computer moved");
                    println!("The computer plays {}", mv);
                }
                (None, _) => {
                    println!("The computer has no move left.");
                    break;
                }
            }
            continue;
        }

        let Some(line) = lines.next() else {
            break;
        };
        let mv = match parse_move(&line?) {
            Ok(mv) => mv,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        for event in game.submit(mv) {
            if let ServerEvent::InvalidMove { message } = event {
                debug!(%message, "Move rejected");
            }
        }
    }
    Ok(())
}

fn initialize_logging(level: LevelFilter) {
    // The board goes to stdout
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
