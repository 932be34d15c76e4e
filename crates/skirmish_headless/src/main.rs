//! Headless skirmish runner.
//!
//! Loads a map, pits two decision logics against each other and exits with
//! a code describing the result.
//!
//! # Usage
//!
//! ```bash
//! # Example logic on both sides, JSON summary on stdout
//! cargo run -p skirmish_headless -- --map maps/arena.ron
//!
//! # Custom rules, fixed seed, silent
//! cargo run -p skirmish_headless -- --map maps/arena.ron --rules rules.ron --seed 7 --renderer dummy
//! ```
//!
//! # Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | draw |
//! | 1 | blue wins |
//! | 2 | red wins |
//! | 11 | blue forfeits |
//! | 12 | red forfeits |
//! | 255 | setup or runtime error |

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skirmish_headless::{controllers, HandlerKind, Match, MatchConfig, RendererKind, SETUP_FAILURE_EXIT_CODE};

#[derive(Parser)]
#[command(name = "skirmish_headless")]
#[command(about = "Headless two-team battle runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Map file (RON)
    #[arg(short, long)]
    map: PathBuf,

    /// Rules file (RON); built-in rules when omitted
    #[arg(long)]
    rules: Option<PathBuf>,

    /// World offset seed; derived from the clock when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Declare a draw after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Blue team decision logic
    #[arg(long, value_enum, default_value = "example")]
    blue: HandlerKind,

    /// Red team decision logic
    #[arg(long, value_enum, default_value = "example")]
    red: HandlerKind,

    /// Presentation of the match
    #[arg(long, value_enum, default_value = "summary")]
    renderer: RendererKind,

    /// Progress line interval for the summary renderer, in rounds (0 = none)
    #[arg(long, default_value = "500")]
    every: u64,
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the summary.
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let config = MatchConfig {
        map: cli.map,
        rules: cli.rules,
        seed: cli.seed.unwrap_or_else(clock_seed),
        max_ticks: cli.max_ticks,
    };
    tracing::info!(
        blue = cli.blue.name(),
        red = cli.red.name(),
        seed = config.seed,
        "Setting up match"
    );

    let mut game = match Match::setup(&config, controllers(cli.blue, cli.red)) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("Failed to set up match: {}", e);
            std::process::exit(SETUP_FAILURE_EXIT_CODE);
        }
    };

    let mut renderer = cli.renderer.build(cli.every);
    match game.run(renderer.as_mut()) {
        Ok(report) => {
            eprintln!("Number of rounds: {}", report.rounds);
            std::process::exit(report.outcome.exit_code());
        }
        Err(e) => {
            eprintln!("Match aborted: {}", e);
            std::process::exit(SETUP_FAILURE_EXIT_CODE);
        }
    }
}
