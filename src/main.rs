//! Command-line entry point for the paddle ladder
//!
//! Exposes the rating engine directly (rate, reverse, predict) and replays
//! recorded ladder files through the in-memory ladder service.

use anyhow::Result;
use clap::{Parser, Subcommand};
use paddle_ladder::config::AppConfig;
use paddle_ladder::ladder::{replay_ladder, LadderFile};
use paddle_ladder::rating::{expected_score, reverse_match, InMemoryLadderStorage, RatingEngine};
use paddle_ladder::types::{ExperienceCount, MatchOutcome, Rating};
use paddle_ladder::LadderService;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Paddle Ladder - Elo ratings for head-to-head matches
#[derive(Parser)]
#[command(
    name = "paddle-ladder",
    version,
    about = "Elo ladder with tiered K-factors and exact match reversal"
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        global = true,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, global = true, help = "Enable debug mode with verbose logging")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply one match result to two ratings
    Rate {
        #[arg(long, allow_negative_numbers = true)]
        rating1: Rating,
        #[arg(long, allow_negative_numbers = true)]
        rating2: Rating,
        /// Player 1 score: 1 (win), 0.5 (draw) or 0 (loss)
        #[arg(long)]
        score: f64,
        #[arg(long, default_value_t = 0)]
        games1: ExperienceCount,
        #[arg(long, default_value_t = 0)]
        games2: ExperienceCount,
    },
    /// Recover a pre-match rating from a stored rating and its recorded delta
    Reverse {
        #[arg(long, allow_negative_numbers = true)]
        rating: Rating,
        #[arg(long, allow_negative_numbers = true)]
        delta: Rating,
    },
    /// Show both players' rating changes for either result
    Predict {
        #[arg(long, allow_negative_numbers = true)]
        rating1: Rating,
        #[arg(long, allow_negative_numbers = true)]
        rating2: Rating,
        #[arg(long, default_value_t = 0)]
        games1: ExperienceCount,
        #[arg(long, default_value_t = 0)]
        games2: ExperienceCount,
    },
    /// Replay a JSON ladder file and print the final standings
    Replay {
        /// Ladder file with players, matches and deleted match indices
        file: PathBuf,
    },
    /// Validate configuration and exit
    Check,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load configuration from file or environment and apply CLI overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(config_path) => AppConfig::from_file(config_path)?,
        None => AppConfig::from_env()?,
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    paddle_ladder::config::validate_config(&config)?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(command: Command, config: AppConfig) -> Result<()> {
    let engine = RatingEngine::new(config.rating.clone())?;

    match command {
        Command::Rate {
            rating1,
            rating2,
            score,
            games1,
            games2,
        } => {
            let result = engine.apply_match(rating1, rating2, score, games1, games2)?;
            print_json(&result)
        }
        Command::Reverse { rating, delta } => print_json(&json!({
            "currentRating": rating,
            "recordedDelta": delta,
            "preMatchRating": reverse_match(rating, delta),
        })),
        Command::Predict {
            rating1,
            rating2,
            games1,
            games2,
        } => {
            let if_player1_wins =
                engine.apply_outcome(rating1, rating2, MatchOutcome::Player1Wins, games1, games2);
            let if_player2_wins =
                engine.apply_outcome(rating1, rating2, MatchOutcome::Player2Wins, games1, games2);
            let if_draw =
                engine.apply_outcome(rating1, rating2, MatchOutcome::Draw, games1, games2);

            print_json(&json!({
                "player1WinProbability": expected_score(rating1, rating2),
                "ifPlayer1Wins": if_player1_wins,
                "ifPlayer2Wins": if_player2_wins,
                "ifDraw": if_draw,
            }))
        }
        Command::Replay { file } => {
            let ladder = LadderFile::from_path(&file)?;
            debug!(
                "Loaded ladder file {} with {} players and {} matches",
                file.display(),
                ladder.players.len(),
                ladder.matches.len()
            );

            let service = LadderService::new(engine, Arc::new(InMemoryLadderStorage::new()));
            let summary = replay_ladder(&service, ladder)?;
            print_json(&summary)
        }
        Command::Check => {
            info!("Configuration validation successful");
            print_json(&config)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    debug!(
        "Starting {} v{} with rating config {:?}",
        config.service.name,
        paddle_ladder::VERSION,
        config.rating
    );

    run(args.command, config)
}
