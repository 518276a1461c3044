//! Rating system configuration

use crate::rating::engine::EloConfig;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Rating section of the application configuration
pub type RatingConfig = EloConfig;

fn parse_override<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow!("Invalid {} value: {}", key, value))
}

/// Override rating settings from variables resolved through `lookup`
pub fn apply_env_overrides<F>(config: &mut RatingConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(initial) = lookup("INITIAL_RATING") {
        config.initial_rating = parse_override("INITIAL_RATING", &initial)?;
    }
    if let Some(games) = lookup("PROVISIONAL_GAMES") {
        config.provisional_games = parse_override("PROVISIONAL_GAMES", &games)?;
    }
    if let Some(rate) = lookup("PROVISIONAL_RATE") {
        config.provisional_rate = parse_override("PROVISIONAL_RATE", &rate)?;
    }
    if let Some(rate) = lookup("TOP_RATE") {
        config.top_rate = parse_override("TOP_RATE", &rate)?;
    }
    Ok(())
}
