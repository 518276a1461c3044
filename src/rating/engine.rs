//! Elo rating engine with tiered adjustment rates
//!
//! The engine is pure: it never touches storage, keeps no state between
//! calls, and is safe to share across threads. Callers hand it a consistent
//! snapshot of both players and persist whatever it returns.
//!
//! Deltas are rounded half away from zero (`f64::round`). The delta reported
//! for each player is the raw rounded value; the floor clamp at 0 only affects
//! the reported new rating, so a recorded delta can always be fed back into
//! [`reverse_match`].

use crate::error::LadderError;
use crate::types::{AdjustmentRate, ExperienceCount, MatchOutcome, Rating};
use serde::{Deserialize, Serialize};

/// Lowest rating a forward update may produce
pub const RATING_FLOOR: Rating = 0;

/// Rating gap that shifts the expected score by a factor of ten
const LOGISTIC_SCALE: f64 = 400.0;

/// Adjustment rate for every rating strictly below `below`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTier {
    pub below: Rating,
    pub rate: AdjustmentRate,
}

/// Tier policy and defaults for the Elo engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EloConfig {
    /// Rating given to newly registered players
    pub initial_rating: Rating,
    /// Players with fewer completed matches than this are provisional
    pub provisional_games: ExperienceCount,
    /// Rate used for provisional players regardless of rating
    pub provisional_rate: AdjustmentRate,
    /// Established-player tiers, ascending by threshold
    pub tiers: Vec<RateTier>,
    /// Rate used at or above the last tier threshold
    pub top_rate: AdjustmentRate,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            initial_rating: 1000,
            provisional_games: 20,
            provisional_rate: 40,
            tiers: vec![
                RateTier {
                    below: 2000,
                    rate: 32,
                },
                RateTier {
                    below: 2400,
                    rate: 24,
                },
            ],
            top_rate: 16,
        }
    }
}

impl EloConfig {
    /// Single-rate configuration with no provisional period
    pub fn flat(rate: AdjustmentRate) -> Self {
        Self {
            provisional_games: 0,
            provisional_rate: rate,
            tiers: Vec::new(),
            top_rate: rate,
            ..Self::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), LadderError> {
        if self.initial_rating < RATING_FLOOR {
            return Err(LadderError::ConfigurationError {
                message: format!(
                    "Initial rating {} is below the rating floor",
                    self.initial_rating
                ),
            });
        }

        if self.provisional_rate <= 0 || self.top_rate <= 0 {
            return Err(LadderError::ConfigurationError {
                message: "Adjustment rates must be positive".to_string(),
            });
        }

        for tier in &self.tiers {
            if tier.rate <= 0 {
                return Err(LadderError::ConfigurationError {
                    message: format!("Tier below {} has a non-positive rate", tier.below),
                });
            }
        }

        if self.tiers.windows(2).any(|pair| pair[0].below >= pair[1].below) {
            return Err(LadderError::ConfigurationError {
                message: "Tier thresholds must be strictly ascending".to_string(),
            });
        }

        Ok(())
    }
}

/// Effect of one match on one player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    pub rating_before: Rating,
    /// Rating after the update, floor-clamped
    pub new_rating: Rating,
    /// Raw rounded delta, not reduced by the clamp
    pub delta: Rating,
    pub adjustment_rate: AdjustmentRate,
    pub expected_score: f64,
}

impl PlayerUpdate {
    /// Whether the floor clamp swallowed part of the delta
    pub fn was_clamped(&self) -> bool {
        self.rating_before.saturating_add(self.delta) < RATING_FLOOR
    }
}

/// Result of applying one match to both players
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub player1: PlayerUpdate,
    pub player2: PlayerUpdate,
}

/// Logistic estimate of the score `rating_a` takes against `rating_b`
pub fn expected_score(rating_a: Rating, rating_b: Rating) -> f64 {
    let gap = rating_b as f64 - rating_a as f64;
    1.0 / (1.0 + 10f64.powf(gap / LOGISTIC_SCALE))
}

/// Recover a pre-match rating from the stored rating and the recorded delta.
///
/// Exact whenever the forward update did not clamp; a clamped rating cannot be
/// restored because the clamp discarded information.
pub fn reverse_match(current_rating: Rating, recorded_delta: Rating) -> Rating {
    current_rating.saturating_sub(recorded_delta).max(RATING_FLOOR)
}

fn validate_score(player1_score: f64) -> Result<f64, LadderError> {
    if player1_score == 0.0 || player1_score == 0.5 || player1_score == 1.0 {
        Ok(player1_score)
    } else {
        Err(LadderError::InvalidOutcome {
            score: player1_score,
        })
    }
}

/// Round `rate * surprise` half away from zero
fn scaled_delta(rate: AdjustmentRate, surprise: f64) -> Rating {
    (rate as f64 * surprise).round() as Rating
}

/// Elo engine configured with a tier policy
#[derive(Debug, Clone)]
pub struct RatingEngine {
    config: EloConfig,
}

impl Default for RatingEngine {
    fn default() -> Self {
        Self {
            config: EloConfig::default(),
        }
    }
}

impl RatingEngine {
    /// Create a new engine, rejecting invalid tier policies
    pub fn new(config: EloConfig) -> Result<Self, LadderError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Rating given to newly registered players
    pub fn initial_rating(&self) -> Rating {
        self.config.initial_rating
    }

    /// Pick the K-factor for a player from their own rating and experience
    pub fn select_adjustment_rate(
        &self,
        rating: Rating,
        experience: ExperienceCount,
    ) -> AdjustmentRate {
        if experience < self.config.provisional_games {
            return self.config.provisional_rate;
        }

        self.config
            .tiers
            .iter()
            .find(|tier| rating < tier.below)
            .map(|tier| tier.rate)
            .unwrap_or(self.config.top_rate)
    }

    /// Apply a match with player 1's score given as 0, 0.5 or 1.
    ///
    /// Any other score, NaN included, is rejected with
    /// [`LadderError::InvalidOutcome`].
    pub fn apply_match(
        &self,
        player1_rating: Rating,
        player2_rating: Rating,
        player1_score: f64,
        player1_experience: ExperienceCount,
        player2_experience: ExperienceCount,
    ) -> Result<MatchResult, LadderError> {
        let score = validate_score(player1_score)?;
        Ok(self.compute(
            player1_rating,
            player2_rating,
            score,
            player1_experience,
            player2_experience,
        ))
    }

    /// Apply a match described by a [`MatchOutcome`]; cannot fail
    pub fn apply_outcome(
        &self,
        player1_rating: Rating,
        player2_rating: Rating,
        outcome: MatchOutcome,
        player1_experience: ExperienceCount,
        player2_experience: ExperienceCount,
    ) -> MatchResult {
        self.compute(
            player1_rating,
            player2_rating,
            outcome.player1_score(),
            player1_experience,
            player2_experience,
        )
    }

    fn compute(
        &self,
        player1_rating: Rating,
        player2_rating: Rating,
        score: f64,
        player1_experience: ExperienceCount,
        player2_experience: ExperienceCount,
    ) -> MatchResult {
        let rate1 = self.select_adjustment_rate(player1_rating, player1_experience);
        let rate2 = self.select_adjustment_rate(player2_rating, player2_experience);

        let expected1 = expected_score(player1_rating, player2_rating);
        let expected2 = expected_score(player2_rating, player1_rating);

        let delta1 = scaled_delta(rate1, score - expected1);
        let delta2 = scaled_delta(rate2, (1.0 - score) - expected2);

        MatchResult {
            player1: PlayerUpdate {
                rating_before: player1_rating,
                new_rating: player1_rating.saturating_add(delta1).max(RATING_FLOOR),
                delta: delta1,
                adjustment_rate: rate1,
                expected_score: expected1,
            },
            player2: PlayerUpdate {
                rating_before: player2_rating,
                new_rating: player2_rating.saturating_add(delta2).max(RATING_FLOOR),
                delta: delta2,
                adjustment_rate: rate2,
                expected_score: expected2,
            },
        }
    }
}
