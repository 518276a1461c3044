//! Common types used throughout the ladder

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = String;

/// Unique identifier for recorded matches
pub type MatchId = Uuid;

/// Integer skill rating, floor-clamped at 0 after every forward update
pub type Rating = i64;

/// Number of matches a player has completed
pub type ExperienceCount = u32;

/// K-factor applied to a single player in a single match
pub type AdjustmentRate = i64;

/// Result of a head-to-head match, seen from player 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchOutcome {
    Player1Wins,
    Player2Wins,
    Draw,
}

impl MatchOutcome {
    /// Continuous score credited to player 1 (1 = win, 0 = loss, 0.5 = draw)
    pub fn player1_score(self) -> f64 {
        match self {
            MatchOutcome::Player1Wins => 1.0,
            MatchOutcome::Player2Wins => 0.0,
            MatchOutcome::Draw => 0.5,
        }
    }

    /// Same outcome with the players swapped
    pub fn flipped(self) -> Self {
        match self {
            MatchOutcome::Player1Wins => MatchOutcome::Player2Wins,
            MatchOutcome::Player2Wins => MatchOutcome::Player1Wins,
            MatchOutcome::Draw => MatchOutcome::Draw,
        }
    }
}

impl std::fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchOutcome::Player1Wins => write!(f, "Player1Wins"),
            MatchOutcome::Player2Wins => write!(f, "Player2Wins"),
            MatchOutcome::Draw => write!(f, "Draw"),
        }
    }
}

/// Stored state of a ladder player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub rating: Rating,
    pub games_played: ExperienceCount,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub created_at: DateTime<Utc>,
}

impl PlayerRecord {
    /// Create a player with no match history
    pub fn new(id: impl Into<PlayerId>, first_name: impl Into<String>, rating: Rating) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: None,
            rating,
            games_played: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            created_at: Utc::now(),
        }
    }

    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

/// Request to register a new player on the ladder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub id: PlayerId,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Starting rating; the configured initial rating is used when absent
    #[serde(default)]
    pub rating: Option<Rating>,
}

/// Request to record a finished match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMatchRequest {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    /// Winner of the match, `None` for a draw
    #[serde(default)]
    pub winner_id: Option<PlayerId>,
}

/// Persisted record of one match, including everything needed to reverse it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: MatchId,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub winner_id: Option<PlayerId>,
    pub outcome: MatchOutcome,
    pub player1_rating_before: Rating,
    pub player2_rating_before: Rating,
    pub player1_rating_after: Rating,
    pub player2_rating_after: Rating,
    /// Raw rounded delta, never reduced by the floor clamp
    pub player1_delta: Rating,
    pub player2_delta: Rating,
    pub player1_rate: AdjustmentRate,
    pub player2_rate: AdjustmentRate,
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn involves(&self, player_id: &str) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }
}

/// Projected effect of one possible result on a player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedChange {
    pub delta: Rating,
    pub new_rating: Rating,
}

/// Win/loss projection for one side of a prospective match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPrediction {
    pub player_id: PlayerId,
    pub current_rating: Rating,
    pub games_played: ExperienceCount,
    pub adjustment_rate: AdjustmentRate,
    pub win_probability: f64,
    pub if_wins: ProjectedChange,
    pub if_loses: ProjectedChange,
}

/// Rating projections for a prospective match between two players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPrediction {
    pub player1: PlayerPrediction,
    pub player2: PlayerPrediction,
}

/// Rating movement applied to one player when a match is deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReversedChange {
    pub player_id: PlayerId,
    pub rating_before_reversal: Rating,
    pub rating_after_reversal: Rating,
    /// Negation of the recorded delta
    pub change: Rating,
}

/// Outcome of deleting a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReversal {
    pub match_id: MatchId,
    pub player1: ReversedChange,
    pub player2: ReversedChange,
}
