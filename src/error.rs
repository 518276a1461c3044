//! Error types for the ladder
//!
//! The rating engine returns [`LadderError`] directly. Everything above it
//! (storage, service, configuration) propagates through `anyhow` so storage
//! failures reach the caller unchanged.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ladder scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LadderError {
    #[error("Invalid match outcome: player 1 score {score} is not one of 0, 0.5 or 1")]
    InvalidOutcome { score: f64 },

    #[error("Invalid match request: {reason}")]
    InvalidMatchRequest { reason: String },

    #[error("Invalid player: {reason}")]
    InvalidPlayer { reason: String },

    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("Match not found: {match_id}")]
    MatchNotFound { match_id: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Internal ladder error: {message}")]
    InternalError { message: String },
}
