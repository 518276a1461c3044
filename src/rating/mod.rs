//! Elo rating engine and ladder storage
//!
//! This module provides the pure rating engine with its tier policy, and the
//! storage interface the ladder service persists through.

pub mod engine;
pub mod storage;

// Re-export commonly used types
pub use engine::{
    expected_score, reverse_match, EloConfig, MatchResult, PlayerUpdate, RateTier, RatingEngine,
};
pub use storage::{InMemoryLadderStorage, LadderStorage};
