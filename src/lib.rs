//! Paddle Ladder - Elo ratings for head-to-head matches
//!
//! This crate provides a pure Elo rating engine with tiered K-factors and
//! exact match reversal, plus the storage interface and ladder service that
//! record and delete matches around it.

pub mod config;
pub mod error;
pub mod ladder;
pub mod rating;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LadderError, Result};
pub use types::*;

// Re-export key components
pub use ladder::LadderService;
pub use rating::{InMemoryLadderStorage, LadderStorage, RatingEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
