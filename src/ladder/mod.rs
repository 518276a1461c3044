//! Ladder service layer
//!
//! This module wires the rating engine to a storage collaborator and exposes
//! the operations a request handler needs: registering players, recording,
//! predicting and deleting matches.

pub mod replay;
pub mod service;

pub use replay::{replay_ladder, LadderFile, ReplaySummary};
pub use service::{LadderService, LadderStats};
