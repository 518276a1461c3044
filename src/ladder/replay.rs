//! Replay a recorded ladder from a JSON file
//!
//! A ladder file lists players and matches in the order they were played,
//! plus the indices of matches that were later deleted. Replaying it through a
//! [`LadderService`] reproduces the final standings.

use crate::error::{LadderError, Result};
use crate::ladder::service::LadderService;
use crate::types::{NewPlayer, PlayerRecord, RecordMatchRequest};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Contents of a ladder file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderFile {
    pub players: Vec<NewPlayer>,
    #[serde(default)]
    pub matches: Vec<RecordMatchRequest>,
    /// Zero-based indices into `matches` of results deleted afterwards
    #[serde(default)]
    pub deleted: Vec<usize>,
}

impl LadderFile {
    /// Load a ladder file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ladder file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse ladder file {}", path.display()))
    }
}

/// Final state after a replay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySummary {
    pub matches_recorded: usize,
    pub matches_deleted: usize,
    /// Players ordered by rating, highest first
    pub standings: Vec<PlayerRecord>,
}

/// Register every player, record every match, then delete the listed matches
pub fn replay_ladder(service: &LadderService, file: LadderFile) -> Result<ReplaySummary> {
    for player in file.players {
        service.register_player(player)?;
    }

    let mut match_ids = Vec::with_capacity(file.matches.len());
    for (index, request) in file.matches.into_iter().enumerate() {
        let record = service
            .record_match(request)
            .with_context(|| format!("Match #{} could not be recorded", index))?;
        match_ids.push(record.id);
    }

    // Newest first, so each reversal sees the ratings its match produced
    let mut deleted = file.deleted;
    deleted.sort_unstable();
    deleted.dedup();
    for &index in deleted.iter().rev() {
        let match_id = match_ids
            .get(index)
            .ok_or_else(|| LadderError::InvalidMatchRequest {
                reason: format!("Deleted index {} is out of range", index),
            })?;
        service.delete_match(match_id)?;
    }

    let summary = ReplaySummary {
        matches_recorded: match_ids.len(),
        matches_deleted: deleted.len(),
        standings: service.list_players()?,
    };
    info!(
        "Replayed {} matches ({} deleted) across {} players",
        summary.matches_recorded,
        summary.matches_deleted,
        summary.standings.len()
    );

    Ok(summary)
}
