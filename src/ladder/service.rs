//! Ladder service: the handler-facing side of the rating engine
//!
//! Loads both players from storage, runs the engine, and hands the new
//! ratings and the match record back to storage in one call. Deleting a
//! match reverses both recorded deltas the same way.

use crate::error::{LadderError, Result};
use crate::rating::engine::{reverse_match, PlayerUpdate, RatingEngine};
use crate::rating::storage::LadderStorage;
use crate::types::{
    MatchId, MatchOutcome, MatchPrediction, MatchRecord, MatchReversal, NewPlayer,
    PlayerId, PlayerPrediction, PlayerRecord, ProjectedChange, RecordMatchRequest,
    ReversedChange,
};
use crate::utils::{current_timestamp, generate_match_id, normalize_name};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Ladder-wide counters for status reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderStats {
    pub player_count: usize,
    pub match_count: usize,
}

/// Coordinates the rating engine with a storage collaborator
pub struct LadderService {
    engine: RatingEngine,
    storage: Arc<dyn LadderStorage>,
    /// Serializes every read-compute-write sequence
    update_lock: Mutex<()>,
}

impl LadderService {
    /// Create a new ladder service
    pub fn new(engine: RatingEngine, storage: Arc<dyn LadderStorage>) -> Self {
        Self {
            engine,
            storage,
            update_lock: Mutex::new(()),
        }
    }

    fn lock_updates(&self) -> Result<MutexGuard<'_, ()>> {
        self.update_lock.lock().map_err(|_| {
            LadderError::InternalError {
                message: "Failed to acquire ladder update lock".to_string(),
            }
            .into()
        })
    }

    /// Register a new player at the configured initial rating unless one is given
    pub fn register_player(&self, request: NewPlayer) -> Result<PlayerRecord> {
        let id = normalize_name(&request.id).ok_or_else(|| LadderError::InvalidPlayer {
            reason: "Player id is required".to_string(),
        })?;
        // Ids are looked up verbatim, so they are never trimmed
        if id != request.id {
            return Err(LadderError::InvalidPlayer {
                reason: format!("Player id '{}' has surrounding whitespace", request.id),
            }
            .into());
        }
        let first_name =
            normalize_name(&request.first_name).ok_or_else(|| LadderError::InvalidPlayer {
                reason: "First name is required".to_string(),
            })?;
        let rating = request.rating.unwrap_or(self.engine.initial_rating());
        if rating < 0 {
            return Err(LadderError::InvalidPlayer {
                reason: format!("Starting rating {} is negative", rating),
            }
            .into());
        }

        let _guard = self.lock_updates()?;

        if self.storage.get_player(&id)?.is_some() {
            return Err(LadderError::InvalidPlayer {
                reason: format!("Player '{}' is already registered", id),
            }
            .into());
        }

        let mut player = PlayerRecord::new(id, first_name, rating);
        player.last_name = request.last_name.as_deref().and_then(normalize_name);

        self.storage.store_player(player.clone())?;
        info!(
            "Registered player '{}' ({}) at rating {}",
            player.id,
            player.full_name(),
            player.rating
        );

        Ok(player)
    }

    pub fn get_player(&self, player_id: &str) -> Result<PlayerRecord> {
        self.storage
            .get_player(&player_id.to_string())?
            .ok_or_else(|| {
                LadderError::PlayerNotFound {
                    player_id: player_id.to_string(),
                }
                .into()
            })
    }

    /// All players, highest rating first
    pub fn list_players(&self) -> Result<Vec<PlayerRecord>> {
        let mut players = self.storage.get_all_players()?;
        players.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| a.id.cmp(&b.id)));
        Ok(players)
    }

    /// Remove a player and their match records without touching opponents' ratings
    pub fn remove_player(&self, player_id: &str) -> Result<()> {
        let _guard = self.lock_updates()?;

        if !self.storage.remove_player(&player_id.to_string())? {
            return Err(LadderError::PlayerNotFound {
                player_id: player_id.to_string(),
            }
            .into());
        }

        warn!(
            "Removed player '{}'; opponents keep ratings earned against them",
            player_id
        );
        Ok(())
    }

    /// Verify storage is reachable and report ladder size
    pub fn status(&self) -> Result<LadderStats> {
        self.storage.ping()?;
        Ok(LadderStats {
            player_count: self.storage.get_player_count()?,
            match_count: self.storage.get_match_count()?,
        })
    }

    fn load_pair(
        &self,
        player1_id: &PlayerId,
        player2_id: &PlayerId,
    ) -> Result<(PlayerRecord, PlayerRecord)> {
        let mut players = self
            .storage
            .get_players(&[player1_id.clone(), player2_id.clone()])?;

        let mut take = |player_id: &PlayerId| {
            players.remove(player_id).ok_or_else(|| LadderError::PlayerNotFound {
                player_id: player_id.clone(),
            })
        };

        let player1 = take(player1_id)?;
        let player2 = take(player2_id)?;
        Ok((player1, player2))
    }

    /// Record a finished match and update both players
    pub fn record_match(&self, request: RecordMatchRequest) -> Result<MatchRecord> {
        ensure_distinct(&request.player1_id, &request.player2_id)?;
        let outcome = resolve_outcome(&request)?;

        let _guard = self.lock_updates()?;
        let (mut player1, mut player2) = self.load_pair(&request.player1_id, &request.player2_id)?;

        let result = self.engine.apply_outcome(
            player1.rating,
            player2.rating,
            outcome,
            player1.games_played,
            player2.games_played,
        );

        let record = MatchRecord {
            id: generate_match_id(),
            player1_id: player1.id.clone(),
            player2_id: player2.id.clone(),
            winner_id: request.winner_id.clone(),
            outcome,
            player1_rating_before: result.player1.rating_before,
            player2_rating_before: result.player2.rating_before,
            player1_rating_after: result.player1.new_rating,
            player2_rating_after: result.player2.new_rating,
            player1_delta: result.player1.delta,
            player2_delta: result.player2.delta,
            player1_rate: result.player1.adjustment_rate,
            player2_rate: result.player2.adjustment_rate,
            created_at: current_timestamp(),
        };

        credit(&mut player1, &result.player1, outcome);
        credit(&mut player2, &result.player2, outcome.flipped());

        for (player, update) in [(&player1, &result.player1), (&player2, &result.player2)] {
            if update.was_clamped() {
                debug!(
                    "Rating of '{}' clamped at floor; recorded delta {} kept for reversal",
                    player.id, update.delta
                );
            }
        }

        self.storage.commit_match(vec![player1, player2], record.clone())?;

        info!(
            "Recorded match {} - '{}' {:+} ({} -> {}), '{}' {:+} ({} -> {}), outcome: {}",
            record.id,
            record.player1_id,
            record.player1_delta,
            record.player1_rating_before,
            record.player1_rating_after,
            record.player2_id,
            record.player2_delta,
            record.player2_rating_before,
            record.player2_rating_after,
            record.outcome
        );

        Ok(record)
    }

    /// Project both players' rating changes for either result, without writing
    pub fn predict_match(&self, player1_id: &str, player2_id: &str) -> Result<MatchPrediction> {
        let player1_id = player1_id.to_string();
        let player2_id = player2_id.to_string();
        ensure_distinct(&player1_id, &player2_id)?;

        let (player1, player2) = self.load_pair(&player1_id, &player2_id)?;

        let player1_wins = self.engine.apply_outcome(
            player1.rating,
            player2.rating,
            MatchOutcome::Player1Wins,
            player1.games_played,
            player2.games_played,
        );
        let player2_wins = self.engine.apply_outcome(
            player1.rating,
            player2.rating,
            MatchOutcome::Player2Wins,
            player1.games_played,
            player2.games_played,
        );

        Ok(MatchPrediction {
            player1: PlayerPrediction {
                player_id: player1.id,
                current_rating: player1.rating,
                games_played: player1.games_played,
                adjustment_rate: player1_wins.player1.adjustment_rate,
                win_probability: player1_wins.player1.expected_score,
                if_wins: projected(&player1_wins.player1),
                if_loses: projected(&player2_wins.player1),
            },
            player2: PlayerPrediction {
                player_id: player2.id,
                current_rating: player2.rating,
                games_played: player2.games_played,
                adjustment_rate: player2_wins.player2.adjustment_rate,
                win_probability: player2_wins.player2.expected_score,
                if_wins: projected(&player2_wins.player2),
                if_loses: projected(&player1_wins.player2),
            },
        })
    }

    /// Delete a match and reverse its recorded deltas
    pub fn delete_match(&self, match_id: &MatchId) -> Result<MatchReversal> {
        let _guard = self.lock_updates()?;

        let record = self
            .storage
            .get_match(match_id)?
            .ok_or_else(|| LadderError::MatchNotFound {
                match_id: match_id.to_string(),
            })?;
        let (mut player1, mut player2) = self.load_pair(&record.player1_id, &record.player2_id)?;

        let reversal = MatchReversal {
            match_id: record.id,
            player1: reversed(&player1, record.player1_delta),
            player2: reversed(&player2, record.player2_delta),
        };

        debit(&mut player1, reversal.player1.rating_after_reversal, record.outcome);
        debit(
            &mut player2,
            reversal.player2.rating_after_reversal,
            record.outcome.flipped(),
        );

        self.storage.revert_match(vec![player1, player2], match_id)?;

        info!(
            "Deleted match {} - '{}' {} -> {}, '{}' {} -> {}",
            record.id,
            reversal.player1.player_id,
            reversal.player1.rating_before_reversal,
            reversal.player1.rating_after_reversal,
            reversal.player2.player_id,
            reversal.player2.rating_before_reversal,
            reversal.player2.rating_after_reversal
        );

        Ok(reversal)
    }

    pub fn get_match(&self, match_id: &MatchId) -> Result<MatchRecord> {
        self.storage.get_match(match_id)?.ok_or_else(|| {
            LadderError::MatchNotFound {
                match_id: match_id.to_string(),
            }
            .into()
        })
    }

    /// All recorded matches, newest first
    pub fn list_matches(&self) -> Result<Vec<MatchRecord>> {
        self.storage.list_matches()
    }
}

fn ensure_distinct(player1_id: &PlayerId, player2_id: &PlayerId) -> Result<()> {
    if player1_id == player2_id {
        return Err(LadderError::InvalidMatchRequest {
            reason: "player1Id and player2Id must be different".to_string(),
        }
        .into());
    }
    Ok(())
}

fn resolve_outcome(request: &RecordMatchRequest) -> Result<MatchOutcome> {
    match request.winner_id.as_ref() {
        None => Ok(MatchOutcome::Draw),
        Some(winner) if *winner == request.player1_id => Ok(MatchOutcome::Player1Wins),
        Some(winner) if *winner == request.player2_id => Ok(MatchOutcome::Player2Wins),
        Some(winner) => Err(LadderError::InvalidMatchRequest {
            reason: format!("winnerId '{}' must be either player1Id or player2Id", winner),
        }
        .into()),
    }
}

fn projected(update: &PlayerUpdate) -> ProjectedChange {
    ProjectedChange {
        delta: update.delta,
        new_rating: update.new_rating,
    }
}

fn reversed(player: &PlayerRecord, recorded_delta: i64) -> ReversedChange {
    ReversedChange {
        player_id: player.id.clone(),
        rating_before_reversal: player.rating,
        rating_after_reversal: reverse_match(player.rating, recorded_delta),
        change: -recorded_delta,
    }
}

/// Apply a forward update; `outcome` is seen from this player's side
fn credit(player: &mut PlayerRecord, update: &PlayerUpdate, outcome: MatchOutcome) {
    player.rating = update.new_rating;
    player.games_played = player.games_played.saturating_add(1);
    match outcome {
        MatchOutcome::Player1Wins => player.wins = player.wins.saturating_add(1),
        MatchOutcome::Player2Wins => player.losses = player.losses.saturating_add(1),
        MatchOutcome::Draw => player.draws = player.draws.saturating_add(1),
    }
}

/// Undo a forward update; `outcome` is seen from this player's side
fn debit(player: &mut PlayerRecord, restored_rating: i64, outcome: MatchOutcome) {
    player.rating = restored_rating;
    player.games_played = player.games_played.saturating_sub(1);
    match outcome {
        MatchOutcome::Player1Wins => player.wins = player.wins.saturating_sub(1),
        MatchOutcome::Player2Wins => player.losses = player.losses.saturating_sub(1),
        MatchOutcome::Draw => player.draws = player.draws.saturating_sub(1),
    }
}
