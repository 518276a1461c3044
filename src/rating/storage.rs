//! Ladder storage interface and the in-memory implementation
//!
//! The storage collaborator owns all mutable state: player records and match
//! records. Writes that belong to one match (both players plus the match
//! record) go through a single call so implementations can make them atomic.

use crate::error::LadderError;
use crate::types::{MatchId, MatchRecord, PlayerId, PlayerRecord};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Trait for ladder storage operations
pub trait LadderStorage: Send + Sync {
    /// Check that the backing store is reachable
    fn ping(&self) -> crate::error::Result<()>;

    /// Get a player's record
    fn get_player(&self, player_id: &PlayerId) -> crate::error::Result<Option<PlayerRecord>>;

    /// Get records for multiple players; missing ids are left out
    fn get_players(
        &self,
        player_ids: &[PlayerId],
    ) -> crate::error::Result<HashMap<PlayerId, PlayerRecord>>;

    /// Insert or replace a player record
    fn store_player(&self, player: PlayerRecord) -> crate::error::Result<()>;

    /// Remove a player together with every match they took part in.
    ///
    /// Opponents keep their current ratings. Returns whether the player existed.
    fn remove_player(&self, player_id: &PlayerId) -> crate::error::Result<bool>;

    /// Get all players
    fn get_all_players(&self) -> crate::error::Result<Vec<PlayerRecord>>;

    /// Get total number of players
    fn get_player_count(&self) -> crate::error::Result<usize>;

    /// Get a single match record
    fn get_match(&self, match_id: &MatchId) -> crate::error::Result<Option<MatchRecord>>;

    /// All match records, newest first
    fn list_matches(&self) -> crate::error::Result<Vec<MatchRecord>>;

    /// Get total number of recorded matches
    fn get_match_count(&self) -> crate::error::Result<usize>;

    /// Store updated player records and a new match record atomically
    fn commit_match(
        &self,
        players: Vec<PlayerRecord>,
        record: MatchRecord,
    ) -> crate::error::Result<()>;

    /// Store restored player records and delete a match record atomically
    fn revert_match(
        &self,
        players: Vec<PlayerRecord>,
        match_id: &MatchId,
    ) -> crate::error::Result<()>;
}

#[derive(Debug, Default)]
struct LadderState {
    players: HashMap<PlayerId, PlayerRecord>,
    matches: HashMap<MatchId, MatchRecord>,
}

/// In-memory ladder storage; players and matches share one lock
#[derive(Debug, Default)]
pub struct InMemoryLadderStorage {
    state: RwLock<LadderState>,
}

impl InMemoryLadderStorage {
    /// Create empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage preloaded with players
    pub fn with_players(players: impl IntoIterator<Item = PlayerRecord>) -> Self {
        let state = LadderState {
            players: players
                .into_iter()
                .map(|player| (player.id.clone(), player))
                .collect(),
            matches: HashMap::new(),
        };

        Self {
            state: RwLock::new(state),
        }
    }

    fn read(&self) -> crate::error::Result<RwLockReadGuard<'_, LadderState>> {
        self.state.read().map_err(|_| {
            LadderError::StorageError {
                message: "Failed to acquire ladder read lock".to_string(),
            }
            .into()
        })
    }

    fn write(&self) -> crate::error::Result<RwLockWriteGuard<'_, LadderState>> {
        self.state.write().map_err(|_| {
            LadderError::StorageError {
                message: "Failed to acquire ladder write lock".to_string(),
            }
            .into()
        })
    }
}

fn ensure_known(state: &LadderState, players: &[PlayerRecord]) -> crate::error::Result<()> {
    for player in players {
        if !state.players.contains_key(&player.id) {
            return Err(LadderError::PlayerNotFound {
                player_id: player.id.clone(),
            }
            .into());
        }
    }
    Ok(())
}

impl LadderStorage for InMemoryLadderStorage {
    fn ping(&self) -> crate::error::Result<()> {
        self.read().map(|_| ())
    }

    fn get_player(&self, player_id: &PlayerId) -> crate::error::Result<Option<PlayerRecord>> {
        Ok(self.read()?.players.get(player_id).cloned())
    }

    fn get_players(
        &self,
        player_ids: &[PlayerId],
    ) -> crate::error::Result<HashMap<PlayerId, PlayerRecord>> {
        let state = self.read()?;

        let mut result = HashMap::new();
        for player_id in player_ids {
            if let Some(player) = state.players.get(player_id) {
                result.insert(player_id.clone(), player.clone());
            }
        }

        Ok(result)
    }

    fn store_player(&self, player: PlayerRecord) -> crate::error::Result<()> {
        self.write()?.players.insert(player.id.clone(), player);
        Ok(())
    }

    fn remove_player(&self, player_id: &PlayerId) -> crate::error::Result<bool> {
        let mut state = self.write()?;

        if state.players.remove(player_id).is_none() {
            return Ok(false);
        }

        let before = state.matches.len();
        state.matches.retain(|_, record| !record.involves(player_id));
        debug!(
            "Removed player '{}' and {} of their matches",
            player_id,
            before - state.matches.len()
        );

        Ok(true)
    }

    fn get_all_players(&self) -> crate::error::Result<Vec<PlayerRecord>> {
        Ok(self.read()?.players.values().cloned().collect())
    }

    fn get_player_count(&self) -> crate::error::Result<usize> {
        Ok(self.read()?.players.len())
    }

    fn get_match(&self, match_id: &MatchId) -> crate::error::Result<Option<MatchRecord>> {
        Ok(self.read()?.matches.get(match_id).cloned())
    }

    fn list_matches(&self) -> crate::error::Result<Vec<MatchRecord>> {
        let mut matches: Vec<MatchRecord> = self.read()?.matches.values().cloned().collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matches)
    }

    fn get_match_count(&self) -> crate::error::Result<usize> {
        Ok(self.read()?.matches.len())
    }

    fn commit_match(
        &self,
        players: Vec<PlayerRecord>,
        record: MatchRecord,
    ) -> crate::error::Result<()> {
        let mut state = self.write()?;

        ensure_known(&state, &players)?;
        if state.matches.contains_key(&record.id) {
            return Err(LadderError::StorageError {
                message: format!("Match {} already exists", record.id),
            }
            .into());
        }

        for player in players {
            state.players.insert(player.id.clone(), player);
        }
        state.matches.insert(record.id, record);

        Ok(())
    }

    fn revert_match(
        &self,
        players: Vec<PlayerRecord>,
        match_id: &MatchId,
    ) -> crate::error::Result<()> {
        let mut state = self.write()?;

        if !state.matches.contains_key(match_id) {
            return Err(LadderError::MatchNotFound {
                match_id: match_id.to_string(),
            }
            .into());
        }
        ensure_known(&state, &players)?;

        for player in players {
            state.players.insert(player.id.clone(), player);
        }
        state.matches.remove(match_id);

        Ok(())
    }
}
