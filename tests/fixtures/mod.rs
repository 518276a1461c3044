//! Test fixtures and mock implementations for integration testing

#![allow(dead_code)]

use mockall::mock;
use paddle_ladder::error::Result;
use paddle_ladder::rating::{EloConfig, InMemoryLadderStorage, LadderStorage, RatingEngine};
use paddle_ladder::types::{
    ExperienceCount, MatchId, MatchRecord, PlayerId, PlayerRecord, Rating, RecordMatchRequest,
};
use paddle_ladder::LadderService;
use std::collections::HashMap;
use std::sync::Arc;

mock! {
    pub Storage {}

    impl LadderStorage for Storage {
        fn ping(&self) -> Result<()>;
        fn get_player(&self, player_id: &PlayerId) -> Result<Option<PlayerRecord>>;
        fn get_players(&self, player_ids: &[PlayerId]) -> Result<HashMap<PlayerId, PlayerRecord>>;
        fn store_player(&self, player: PlayerRecord) -> Result<()>;
        fn remove_player(&self, player_id: &PlayerId) -> Result<bool>;
        fn get_all_players(&self) -> Result<Vec<PlayerRecord>>;
        fn get_player_count(&self) -> Result<usize>;
        fn get_match(&self, match_id: &MatchId) -> Result<Option<MatchRecord>>;
        fn list_matches(&self) -> Result<Vec<MatchRecord>>;
        fn get_match_count(&self) -> Result<usize>;
        fn commit_match(&self, players: Vec<PlayerRecord>, record: MatchRecord) -> Result<()>;
        fn revert_match(&self, players: Vec<PlayerRecord>, match_id: &MatchId) -> Result<()>;
    }
}

/// Player with a given rating and match count
pub fn player(id: &str, rating: Rating, games_played: ExperienceCount) -> PlayerRecord {
    let mut record = PlayerRecord::new(id, id.to_uppercase(), rating);
    record.games_played = games_played;
    record
}

/// Ladder service over in-memory storage preloaded with `players`
pub fn seeded_service(players: Vec<PlayerRecord>) -> LadderService {
    LadderService::new(
        RatingEngine::new(EloConfig::default()).unwrap(),
        Arc::new(InMemoryLadderStorage::with_players(players)),
    )
}

/// Ladder service over an arbitrary storage collaborator
pub fn service_with_storage(storage: impl LadderStorage + 'static) -> LadderService {
    LadderService::new(RatingEngine::default(), Arc::new(storage))
}

pub fn win(player1: &str, player2: &str, winner: &str) -> RecordMatchRequest {
    RecordMatchRequest {
        player1_id: player1.to_string(),
        player2_id: player2.to_string(),
        winner_id: Some(winner.to_string()),
    }
}

pub fn draw(player1: &str, player2: &str) -> RecordMatchRequest {
    RecordMatchRequest {
        player1_id: player1.to_string(),
        player2_id: player2.to_string(),
        winner_id: None,
    }
}
