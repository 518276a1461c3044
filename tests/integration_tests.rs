//! Integration tests for the paddle ladder
//!
//! These tests drive the ladder service end to end:
//! - recording, predicting and deleting matches
//! - provisional to established rate transitions
//! - floor clamping and lossy reversal
//! - storage error propagation

mod fixtures;

use anyhow::anyhow;
use paddle_ladder::error::LadderError;
use paddle_ladder::types::{MatchOutcome, NewPlayer, PlayerRecord};
use std::collections::HashMap;
use std::thread::sleep;
use std::time::Duration;

use fixtures::{draw, player, seeded_service, service_with_storage, win, MockStorage};

fn ladder_error(err: &anyhow::Error) -> Option<&LadderError> {
    err.downcast_ref::<LadderError>()
}

#[test]
fn test_complete_ladder_workflow() {
    let service = seeded_service(vec![]);

    for (id, first_name) in [("ana", "Ana"), ("ben", "Ben"), ("cho", "Cho")] {
        service
            .register_player(NewPlayer {
                id: id.to_string(),
                first_name: first_name.to_string(),
                ..Default::default()
            })
            .unwrap();
    }

    // Step 1: two novices at the initial rating
    let first = service.record_match(win("ana", "ben", "ana")).unwrap();
    assert_eq!((first.player1_delta, first.player2_delta), (20, -20));
    assert_eq!((first.player1_rate, first.player2_rate), (40, 40));

    sleep(Duration::from_millis(2));

    // Step 2: the loser draws against a fresh player
    let second = service.record_match(draw("ben", "cho")).unwrap();
    assert_eq!(second.outcome, MatchOutcome::Draw);
    assert!(second.player1_delta > 0, "lower-rated side gains from a draw");
    assert_eq!(second.player1_delta, -second.player2_delta);

    // Step 3: standings and history
    let standings = service.list_players().unwrap();
    assert_eq!(standings[0].id, "ana");
    assert_eq!(standings[0].rating, 1020);

    let history = service.list_matches().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id);
    assert_eq!(history[1].id, first.id);

    let ben = service.get_player("ben").unwrap();
    assert_eq!((ben.games_played, ben.wins, ben.losses, ben.draws), (2, 0, 1, 1));
}

#[test]
fn test_rate_changes_after_provisional_period() {
    let service = seeded_service(vec![player("ana", 1500, 0), player("ben", 1500, 0)]);

    for round in 0..20 {
        let winner = if round % 2 == 0 { "ana" } else { "ben" };
        let record = service.record_match(win("ana", "ben", winner)).unwrap();
        assert_eq!(record.player1_rate, 40);
    }

    let record = service.record_match(win("ana", "ben", "ana")).unwrap();
    assert_eq!(record.player1_rate, 32);
    assert_eq!(record.player2_rate, 32);
}

#[test]
fn test_established_tiers_apply_per_player() {
    let service = seeded_service(vec![player("elite", 2500, 40), player("club", 1000, 40)]);

    let upset = service.record_match(win("elite", "club", "club")).unwrap();

    assert_eq!(upset.player1_rate, 16);
    assert_eq!(upset.player2_rate, 32);
    assert_eq!(upset.player1_delta, -16);
    assert_eq!(upset.player2_delta, 32);
    assert_eq!(service.get_player("elite").unwrap().rating, 2484);
    assert_eq!(service.get_player("club").unwrap().rating, 1032);
}

#[test]
fn test_delete_older_match_first() {
    let service = seeded_service(vec![player("ana", 1000, 30), player("ben", 1000, 30)]);

    let older = service.record_match(win("ana", "ben", "ana")).unwrap();
    let newer = service.record_match(win("ana", "ben", "ana")).unwrap();

    let reversal = service.delete_match(&older.id).unwrap();
    assert_eq!(reversal.player1.change, -older.player1_delta);

    let ana = service.get_player("ana").unwrap();
    let ben = service.get_player("ben").unwrap();
    assert_eq!(ana.rating, 1000 + newer.player1_delta);
    assert_eq!(ben.rating, 1000 + newer.player2_delta);
    assert_eq!((ana.games_played, ana.wins), (31, 1));
    assert_eq!((ben.games_played, ben.losses), (31, 1));

    service.delete_match(&newer.id).unwrap();
    assert_eq!(service.get_player("ana").unwrap().rating, 1000);
    assert_eq!(service.get_player("ben").unwrap().rating, 1000);
    assert!(service.list_matches().unwrap().is_empty());
}

#[test]
fn test_floor_clamp_makes_reversal_lossy() {
    let service = seeded_service(vec![player("low", 5, 0), player("peer", 5, 0)]);

    let record = service.record_match(win("low", "peer", "peer")).unwrap();
    assert_eq!(record.player1_delta, -20);
    assert_eq!(record.player1_rating_after, 0);
    assert_eq!(record.player2_rating_after, 25);

    let reversal = service.delete_match(&record.id).unwrap();

    // The winner is restored exactly; the clamped loser is not
    assert_eq!(reversal.player2.rating_after_reversal, 5);
    assert_eq!(reversal.player1.rating_after_reversal, 20);
}

#[test]
fn test_deleting_twice_fails() {
    let service = seeded_service(vec![player("ana", 1000, 0), player("ben", 1000, 0)]);
    let record = service.record_match(win("ana", "ben", "ben")).unwrap();

    service.delete_match(&record.id).unwrap();
    let err = service.delete_match(&record.id).unwrap_err();

    assert!(matches!(
        ladder_error(&err),
        Some(LadderError::MatchNotFound { .. })
    ));
    assert_eq!(service.get_player("ana").unwrap().games_played, 0);
}

#[test]
fn test_remove_player_keeps_opponent_rating() {
    let service = seeded_service(vec![player("ana", 1000, 0), player("ben", 1000, 0)]);
    service.record_match(win("ana", "ben", "ana")).unwrap();

    service.remove_player("ben").unwrap();

    assert!(service.list_matches().unwrap().is_empty());
    assert_eq!(service.get_player("ana").unwrap().rating, 1020);
    assert!(matches!(
        ladder_error(&service.get_player("ben").unwrap_err()),
        Some(LadderError::PlayerNotFound { .. })
    ));
    assert!(service.remove_player("ben").is_err());
}

#[test]
fn test_predict_matches_recorded_result() {
    let service = seeded_service(vec![player("ana", 1720, 25), player("ben", 1480, 8)]);

    let prediction = service.predict_match("ana", "ben").unwrap();
    assert_eq!(prediction.player1.adjustment_rate, 32);
    assert_eq!(prediction.player2.adjustment_rate, 40);
    assert!(
        (prediction.player1.win_probability + prediction.player2.win_probability - 1.0).abs()
            < 1e-9
    );

    let record = service.record_match(win("ana", "ben", "ben")).unwrap();
    assert_eq!(record.player1_delta, prediction.player1.if_loses.delta);
    assert_eq!(record.player2_delta, prediction.player2.if_wins.delta);
    assert_eq!(
        record.player2_rating_after,
        prediction.player2.if_wins.new_rating
    );
}

#[test]
fn test_predict_unknown_player() {
    let service = seeded_service(vec![player("ana", 1000, 0)]);

    let err = service.predict_match("ana", "ghost").unwrap_err();
    assert!(matches!(
        ladder_error(&err),
        Some(LadderError::PlayerNotFound { player_id }) if player_id == "ghost"
    ));
}

#[test]
fn test_match_record_json_shape() {
    let service = seeded_service(vec![player("ana", 1000, 0), player("ben", 1000, 0)]);
    let record = service.record_match(win("ana", "ben", "ana")).unwrap();

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["player1Delta"], 20);
    assert_eq!(value["player2RatingAfter"], 980);
    assert_eq!(value["winnerId"], "ana");
    assert_eq!(value["outcome"], "player1Wins");
}

#[test]
fn test_storage_read_failure_propagates() {
    let mut storage = MockStorage::new();
    storage.expect_get_players().times(1).returning(|_| {
        Err(LadderError::StorageError {
            message: "connection reset".to_string(),
        }
        .into())
    });
    storage.expect_commit_match().times(0);

    let service = service_with_storage(storage);
    let err = service.record_match(win("ana", "ben", "ana")).unwrap_err();

    assert!(matches!(
        ladder_error(&err),
        Some(LadderError::StorageError { .. })
    ));
}

#[test]
fn test_storage_commit_failure_propagates() {
    let mut storage = MockStorage::new();
    storage.expect_get_players().returning(|ids| {
        Ok(ids
            .iter()
            .map(|id| (id.clone(), PlayerRecord::new(id.clone(), id.clone(), 1000)))
            .collect::<HashMap<_, _>>())
    });
    storage
        .expect_commit_match()
        .times(1)
        .withf(|players, record| {
            players.len() == 2 && record.player1_delta == 20 && record.player2_delta == -20
        })
        .returning(|_, _| Err(anyhow!("disk full")));

    let service = service_with_storage(storage);
    let err = service.record_match(win("ana", "ben", "ana")).unwrap_err();

    assert_eq!(err.to_string(), "disk full");
}

#[test]
fn test_status_reports_unreachable_storage() {
    let mut storage = MockStorage::new();
    storage
        .expect_ping()
        .returning(|| Err(anyhow!("database unavailable")));

    let service = service_with_storage(storage);
    assert!(service.status().is_err());
}

#[test]
fn test_status_counts_without_loading_matches() {
    let mut storage = MockStorage::new();
    storage.expect_ping().returning(|| Ok(()));
    storage.expect_get_player_count().returning(|| Ok(3));
    storage.expect_get_match_count().times(1).returning(|| Ok(7));
    storage.expect_list_matches().times(0);

    let service = service_with_storage(storage);
    let stats = service.status().unwrap();

    assert_eq!((stats.player_count, stats.match_count), (3, 7));
}

#[test]
fn test_padded_player_id_is_rejected() {
    let service = seeded_service(vec![player("bob", 1000, 0)]);

    let err = service
        .register_player(NewPlayer {
            id: " alice ".to_string(),
            first_name: "Alice".to_string(),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(
        ladder_error(&err),
        Some(LadderError::InvalidPlayer { .. })
    ));

    // Nothing was stored under either spelling
    assert!(service.get_player("alice").is_err());
    assert!(service.record_match(win(" alice ", "bob", " alice ")).is_err());
    assert_eq!(service.list_players().unwrap().len(), 1);
}
