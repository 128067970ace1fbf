use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use super::*;
use crate::journal::InputPayload;
use crate::types::Direction;

fn random_input(rng: &mut ChaCha8Rng) -> InputPayload {
    match rng.next_u64() % 10 {
        0 => InputPayload::Interact,
        1 => InputPayload::AdvanceClock { ms: 100 + rng.next_u64() % 400 },
        roll => InputPayload::Move { direction: Direction::ALL[(roll % 4) as usize] },
    }
}

fn record_run(seed: u64, steps: usize) -> (Game, InputJournal) {
    let config = SessionConfig::default();
    let mut game = Game::new(seed, config).unwrap();
    let mut journal = InputJournal::new(seed).with_content_hash(game.level().fingerprint());
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0xfeed);
    for _ in 0..steps {
        let payload = random_input(&mut rng);
        game.apply_input(&payload).unwrap();
        journal.append(payload);
    }
    (game, journal)
}

#[test]
fn replay_matches_recorded_run() {
    let (game, journal) = record_run(777, 300);
    let result = replay_to_end(&SessionConfig::default(), &journal).unwrap();
    assert_eq!(result, ReplayResult::of(&game));
}

#[test]
fn replay_with_restart_matches_recorded_run() {
    let (mut game, mut journal) = record_run(1234, 80);
    if !game.is_paused() {
        game.restart_level().unwrap();
        journal.append(InputPayload::Restart);
    }
    let result = replay_to_end(&SessionConfig::default(), &journal).unwrap();
    assert_eq!(result.final_snapshot_hash, game.snapshot_hash());
    assert_eq!(result.final_score, game.score());
}

#[test]
fn different_seeds_diverge() {
    let (first, _) = record_run(1, 40);
    let (second, _) = record_run(2, 40);
    assert_ne!(first.snapshot_hash(), second.snapshot_hash());
}

#[test]
fn content_mismatch_is_reported() {
    let (_, journal) = record_run(5, 3);
    let tampered = InputJournal { content_hash: journal.content_hash ^ 1, ..journal };
    let result = replay_to_end(&SessionConfig::default(), &tampered);
    assert!(matches!(result, Err(ReplayError::ContentMismatch { .. })), "got: {result:?}");
}
