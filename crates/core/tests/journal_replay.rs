use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tempfile::tempdir;
use zeta_core::journal_file::{JournalWriter, load_journal_from_file};
use zeta_core::{Direction, Game, InputPayload, ReplayResult, SessionConfig, replay_to_end};

fn scripted_input(rng: &mut ChaCha8Rng) -> InputPayload {
    match rng.next_u64() % 8 {
        0 => InputPayload::Interact,
        1 => InputPayload::AdvanceClock { ms: 250 },
        roll => InputPayload::Move { direction: Direction::ALL[(roll % 4) as usize] },
    }
}

#[test]
fn recorded_file_replays_to_the_same_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.jsonl");
    let seed = 2024;

    let mut game = Game::new(seed, SessionConfig::default()).unwrap();
    let mut writer = JournalWriter::create(&path, seed, "test", game.level().fingerprint()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    for _ in 0..400 {
        let payload = scripted_input(&mut rng);
        game.apply_input(&payload).unwrap();
        writer.append(game.clock_ms(), &payload).unwrap();
    }
    drop(writer);

    let loaded = load_journal_from_file(&path).unwrap();
    assert_eq!(loaded.journal.inputs.len(), 400);
    let result = replay_to_end(&SessionConfig::default(), &loaded.journal).unwrap();
    assert_eq!(result, ReplayResult::of(&game));
    assert_eq!(loaded.clock_stamps.last().copied(), Some(game.clock_ms()));
}

#[test]
fn resumed_recording_replays_across_both_halves() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("resumed.jsonl");
    let seed = 31;

    let mut game = Game::new(seed, SessionConfig::default()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut writer = JournalWriter::create(&path, seed, "test", 0).unwrap();
    for _ in 0..50 {
        let payload = scripted_input(&mut rng);
        game.apply_input(&payload).unwrap();
        writer.append(game.clock_ms(), &payload).unwrap();
    }
    drop(writer);

    let loaded = load_journal_from_file(&path).unwrap();
    let mut writer = JournalWriter::resume(&path, loaded.last_digest, loaded.next_seq).unwrap();
    for _ in 0..50 {
        let payload = scripted_input(&mut rng);
        game.apply_input(&payload).unwrap();
        writer.append(game.clock_ms(), &payload).unwrap();
    }
    drop(writer);

    let reloaded = load_journal_from_file(&path).unwrap();
    assert_eq!(reloaded.next_seq, 100);
    let result = replay_to_end(&SessionConfig::default(), &reloaded.journal).unwrap();
    assert_eq!(result.final_snapshot_hash, game.snapshot_hash());
}
