use std::collections::BTreeSet;

use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use zeta_core::{Direction, Game, GameError, InputPayload, SessionConfig, SessionStatus, TileKind};

fn random_input(rng: &mut ChaCha8Rng) -> InputPayload {
    match rng.next_u64() % 20 {
        0 => InputPayload::Restart,
        1..=2 => InputPayload::Interact,
        3..=4 => InputPayload::AdvanceClock { ms: rng.next_u64() % 1_200 },
        roll => InputPayload::Move { direction: Direction::ALL[(roll % 4) as usize] },
    }
}

fn check_invariants(game: &Game, seed: u64) -> Result<(), String> {
    let grid = &game.level().grid;
    let player_tile = grid.tile_at(game.player());
    if player_tile == TileKind::Wall || player_tile.is_dispenser() {
        return Err(format!("player inside {player_tile:?} on seed {seed}"));
    }

    let mut occupied = BTreeSet::new();
    for cube in game.cubes().into_iter().filter(|cube| cube.is_active()) {
        if !occupied.insert(cube.position) {
            return Err(format!("two active cubes share {:?} on seed {seed}", cube.position));
        }
        if cube.position == game.player() {
            return Err(format!("cube {:?} sits under the player on seed {seed}", cube.id));
        }
        if grid.tile_at(cube.position) == TileKind::Wall {
            return Err(format!("cube {:?} inside a wall on seed {seed}", cube.id));
        }
        if !cube.kind.admits(cube.value) {
            return Err(format!("cube {:?} is {:?} with value {} on seed {seed}", cube.id, cube.kind, cube.value));
        }
    }
    Ok(())
}

fn run_session(seed: u64, input_seed: u64, steps: usize) -> Result<(), String> {
    let mut game = Game::new(seed, SessionConfig::default()).map_err(|error| error.to_string())?;
    let mut rng = ChaCha8Rng::seed_from_u64(input_seed);
    let mut level_index = game.level_index();
    let mut clock = game.clock_ms();

    for _ in 0..steps {
        let payload = random_input(&mut rng);
        match game.apply_input(&payload) {
            Ok(()) => {}
            Err(GameError::Paused) if payload == InputPayload::Restart => {}
            Err(error) => return Err(format!("{payload:?} rejected on seed {seed}: {error}")),
        }

        if game.level_index() < level_index {
            return Err(format!("level index went backwards on seed {seed}"));
        }
        if game.clock_ms() < clock {
            return Err(format!("clock went backwards on seed {seed}"));
        }
        level_index = game.level_index();
        clock = game.clock_ms();
        if game.status() != SessionStatus::Playing {
            continue;
        }
        check_invariants(&game, seed)?;
    }
    Ok(())
}

#[test]
fn random_sessions_preserve_board_invariants() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(24));
    let seeds = (any::<u64>(), any::<u64>());

    runner
        .run(&seeds, |(seed, input_seed)| {
            run_session(seed, input_seed, 1_500).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("random sessions should preserve board invariants");
}
