use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Result, bail, ensure};
use clap::Parser;
use game_core::{Direction, Game, GameError, InputPayload, SessionStatus, TileKind};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing::info;
use zeta_tools::{init_tracing, load_session_config};

#[derive(Parser)]
#[command(author, version, about = "Drives a session with random inputs and checks board invariants", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 10_000)]
    steps: u32,
    /// Optional TOML session config
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn random_input(rng: &mut ChaCha8Rng) -> InputPayload {
    match rng.next_u64() % 24 {
        0 => InputPayload::Restart,
        1..=3 => InputPayload::Interact,
        4..=6 => InputPayload::AdvanceClock { ms: rng.next_u64() % 1_500 },
        roll => InputPayload::Move { direction: Direction::ALL[(roll % 4) as usize] },
    }
}

fn check_board(game: &Game) -> Result<()> {
    let grid = &game.level().grid;
    let tile = grid.tile_at(game.player());
    ensure!(tile != TileKind::Wall && !tile.is_dispenser(), "player inside {tile:?} at {:?}", game.player());

    let mut occupied = BTreeSet::new();
    for cube in game.cubes().into_iter().filter(|cube| cube.is_active()) {
        ensure!(occupied.insert(cube.position), "two active cubes share {:?}", cube.position);
        ensure!(cube.position != game.player(), "cube {:?} under the player", cube.id);
        ensure!(grid.tile_at(cube.position) != TileKind::Wall, "cube {:?} inside a wall", cube.id);
        ensure!(cube.kind.admits(cube.value), "cube {:?} has value {} as {:?}", cube.id, cube.value, cube.kind);
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_session_config(args.config.as_deref())?;

    println!("Starting fuzz harness on seed {} for {} steps...", args.seed, args.steps);
    let mut game = Game::new(args.seed, config)?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    for step in 0..args.steps {
        let payload = random_input(&mut rng);
        match game.apply_input(&payload) {
            Ok(()) | Err(GameError::Paused) => {}
            Err(error) => bail!("step {step}: {payload:?} failed: {error}"),
        }
        if game.status() == SessionStatus::Finished {
            info!(step, score = game.score(), "run finished");
            break;
        }
        if game.status() == SessionStatus::Playing {
            check_board(&game).map_err(|error| error.context(format!("invariant broken at step {step}")))?;
        }
    }

    println!(
        "Fuzzing completed: level {}, score {}, clock {} ms, hash {:#018x}",
        game.level_index() + 1,
        game.score(),
        game.clock_ms(),
        game.snapshot_hash()
    );
    Ok(())
}
