use super::*;
use crate::level::LevelData;
use crate::levels::LEVEL_COUNT;
use crate::mapgen::build_template;
use crate::progression::{
    Condition, DOOR_OPEN_BONUS, LevelRules, MAIN_GATE, PHASE_BONUS, PhasePolicy, PhaseRule, WinRule,
};
use crate::puzzle::{AbsoluteLink, Synthesizer};
use crate::types::{CubeKind, CubeStatus, TileKind};

const START: Pos = Pos::new(10, 10);

fn room() -> LevelData {
    let mut level = LevelData::bare("test room", build_template(1), START);
    level.rules = LevelRules::new(PhaseRule::new(PhasePolicy::Ratchet), WinRule::AllCubesCleared);
    level
}

fn start(level: LevelData) -> Game {
    Game::from_level(3, SessionConfig::default(), 0, level).expect("fixture level is valid")
}

fn walk(game: &mut Game, moves: &[Direction]) {
    for &direction in moves {
        assert_eq!(game.apply_move(direction), MoveOutcome::Walked, "walking {direction:?} from {:?}", game.player());
    }
}

#[test]
fn walls_block_and_floor_walks() {
    let mut level = room();
    level.player_start = Pos::new(1, 1);
    let mut game = start(level);
    assert_eq!(game.apply_move(Direction::Up), MoveOutcome::Blocked);
    assert_eq!(game.apply_move(Direction::Left), MoveOutcome::Blocked);
    assert_eq!(game.apply_move(Direction::Right), MoveOutcome::Walked);
    assert_eq!(game.player(), Pos::new(1, 2));
}

#[test]
fn pushing_moves_cube_and_player() {
    let mut level = room();
    level.cubes.push(Cube::new(1, 3, START.offset(0, 1)));
    let mut game = start(level);

    assert_eq!(game.apply_move(Direction::Right), MoveOutcome::Pushed { cube: CubeId(1) });
    assert_eq!(game.player(), START.offset(0, 1));
    assert_eq!(game.cube(CubeId(1)).map(|cube| cube.position), Some(START.offset(0, 2)));
}

#[test]
fn cube_against_wall_does_not_move() {
    let mut level = room();
    level.player_start = Pos::new(10, 17);
    level.cubes.push(Cube::new(1, 3, Pos::new(10, 18)));
    let mut game = start(level);

    assert_eq!(game.apply_move(Direction::Right), MoveOutcome::Blocked);
    assert_eq!(game.player(), Pos::new(10, 17));
}

#[test]
fn opposite_cubes_neutralize_and_evaporate() {
    let mut level = room();
    level.allows_neutralization = true;
    level.cubes.push(Cube::new(1, 2, START.offset(0, 1)));
    level.cubes.push(Cube::new(2, -2, START.offset(0, 2)));
    let mut game = start(level);

    let outcome = game.apply_move(Direction::Right);
    assert_eq!(outcome, MoveOutcome::Neutralized { cubes: [CubeId(1), CubeId(2)], score: 200 });
    assert_eq!(game.player(), START.offset(0, 1));
    assert_eq!(game.score(), 200);
    assert!(game.cubes().iter().all(|cube| cube.status == CubeStatus::Evaporating));

    game.advance_clock(299).unwrap();
    assert_eq!(game.cubes().len(), 2);
    game.advance_clock(1).unwrap();
    assert!(game.cubes().is_empty());

    // Resolving again is a no-op.
    game.advance_clock(1_000).unwrap();
    assert_eq!(game.score(), 200);
}

#[test]
fn neutralization_score_saturates() {
    let mut level = room();
    level.allows_neutralization = true;
    level.cubes.push(Cube::new(1, 1_000_000, START.offset(0, 1)));
    level.cubes.push(Cube::new(2, -1_000_000, START.offset(0, 2)));
    let mut game = start(level);
    game.score = u32::MAX - 50;

    let outcome = game.apply_move(Direction::Right);
    assert_eq!(outcome, MoveOutcome::Neutralized { cubes: [CubeId(1), CubeId(2)], score: 100_000_000 });
    assert_eq!(game.score(), u32::MAX);
}

#[test]
fn neutralization_needs_permission_and_a_zero_sum() {
    let mut forbidden = room();
    forbidden.cubes.push(Cube::new(1, 2, START.offset(0, 1)));
    forbidden.cubes.push(Cube::new(2, -2, START.offset(0, 2)));
    assert_eq!(start(forbidden).apply_move(Direction::Right), MoveOutcome::Blocked);

    let mut uneven = room();
    uneven.allows_neutralization = true;
    uneven.cubes.push(Cube::new(1, 2, START.offset(0, 1)));
    uneven.cubes.push(Cube::new(2, -3, START.offset(0, 2)));
    assert_eq!(start(uneven).apply_move(Direction::Right), MoveOutcome::Blocked);
}

#[test]
fn fixed_zero_cubes_cannot_be_pushed() {
    let mut level = room();
    level.cubes.push(Cube::new(1, 0, START.offset(-1, 0)));
    let mut pinned = level.clone();
    pinned.zero_cubes_fixed = true;

    assert_eq!(start(pinned).apply_move(Direction::Up), MoveOutcome::Blocked);
    assert_eq!(start(level).apply_move(Direction::Up), MoveOutcome::Pushed { cube: CubeId(1) });
}

#[test]
fn inverter_flips_cube_after_delay() {
    let mut level = room();
    level.grid.set_tile(START.offset(0, 2), TileKind::Inverter);
    level.cubes.push(Cube::new(1, 3, START.offset(0, 1)));
    let mut game = start(level);

    game.apply_move(Direction::Right);
    assert_eq!(game.cube(CubeId(1)).map(|cube| cube.value), Some(3));
    game.advance_clock(100).unwrap();
    let cube = game.cube(CubeId(1)).expect("cube survives inversion");
    assert_eq!((cube.value, cube.kind), (-3, CubeKind::Ice));
    assert!(game.log().contains(&GameEvent::CubeInverted { id: CubeId(1) }));
}

#[test]
fn rebound_pulls_jammed_cube_over_the_player() {
    let mut level = room();
    level.grid.set_tile(START.offset(0, 2), TileKind::Wall);
    level.cubes.push(Cube::new(1, 4, START.offset(0, 1)));
    let mut game = start(level);

    assert_eq!(game.interact(), InteractOutcome::Rebounded { cube: CubeId(1), to: START.offset(0, -1) });
    assert_eq!(game.cube(CubeId(1)).map(|cube| cube.position), Some(START.offset(0, -1)));
}

#[test]
fn free_cube_does_not_rebound() {
    let mut level = room();
    level.cubes.push(Cube::new(1, 4, START.offset(0, 1)));
    let mut game = start(level);
    assert_eq!(game.interact(), InteractOutcome::Nothing);

    let mut blocked_landing = room();
    blocked_landing.grid.set_tile(START.offset(0, 2), TileKind::Wall);
    blocked_landing.grid.set_tile(START.offset(0, -1), TileKind::Wall);
    blocked_landing.cubes.push(Cube::new(1, 4, START.offset(0, 1)));
    assert_eq!(start(blocked_landing).interact(), InteractOutcome::Nothing);
}

#[test]
fn dispenser_refills_its_output_cell() {
    let mut level = room();
    level.grid.set_tile(Pos::new(5, 0), TileKind::DispenserLava);
    level.player_start = Pos::new(6, 1);
    let mut game = start(level);

    let first = game.cubes().into_iter().cloned().collect::<Vec<_>>();
    assert_eq!(first, vec![Cube::new(1, 1, Pos::new(5, 1))]);

    assert_eq!(game.apply_move(Direction::Up), MoveOutcome::Pushed { cube: CubeId(1) });
    assert_eq!(game.cubes().len(), 1, "the player stands on the output cell");

    game.apply_move(Direction::Down);
    assert_eq!(game.cubes().len(), 2);
    assert_eq!(game.cube(CubeId(2)).map(|cube| (cube.value, cube.position)), Some((1, Pos::new(5, 1))));
}

#[test]
fn synthesizer_merges_inputs_into_output() {
    let mut level = room();
    let synth = Synthesizer::around("synth", Pos::new(6, 10));
    level.grid.set_tile(synth.core, TileKind::SynthCore);
    level.cubes.push(Cube::new(1, 2, synth.slot_a));
    level.cubes.push(Cube::new(2, -5, synth.slot_b));
    let output = synth.output;
    level.synthesizers.push(synth);
    let mut game = start(level);

    walk(&mut game, &[Direction::Up]);
    assert_eq!(game.score(), SYNTHESIS_BONUS);
    assert_eq!(game.pending_effects(), 1);

    game.advance_clock(300).unwrap();
    let cubes = game.cubes();
    assert_eq!(cubes.len(), 1);
    assert_eq!((cubes[0].id, cubes[0].value, cubes[0].position), (CubeId(3), -3, output));
    assert_eq!(cubes[0].kind, CubeKind::Ice);
}

#[test]
fn mass_converter_inverts_and_reserves_its_cell() {
    let mut level = room();
    level.grid.set_tile(Pos::new(5, 5), TileKind::MassConverter);
    level.player_start = Pos::new(5, 3);
    level.cubes.push(Cube::new(1, 4, Pos::new(5, 4)));
    let mut game = start(level);

    game.apply_move(Direction::Right);
    assert_eq!(game.cube(CubeId(1)).map(|cube| cube.status), Some(CubeStatus::Evaporating));
    assert_eq!(game.apply_move(Direction::Right), MoveOutcome::Blocked);

    game.advance_clock(500).unwrap();
    let cube = game.cube(CubeId(1)).expect("converted cube");
    assert_eq!((cube.value, cube.status), (-4, CubeStatus::Active));
    assert!(game.log().contains(&GameEvent::ConversionFinished { ids: vec![CubeId(1)] }));
}

#[test]
fn prizes_and_key_are_collected_once() {
    let mut level = room();
    level.prizes.push(Collectible { id: 401, position: START.offset(-1, 0) });
    level.key = Some(Collectible { id: 1, position: START.offset(-2, 0) });
    let mut game = start(level);

    walk(&mut game, &[Direction::Up]);
    assert_eq!(game.score(), PRIZE_BONUS);
    assert!(game.prizes().is_empty());
    walk(&mut game, &[Direction::Up, Direction::Down]);
    assert!(game.has_key());
    assert_eq!(game.score(), PRIZE_BONUS);
}

#[test]
fn restart_restores_level_and_score() {
    let mut level = room();
    level.prizes.push(Collectible { id: 401, position: START.offset(-1, 0) });
    level.cubes.push(Cube::new(1, 2, START.offset(0, 1)));
    let mut game = start(level);

    walk(&mut game, &[Direction::Up]);
    game.apply_move(Direction::Down);
    game.apply_move(Direction::Right);
    assert_eq!(game.score(), PRIZE_BONUS);

    game.restart_level().unwrap();
    assert_eq!(game.score(), 0);
    assert_eq!(game.player(), START);
    assert_eq!(game.prizes().len(), 1);
    assert_eq!(game.cube(CubeId(1)).map(|cube| cube.position), Some(START.offset(0, 1)));
}

#[test]
fn absolute_door_opens_while_plate_is_held() {
    let mut level = room();
    let door = Pos::new(3, 10);
    let plate = Pos::new(8, 5);
    level.grid.set_tile(door, TileKind::DoorAbsolute);
    level.grid.set_tile(plate, TileKind::PlateAbsolute);
    level.absolute_links.push(AbsoluteLink { value: 2, plate, doors: vec![door] });
    level.player_start = Pos::new(8, 7);
    level.cubes.push(Cube::new(1, -2, Pos::new(8, 6)));
    let mut game = start(level);

    assert!(game.is_obstacle(door));
    game.apply_move(Direction::Left);
    assert!(!game.is_obstacle(door));
    assert_eq!(game.score(), DOOR_OPEN_BONUS);
    walk(&mut game, &[Direction::Up, Direction::Up, Direction::Up, Direction::Up]);
    walk(&mut game, &[Direction::Right, Direction::Right, Direction::Right, Direction::Right]);
    walk(&mut game, &[Direction::Up]);
    assert_eq!(game.player(), door);
    assert_eq!(game.score(), DOOR_OPEN_BONUS);
}

#[test]
fn stage_door_opens_with_phase() {
    let mut level = room();
    let door = Pos::new(3, 10);
    level.grid.set_tile(door, TileKind::DoorStage1);
    level.allows_neutralization = true;
    level.cubes.push(Cube::new(1, 2, START.offset(0, 1)));
    level.cubes.push(Cube::new(2, -2, START.offset(0, 2)));
    level.rules = LevelRules::new(
        PhaseRule::new(PhasePolicy::Ratchet).step(2, Condition::CubesCleared { ids: vec![CubeId(1)] }),
        WinRule::AllCubesCleared,
    );
    let mut game = start(level);

    assert!(game.is_obstacle(door));
    game.apply_move(Direction::Right);
    assert_eq!(game.phase(), 2);
    assert_eq!(game.score(), 200 + PHASE_BONUS);
    assert!(!game.is_obstacle(door));
}

#[test]
fn sealed_goal_is_an_obstacle() {
    let mut level = room();
    level.player_start = Pos::new(1, 10);
    level.rules = LevelRules::new(PhaseRule::new(PhasePolicy::Ratchet), WinRule::GateOpen {
        name: MAIN_GATE.to_string(),
    })
    .gate(MAIN_GATE, Condition::Link { id: "missing".to_string() })
    .goal_behind(MAIN_GATE);
    let mut game = start(level);
    assert_eq!(game.apply_move(Direction::Up), MoveOutcome::Blocked);
}

#[test]
fn winning_pauses_then_moves_to_the_next_level() {
    let mut level = room();
    level.player_start = Pos::new(1, 10);
    let mut game = start(level);

    assert_eq!(game.apply_move(Direction::Up), MoveOutcome::Walked);
    assert_eq!(game.status(), SessionStatus::Celebrating);
    assert!(game.log().contains(&GameEvent::LevelWon { index: 0 }));
    assert_eq!(game.apply_move(Direction::Down), MoveOutcome::Ignored);
    assert_eq!(game.interact(), InteractOutcome::Ignored);
    assert_eq!(game.restart_level(), Err(GameError::Paused));
    assert_eq!(game.final_score(), Err(GameError::NotFinished));

    game.advance_clock(2_499).unwrap();
    assert_eq!(game.score(), 0);
    game.advance_clock(1).unwrap();
    assert_eq!(game.score(), LEVEL_BONUS);
    assert_eq!(game.status(), SessionStatus::Transitioning);

    game.advance_clock(1_500).unwrap();
    assert_eq!(game.status(), SessionStatus::Playing);
    assert_eq!(game.level_index(), 1);
    assert_eq!(game.score(), LEVEL_BONUS);
    assert_eq!(game.phase(), 1);
}

#[test]
fn final_level_finishes_the_run() {
    let mut level = room();
    level.player_start = Pos::new(1, 10);
    let mut game = Game::from_level(3, SessionConfig::default(), LEVEL_COUNT - 1, level).unwrap();

    game.apply_move(Direction::Up);
    game.advance_clock(9_999).unwrap();
    assert_eq!(game.status(), SessionStatus::Celebrating);
    game.advance_clock(1).unwrap();
    assert_eq!(game.status(), SessionStatus::Finished);
    assert_eq!(game.final_score(), Ok(LEVEL_BONUS));
    assert!(game.log().contains(&GameEvent::RunFinished { score: LEVEL_BONUS }));
}

#[test]
fn snapshot_hash_tracks_state() {
    let mut level = room();
    level.cubes.push(Cube::new(1, 2, START.offset(0, 1)));
    let mut game = start(level.clone());
    let twin = start(level);
    assert_eq!(game.snapshot_hash(), twin.snapshot_hash());

    game.apply_move(Direction::Right);
    assert_ne!(game.snapshot_hash(), twin.snapshot_hash());
}

#[test]
fn every_catalog_level_starts_playable() {
    for index in 0..LEVEL_COUNT {
        let game = Game::with_level(11, SessionConfig::default(), index).unwrap();
        assert_eq!(game.status(), SessionStatus::Playing);
        assert_eq!(game.phase(), 1, "level {index} starts in phase 1");
        assert_eq!(game.score(), 0);
        assert!(!game.is_obstacle(game.player()));
    }
}
