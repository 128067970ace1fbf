//! Episode 1: clearing opposite pairs, inverters and absolute-value plates.

use rand_chacha::ChaCha8Rng;

use super::stations::{
    CubeDef, col_cells, door_approaches, fixed_cubes, objectives, paint, room_plans, row_cells, spawn_cubes,
};
use crate::config::GenerationConfig;
use crate::level::LevelData;
use crate::mapgen::{EntityPlacer, Grid, build_template, carve_rooms, safe_position_or};
use crate::progression::{Condition, LevelRules, PhasePolicy, PhaseRule, WinRule};
use crate::puzzle::AbsoluteLink;
use crate::types::{CubeId, Pos, TileKind};

const START_FALLBACK: Pos = Pos::new(42, 10);

const CRADLE_CUBES: [(usize, &[CubeDef]); 3] = [
    (2, &[(1, 2), (2, -2), (3, 4), (4, -4)]),
    (1, &[(5, 3), (6, -3), (7, 5), (8, -5), (9, 1), (10, -1)]),
    (0, &[(11, -6), (12, 6), (13, -7), (14, 7), (15, -8), (16, 8), (17, -9), (18, 9), (19, -10), (20, 10)]),
];

const TWIN_CUBES: [(usize, &[CubeDef]); 3] = [
    (2, &[(11, 2), (12, -2)]),
    (1, &[(13, 3), (14, 3), (15, -5), (16, -5)]),
    (0, &[(17, 6), (18, 6), (19, -7), (20, -7), (21, 8), (22, 8), (23, -9), (24, -9)]),
];

/// Carves all three rooms with only the door approaches held open.
fn carved_three_rooms(grid: Grid, rng: &mut ChaCha8Rng, config: &GenerationConfig) -> Grid {
    let plans = room_plans(&[0, 1, 2], &door_approaches(3));
    carve_rooms(grid, &plans, rng, config).0
}

fn room_fallback(room: usize, index: usize) -> Pos {
    Pos::new(room as i32 * 15 + 3, 1 + index as i32)
}

/// Three rooms of opposite pairs; each room opens once the one below is clear.
pub(super) fn cradle(rng: &mut ChaCha8Rng, config: &GenerationConfig) -> LevelData {
    let grid = carved_three_rooms(build_template(3), rng, config);
    let player_start = safe_position_or(&grid, 2, &[], rng, START_FALLBACK);
    let mut placer = EntityPlacer::new([player_start]);

    let mut cubes = Vec::new();
    for (room, defs) in CRADLE_CUBES {
        cubes.extend(spawn_cubes(&mut placer, &grid, room, rng, defs, |index| room_fallback(room, index)));
    }

    let mut level = LevelData::bare("Episode 1: The Cradle of Zeta", grid, player_start);
    level.short_title = "E1 - Level 1".to_string();
    level.cubes = cubes;
    level.allows_neutralization = true;
    level.objectives = objectives([
        "Clear the [+2/-2] and [+4/-4] pairs to open the first door.",
        "Neutralize the [+3/-3], [+5/-5] and [+1/-1] pairs to unlock the next sector.",
        "Final challenge: clear the five remaining pairs and reach the goal.",
    ]);
    level.rules = LevelRules::new(
        PhaseRule::new(PhasePolicy::Ratchet)
            .step(2, Condition::RoomCleared { room: 2 })
            .step(3, Condition::all([Condition::RoomCleared { room: 2 }, Condition::RoomCleared { room: 1 }])),
        WinRule::AllCubesCleared,
    );
    level
}

/// Twin cubes that can only be cleared after one of them passes an inverter.
pub(super) fn twins(rng: &mut ChaCha8Rng, config: &GenerationConfig) -> LevelData {
    let mut grid = carved_three_rooms(build_template(3), rng, config);
    let player_start = safe_position_or(&grid, 2, &[], rng, START_FALLBACK);
    let mut placer = EntityPlacer::new([player_start]);

    for (room, fallback) in [(1, Pos::new(22, 10)), (0, Pos::new(7, 10))] {
        let inverter = placer.place_many(&grid, room, rng, &[fallback]);
        paint(&mut grid, &inverter, TileKind::Inverter);
    }

    let mut cubes = Vec::new();
    for (room, defs) in TWIN_CUBES {
        cubes.extend(spawn_cubes(&mut placer, &grid, room, rng, defs, |index| room_fallback(room, index)));
    }

    let first_pair = Condition::CubesCleared { ids: vec![CubeId(11), CubeId(12)] };
    let twin_pairs = Condition::CubesCleared { ids: (13..=16).map(CubeId).collect() };

    let mut level = LevelData::bare("Episode 1: The Twins' Dilemma", grid, player_start);
    level.short_title = "E1 - Level 2".to_string();
    level.cubes = cubes;
    level.allows_neutralization = true;
    level.objectives = objectives([
        "Clear the opening pair to unlock the first door.",
        "Use the inverter to neutralize both pairs of twins.",
        "Show your mastery: invert all four twin pairs and reach the goal.",
    ]);
    level.rules = LevelRules::new(
        PhaseRule::new(PhasePolicy::Ratchet)
            .step(2, first_pair.clone())
            .step(3, Condition::all([first_pair, twin_pairs])),
        WinRule::AllCubesCleared,
    );
    level
}

const CROSSING_CUBES: [(u32, i32, Pos); 10] = [
    (23, 3, Pos::new(20, 5)),
    (24, 5, Pos::new(22, 4)),
    (25, 7, Pos::new(23, 6)),
    (26, -3, Pos::new(20, 15)),
    (27, -5, Pos::new(22, 14)),
    (28, -7, Pos::new(23, 16)),
    (29, 9, Pos::new(12, 5)),
    (30, 9, Pos::new(12, 15)),
    (31, 2, Pos::new(8, 10)),
    (32, -2, Pos::new(7, 10)),
];

/// Walls the rectangle outline `top..=bottom` x `left..=right`.
fn chamber(grid: &mut Grid, top: i32, bottom: i32, left: i32, right: i32) {
    paint(grid, &row_cells(top, left..=right), TileKind::Wall);
    paint(grid, &row_cells(bottom, left..=right), TileKind::Wall);
    paint(grid, &col_cells(left, top + 1..bottom), TileKind::Wall);
    paint(grid, &col_cells(right, top + 1..bottom), TileKind::Wall);
}

/// Two sealed chambers of same-sign cubes whose only way in is an inverter
/// set into the chamber wall, then a walled corridor ending in a third one.
pub(super) fn inverted_crossing(rng: &mut ChaCha8Rng, config: &GenerationConfig) -> LevelData {
    let plans = room_plans(&[2], &door_approaches(3));
    let (mut grid, _) = carve_rooms(build_template(3), &plans, rng, config);

    chamber(&mut grid, 19, 24, 2, 7);
    grid.set_tile(Pos::new(20, 3), TileKind::Floor);
    grid.set_tile(Pos::new(24, 4), TileKind::Inverter);
    chamber(&mut grid, 19, 24, 12, 17);
    grid.set_tile(Pos::new(21, 13), TileKind::Floor);
    grid.set_tile(Pos::new(21, 12), TileKind::Inverter);

    paint(&mut grid, &col_cells(9, 4..=10), TileKind::Wall);
    paint(&mut grid, &col_cells(11, 4..=10), TileKind::Wall);
    grid.set_tile(Pos::new(2, 10), TileKind::Inverter);

    let player_start = safe_position_or(&grid, 2, &[], rng, START_FALLBACK);
    let mut placer = EntityPlacer::new([player_start]);
    let fallbacks = [Pos::new(40, 4), Pos::new(40, 15)];
    let mut cubes = spawn_cubes(&mut placer, &grid, 2, rng, &[(21, 4), (22, -4)], |index| fallbacks[index]);
    cubes.extend(fixed_cubes(&CROSSING_CUBES));

    let opening_pair = Condition::CubesCleared { ids: vec![CubeId(21), CubeId(22)] };
    let chambers = Condition::CubesCleared { ids: (23..=28).map(CubeId).collect() };

    let mut level = LevelData::bare("Episode 1: The Inverted Crossing", grid, player_start);
    level.short_title = "E1 - Level 3".to_string();
    level.cubes = cubes;
    level.allows_neutralization = true;
    level.objectives = objectives([
        "Clear the opening pair to reach the test chambers.",
        "Use the inverters to make opposite pairs and clear both chambers.",
        "Clear the corridor to reach the last inverter and solve the final puzzle.",
    ]);
    level.rules = LevelRules::new(
        PhaseRule::new(PhasePolicy::Ratchet)
            .step(2, opening_pair.clone())
            .step(3, Condition::all([opening_pair, chambers])),
        WinRule::AllCubesCleared,
    );
    level
}

/// Absolute-value plates holding every divider door, including the last one
/// guarding the goal.
pub(super) fn absolute_pressure(rng: &mut ChaCha8Rng, config: &GenerationConfig) -> LevelData {
    let mut grid = build_template(3);
    let lower_door = row_cells(29, [9, 10]);
    let middle_door = row_cells(14, [9, 10]);
    let goal_door = row_cells(1, [9, 10]);
    for door in [&lower_door, &middle_door, &goal_door] {
        paint(&mut grid, door, TileKind::DoorAbsolute);
    }
    paint(&mut grid, &[Pos::new(1, 8), Pos::new(1, 11)], TileKind::Wall);

    let mut held_open = door_approaches(3);
    held_open.extend(row_cells(2, [9, 10]));
    let plans = room_plans(&[0, 1, 2], &held_open);
    let (mut grid, _) = carve_rooms(grid, &plans, rng, config);

    let player_start = safe_position_or(&grid, 2, &[], rng, START_FALLBACK);
    let mut placer = EntityPlacer::new([player_start]);
    let mut absolute_links = Vec::new();
    let mut cubes = Vec::new();

    let rooms: [(usize, &[(i32, Pos)], &[Pos], &[CubeDef], Vec<Pos>); 3] = [
        (2, &[(2, Pos::new(35, 10))], &lower_door, &[(401, 2), (402, -2)], vec![Pos::new(40, 5), Pos::new(40, 15)]),
        (
            1,
            &[(4, Pos::new(22, 5)), (6, Pos::new(22, 15))],
            &middle_door,
            &[(403, 4), (404, -4), (405, 6), (406, -6)],
            row_cells(18, [3, 8, 12, 17]),
        ),
        (
            0,
            &[(1, Pos::new(7, 3)), (3, Pos::new(7, 10)), (5, Pos::new(7, 17))],
            &goal_door,
            &[(407, 1), (408, -1), (409, 3), (410, -3), (411, 5), (412, -5)],
            row_cells(12, [2, 5, 8, 11, 14, 17]),
        ),
    ];
    for (room, plates, door, defs, fallbacks) in rooms {
        for &(value, fallback) in plates {
            let plate = placer.place_many(&grid, room, rng, &[fallback]);
            paint(&mut grid, &plate, TileKind::PlateAbsolute);
            absolute_links.push(AbsoluteLink { value, plate: plate[0], doors: door.to_vec() });
        }
        cubes.extend(spawn_cubes(&mut placer, &grid, room, rng, defs, |index| fallbacks[index]));
    }

    let mut level = LevelData::bare("Episode 1: Absolute Pressure", grid, player_start);
    level.short_title = "E1 - Level 4".to_string();
    level.cubes = cubes;
    level.absolute_links = absolute_links;
    level.allows_neutralization = true;
    level.objectives = objectives([
        "Use a cube of magnitude |2| to open the first door.",
        "Hold BOTH plates with |4| and |6| to proceed.",
        "Final challenge: hold all THREE plates to reach the goal.",
    ]);
    let lower_open = Condition::Door { pos: lower_door[0] };
    let middle_open = Condition::Door { pos: middle_door[0] };
    level.rules = LevelRules::new(
        PhaseRule::new(PhasePolicy::Ratchet)
            .step(2, lower_open.clone())
            .step(3, Condition::all([lower_open, middle_open])),
        WinRule::DoorOpen { pos: goal_door[0] },
    );
    level
}
