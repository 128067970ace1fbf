//! Episode 2: the number line, hidden memory cubes and integer synthesis.

use rand_chacha::ChaCha8Rng;

use super::stations::{
    CubeDef, door_approaches, fixed_cubes, objectives, paint, place_comparison, place_synthesizer, plate_exclusions,
    room_plans, row_cells, station_exclusions, synthesizer_exclusions,
};
use crate::config::GenerationConfig;
use crate::level::LevelData;
use crate::mapgen::{EntityPlacer, build_template, carve_rooms, safe_position_or};
use crate::progression::{Condition, LevelRules, MAIN_GATE, PhasePolicy, PhaseRule, WinRule};
use crate::puzzle::{AbsoluteLink, SlotTarget};
use crate::types::{Cube, Operator, Pos, TileKind};

const START: Pos = Pos::new(42, 10);
const LINE_CENTER_COL: i32 = 10;

struct NumberLine {
    room: usize,
    row: i32,
    /// Expected value per column, zero column excluded.
    slots: &'static [(i32, i32)],
    zero_id: u32,
    cubes: &'static [CubeDef],
}

const NUMBER_LINES: [NumberLine; 3] = [
    NumberLine { room: 2, row: 37, slots: &[(9, -1), (11, 1)], zero_id: 100, cubes: &[(101, -1), (102, 1)] },
    NumberLine {
        room: 1,
        row: 22,
        slots: &[(8, -4), (9, -2), (11, 2), (12, 4)],
        zero_id: 200,
        cubes: &[(103, -4), (104, -2), (105, 2), (106, 4)],
    },
    NumberLine {
        room: 0,
        row: 7,
        slots: &[(7, -7), (8, -5), (9, -3), (11, 3), (12, 5), (13, 7)],
        zero_id: 300,
        cubes: &[(107, -7), (108, -5), (109, -3), (110, 3), (111, 5), (112, 7)],
    },
];

/// Each room holds a number line centred on a pinned zero cube; every cube
/// must land on the slot of its own value.
pub(super) fn number_line(rng: &mut ChaCha8Rng, config: &GenerationConfig) -> LevelData {
    let mut held_open = door_approaches(3);
    held_open.push(START);
    for line in &NUMBER_LINES {
        let half_width = line.slots.len() as i32 / 2;
        held_open.extend(row_cells(line.row, LINE_CENTER_COL - half_width..=LINE_CENTER_COL + half_width));
    }
    let plans = room_plans(&[0, 1, 2], &held_open);
    let (mut grid, _) = carve_rooms(build_template(3), &plans, rng, config);

    let mut slot_targets = Vec::new();
    for line in &NUMBER_LINES {
        for &(col, expected) in line.slots {
            let position = Pos::new(line.row, col);
            let tile = if expected < 0 { TileKind::SlotNegative } else { TileKind::SlotPositive };
            grid.set_tile(position, tile);
            slot_targets.push(SlotTarget { position, expected });
        }
    }

    let mut placer = EntityPlacer::new([START]);
    let mut cubes = Vec::new();
    for line in &NUMBER_LINES {
        let fallback_row = line.room as i32 * 15 + 5;
        let fallbacks: Vec<Pos> =
            (0..line.cubes.len()).map(|index| Pos::new(fallback_row, 2 + 2 * index as i32)).collect();
        let positions = placer.place_many_off_row(&grid, line.room, line.row, rng, &fallbacks);
        cubes.extend(line.cubes.iter().zip(positions).map(|(&(id, value), pos)| Cube::new(id, value, pos)));

        let zero = Pos::new(line.row, LINE_CENTER_COL);
        placer.occupy(zero);
        cubes.push(Cube::new(line.zero_id, 0, zero));
    }

    let mut level = LevelData::bare("Episode 2: The Number Line", grid, START);
    level.short_title = "E2 - Level 1".to_string();
    level.cubes = cubes;
    level.slot_targets = slot_targets;
    level.zero_cubes_fixed = true;
    level.objectives = objectives([
        "Zero is the centre. Put each number on its slot.",
        "Negatives to the left, positives to the right. Sort them!",
        "Prove your mastery and reach the goal.",
    ]);
    level.rules = LevelRules::new(
        PhaseRule::new(PhasePolicy::Recompute)
            .step(2, Condition::SlotsInRoom { room: 2 })
            .step(3, Condition::all([Condition::SlotsInRoom { room: 2 }, Condition::SlotsInRoom { room: 1 }])),
        WinRule::AllSlotsCorrect,
    );
    level
}

struct MemoryRoom {
    room: usize,
    scanner_fallback: Pos,
    stations: &'static [(&'static str, Pos, Operator)],
    cubes: &'static [CubeDef],
}

const MEMORY_ROOMS: [MemoryRoom; 3] = [
    MemoryRoom {
        room: 2,
        scanner_fallback: Pos::new(35, 10),
        stations: &[("s1_gt", Pos::new(37, 10), Operator::Gt)],
        cubes: &[(320, 5), (321, -2), (322, 1), (323, -8)],
    },
    MemoryRoom {
        room: 1,
        scanner_fallback: Pos::new(20, 10),
        stations: &[("s2_lt", Pos::new(22, 6), Operator::Lt), ("s2_eq", Pos::new(22, 14), Operator::Eq)],
        cubes: &[(324, 6), (325, 6), (326, -9), (327, 3), (328, -4), (329, -1)],
    },
    MemoryRoom {
        room: 0,
        scanner_fallback: Pos::new(5, 10),
        stations: &[
            ("s3_gt", Pos::new(7, 4), Operator::Gt),
            ("s3_lt", Pos::new(7, 10), Operator::Lt),
            ("s3_eq", Pos::new(7, 16), Operator::Eq),
        ],
        cubes: &[(330, 10), (331, -10), (332, 7), (333, -7), (334, 2), (335, -2), (336, 4), (337, -5)],
    },
];

/// Row of the wall that seals the goal strip until the final comparisons hold.
const GOAL_WALL_ROW: i32 = 2;

/// Comparison stations fed by memory cubes whose values only show on a scanner.
pub(super) fn memory_challenge(rng: &mut ChaCha8Rng, config: &GenerationConfig) -> LevelData {
    let mut held_open = door_approaches(3);
    held_open.extend(row_cells(1, 1..19));
    held_open.extend(row_cells(GOAL_WALL_ROW, 1..19));
    held_open.extend(row_cells(GOAL_WALL_ROW + 1, [9, 10]));
    for room in &MEMORY_ROOMS {
        for &(_, core, _) in room.stations {
            held_open.extend(station_exclusions(core));
        }
    }
    let plans = room_plans(&[0, 1, 2], &held_open);
    let (mut grid, _) = carve_rooms(build_template(3), &plans, rng, config);

    paint(&mut grid, &row_cells(GOAL_WALL_ROW, 1..19), TileKind::Wall);
    paint(&mut grid, &row_cells(GOAL_WALL_ROW, [9, 10]), TileKind::DoorStage3);

    let mut logic_links = Vec::new();
    for room in &MEMORY_ROOMS {
        for &(id, core, operator) in room.stations {
            logic_links.push(place_comparison(&mut grid, id, core, operator));
        }
    }

    let player_start = safe_position_or(&grid, 2, &[], rng, START);
    let mut placer = EntityPlacer::new([player_start]);
    let mut cubes = Vec::new();
    for room in &MEMORY_ROOMS {
        let scanner = placer.place_many(&grid, room.room, rng, &[room.scanner_fallback]);
        paint(&mut grid, &scanner, TileKind::ScannerPlate);

        let fallback_row = room.room as i32 * 15 + 3;
        let fallbacks: Vec<Pos> =
            (0..room.cubes.len()).map(|index| Pos::new(fallback_row, 2 + 2 * index as i32)).collect();
        let positions = placer.place_many(&grid, room.room, rng, &fallbacks);
        cubes.extend(
            room.cubes.iter().zip(positions).map(|(&(id, value), pos)| Cube::new(id, value, pos).memory()),
        );
    }

    let mut level = LevelData::bare("Episode 2: The Memory Challenge", grid, player_start);
    level.short_title = "E2 - Level 2".to_string();
    level.cubes = cubes;
    level.logic_links = logic_links;
    level.objectives = objectives([
        "Solve the (>) comparison to open the first door.",
        "Solve the (<) and (=) comparisons to open the second door.",
        "Solve the three final comparisons to reach the goal.",
    ]);
    level.rules = LevelRules::new(
        PhaseRule::new(PhasePolicy::Recompute).step(2, Condition::link("s1_gt")).step(
            3,
            Condition::all([Condition::link("s1_gt"), Condition::link("s2_lt"), Condition::link("s2_eq")]),
        ),
        WinRule::GateOpen { name: MAIN_GATE.to_string() },
    )
    .gate(
        MAIN_GATE,
        Condition::all([Condition::link("s3_gt"), Condition::link("s3_lt"), Condition::link("s3_eq")]),
    );
    level
}

const SYNTH_CORES: [(&str, Pos); 4] = [
    ("synth1", Pos::new(37, 10)),
    ("synth2", Pos::new(22, 10)),
    ("synth3", Pos::new(7, 6)),
    ("synth4", Pos::new(7, 14)),
];

const SYNTH_CUBES: [(u32, i32, Pos); 9] = [
    (501, 1, Pos::new(40, 4)),
    (502, 2, Pos::new(40, 15)),
    (503, 1, Pos::new(25, 3)),
    (504, -4, Pos::new(25, 8)),
    (505, 8, Pos::new(25, 16)),
    (506, 3, Pos::new(12, 3)),
    (507, 4, Pos::new(12, 7)),
    (508, -4, Pos::new(12, 13)),
    (509, -5, Pos::new(12, 17)),
];

/// Absolute plates that only a synthesized cube can satisfy.
pub(super) fn integer_synthesizer(rng: &mut ChaCha8Rng, config: &GenerationConfig) -> LevelData {
    let lower_door = row_cells(29, [9, 10]);
    let middle_door = row_cells(14, [9, 10]);
    let goal_door = row_cells(1, [9, 10]);
    let plates = [
        (3, Pos::new(32, 10), &lower_door),
        (5, Pos::new(17, 10), &middle_door),
        (7, Pos::new(4, 8), &goal_door),
        (9, Pos::new(4, 12), &goal_door),
    ];
    let goal_walls = [Pos::new(1, 8), Pos::new(1, 11)];

    let mut grid = build_template(3);
    paint(&mut grid, &goal_walls, TileKind::Wall);

    let mut held_open = door_approaches(3);
    held_open.extend(row_cells(2, [9, 10]));
    held_open.push(START);
    held_open.extend(SYNTH_CUBES.iter().map(|&(_, _, pos)| pos));
    for (_, core) in SYNTH_CORES {
        held_open.extend(synthesizer_exclusions(core));
    }
    for (_, plate, _) in plates {
        held_open.extend(plate_exclusions(plate));
    }
    let plans = room_plans(&[2, 1, 0], &held_open);
    let (mut grid, _) = carve_rooms(grid, &plans, rng, config);

    let synthesizers: Vec<_> = SYNTH_CORES.iter().map(|&(id, core)| place_synthesizer(&mut grid, id, core)).collect();
    let mut absolute_links = Vec::new();
    for (value, plate, doors) in plates {
        grid.set_tile(plate, TileKind::PlateAbsolute);
        paint(&mut grid, doors, TileKind::DoorAbsolute);
        absolute_links.push(AbsoluteLink { value, plate, doors: doors.clone() });
    }

    let mut level = LevelData::bare("Episode 2: The Integer Synthesizer", grid, START);
    level.short_title = "E2 - Level 3".to_string();
    level.cubes = fixed_cubes(&SYNTH_CUBES);
    level.synthesizers = synthesizers;
    level.absolute_links = absolute_links;
    level.objectives = objectives([
        "Build a cube of magnitude |3| with the synthesizer.",
        "Think in sequence: synthesize a |5| cube to move on.",
        "Final challenge: solve both plates (|7| and |9|) to open the door to the goal.",
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
