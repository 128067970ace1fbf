//! Episode 3: logic stations, numeric deposits, calibrators and assemblers.

use rand_chacha::ChaCha8Rng;

use super::stations::{
    CubeDef, block, col_cells, door_approaches, fixed_cubes, objectives, paint, place_comparison, room_plans,
    row_cells, spawn_cubes, station_exclusions,
};
use crate::config::GenerationConfig;
use crate::level::{Collectible, LevelData};
use crate::mapgen::{EntityPlacer, build_template, carve_rooms};
use crate::progression::{Condition, LevelRules, MAIN_GATE, PhasePolicy, PhaseRule, SECRET_CHAMBER_GATE, WinRule};
use crate::puzzle::{
    Assembler, AssemblerCondition, AssemblerGoal, AssemblerGoalKind, LogicCalibrator, NumericDeposit,
};
use crate::types::{Operator, Pos, TileKind};

const START: Pos = Pos::new(42, 10);

const ORDER_STATIONS: [(&str, Pos, Operator); 6] = [
    ("s1_eq", Pos::new(37, 10), Operator::Eq),
    ("s2_lt", Pos::new(22, 7), Operator::Lt),
    ("s2_gt", Pos::new(22, 14), Operator::Gt),
    ("s3_eq", Pos::new(7, 4), Operator::Eq),
    ("s3_lt", Pos::new(7, 10), Operator::Lt),
    ("s3_gt", Pos::new(7, 16), Operator::Gt),
];

const CHAMBER_TOP: i32 = 18;
const CHAMBER_BOTTOM: i32 = 23;
const CHAMBER_LEFT: i32 = 1;
const CHAMBER_RIGHT: i32 = 5;
const CHAMBER_GATE: Pos = Pos::new(CHAMBER_TOP + 2, CHAMBER_RIGHT);

const ORDER_CUBES: [(usize, &[CubeDef], &[Pos]); 3] = [
    (2, &[(301, 3), (302, 3)], &[Pos::new(32, 5), Pos::new(32, 15)]),
    (
        1,
        &[(303, -4), (304, 1), (305, 8), (306, -2)],
        &[Pos::new(17, 3), Pos::new(17, 8), Pos::new(17, 12), Pos::new(17, 17)],
    ),
    (
        0,
        &[(307, 5), (308, 5), (309, -7), (310, -6), (311, 9), (312, -9)],
        &[Pos::new(2, 2), Pos::new(2, 6), Pos::new(2, 9), Pos::new(2, 11), Pos::new(2, 15), Pos::new(2, 18)],
    ),
];

/// Six comparison stations and a walled prize chamber that opens on either
/// middle-room comparison.
pub(super) fn order_lab(rng: &mut ChaCha8Rng, config: &GenerationConfig) -> LevelData {
    let chamber = block(CHAMBER_TOP, CHAMBER_BOTTOM, CHAMBER_LEFT, CHAMBER_RIGHT);

    let mut held_open = door_approaches(3);
    held_open.push(START);
    held_open.extend(chamber.iter().copied());
    held_open.push(CHAMBER_GATE.offset(0, 1));
    for (_, core, _) in ORDER_STATIONS {
        held_open.extend(station_exclusions(core));
    }
    let plans = room_plans(&[2, 1, 0], &held_open);
    let (mut grid, _) = carve_rooms(build_template(3), &plans, rng, config);

    let logic_links: Vec<_> =
        ORDER_STATIONS.iter().map(|&(id, core, operator)| place_comparison(&mut grid, id, core, operator)).collect();

    let chamber_walls: Vec<Pos> = chamber
        .iter()
        .copied()
        .filter(|pos| {
            pos.row == CHAMBER_TOP || pos.row == CHAMBER_BOTTOM || pos.col == CHAMBER_LEFT || pos.col == CHAMBER_RIGHT
        })
        .collect();
    paint(&mut grid, &chamber_walls, TileKind::Wall);
    grid.set_tile(CHAMBER_GATE, TileKind::SecretChamberGate);

    let mut placer = EntityPlacer::new([START]);
    for pos in &chamber {
        placer.occupy(*pos);
    }
    let mut cubes = Vec::new();
    for (room, defs, fallbacks) in ORDER_CUBES {
        cubes.extend(spawn_cubes(&mut placer, &grid, room, rng, defs, |index| fallbacks[index]));
    }

    let prizes = [
        (401, Pos::new(CHAMBER_TOP + 1, CHAMBER_LEFT + 1)),
        (402, Pos::new(CHAMBER_TOP + 2, CHAMBER_LEFT + 2)),
        (403, Pos::new(CHAMBER_BOTTOM - 1, CHAMBER_LEFT + 1)),
    ]
    .map(|(id, position)| Collectible { id, position });

    let mut level = LevelData::bare("Episode 3: The Order Lab", grid, START);
    level.short_title = "E3 - Level 1".to_string();
    level.cubes = cubes;
    level.logic_links = logic_links;
    level.prizes = prizes.to_vec();
    level.secret_chamber_gate = Some(CHAMBER_GATE);
    level.objectives = objectives([
        "Solve the (=) riddle to open the first door.",
        "Solve the (<) and (>) riddles to move on and open the secret chamber.",
        "Solve the three final riddles to reach the goal.",
    ]);
    let all_links = ORDER_STATIONS.iter().map(|&(id, _, _)| Condition::link(id));
    level.rules = LevelRules::new(
        PhaseRule::new(PhasePolicy::Recompute).step(2, Condition::link("s1_eq")).step(
            3,
            Condition::all([Condition::link("s1_eq"), Condition::link("s2_lt"), Condition::link("s2_gt")]),
        ),
        WinRule::GateOpen { name: MAIN_GATE.to_string() },
    )
    .gate(MAIN_GATE, Condition::all(all_links))
    .gate(SECRET_CHAMBER_GATE, Condition::any([Condition::link("s2_lt"), Condition::link("s2_gt")]))
    .goal_behind(MAIN_GATE);
    level
}

/// Phase 2 on door 1, phase 3 on doors 1 and 2, main gate on all three.
fn door_group_rules(policy: PhasePolicy) -> LevelRules {
    let group = |door| Condition::DoorGroup { door };
    LevelRules::new(
        PhaseRule::new(policy).step(2, group(1)).step(3, Condition::all([group(1), group(2)])),
        WinRule::GateOpen { name: MAIN_GATE.to_string() },
    )
    .gate(MAIN_GATE, Condition::all([group(1), group(2), group(3)]))
}

/// Deposits fed only by dispensers; each sum target unlocks one door.
pub(super) fn unit_vault(rng: &mut ChaCha8Rng, config: &GenerationConfig) -> LevelData {
    let dispensers = [
        (Pos::new(37, 0), TileKind::DispenserLava),
        (Pos::new(22, 19), TileKind::DispenserIce),
        (Pos::new(7, 0), TileKind::DispenserLava),
        (Pos::new(7, 19), TileKind::DispenserIce),
    ];
    let deposits = [("sala1", 36, 4, 1), ("sala2", 21, -3, 2), ("sala3", 6, 0, 3)]
        .map(|(id, top, target, door)| NumericDeposit {
            id: id.to_string(),
            positions: block(top, top + 1, 8, 12),
            target,
            controls_door: door,
        });

    let mut held_open = door_approaches(3);
    held_open.push(START);
    held_open.extend(dispensers.iter().filter_map(|&(pos, tile)| tile.dispenser_output(pos)));
    held_open.extend(deposits.iter().flat_map(|deposit| deposit.positions.iter().copied()));
    let plans = room_plans(&[2, 1, 0], &held_open);
    let (mut grid, _) = carve_rooms(build_template(3), &plans, rng, config);

    for (pos, tile) in dispensers {
        grid.set_tile(pos, tile);
    }
    for deposit in &deposits {
        paint(&mut grid, &deposit.positions, TileKind::NumericDeposit);
    }

    let mut level = LevelData::bare("Episode 3: The Unit Vault", grid, START);
    level.short_title = "E3 - Level 2".to_string();
    level.numeric_deposits = deposits.to_vec();
    level.objectives = objectives([
        "Use the lava dispenser to reach a sum of [+4].",
        "Use the ice dispenser to reach a sum of [-3].",
        "Use both dispensers to reach the balance: [0].",
    ]);
    level.rules = door_group_rules(PhasePolicy::Ratchet);
    level
}

const CALIBRATOR_CUBES: [(u32, i32, Pos); 4] = [
    (601, 1, Pos::new(12, 2)),
    (602, 1, Pos::new(12, 3)),
    (603, 1, Pos::new(12, 16)),
    (604, 1, Pos::new(12, 17)),
];

const CONVERTER: Pos = Pos::new(10, 10);

/// Calibrators comparing plate sums against thresholds, with a mass converter
/// to flip signs in the last room.
pub(super) fn logic_calibrators(rng: &mut ChaCha8Rng, config: &GenerationConfig) -> LevelData {
    let dispensers = [
        (Pos::new(37, 0), TileKind::DispenserLava),
        (Pos::new(22, 0), TileKind::DispenserLava),
        (Pos::new(22, 19), TileKind::DispenserIce),
    ];
    let calibrator = |id: &str, cells: Vec<Pos>, operator, target, door| LogicCalibrator {
        id: id.to_string(),
        positions: cells,
        operator,
        target,
        controls_door: door,
    };
    let calibrators = vec![
        calibrator("sala1_gt3", block(36, 37, 8, 12), Operator::Gt, 3, 1),
        calibrator("sala2_lt-4", block(21, 22, 3, 7), Operator::Lt, -4, 2),
        calibrator("sala2_gt1", block(21, 22, 13, 17), Operator::Gt, 1, 2),
        calibrator("sala3_gt0", block(6, 7, 1, 5), Operator::Gt, 0, 3),
        calibrator("sala3_lt0", block(6, 7, 14, 18), Operator::Lt, 0, 3),
        calibrator("sala3_eq0", block(1, 2, 8, 12), Operator::Eq, 0, 3),
    ];

    let mut held_open = door_approaches(3);
    held_open.push(START);
    held_open.push(CONVERTER);
    held_open.extend(CALIBRATOR_CUBES.iter().map(|&(_, _, pos)| pos));
    held_open.extend(dispensers.iter().filter_map(|&(pos, tile)| tile.dispenser_output(pos)));
    held_open.extend(calibrators.iter().flat_map(|calibrator| calibrator.positions.iter().copied()));
    // Corridors from each door down to the plates.
    held_open.extend(col_cells(10, 38..44));
    held_open.extend(row_cells(38, 1..19));
    held_open.extend(col_cells(10, 23..29));
    held_open.extend(row_cells(23, 1..19));
    held_open.extend(col_cells(10, 3..14));
    held_open.extend(row_cells(8, 1..19));
    held_open.extend(row_cells(3, 8..13));
    let plans = room_plans(&[2, 1, 0], &held_open);
    let (mut grid, _) = carve_rooms(build_template(3), &plans, rng, config);

    for (pos, tile) in dispensers {
        grid.set_tile(pos, tile);
    }
    grid.set_tile(CONVERTER, TileKind::MassConverter);
    for calibrator in &calibrators {
        paint(&mut grid, &calibrator.positions, TileKind::LogicCalibrator);
    }

    let mut level = LevelData::bare("Episode 3: The Logic Calibrators", grid, START);
    level.short_title = "E3 - Level 3".to_string();
    level.cubes = fixed_cubes(&CALIBRATOR_CUBES);
    level.logic_calibrators = calibrators;
    level.objectives = objectives([
        "Activate the logic calibrator with a sum > 3.",
        "Activate both calibrators at once (< -4 and > 1).",
        "Use the mass converter to solve the three final calibrators.",
    ]);
    level.rules = door_group_rules(PhasePolicy::Ratchet);
    level
}

/// Multi-goal assembler grids; the last level of the run. The rooms are left
/// uncarved.
pub(super) fn integer_assembler() -> LevelData {
    let mut grid = build_template(3);
    let dispensers = [
        (Pos::new(37, 0), TileKind::DispenserLava),
        (Pos::new(37, 19), TileKind::DispenserIce),
        (Pos::new(22, 0), TileKind::DispenserLava),
        (Pos::new(22, 19), TileKind::DispenserIce),
        (Pos::new(12, 0), TileKind::DispenserLava),
        (Pos::new(12, 19), TileKind::DispenserIce),
    ];
    for (pos, tile) in dispensers {
        grid.set_tile(pos, tile);
    }
    grid.set_tile(CONVERTER, TileKind::MassConverter);

    let goal = AssemblerGoal::new;
    let assemblers = vec![
        Assembler {
            id: "sala1".to_string(),
            positions: block(36, 37, 8, 12),
            goals: vec![
                goal(AssemblerGoalKind::CubeCount, AssemblerCondition::Eq, 3).described("Cubes used"),
                goal(AssemblerGoalKind::TotalSum, AssemblerCondition::Eq, -1).described("Total sum"),
            ],
            controls_door: 1,
        },
        Assembler {
            id: "sala2".to_string(),
            positions: block(21, 22, 8, 12),
            goals: vec![
                goal(AssemblerGoalKind::CubeCount, AssemblerCondition::Gt, 4).described("Cubes used"),
                goal(AssemblerGoalKind::RowParity, AssemblerCondition::Odd, 0).at(0).described("Top row"),
                goal(AssemblerGoalKind::ColParity, AssemblerCondition::Even, 0).at(2).described("Column 3"),
                goal(AssemblerGoalKind::TotalSum, AssemblerCondition::Eq, -5).described("Total sum"),
            ],
            controls_door: 2,
        },
        Assembler {
            id: "sala3_final".to_string(),
            positions: block(6, 7, 8, 12),
            goals: vec![
                goal(AssemblerGoalKind::CubeCount, AssemblerCondition::Eq, 8).described("Cubes used"),
                goal(AssemblerGoalKind::RowSum, AssemblerCondition::Eq, -2).at(0).described("Top row"),
                goal(AssemblerGoalKind::RowSum, AssemblerCondition::Eq, -4).at(1).described("Bottom row"),
                goal(AssemblerGoalKind::ColSum, AssemblerCondition::Gt, 0).at(0).described("Column 1"),
                goal(AssemblerGoalKind::ColSum, AssemblerCondition::Lt, 0).at(4).described("Column 5"),
                goal(AssemblerGoalKind::TotalSum, AssemblerCondition::Eq, -6).described("Total sum"),
            ],
            controls_door: 3,
        },
    ];
    for assembler in &assemblers {
        paint(&mut grid, &assembler.positions, TileKind::AssemblerPlate);
    }

    let mut level = LevelData::bare("Episode 3: The Integer Assembler", grid, START);
    level.short_title = "E3 - Level 4".to_string();
    level.assemblers = assemblers;
    level.objectives = objectives([
        "Meet the assembler's 2 conditions to open the door.",
        "More complex: meet all 4 conditions to unlock the final room.",
        "Final objective: solve the 6-condition puzzle to win the game.",
    ]);
    let assembler = |id: &str| Condition::Assembler { id: id.to_string() };
    level.rules = LevelRules::new(
        PhaseRule::new(PhasePolicy::Ratchet)
            .step(2, assembler("sala1"))
            .step(3, Condition::all([assembler("sala1"), assembler("sala2")])),
        WinRule::GateOpen { name: MAIN_GATE.to_string() },
    )
    .gate(MAIN_GATE, assembler("sala3_final"));
    level
}
