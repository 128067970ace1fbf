//! Shared building blocks for the level builders: station stamps, plate blocks
//! and carve exclusions.

use std::collections::BTreeMap;

use rand_chacha::ChaCha8Rng;

use crate::mapgen::{DOOR_COLUMNS, EntityPlacer, GOAL_POS, Grid, RoomBounds, RoomPlan, divider_row};
use crate::puzzle::{ComparisonLink, Synthesizer};
use crate::types::{Cube, Operator, Pos, TileKind};

/// Stamps a three-tile comparison station centred on `core`.
pub(super) fn place_comparison(grid: &mut Grid, id: &str, core: Pos, operator: Operator) -> ComparisonLink {
    let operator_tile = match operator {
        Operator::Gt => TileKind::ComparisonGt,
        Operator::Lt => TileKind::ComparisonLt,
        Operator::Eq => TileKind::ComparisonEq,
    };
    let slot_a = core.offset(0, -1);
    let slot_b = core.offset(0, 1);
    grid.set_tile(slot_a, TileKind::ComparisonSlotA);
    grid.set_tile(core, operator_tile);
    grid.set_tile(slot_b, TileKind::ComparisonSlotB);
    ComparisonLink { id: id.to_string(), operator, slot_a, slot_b }
}

/// The 3x3 block around a comparison core.
pub(super) fn station_exclusions(core: Pos) -> Vec<Pos> {
    (-1..=1).flat_map(|d_row| (-1..=1).map(move |d_col| core.offset(d_row, d_col))).collect()
}

pub(super) fn place_synthesizer(grid: &mut Grid, id: &str, core: Pos) -> Synthesizer {
    let synthesizer = Synthesizer::around(id, core);
    grid.set_tile(synthesizer.slot_a, TileKind::SynthSlotA);
    grid.set_tile(synthesizer.core, TileKind::SynthCore);
    grid.set_tile(synthesizer.slot_b, TileKind::SynthSlotB);
    grid.set_tile(synthesizer.output, TileKind::SynthOutput);
    synthesizer
}

/// Station cells plus the approach lanes a synthesizer needs to stay usable.
pub(super) fn synthesizer_exclusions(core: Pos) -> Vec<Pos> {
    vec![
        core.offset(0, -1),
        core,
        core.offset(0, 1),
        core.offset(1, -1),
        core.offset(1, 0),
        core.offset(1, 1),
        core.offset(2, 0),
        core.offset(-1, -1),
        core.offset(-1, 1),
    ]
}

/// A plate and its four neighbours.
pub(super) fn plate_exclusions(plate: Pos) -> Vec<Pos> {
    let mut cells = vec![plate];
    cells.extend(plate.neighbors());
    cells
}

/// Every cell of the inclusive rectangle, row-major.
pub(super) fn block(top: i32, bottom: i32, left: i32, right: i32) -> Vec<Pos> {
    (top..=bottom).flat_map(|row| (left..=right).map(move |col| Pos::new(row, col))).collect()
}

pub(super) fn paint(grid: &mut Grid, cells: &[Pos], tile: TileKind) {
    for &pos in cells {
        grid.set_tile(pos, tile);
    }
}

pub(super) fn row_cells(row: i32, cols: impl IntoIterator<Item = i32>) -> Vec<Pos> {
    cols.into_iter().map(|col| Pos::new(row, col)).collect()
}

pub(super) fn col_cells(col: i32, rows: impl IntoIterator<Item = i32>) -> Vec<Pos> {
    rows.into_iter().map(|row| Pos::new(row, col)).collect()
}

/// Cells directly above and below every divider door, plus the cell under the
/// goal, so carving never seals a way through.
pub(super) fn door_approaches(room_count: usize) -> Vec<Pos> {
    let mut cells = vec![GOAL_POS.offset(1, 0)];
    for boundary in 1..room_count {
        let row = divider_row(boundary);
        for col in DOOR_COLUMNS {
            cells.push(Pos::new(row - 1, col));
            cells.push(Pos::new(row + 1, col));
        }
    }
    cells
}

/// One carve plan per room in `order`, each keeping only the exclusions that
/// fall inside that room's row band.
pub(super) fn room_plans(order: &[usize], exclusions: &[Pos]) -> Vec<RoomPlan> {
    order
        .iter()
        .map(|&room| {
            let (start, end) = RoomBounds::band(room);
            RoomPlan::new(room).excluding(exclusions.iter().copied().filter(|pos| (start..end).contains(&pos.row)))
        })
        .collect()
}

pub(super) fn objectives(texts: [&str; 3]) -> BTreeMap<u8, String> {
    (1..).zip(texts).map(|(phase, text)| (phase, text.to_string())).collect()
}

/// Cube recipe: id and signed value.
pub(super) type CubeDef = (u32, i32);

/// Places `defs` on free floor of `room`; cells the room cannot supply come
/// from `fallback(index)`.
pub(super) fn spawn_cubes(
    placer: &mut EntityPlacer,
    grid: &Grid,
    room: usize,
    rng: &mut ChaCha8Rng,
    defs: &[CubeDef],
    fallback: impl Fn(usize) -> Pos,
) -> Vec<Cube> {
    let fallbacks: Vec<Pos> = (0..defs.len()).map(fallback).collect();
    let positions = placer.place_many(grid, room, rng, &fallbacks);
    defs.iter().zip(positions).map(|(&(id, value), pos)| Cube::new(id, value, pos)).collect()
}

/// Cubes whose positions are fixed by the level layout.
pub(super) fn fixed_cubes(defs: &[(u32, i32, Pos)]) -> Vec<Cube> {
    defs.iter().map(|&(id, value, pos)| Cube::new(id, value, pos)).collect()
}
