//! Polyomino rock carving guarded by a flood-fill reachability check.

use std::collections::BTreeSet;

use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::GenerationConfig;
use crate::types::{Pos, TileKind};

use super::flood::{first_floor_cell, flood_fill, floor_count};
use super::grid::{Grid, ROOM_HEIGHT, ROOM_WIDTH, RoomBounds};
use super::model::{CarveOutcome, CarveReport, PlacedShape};
use super::seed::{random_below, shuffle};
use super::shapes::{Shape, ShapeArchetype};

/// Anchor rows span `top + [0, ROOM_HEIGHT - ANCHOR_ROW_MARGIN)`.
const ANCHOR_ROW_MARGIN: usize = 5;
const ANCHOR_COL_MARGIN: usize = 6;

/// Carves rock shapes into a copy of `grid` inside room `room_index`.
///
/// Cells in `excluded` and non-floor cells are never walled. A placement is
/// kept only while the floor component holding the first floor cell of the
/// room still covers all but `reachability_slack` floor tiles. Shapes that run
/// out of attempts are skipped and recorded in the report.
pub fn carve_puzzle(
    grid: &Grid,
    room_index: usize,
    excluded: &[Pos],
    rng: &mut ChaCha8Rng,
    config: &GenerationConfig,
) -> CarveOutcome {
    let mut carved = grid.clone();
    let bounds = RoomBounds::for_room(room_index);
    let excluded: BTreeSet<Pos> = excluded.iter().copied().collect();
    let archetypes = pick_archetypes(rng, config.shapes_per_room);

    let mut report = CarveReport {
        room_index,
        shapes_requested: archetypes.len(),
        ..CarveReport::default()
    };
    let mut budget = floor_count(&carved, bounds);

    for archetype in archetypes {
        let orientations = archetype.shape().orientations();
        let shape = &orientations[random_below(rng, orientations.len())];

        let mut placed = None;
        for _ in 0..config.placement_attempts {
            report.attempts_used += 1;
            let anchor = Pos::new(
                bounds.top + random_below(rng, ROOM_HEIGHT - ANCHOR_ROW_MARGIN) as i32,
                bounds.left + random_below(rng, ROOM_WIDTH - ANCHOR_COL_MARGIN) as i32,
            );
            let Some(cells) = fit_shape(&carved, bounds, &excluded, shape, anchor) else {
                continue;
            };

            for &cell in &cells {
                carved.set_tile(cell, TileKind::Wall);
            }
            let remaining = budget.saturating_sub(cells.len());
            let keeps_room_connected = match first_floor_cell(&carved, bounds) {
                Some(start) => flood_fill(&carved, start, bounds) + config.reachability_slack >= remaining,
                None => remaining == 0,
            };
            if keeps_room_connected {
                budget = remaining;
                placed = Some(cells);
                break;
            }
            for &cell in &cells {
                carved.set_tile(cell, TileKind::Floor);
            }
        }

        match placed {
            Some(cells) => report.placed.push(PlacedShape { archetype, cells }),
            None => {
                debug!(room_index, ?archetype, "rock shape skipped after exhausting placement attempts");
                report.skipped.push(archetype);
            }
        }
    }

    report.floor_remaining = budget;
    debug!(
        room_index,
        placed = report.shapes_placed(),
        requested = report.shapes_requested,
        attempts = report.attempts_used,
        degraded = report.is_degraded(),
        "carved room"
    );
    CarveOutcome { grid: carved, report }
}

/// Distinct archetypes drawn uniformly without repetition.
fn pick_archetypes(rng: &mut ChaCha8Rng, count: usize) -> Vec<ShapeArchetype> {
    let mut pool = ShapeArchetype::ALL;
    shuffle(rng, &mut pool);
    pool.into_iter().take(count.min(pool.len())).collect()
}

fn fit_shape(
    grid: &Grid,
    bounds: RoomBounds,
    excluded: &BTreeSet<Pos>,
    shape: &Shape,
    anchor: Pos,
) -> Option<Vec<Pos>> {
    let cells: Vec<Pos> = shape.cells().iter().map(|&(row, col)| anchor.offset(row, col)).collect();
    let fits = cells.iter().all(|&cell| {
        bounds.contains(cell) && grid.tile_at(cell) == TileKind::Floor && !excluded.contains(&cell)
    });
    fits.then_some(cells)
}
