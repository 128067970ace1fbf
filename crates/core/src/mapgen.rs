//! Procedural level generation split into coherent submodules.

pub mod carve;
pub mod flood;
pub mod grid;
pub mod layout;
pub mod model;
pub mod seed;
pub mod shapes;
pub mod spawns;

use rand_chacha::ChaCha8Rng;

use crate::config::GenerationConfig;

pub use carve::carve_puzzle;
pub use flood::{flood_fill, stranded_floor_count};
pub use grid::{Grid, ROOM_HEIGHT, ROOM_STRIDE, ROOM_WIDTH, RoomBounds, room_of_row};
pub use layout::{DOOR_COLUMNS, GOAL_POS, build_template, divider_row};
pub use model::{CarveOutcome, CarveReport, PlacedShape, RoomPlan};
pub use seed::{derive_level_seed, level_rng};
pub use shapes::{Shape, ShapeArchetype};
pub use spawns::{EntityPlacer, find_safe_positions, safe_position_or};

/// Carves each planned room in order, threading the grid through.
pub fn carve_rooms(
    grid: Grid,
    plans: &[RoomPlan],
    rng: &mut ChaCha8Rng,
    config: &GenerationConfig,
) -> (Grid, Vec<CarveReport>) {
    let mut grid = grid;
    let mut reports = Vec::with_capacity(plans.len());
    for plan in plans {
        let outcome = carve_puzzle(&grid, plan.room_index, &plan.excluded, rng, config);
        grid = outcome.grid;
        reports.push(outcome.report);
    }
    (grid, reports)
}
