//! Public data models produced by room carving.

use crate::types::Pos;

use super::grid::Grid;
use super::shapes::ShapeArchetype;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedShape {
    pub archetype: ShapeArchetype,
    pub cells: Vec<Pos>,
}

/// What the carver managed to do in one room.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CarveReport {
    pub room_index: usize,
    pub shapes_requested: usize,
    pub placed: Vec<PlacedShape>,
    pub skipped: Vec<ShapeArchetype>,
    pub attempts_used: usize,
    /// Floor tiles left in the room after carving.
    pub floor_remaining: usize,
}

impl CarveReport {
    pub fn shapes_placed(&self) -> usize {
        self.placed.len()
    }

    /// True when some requested shapes could not be placed.
    pub fn is_degraded(&self) -> bool {
        self.shapes_placed() < self.shapes_requested
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarveOutcome {
    pub grid: Grid,
    pub report: CarveReport,
}

/// One room to carve and the cells the carver must leave untouched.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RoomPlan {
    pub room_index: usize,
    pub excluded: Vec<Pos>,
}

impl RoomPlan {
    pub fn new(room_index: usize) -> Self {
        Self { room_index, excluded: Vec::new() }
    }

    pub fn excluding(mut self, cells: impl IntoIterator<Item = Pos>) -> Self {
        self.excluded.extend(cells);
        self
    }
}
