//! Pure evaluation of constraint stations against the current cube set.

pub mod assembler;
pub mod links;
pub mod snapshot;

use std::collections::BTreeMap;

use crate::types::{Cube, Pos};

pub use assembler::{
    Assembler, AssemblerCondition, AssemblerGoal, AssemblerGoalKind, AssemblerState, AssemblerValues,
};
pub use links::{AbsoluteLink, ComparisonLink, LogicCalibrator, NumericDeposit, SlotTarget, Synthesizer};
pub use snapshot::{CalibratorState, DepositState, PuzzleSnapshot, SlotState, SnapshotDiff, evaluate};

/// Active cubes indexed by cell. Evaporating cubes are invisible to every station.
#[derive(Clone, Debug, Default)]
pub struct Occupancy<'a> {
    by_pos: BTreeMap<Pos, &'a Cube>,
}

impl<'a> Occupancy<'a> {
    pub fn new(cubes: impl IntoIterator<Item = &'a Cube>) -> Self {
        let mut by_pos = BTreeMap::new();
        for cube in cubes.into_iter().filter(|cube| cube.is_active()) {
            by_pos.entry(cube.position).or_insert(cube);
        }
        Self { by_pos }
    }

    pub fn at(&self, pos: Pos) -> Option<&'a Cube> {
        self.by_pos.get(&pos).copied()
    }

    /// Sum of cube values on `cells`; 0 when all are empty.
    pub fn sum_over(&self, cells: &[Pos]) -> i32 {
        cells.iter().filter_map(|&pos| self.at(pos)).fold(0, |sum, cube| sum.saturating_add(cube.value))
    }

    pub fn cubes(&self) -> impl Iterator<Item = &'a Cube> + '_ {
        self.by_pos.values().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pos.is_empty()
    }
}
