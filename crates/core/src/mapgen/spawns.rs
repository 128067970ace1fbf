//! Safe-position search for placing cubes, prizes and the player on free floor.

use std::collections::BTreeSet;

use rand_chacha::ChaCha8Rng;

use crate::types::{Pos, TileKind};

use super::grid::{Grid, RoomBounds};
use super::seed::shuffle;

/// Up to `count` distinct floor cells of the room that are not in `occupied`,
/// in random order. Returns fewer when the room runs out of space.
pub fn find_safe_positions(
    grid: &Grid,
    room_index: usize,
    count: usize,
    occupied: &[Pos],
    rng: &mut ChaCha8Rng,
) -> Vec<Pos> {
    let occupied: BTreeSet<Pos> = occupied.iter().copied().collect();
    let mut candidates: Vec<Pos> = RoomBounds::for_room(room_index)
        .positions()
        .filter(|pos| grid.tile_at(*pos) == TileKind::Floor && !occupied.contains(pos))
        .collect();
    shuffle(rng, &mut candidates);
    candidates.truncate(count);
    candidates
}

/// One safe position, or `fallback` when the room has none left.
pub fn safe_position_or(
    grid: &Grid,
    room_index: usize,
    occupied: &[Pos],
    rng: &mut ChaCha8Rng,
    fallback: Pos,
) -> Pos {
    find_safe_positions(grid, room_index, 1, occupied, rng).first().copied().unwrap_or(fallback)
}

/// Tracks cells already handed out while a level is being populated.
#[derive(Clone, Debug, Default)]
pub struct EntityPlacer {
    occupied: Vec<Pos>,
}

impl EntityPlacer {
    pub fn new(initial: impl IntoIterator<Item = Pos>) -> Self {
        Self { occupied: initial.into_iter().collect() }
    }

    pub fn occupy(&mut self, pos: Pos) {
        self.occupied.push(pos);
    }

    pub fn occupied(&self) -> &[Pos] {
        &self.occupied
    }

    /// Places `fallbacks.len()` entities in the room; positions the room cannot
    /// supply come from `fallbacks` in order.
    pub fn place_many(
        &mut self,
        grid: &Grid,
        room_index: usize,
        rng: &mut ChaCha8Rng,
        fallbacks: &[Pos],
    ) -> Vec<Pos> {
        let found = find_safe_positions(grid, room_index, fallbacks.len(), &self.occupied, rng);
        self.claim(found, fallbacks)
    }

    /// Like [`EntityPlacer::place_many`] but never picks a cell on `skip_row`.
    pub fn place_many_off_row(
        &mut self,
        grid: &Grid,
        room_index: usize,
        skip_row: i32,
        rng: &mut ChaCha8Rng,
        fallbacks: &[Pos],
    ) -> Vec<Pos> {
        let bounds = RoomBounds::for_room(room_index);
        let mut blocked = self.occupied.clone();
        blocked.extend((bounds.left..bounds.right).map(|col| Pos::new(skip_row, col)));
        let found = find_safe_positions(grid, room_index, fallbacks.len(), &blocked, rng);
        self.claim(found, fallbacks)
    }

    fn claim(&mut self, found: Vec<Pos>, fallbacks: &[Pos]) -> Vec<Pos> {
        let placed = fallbacks
            .iter()
            .enumerate()
            .map(|(index, &fallback)| found.get(index).copied().unwrap_or(fallback))
            .collect();
        self.occupied.extend(found);
        placed
    }
}
