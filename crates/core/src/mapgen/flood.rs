//! Floor connectivity queries confined to a room interior.

use std::collections::{BTreeSet, VecDeque};

use crate::types::{Pos, TileKind};

use super::grid::{Grid, RoomBounds};

/// Floor cells 4-connected to `start` inside `bounds`. Empty when `start` is not floor.
pub fn reachable_floor(grid: &Grid, start: Pos, bounds: RoomBounds) -> BTreeSet<Pos> {
    let mut visited = BTreeSet::new();
    if !bounds.contains(start) || grid.tile_at(start) != TileKind::Floor {
        return visited;
    }

    let mut queue = VecDeque::from([start]);
    visited.insert(start);
    while let Some(current) = queue.pop_front() {
        for next in current.neighbors() {
            if !bounds.contains(next) || grid.tile_at(next) != TileKind::Floor {
                continue;
            }
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    visited
}

/// Size of the floor component holding `start`.
pub fn flood_fill(grid: &Grid, start: Pos, bounds: RoomBounds) -> usize {
    reachable_floor(grid, start, bounds).len()
}

pub fn first_floor_cell(grid: &Grid, bounds: RoomBounds) -> Option<Pos> {
    bounds.positions().find(|&pos| grid.tile_at(pos) == TileKind::Floor)
}

pub fn floor_count(grid: &Grid, bounds: RoomBounds) -> usize {
    bounds.positions().filter(|&pos| grid.tile_at(pos) == TileKind::Floor).count()
}

/// Floor cells outside the largest connected component of the room.
pub fn stranded_floor_count(grid: &Grid, bounds: RoomBounds) -> usize {
    let mut unvisited: BTreeSet<Pos> =
        bounds.positions().filter(|&pos| grid.tile_at(pos) == TileKind::Floor).collect();
    let total = unvisited.len();
    let mut largest = 0;
    while let Some(&start) = unvisited.iter().next() {
        let component = reachable_floor(grid, start, bounds);
        largest = largest.max(component.len());
        for pos in &component {
            unvisited.remove(pos);
        }
    }
    total - largest
}
