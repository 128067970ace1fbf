//! Multi-room template: stacked rooms, wall dividers with staged doors, and the goal.

use crate::types::{Pos, TileKind};

use super::grid::{Grid, ROOM_HEIGHT, ROOM_STRIDE, ROOM_WIDTH};

/// Columns of the two-tile door in every divider band.
pub const DOOR_COLUMNS: [i32; 2] = [(ROOM_WIDTH / 2) as i32 - 1, (ROOM_WIDTH / 2) as i32];
pub const GOAL_POS: Pos = Pos::new(0, (ROOM_WIDTH / 2) as i32);

/// Builds the empty level shell for `room_count` stacked rooms.
///
/// The divider nearest the bottom (starting) room carries stage-1 doors and
/// every higher divider stage-2 doors. Zero rooms produce an empty grid.
pub fn build_template(room_count: usize) -> Grid {
    if room_count == 0 {
        return Grid::filled(ROOM_WIDTH, 0, TileKind::Wall);
    }

    let height = ROOM_HEIGHT * room_count + (room_count - 1);
    let mut grid = Grid::filled(ROOM_WIDTH, height, TileKind::Floor);
    let last_row = height as i32 - 1;
    let last_col = ROOM_WIDTH as i32 - 1;

    for col in 0..=last_col {
        grid.set_tile(Pos::new(0, col), TileKind::Wall);
        grid.set_tile(Pos::new(last_row, col), TileKind::Wall);
    }
    for row in 0..=last_row {
        grid.set_tile(Pos::new(row, 0), TileKind::Wall);
        grid.set_tile(Pos::new(row, last_col), TileKind::Wall);
    }

    for boundary in 1..room_count {
        let divider_row = divider_row(boundary);
        for col in 1..last_col {
            grid.set_tile(Pos::new(divider_row, col), TileKind::Wall);
        }
        let door = if boundary == room_count - 1 { TileKind::DoorStage1 } else { TileKind::DoorStage2 };
        for col in DOOR_COLUMNS {
            grid.set_tile(Pos::new(divider_row, col), door);
        }
    }

    grid.set_tile(GOAL_POS, TileKind::Goal);
    grid
}

/// Row of the wall band between room `boundary - 1` and room `boundary`.
pub const fn divider_row(boundary: usize) -> i32 {
    (boundary * ROOM_STRIDE) as i32 - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_room_template_matches_known_layout() {
        let grid = build_template(3);
        assert_eq!(grid.height(), 44);
        assert_eq!(grid.width(), 20);
        assert_eq!(grid.tile_at(Pos::new(14, 9)), TileKind::DoorStage2);
        assert_eq!(grid.tile_at(Pos::new(14, 10)), TileKind::DoorStage2);
        assert_eq!(grid.tile_at(Pos::new(29, 9)), TileKind::DoorStage1);
        assert_eq!(grid.tile_at(Pos::new(29, 11)), TileKind::Wall);
        assert_eq!(grid.tile_at(Pos::new(0, 10)), TileKind::Goal);
        assert_eq!(grid.tile_at(Pos::new(42, 10)), TileKind::Floor);
        assert_eq!(grid.room_count(), 3);
    }

    #[test]
    fn single_room_has_no_doors() {
        let grid = build_template(1);
        assert_eq!(grid.height(), 14);
        assert_eq!(grid.count(TileKind::DoorStage1) + grid.count(TileKind::DoorStage2), 0);
        assert_eq!(grid.count(TileKind::Goal), 1);
    }

    #[test]
    fn zero_rooms_yield_empty_grid() {
        let grid = build_template(0);
        assert!(grid.is_empty());
        assert_eq!(grid.height(), 0);
    }
}
