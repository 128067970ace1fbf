//! Tile grid storage and room geometry for stacked-room levels.

use serde::{Deserialize, Serialize};

use crate::types::{LevelError, Pos, TileKind};

pub const ROOM_HEIGHT: usize = 14;
pub const ROOM_WIDTH: usize = 20;
/// Rows taken by one room plus the divider band below it.
pub const ROOM_STRIDE: usize = ROOM_HEIGHT + 1;

/// Row-major tile grid. Reads outside the grid see `Wall`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<TileKind>>", try_from = "Vec<Vec<TileKind>>")]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<TileKind>,
}

impl Grid {
    pub fn filled(width: usize, height: usize, tile: TileKind) -> Self {
        Self { width, height, tiles: vec![tile; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.height
            && (pos.col as usize) < self.width
    }

    pub fn tile_at(&self, pos: Pos) -> TileKind {
        if !self.in_bounds(pos) {
            return TileKind::Wall;
        }
        self.tiles[self.index(pos)]
    }

    /// Writes outside the grid are dropped.
    pub fn set_tile(&mut self, pos: Pos, tile: TileKind) {
        if self.in_bounds(pos) {
            let index = self.index(pos);
            self.tiles[index] = tile;
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width).map(move |col| Pos::new(row as i32, col as i32))
        })
    }

    pub fn positions_of(&self, tile: TileKind) -> Vec<Pos> {
        self.positions().filter(|&pos| self.tile_at(pos) == tile).collect()
    }

    pub fn count(&self, tile: TileKind) -> usize {
        self.tiles.iter().filter(|&&candidate| candidate == tile).count()
    }

    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    /// Number of stacked rooms, derived from the height.
    pub fn room_count(&self) -> usize {
        (self.height + 1) / ROOM_STRIDE
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in 0..self.height {
            for col in 0..self.width {
                out.push(self.tile_at(Pos::new(row as i32, col as i32)).glyph());
            }
            out.push('\n');
        }
        out
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.row as usize) * self.width + (pos.col as usize)
    }
}

impl From<Grid> for Vec<Vec<TileKind>> {
    fn from(grid: Grid) -> Self {
        if grid.width == 0 {
            return vec![Vec::new(); grid.height];
        }
        grid.tiles.chunks(grid.width).map(<[TileKind]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<TileKind>>> for Grid {
    type Error = LevelError;

    fn try_from(rows: Vec<Vec<TileKind>>) -> Result<Self, Self::Error> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut tiles = Vec::with_capacity(width * height);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != width {
                return Err(LevelError::RaggedGrid { row, found: cells.len(), expected: width });
            }
            tiles.extend(cells);
        }
        Ok(Self { width, height, tiles })
    }
}

/// Interior of one room: rows `top..bottom`, cols `left..right` (exclusive ends).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomBounds {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl RoomBounds {
    /// Room 0 is the topmost room.
    pub const fn for_room(room_index: usize) -> Self {
        let room_top = (room_index * ROOM_STRIDE) as i32;
        Self {
            top: room_top + 1,
            bottom: room_top + ROOM_HEIGHT as i32,
            left: 1,
            right: ROOM_WIDTH as i32 - 1,
        }
    }

    /// Row range `start..end` owned by the room, including its lower divider.
    pub const fn band(room_index: usize) -> (i32, i32) {
        let room_top = (room_index * ROOM_STRIDE) as i32;
        (room_top, room_top + ROOM_STRIDE as i32)
    }

    pub const fn contains(&self, pos: Pos) -> bool {
        pos.row >= self.top && pos.row < self.bottom && pos.col >= self.left && pos.col < self.right
    }

    pub const fn height(&self) -> usize {
        (self.bottom - self.top) as usize
    }

    pub const fn width(&self) -> usize {
        (self.right - self.left) as usize
    }

    /// Row-major scan of the interior.
    pub fn positions(self) -> impl Iterator<Item = Pos> {
        (self.top..self.bottom)
            .flat_map(move |row| (self.left..self.right).map(move |col| Pos::new(row, col)))
    }

    pub fn center_row(&self) -> i32 {
        (self.top - 1) + (ROOM_HEIGHT / 2) as i32
    }
}

/// Room whose band holds `row`; divider rows belong to the room above.
pub fn room_of_row(row: i32) -> usize {
    row.max(0) as usize / ROOM_STRIDE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_are_walls() {
        let grid = Grid::filled(4, 3, TileKind::Floor);
        assert_eq!(grid.tile_at(Pos::new(-1, 0)), TileKind::Wall);
        assert_eq!(grid.tile_at(Pos::new(0, 4)), TileKind::Wall);
        assert_eq!(grid.tile_at(Pos::new(2, 3)), TileKind::Floor);
    }

    #[test]
    fn room_bounds_follow_stride() {
        let bounds = RoomBounds::for_room(2);
        assert_eq!(bounds, RoomBounds { top: 31, bottom: 44, left: 1, right: 19 });
        assert_eq!(bounds.center_row(), 37);
        assert_eq!(RoomBounds::for_room(0).center_row(), 7);
        assert_eq!(bounds.positions().count(), 13 * 18);
        assert_eq!(bounds.positions().next(), Some(Pos::new(31, 1)));
    }

    #[test]
    fn rows_map_to_rooms() {
        assert_eq!(room_of_row(0), 0);
        assert_eq!(room_of_row(13), 0);
        assert_eq!(room_of_row(14), 0);
        assert_eq!(room_of_row(15), 1);
        assert_eq!(room_of_row(29), 1);
        assert_eq!(room_of_row(30), 2);
        assert_eq!(room_of_row(42), 2);
        assert_eq!(RoomBounds::band(1), (15, 30));
    }

    #[test]
    fn grid_round_trips_through_nested_rows() {
        let mut grid = Grid::filled(3, 2, TileKind::Floor);
        grid.set_tile(Pos::new(1, 2), TileKind::Goal);
        let json = serde_json::to_string(&grid).expect("serialize");
        assert_eq!(json, r#"[["F","F","F"],["F","F","G"]]"#);
        let back: Grid = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, grid);

        let ragged: Result<Grid, _> = serde_json::from_str(r#"[["F","F"],["F"]]"#);
        assert!(ragged.is_err());
    }
}
