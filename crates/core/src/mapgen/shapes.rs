//! Rock polyomino catalog and orientation enumeration.

use std::collections::BTreeSet;
use std::iter;

/// `(row, col)` offset relative to a shape anchor.
pub type Offset = (i32, i32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeArchetype {
    F,
    I,
    L,
    N,
    P,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
}

impl ShapeArchetype {
    pub const ALL: [ShapeArchetype; 12] = [
        ShapeArchetype::F,
        ShapeArchetype::I,
        ShapeArchetype::L,
        ShapeArchetype::N,
        ShapeArchetype::P,
        ShapeArchetype::T,
        ShapeArchetype::U,
        ShapeArchetype::V,
        ShapeArchetype::W,
        ShapeArchetype::X,
        ShapeArchetype::Y,
        ShapeArchetype::Z,
    ];

    /// Offsets added to the origin cell.
    const fn offsets(self) -> &'static [Offset] {
        match self {
            ShapeArchetype::F => &[(1, 0), (2, 0), (0, 1), (1, 1)],
            ShapeArchetype::I => &[(0, 0), (1, 0), (2, 0), (3, 0)],
            ShapeArchetype::L => &[(0, 0), (1, 0), (2, 0), (0, 1)],
            ShapeArchetype::N => &[(1, 0), (2, 0), (0, 1), (1, 1)],
            ShapeArchetype::P => &[(0, 0), (1, 0), (0, 1), (1, 1)],
            ShapeArchetype::T => &[(0, 0), (1, 0), (2, 0), (1, 1)],
            ShapeArchetype::U => &[(0, 0), (2, 0), (0, 1), (1, 1), (2, 1)],
            ShapeArchetype::V => &[(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)],
            ShapeArchetype::W => &[(0, 0), (1, 0), (1, 1), (2, 1), (2, 2)],
            ShapeArchetype::X => &[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)],
            ShapeArchetype::Y => &[(1, 0), (0, 1), (1, 1), (1, 2), (1, 3)],
            ShapeArchetype::Z => &[(0, 0), (1, 0), (1, 1), (1, 2), (2, 2)],
        }
    }

    pub fn shape(self) -> Shape {
        let cells = iter::once((0, 0)).chain(self.offsets().iter().copied());
        Shape::from_cells(cells)
    }
}

/// Normalized cell set: sorted, deduplicated, minimum row and col are 0.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Shape {
    cells: Vec<Offset>,
}

impl Shape {
    pub fn from_cells(cells: impl IntoIterator<Item = Offset>) -> Self {
        let cells: BTreeSet<Offset> = cells.into_iter().collect();
        let min_row = cells.iter().map(|&(row, _)| row).min().unwrap_or(0);
        let min_col = cells.iter().map(|&(_, col)| col).min().unwrap_or(0);
        let mut cells: Vec<Offset> =
            cells.into_iter().map(|(row, col)| (row - min_row, col - min_col)).collect();
        cells.sort_unstable();
        Self { cells }
    }

    pub fn cells(&self) -> &[Offset] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Quarter turn: `(r, c) -> (-c, r)`.
    pub fn rotated(&self) -> Self {
        Self::from_cells(self.cells.iter().map(|&(row, col)| (-col, row)))
    }

    /// Vertical mirror: `(r, c) -> (-r, c)`.
    pub fn reflected(&self) -> Self {
        Self::from_cells(self.cells.iter().map(|&(row, col)| (-row, col)))
    }

    /// Distinct orientations under rotation and reflection, in canonical order.
    pub fn orientations(&self) -> Vec<Shape> {
        let mut seen = BTreeSet::new();
        let mut current = self.clone();
        for _ in 0..4 {
            seen.insert(current.reflected());
            let next = current.rotated();
            seen.insert(current);
            current = next;
        }
        seen.into_iter().collect()
    }
}
