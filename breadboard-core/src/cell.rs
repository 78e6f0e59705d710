use serde::{Deserialize, Serialize};

use crate::geometry::{CellIdx, Point};

/// A single addressable grid position with its pixel geometry.
/// Only [`Grid::cell`](crate::grid::Grid::cell) creates these.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub idx: CellIdx,
    /// Top-left corner in pixels.
    pub pos: Point,
    pub size: Point,
}

impl Cell {
    pub fn center(&self) -> Point {
        Point::new(self.pos.x + self.size.x / 2.0, self.pos.y + self.size.y / 2.0)
    }
}
