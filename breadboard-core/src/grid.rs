//! Fixed cell grid of the breadboard and its pixel mapping.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::GridError;
use crate::geometry::{CellIdx, Point};

/// Default pixel size of a cell when a composition file does not say.
pub const DEFAULT_CELL_PX: f64 = 20.0;

/// Column/row count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dim {
    pub x: i32,
    pub y: i32,
}

/// Immutable mapping between integer cells and pixel geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    dim: Dim,
    cell_size: Point,
    gap: Point,
}

impl Grid {
    pub fn new(cols: i32, rows: i32, cell_size: Point, gap: Point) -> Result<Self, GridError> {
        if cols <= 0 || rows <= 0 {
            return Err(GridError::EmptyDim { cols, rows });
        }
        Ok(Grid { dim: Dim { x: cols, y: rows }, cell_size, gap })
    }

    /// Square cells of [`DEFAULT_CELL_PX`] without gaps.
    pub fn with_dim(cols: i32, rows: i32) -> Result<Self, GridError> {
        Grid::new(cols, rows, Point::new(DEFAULT_CELL_PX, DEFAULT_CELL_PX), Point::ZERO)
    }

    pub fn from_spec(spec: &GridSpec) -> Result<Self, GridError> {
        Grid::new(
            spec.cols,
            spec.rows,
            Point::new(spec.cell_px, spec.cell_px),
            Point::new(spec.gap_px, spec.gap_px),
        )
    }

    pub fn dim(&self) -> Dim {
        self.dim
    }

    pub fn cell_size(&self) -> Point {
        self.cell_size
    }

    /// Distance between the origins of two neighbouring cells.
    pub fn pitch(&self) -> Point {
        self.cell_size + self.gap
    }

    /// Total pixel size of the grid.
    pub fn size(&self) -> Point {
        let p = self.pitch();
        Point::new(
            p.x * self.dim.x as f64 - self.gap.x,
            p.y * self.dim.y as f64 - self.gap.y,
        )
    }

    pub fn contains(&self, idx: CellIdx) -> bool {
        idx.x >= 0 && idx.y >= 0 && idx.x < self.dim.x && idx.y < self.dim.y
    }

    pub fn cell(&self, x: i32, y: i32) -> Result<Cell, GridError> {
        let idx = CellIdx::new(x, y);
        if !self.contains(idx) {
            return Err(GridError::OutOfBounds { idx, cols: self.dim.x, rows: self.dim.y });
        }
        let pitch = self.pitch();
        Ok(Cell {
            idx,
            pos: Point::new(pitch.x * x as f64, pitch.y * y as f64),
            size: self.cell_size,
        })
    }

    /// Pixel center of `idx`, whether or not it lies inside the grid.
    pub fn center_of(&self, idx: CellIdx) -> Point {
        let pitch = self.pitch();
        Point::new(
            pitch.x * idx.x as f64 + self.cell_size.x / 2.0,
            pitch.y * idx.y as f64 + self.cell_size.y / 2.0,
        )
    }

    /// Cell whose center is closest to `p`, clamped into the grid.
    pub fn nearest(&self, p: Point) -> CellIdx {
        let pitch = self.pitch();
        let fx = ((p.x - self.cell_size.x / 2.0) / pitch.x).round();
        let fy = ((p.y - self.cell_size.y / 2.0) / pitch.y).round();
        CellIdx::new(
            (fx as i32).clamp(0, self.dim.x - 1),
            (fy as i32).clamp(0, self.dim.y - 1),
        )
    }
}

/// Grid description as stored next to a composition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub cols: i32,
    pub rows: i32,
    #[serde(default = "default_cell_px")]
    pub cell_px: f64,
    #[serde(default)]
    pub gap_px: f64,
}

fn default_cell_px() -> f64 {
    DEFAULT_CELL_PX
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec { cols: 10, rows: 10, cell_px: DEFAULT_CELL_PX, gap_px: 0.0 }
    }
}

impl From<&Grid> for GridSpec {
    fn from(g: &Grid) -> Self {
        GridSpec { cols: g.dim.x, rows: g.dim.y, cell_px: g.cell_size.x, gap_px: g.gap.x }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_geometry_uses_pitch() {
        let g = Grid::new(4, 3, Point::new(10.0, 10.0), Point::new(2.0, 2.0)).unwrap();
        let c = g.cell(2, 1).unwrap();
        assert_eq!(c.pos, Point::new(24.0, 12.0));
        assert_eq!(c.center(), Point::new(29.0, 17.0));
        assert_eq!(g.size(), Point::new(46.0, 34.0));
    }

    #[test]
    fn out_of_bounds_cell_is_an_error() {
        let g = Grid::with_dim(10, 10).unwrap();
        assert!(g.cell(9, 9).is_ok());
        assert!(matches!(g.cell(10, 0), Err(GridError::OutOfBounds { .. })));
        assert!(matches!(g.cell(0, -1), Err(GridError::OutOfBounds { .. })));
    }

    #[test]
    fn nearest_rounds_and_clamps() {
        let g = Grid::with_dim(5, 5).unwrap();
        let c = g.cell(3, 2).unwrap().center();
        assert_eq!(g.nearest(c + Point::new(9.0, -9.0)), CellIdx::new(3, 2));
        assert_eq!(g.nearest(c + Point::new(11.0, 0.0)), CellIdx::new(4, 2));
        assert_eq!(g.nearest(Point::new(-500.0, 900.0)), CellIdx::new(0, 4));
    }

    #[test]
    fn constructor_rejects_empty_dimensions() {
        assert!(matches!(Grid::with_dim(0, 5), Err(GridError::EmptyDim { cols: 0, rows: 5 })));
        assert!(Grid::new(3, -1, Point::new(10.0, 10.0), Point::ZERO).is_err());
    }

    #[test]
    fn grid_spec_rejects_empty_grid() {
        let spec = GridSpec { cols: 0, ..GridSpec::default() };
        assert!(Grid::from_spec(&spec).is_err());
        let spec: GridSpec = serde_json::from_str(r#"{"cols": 8, "rows": 6}"#).unwrap();
        let g = Grid::from_spec(&spec).unwrap();
        assert_eq!(g.dim(), Dim { x: 8, y: 6 });
        assert_eq!(g.cell_size(), Point::new(DEFAULT_CELL_PX, DEFAULT_CELL_PX));
    }
}
