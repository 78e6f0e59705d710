//! Contract between the layer and whatever draws plates.

use serde_json::Value;

use crate::geometry::{CellIdx, Point, Position};
use crate::grid::Grid;
use crate::kind::PlateKind;
use crate::plate::{Plate, PlateFlags, PlateId};

/// Everything a drawing surface needs to show one plate.
#[derive(Clone, Debug, PartialEq)]
pub struct PlateSnapshot {
    pub id: PlateId,
    pub kind: PlateKind,
    pub position: Position,
    /// Pixel center of the origin cell, drag displacement included.
    pub origin_px: Point,
    /// Absolute occupied cells in ascending order.
    pub cells: Vec<CellIdx>,
    pub flags: PlateFlags,
    pub input: Option<Value>,
    /// Hint that the plate just appeared and may be animated in.
    pub animate: bool,
}

impl PlateSnapshot {
    pub fn of(plate: &Plate, grid: &Grid, animate: bool) -> Self {
        PlateSnapshot {
            id: plate.id(),
            kind: plate.kind(),
            position: plate.position(),
            origin_px: plate.pixel_origin(grid),
            cells: plate.absolute_cells().into_iter().collect(),
            flags: plate.flags(),
            input: plate.state().input.clone(),
            animate,
        }
    }
}

/// A surface owns one nested drawable region per plate. `draw_plate`
/// creates the region on first sight of an id and updates it afterwards.
pub trait DrawSurface {
    fn draw_plate(&mut self, plate: &PlateSnapshot);
    fn erase_plate(&mut self, id: PlateId);
}

/// Surface for headless use (generation, grading).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl DrawSurface for NullSurface {
    fn draw_plate(&mut self, _plate: &PlateSnapshot) {}
    fn erase_plate(&mut self, _id: PlateId) {}
}
