//! A single placed plate and its local geometry.
//!
//! Plates never check collisions; that is the layer's job. Position changes
//! go through the pure transforms in [`crate::geometry`] and are written back
//! here by the owning layer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DrawError;
use crate::geometry::{self, CellIdx, Orientation, Point, Position};
use crate::grid::Grid;
use crate::kind::{PlateKind, Properties};
use crate::serialized::SerializedPlate;

pub type PlateId = u32;

/// Runtime values, kept apart from the identity-defining properties.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlateState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(flatten)]
    pub extra: Properties,
}

impl PlateState {
    pub fn with_input(input: Value) -> Self {
        PlateState { input: Some(input), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none() && self.extra.is_empty()
    }

    /// Overlay every value present in `partial`. Returns whether anything
    /// changed.
    pub fn merge(&mut self, partial: &PlateState) -> bool {
        let before = self.clone();
        if let Some(v) = &partial.input {
            self.input = Some(v.clone());
        }
        if let Some(v) = &partial.output {
            self.output = Some(v.clone());
        }
        for (k, v) in &partial.extra {
            self.extra.insert(k.clone(), v.clone());
        }
        *self != before
    }

    pub fn input_f64(&self) -> Option<f64> {
        self.input.as_ref().and_then(Value::as_f64)
    }
}

/// Interaction flags. None of them are serialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlateFlags {
    pub selected: bool,
    pub dragging: bool,
    pub frozen: bool,
    pub touched: bool,
    pub highlighted: bool,
}

#[derive(Clone, Debug)]
pub struct Plate {
    id: PlateId,
    kind: PlateKind,
    properties: Properties,
    surface: Vec<CellIdx>,
    position: Position,
    /// Pixel displacement from the origin cell; non-zero only mid-drag.
    drag_offset: Point,
    state: PlateState,
    flags: PlateFlags,
    drawn: bool,
}

impl Plate {
    /// Factory half of the registry path. The plate is not placed until
    /// [`Plate::draw`] succeeds.
    pub fn new(id: PlateId, kind: PlateKind, properties: &Properties) -> Self {
        let mut state = PlateState::default();
        if let Some(range) = kind.input_range() {
            state.input = Some(Value::from(range.min));
        }
        Plate {
            id,
            kind,
            properties: kind.normalize_properties(properties),
            surface: Vec::new(),
            position: Position::default(),
            drag_offset: Point::ZERO,
            state,
            flags: PlateFlags::default(),
            drawn: false,
        }
    }

    /// Place the plate. Fails if any covered cell falls outside `grid` or
    /// the properties do not describe a drawable plate.
    pub fn draw(&mut self, grid: &Grid, cell: CellIdx, orientation: Orientation) -> Result<(), DrawError> {
        let surface = self.kind.surface(&self.properties)?;
        let position = Position::new(cell, orientation);
        check_fits(self.kind, grid, position, &surface)?;
        self.surface = surface;
        self.position = position;
        self.drag_offset = Point::ZERO;
        self.drawn = true;
        Ok(())
    }

    pub fn id(&self) -> PlateId {
        self.id
    }

    pub fn kind(&self) -> PlateKind {
        self.kind
    }

    pub fn alias(&self) -> &'static str {
        self.kind.alias()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn state(&self) -> &PlateState {
        &self.state
    }

    pub fn flags(&self) -> PlateFlags {
        self.flags
    }

    pub fn surface(&self) -> &[CellIdx] {
        &self.surface
    }

    pub fn drag_offset(&self) -> Point {
        self.drag_offset
    }

    pub fn is_drawn(&self) -> bool {
        self.drawn
    }

    /// Surface offsets rotated into `orientation`.
    pub fn compute_footprint(&self, orientation: Orientation) -> Vec<CellIdx> {
        geometry::footprint(&self.surface, orientation)
    }

    pub fn absolute_cells(&self) -> BTreeSet<CellIdx> {
        geometry::absolute_cells(self.position, &self.surface)
    }

    /// Would the plate fit on `grid` at `position`?
    pub fn fits(&self, grid: &Grid, position: Position) -> Result<(), DrawError> {
        check_fits(self.kind, grid, position, &self.surface)
    }

    /// Pixel center of the origin cell including any drag displacement.
    pub fn pixel_origin(&self, grid: &Grid) -> Point {
        grid.center_of(self.position.cell) + self.drag_offset
    }

    pub fn rotate_clockwise(&mut self) {
        self.position = self.position.rotated_clockwise();
    }

    pub fn rotate_counter_clockwise(&mut self) {
        self.position = self.position.rotated_counter_clockwise();
    }

    pub fn shift(&mut self, dx: i32, dy: i32) {
        self.position = self.position.shifted(dx, dy);
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Continuous pixel-space move used while dragging.
    pub fn dmove(&mut self, dx: f64, dy: f64) {
        self.drag_offset = self.drag_offset + Point::new(dx, dy);
    }

    /// Settle a drag onto the nearest cell where the whole plate fits. If
    /// none fits there, the plate returns to where the drag started.
    /// Returns whether the origin cell changed.
    pub fn snap(&mut self, grid: &Grid) -> bool {
        let target = self.position.moved_to(grid.nearest(self.pixel_origin(grid)));
        self.drag_offset = Point::ZERO;
        if target == self.position || self.fits(grid, target).is_err() {
            return false;
        }
        self.position = target;
        true
    }

    /// Merge runtime state. Returns true when the caller should emit a state
    /// change, i.e. `notify` was requested and something actually changed.
    pub fn set_state(&mut self, partial: &PlateState, notify: bool) -> bool {
        let changed = self.state.merge(partial);
        notify && changed
    }

    pub fn serialize(&self) -> SerializedPlate {
        SerializedPlate {
            id: self.id,
            kind: self.kind.alias().to_string(),
            position: self.position,
            properties: self.properties.clone(),
            dynamic: if self.state.is_empty() { None } else { Some(self.state.clone()) },
        }
    }

    /// Merge runtime state without any notification intent. Returns whether
    /// anything changed.
    pub(crate) fn merge_state(&mut self, partial: &PlateState) -> bool {
        self.state.merge(partial)
    }

    pub(crate) fn flags_mut(&mut self) -> &mut PlateFlags {
        &mut self.flags
    }

    pub(crate) fn reset_drag(&mut self) {
        self.drag_offset = Point::ZERO;
    }

    pub(crate) fn with_id(&self, id: PlateId) -> Plate {
        Plate { id, flags: PlateFlags::default(), drag_offset: Point::ZERO, ..self.clone() }
    }
}

fn check_fits(kind: PlateKind, grid: &Grid, position: Position, surface: &[CellIdx]) -> Result<(), DrawError> {
    for cell in geometry::absolute_cells(position, surface) {
        grid.cell(cell.x, cell.y)
            .map_err(|source| DrawError::OutOfBounds { alias: kind.alias(), source })?;
    }
    Ok(())
}
