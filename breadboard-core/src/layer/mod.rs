//! The composition manager: owner and sole mutator of the live plates.
//!
//! Failure policies are deliberately different per operation:
//! - placement problems in [`PlateLayer::add_plate`] log and return `Ok(None)`;
//! - missing arguments, unknown types and absent ids in
//!   [`PlateLayer::remove_plate`]/[`PlateLayer::get_plate_by_id`] return an
//!   error before anything changes;
//! - [`PlateLayer::set_plate_state`] on an absent id logs and returns `false`.

mod interact;
mod random;
mod reconcile;

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::error::{LayerError, LayerResult};
use crate::geometry::{self, CellIdx, Orientation, Position};
use crate::grid::Grid;
use crate::input::{Channel, EventSource, KeyBindings, NullEventSource};
use crate::kind::{PlateKind, Properties};
use crate::menu::ContextMenuHost;
use crate::plate::{Plate, PlateId, PlateState};
use crate::serialized::SerializedPlate;
use crate::surface::{DrawSurface, NullSurface, PlateSnapshot};

pub use interact::DragState;
pub use random::RandomConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeAction {
    State,
    Rotate,
    Move,
    Remove,
}

impl ChangeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeAction::State => "state",
            ChangeAction::Rotate => "rotate",
            ChangeAction::Move => "move",
            ChangeAction::Remove => "remove",
        }
    }
}

#[derive(Debug)]
pub enum LayerChange<'a> {
    Plate { id: PlateId, action: ChangeAction },
    /// The whole composition after a bulk change.
    Composition(&'a BTreeMap<PlateId, Plate>),
}

/// Multi-step operation in progress. Anything arriving while the layer is
/// not idle is dropped rather than interleaved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Dispatching,
    Reconciling,
    Generating,
}

/// Arguments of [`PlateLayer::add_plate`]. Coordinates and orientation are
/// optional only so that a missing one can be reported instead of guessed.
#[derive(Clone, Debug, Default)]
pub struct PlateSpec {
    pub kind: String,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub orientation: Option<Orientation>,
    pub id: Option<PlateId>,
    pub properties: Properties,
    pub animate: bool,
    pub suppress_error: bool,
}

impl PlateSpec {
    pub fn new(kind: &str) -> Self {
        PlateSpec { kind: kind.to_string(), ..Default::default() }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn facing(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn id(mut self, id: PlateId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn animated(mut self) -> Self {
        self.animate = true;
        self
    }

    pub fn quiet(mut self) -> Self {
        self.suppress_error = true;
        self
    }
}

impl From<&SerializedPlate> for PlateSpec {
    fn from(p: &SerializedPlate) -> Self {
        PlateSpec {
            kind: p.kind.clone(),
            x: Some(p.position.cell.x),
            y: Some(p.position.cell.y),
            orientation: Some(p.position.orientation),
            id: Some(p.id),
            properties: p.properties.clone(),
            animate: false,
            suppress_error: false,
        }
    }
}

type ChangeCallback = Box<dyn FnMut(LayerChange<'_>)>;
type DragStartCallback = Box<dyn FnMut(PlateId)>;

pub struct PlateLayer {
    grid: Grid,
    plates: BTreeMap<PlateId, Plate>,
    surface: Box<dyn DrawSurface>,
    events: Box<dyn EventSource>,
    menu: Option<Box<dyn ContextMenuHost>>,
    bindings: KeyBindings,
    editable: bool,
    subscribed: BTreeSet<Channel>,
    selected: Option<PlateId>,
    drag: DragState,
    phase: Phase,
    on_change: Option<ChangeCallback>,
    on_drag_start: Option<DragStartCallback>,
}

impl PlateLayer {
    /// Headless layer: nothing is drawn and no listeners are installed.
    pub fn new(grid: Grid) -> Self {
        PlateLayer {
            grid,
            plates: BTreeMap::new(),
            surface: Box::new(NullSurface),
            events: Box::new(NullEventSource),
            menu: None,
            bindings: KeyBindings::default(),
            editable: false,
            subscribed: BTreeSet::new(),
            selected: None,
            drag: DragState::Idle,
            phase: Phase::Idle,
            on_change: None,
            on_drag_start: None,
        }
    }

    pub fn with_surface(mut self, surface: impl DrawSurface + 'static) -> Self {
        self.surface = Box::new(surface);
        self
    }

    pub fn with_event_source(mut self, events: impl EventSource + 'static) -> Self {
        self.events = Box::new(events);
        self
    }

    pub fn with_menu_host(mut self, menu: impl ContextMenuHost + 'static) -> Self {
        self.menu = Some(Box::new(menu));
        self
    }

    pub fn with_key_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn on_change(&mut self, cb: impl FnMut(LayerChange<'_>) + 'static) {
        self.on_change = Some(Box::new(cb));
    }

    pub fn on_drag_start(&mut self, cb: impl FnMut(PlateId) + 'static) {
        self.on_drag_start = Some(Box::new(cb));
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn len(&self) -> usize {
        self.plates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plates.is_empty()
    }

    pub fn plates(&self) -> impl Iterator<Item = &Plate> {
        self.plates.values()
    }

    pub fn contains(&self, id: PlateId) -> bool {
        self.plates.contains_key(&id)
    }

    pub fn get_plate_by_id(&self, id: PlateId) -> LayerResult<&Plate> {
        self.plates.get(&id).ok_or(LayerError::PlateNotFound(id))
    }

    pub fn get_serialized_plates(&self) -> Vec<SerializedPlate> {
        self.plates.values().map(Plate::serialize).collect()
    }

    /// One past the highest live id. Once that would pass `PlateId::MAX`,
    /// the lowest id not in use.
    fn next_id(&self) -> PlateId {
        let Some(&highest) = self.plates.keys().next_back() else {
            return 0;
        };
        highest.checked_add(1).unwrap_or_else(|| {
            let mut free = 0;
            for &id in self.plates.keys() {
                if id != free {
                    break;
                }
                free += 1;
            }
            free
        })
    }

    /// Place a plate. See the module docs for the failure policy.
    ///
    /// Reusing the id of a live plate of the same type only re-orients that
    /// plate. Reusing the id of a plate of another type replaces it once the
    /// new plate is placed; if it cannot be placed the old plate stays.
    pub fn add_plate(&mut self, spec: &PlateSpec) -> LayerResult<Option<PlateId>> {
        let (Some(x), Some(y), Some(orientation)) = (spec.x, spec.y, spec.orientation) else {
            return Err(LayerError::invalid(format!(
                "plate '{}' needs x, y and orientation (got x={:?}, y={:?}, orientation={:?})",
                spec.kind, spec.x, spec.y, spec.orientation
            )));
        };
        let kind = PlateKind::from_alias(&spec.kind)?;

        if let Some(id) = spec.id
            && let Some(existing) = self.plates.get_mut(&id)
            && existing.kind() == kind
        {
            let target = Position::new(existing.position().cell, orientation);
            if let Err(err) = existing.fits(&self.grid, target) {
                if !spec.suppress_error {
                    tracing::warn!(id, %err, "cannot re-orient plate");
                }
                return Ok(None);
            }
            existing.set_position(target);
            self.redraw(id, false);
            return Ok(Some(id));
        }

        let id = spec.id.unwrap_or_else(|| self.next_id());
        let mut plate = Plate::new(id, kind, &spec.properties);
        if let Err(err) = plate.draw(&self.grid, CellIdx::new(x, y), orientation) {
            if !spec.suppress_error {
                tracing::warn!(id, %err, "could not place plate");
            }
            return Ok(None);
        }
        if let Some(old) = self.plates.get(&id) {
            tracing::error!(
                id,
                old = old.alias(),
                new = kind.alias(),
                "plate id already taken by another type, overwriting"
            );
            self.dispose(id);
        }
        self.surface.draw_plate(&PlateSnapshot::of(&plate, &self.grid, spec.animate));
        self.plates.insert(id, plate);
        Ok(Some(id))
    }

    /// Place a plate from its wire form, restoring runtime state if present.
    pub fn add_plate_serialized(&mut self, plate: &SerializedPlate) -> LayerResult<Option<PlateId>> {
        let id = self.add_plate(&PlateSpec::from(plate))?;
        if let (Some(id), Some(state)) = (id, &plate.dynamic)
            && let Some(p) = self.plates.get_mut(&id)
        {
            p.set_state(state, false);
            self.redraw(id, false);
        }
        Ok(id)
    }

    pub fn remove_plate(&mut self, id: PlateId) -> LayerResult<()> {
        if !self.plates.contains_key(&id) {
            return Err(LayerError::PlateNotFound(id));
        }
        self.dispose(id);
        Ok(())
    }

    pub fn remove_all_plates(&mut self) {
        let ids: Vec<PlateId> = self.plates.keys().copied().collect();
        for id in ids {
            self.dispose(id);
        }
    }

    /// Merge runtime state into a plate and emit a `State` change if it
    /// differs. An absent id is logged and reported as `false`.
    pub fn set_plate_state(&mut self, id: PlateId, partial: &PlateState) -> bool {
        let Some(plate) = self.plates.get_mut(&id) else {
            tracing::warn!(id, "cannot set state of a missing plate");
            return false;
        };
        if plate.set_state(partial, true) {
            self.redraw(id, false);
            self.emit(id, ChangeAction::State);
        }
        true
    }

    /// Does the plate share any cell with another live plate?
    pub fn has_intersections(&self, id: PlateId) -> LayerResult<bool> {
        let cells = self.get_plate_by_id(id)?.absolute_cells();
        Ok(self
            .plates
            .values()
            .filter(|p| p.id() != id)
            .any(|p| geometry::cells_intersect(&cells, &p.absolute_cells())))
    }

    /// Every overlapping pair, lower id first.
    pub fn intersections(&self) -> Vec<(PlateId, PlateId)> {
        let cells: Vec<(PlateId, BTreeSet<CellIdx>)> =
            self.plates.values().map(|p| (p.id(), p.absolute_cells())).collect();
        let mut pairs = Vec::new();
        for (i, (a, ca)) in cells.iter().enumerate() {
            for (b, cb) in &cells[i + 1..] {
                if geometry::cells_intersect(ca, cb) {
                    pairs.push((*a, *b));
                }
            }
        }
        pairs
    }

    /// Quarter-turn a plate in place. Refused (`Ok(false)`) when the turned
    /// plate would leave the grid.
    pub fn rotate_plate(&mut self, id: PlateId, clockwise: bool) -> LayerResult<bool> {
        let plate = self.plates.get_mut(&id).ok_or(LayerError::PlateNotFound(id))?;
        let current = plate.position();
        let target = if clockwise {
            current.rotated_clockwise()
        } else {
            current.rotated_counter_clockwise()
        };
        if plate.fits(&self.grid, target).is_err() {
            return Ok(false);
        }
        if clockwise {
            plate.rotate_clockwise();
        } else {
            plate.rotate_counter_clockwise();
        }
        self.redraw(id, false);
        self.emit(id, ChangeAction::Rotate);
        Ok(true)
    }

    /// Move a plate by whole cells. Refused when it would leave the grid.
    pub fn shift_plate(&mut self, id: PlateId, dx: i32, dy: i32) -> LayerResult<bool> {
        let plate = self.plates.get_mut(&id).ok_or(LayerError::PlateNotFound(id))?;
        if plate.fits(&self.grid, plate.position().shifted(dx, dy)).is_err() {
            return Ok(false);
        }
        plate.shift(dx, dy);
        self.redraw(id, false);
        self.emit(id, ChangeAction::Move);
        Ok(true)
    }

    /// Copy a plate, state included, onto the same cell under a fresh id.
    pub fn duplicate_plate(&mut self, id: PlateId) -> LayerResult<PlateId> {
        let new_id = self.next_id();
        let copy = self.get_plate_by_id(id)?.with_id(new_id);
        self.surface.draw_plate(&PlateSnapshot::of(&copy, &self.grid, true));
        self.plates.insert(new_id, copy);
        self.emit_composition();
        Ok(new_id)
    }

    /// Set the numeric input of an adjustable plate, clamped to its range.
    pub fn set_input_value(&mut self, id: PlateId, value: f64) -> LayerResult<bool> {
        let kind = self.get_plate_by_id(id)?.kind();
        let Some(range) = kind.input_range() else {
            return Ok(false);
        };
        Ok(self.set_plate_state(id, &PlateState::with_input(Value::from(range.clamp(value)))))
    }

    /// Step the input by `steps` increments of the kind's step size.
    pub fn step_input(&mut self, id: PlateId, steps: i32) -> LayerResult<bool> {
        let plate = self.get_plate_by_id(id)?;
        let Some(range) = plate.kind().input_range() else {
            return Ok(false);
        };
        let current = plate.state().input_f64().unwrap_or(range.min);
        self.set_input_value(id, current + range.step * steps as f64)
    }

    /// Mark plates as erroneous, e.g. after a failed check. Ids that are not
    /// live are skipped.
    pub fn highlight_plates(&mut self, ids: &[PlateId]) {
        for &id in ids {
            if let Some(p) = self.plates.get_mut(&id) {
                p.flags_mut().highlighted = true;
                self.redraw(id, false);
            }
        }
    }

    pub fn clear_highlight(&mut self) {
        let ids: Vec<PlateId> = self
            .plates
            .values()
            .filter(|p| p.flags().highlighted)
            .map(Plate::id)
            .collect();
        for id in ids {
            if let Some(p) = self.plates.get_mut(&id) {
                p.flags_mut().highlighted = false;
            }
            self.redraw(id, false);
        }
    }

    /// Erase and forget a plate, unwinding any interaction it is part of.
    fn dispose(&mut self, id: PlateId) {
        if self.drag.plate() == Some(id) {
            self.abort_drag();
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.plates.remove(&id).is_some() {
            self.surface.erase_plate(id);
        }
    }

    fn redraw(&mut self, id: PlateId, animate: bool) {
        if let Some(p) = self.plates.get(&id) {
            self.surface.draw_plate(&PlateSnapshot::of(p, &self.grid, animate));
        }
    }

    fn emit(&mut self, id: PlateId, action: ChangeAction) {
        if let Some(cb) = self.on_change.as_mut() {
            cb(LayerChange::Plate { id, action });
        }
    }

    fn emit_composition(&mut self) {
        if let Some(cb) = self.on_change.as_mut() {
            cb(LayerChange::Composition(&self.plates));
        }
    }
}
