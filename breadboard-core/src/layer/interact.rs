//! Edit mode: selection, dragging, keyboard shortcuts and the context menu.

use serde_json::Value;

use super::{ChangeAction, Phase, PlateLayer};
use crate::geometry::Point;
use crate::input::{Channel, EDIT_CHANNELS, InputEvent, MouseButton, Shortcut};
use crate::menu::{self, MenuAction};
use crate::plate::PlateId;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { id: PlateId, last: Point },
}

impl DragState {
    pub fn plate(&self) -> Option<PlateId> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { id, .. } => Some(*id),
        }
    }
}

impl PlateLayer {
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn selected(&self) -> Option<PlateId> {
        self.selected
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_subscribed(&self, channel: Channel) -> bool {
        self.subscribed.contains(&channel)
    }

    /// Switch between inert and editable plates.
    pub fn set_editable(&mut self, editable: bool) {
        if editable == self.editable {
            return;
        }
        self.editable = editable;
        if editable {
            for ch in EDIT_CHANNELS {
                self.subscribe(ch);
            }
        } else {
            self.finish_drag();
            let channels: Vec<Channel> = self.subscribed.iter().copied().collect();
            for ch in channels {
                self.unsubscribe(ch);
            }
            self.deselect();
            if let Some(menu) = self.menu.as_mut() {
                menu.close_menu();
            }
        }
        tracing::debug!(editable, "edit mode changed");
    }

    /// Make `id` the only selected plate.
    pub fn select_plate(&mut self, id: PlateId) -> bool {
        if !self.plates.contains_key(&id) {
            return false;
        }
        if self.selected == Some(id) {
            return true;
        }
        self.deselect();
        if let Some(p) = self.plates.get_mut(&id) {
            p.flags_mut().selected = true;
        }
        self.selected = Some(id);
        self.redraw(id, false);
        true
    }

    pub fn deselect(&mut self) {
        if let Some(prev) = self.selected.take() {
            if let Some(p) = self.plates.get_mut(&prev) {
                p.flags_mut().selected = false;
            }
            self.redraw(prev, false);
        }
    }

    /// Feed one input event. Returns whether it changed anything.
    ///
    /// Plate mousedowns only count in edit mode; every other event only
    /// counts while its channel is subscribed.
    pub fn dispatch(&mut self, event: &InputEvent) -> bool {
        if self.phase != Phase::Idle {
            tracing::debug!(phase = ?self.phase, ?event, "event dropped during another operation");
            return false;
        }
        match event.channel() {
            Some(ch) if !self.subscribed.contains(&ch) => return false,
            None if !self.editable => return false,
            _ => {}
        }
        self.phase = Phase::Dispatching;
        let handled = match event {
            InputEvent::PlateMouseDown { id, button, point } => self.plate_mouse_down(*id, *button, *point),
            InputEvent::MouseMove { point } => self.drag_move(*point),
            InputEvent::MouseUp { point } => {
                self.drag_move(*point);
                self.finish_drag()
            }
            InputEvent::Click { target: None } => {
                let had = self.selected.is_some();
                self.deselect();
                had
            }
            InputEvent::Click { target: Some(_) } => false,
            InputEvent::KeyDown { key } => self.key_down(key),
            InputEvent::KeyUp { .. } => false,
            InputEvent::ContextMenu { target, point } => self.open_context_menu(*target, *point),
        };
        self.phase = Phase::Idle;
        handled
    }

    fn plate_mouse_down(&mut self, id: PlateId, button: MouseButton, point: Point) -> bool {
        match self.plates.get(&id) {
            Some(p) if !p.flags().frozen => {}
            _ => return false,
        }
        self.select_plate(id);
        if button == MouseButton::Primary && self.drag == DragState::Idle {
            self.begin_drag(id, point);
        }
        true
    }

    fn begin_drag(&mut self, id: PlateId, point: Point) {
        self.subscribe(Channel::DragMove);
        self.subscribe(Channel::DragEnd);
        self.drag = DragState::Dragging { id, last: point };
        for p in self.plates.values_mut() {
            if p.id() == id {
                p.flags_mut().dragging = true;
            } else {
                p.flags_mut().frozen = true;
            }
        }
        tracing::debug!(id, "drag started");
        if let Some(cb) = self.on_drag_start.as_mut() {
            cb(id);
        }
    }

    fn drag_move(&mut self, point: Point) -> bool {
        let DragState::Dragging { id, last } = self.drag else {
            return false;
        };
        let delta = point - last;
        self.drag = DragState::Dragging { id, last: point };
        if delta == Point::ZERO {
            return false;
        }
        if let Some(p) = self.plates.get_mut(&id) {
            p.dmove(delta.x, delta.y);
        }
        self.redraw(id, false);
        true
    }

    /// Release the dragged plate onto the grid. Returns whether the plate
    /// ended on another cell.
    fn finish_drag(&mut self) -> bool {
        let Some(id) = self.end_drag_tracking() else {
            return false;
        };
        let moved = match self.plates.get_mut(&id) {
            Some(p) => {
                p.flags_mut().dragging = false;
                p.snap(&self.grid)
            }
            None => false,
        };
        self.redraw(id, false);
        tracing::debug!(id, moved, "drag finished");
        if moved {
            self.emit(id, ChangeAction::Move);
        }
        moved
    }

    /// Drop a drag without snapping, used when its plate goes away.
    pub(super) fn abort_drag(&mut self) {
        if let Some(id) = self.end_drag_tracking()
            && let Some(p) = self.plates.get_mut(&id)
        {
            p.flags_mut().dragging = false;
            p.reset_drag();
        }
    }

    fn end_drag_tracking(&mut self) -> Option<PlateId> {
        let id = self.drag.plate()?;
        self.unsubscribe(Channel::DragMove);
        self.unsubscribe(Channel::DragEnd);
        self.drag = DragState::Idle;
        let frozen: Vec<PlateId> = self
            .plates
            .values_mut()
            .filter(|p| p.flags().frozen)
            .map(|p| {
                p.flags_mut().frozen = false;
                p.id()
            })
            .collect();
        for other in frozen {
            self.redraw(other, false);
        }
        Some(id)
    }

    fn key_down(&mut self, key: &str) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        let Some(shortcut) = self.bindings.resolve(key) else {
            return false;
        };
        tracing::debug!(id, ?shortcut, "shortcut");
        let result = match shortcut {
            Shortcut::RotateClockwise => self.rotate_plate(id, true),
            Shortcut::RotateCounterClockwise => self.rotate_plate(id, false),
            Shortcut::InputIncrement => self.step_input(id, 1),
            Shortcut::InputDecrement => self.step_input(id, -1),
            Shortcut::Duplicate => self.duplicate_plate(id).map(|_| true),
            Shortcut::Delete => Ok(self.remove_by_user(id)),
            nudge => match nudge.nudge() {
                Some((dx, dy)) => self.shift_plate(id, dx, dy),
                None => Ok(false),
            },
        };
        result.unwrap_or(false)
    }

    fn open_context_menu(&mut self, target: Option<PlateId>, point: Point) -> bool {
        let Some(plate) = target.and_then(|id| self.plates.get(&id)) else {
            return false;
        };
        let items = menu::menu_items(plate.kind(), plate.state().input_f64());
        let id = plate.id();
        match self.menu.as_mut() {
            Some(host) => {
                host.open_menu(id, point, &items);
                true
            }
            None => false,
        }
    }

    /// Apply a clicked context-menu item. Unknown aliases are ignored.
    pub fn handle_menu_click(&mut self, id: PlateId, alias: &str, value: Option<&Value>) -> bool {
        let Some(action) = MenuAction::from_alias(alias, value) else {
            tracing::debug!(id, alias, "ignoring menu item");
            return false;
        };
        if !self.plates.contains_key(&id) {
            return false;
        }
        let result = match action {
            MenuAction::Remove => Ok(self.remove_by_user(id)),
            MenuAction::RotateClockwise => self.rotate_plate(id, true),
            MenuAction::RotateCounterClockwise => self.rotate_plate(id, false),
            MenuAction::Duplicate => self.duplicate_plate(id).map(|_| true),
            MenuAction::SetInputValue(v) => self.set_input_value(id, v),
        };
        result.unwrap_or(false)
    }

    fn remove_by_user(&mut self, id: PlateId) -> bool {
        if !self.plates.contains_key(&id) {
            return false;
        }
        self.dispose(id);
        self.emit(id, ChangeAction::Remove);
        true
    }

    fn subscribe(&mut self, channel: Channel) {
        if self.subscribed.insert(channel) {
            self.events.subscribe(channel);
        }
    }

    fn unsubscribe(&mut self, channel: Channel) {
        if self.subscribed.remove(&channel) {
            self.events.unsubscribe(channel);
        }
    }
}
