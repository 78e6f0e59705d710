//! Input events, listener channels and keyboard bindings.
//!
//! The layer never reaches for a global event target. The host injects an
//! [`EventSource`] and forwards whatever arrives on the subscribed channels
//! to [`PlateLayer::dispatch`](crate::layer::PlateLayer::dispatch).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::plate::PlateId;

/// Document-level listener groups the layer installs and removes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// Click anywhere; a click on empty space deselects.
    Click,
    /// keydown and keyup.
    Keyboard,
    ContextMenu,
    /// mousemove while a plate is dragged.
    DragMove,
    /// mouseup ending a drag.
    DragEnd,
}

/// Channels installed for as long as the layer is editable.
pub const EDIT_CHANNELS: [Channel; 3] = [Channel::Click, Channel::Keyboard, Channel::ContextMenu];

pub trait EventSource {
    fn subscribe(&mut self, channel: Channel);
    fn unsubscribe(&mut self, channel: Channel);
}

/// Event source for hosts that push events without listener bookkeeping.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSource;

impl EventSource for NullEventSource {
    fn subscribe(&mut self, _channel: Channel) {}
    fn unsubscribe(&mut self, _channel: Channel) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Auxiliary,
    Secondary,
}

impl MouseButton {
    /// DOM `MouseEvent.button` numbering.
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => MouseButton::Primary,
            1 => MouseButton::Auxiliary,
            _ => MouseButton::Secondary,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Delivered by the plate's own listener, not a document channel.
    PlateMouseDown { id: PlateId, button: MouseButton, point: Point },
    MouseMove { point: Point },
    MouseUp { point: Point },
    Click { target: Option<PlateId> },
    KeyDown { key: String },
    KeyUp { key: String },
    ContextMenu { target: Option<PlateId>, point: Point },
}

impl InputEvent {
    /// Document channel that must be subscribed for the event to count.
    pub fn channel(&self) -> Option<Channel> {
        match self {
            InputEvent::PlateMouseDown { .. } => None,
            InputEvent::MouseMove { .. } => Some(Channel::DragMove),
            InputEvent::MouseUp { .. } => Some(Channel::DragEnd),
            InputEvent::Click { .. } => Some(Channel::Click),
            InputEvent::KeyDown { .. } | InputEvent::KeyUp { .. } => Some(Channel::Keyboard),
            InputEvent::ContextMenu { .. } => Some(Channel::ContextMenu),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shortcut {
    RotateClockwise,
    RotateCounterClockwise,
    NudgeLeft,
    NudgeRight,
    NudgeUp,
    NudgeDown,
    InputIncrement,
    InputDecrement,
    Duplicate,
    Delete,
}

impl Shortcut {
    /// Cell delta of the nudge shortcuts.
    pub fn nudge(self) -> Option<(i32, i32)> {
        match self {
            Shortcut::NudgeLeft => Some((-1, 0)),
            Shortcut::NudgeRight => Some((1, 0)),
            Shortcut::NudgeUp => Some((0, -1)),
            Shortcut::NudgeDown => Some((0, 1)),
            _ => None,
        }
    }
}

/// Key (DOM `KeyboardEvent.key`) to shortcut map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBindings(BTreeMap<String, Shortcut>);

impl KeyBindings {
    pub fn empty() -> Self {
        KeyBindings(BTreeMap::new())
    }

    pub fn bind(mut self, key: &str, shortcut: Shortcut) -> Self {
        self.0.insert(key.to_string(), shortcut);
        self
    }

    /// Exact key first, then the lowercase form so Shift does not matter
    /// for letter bindings.
    pub fn resolve(&self, key: &str) -> Option<Shortcut> {
        self.0
            .get(key)
            .or_else(|| self.0.get(&key.to_lowercase()))
            .copied()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings::empty()
            .bind("e", Shortcut::RotateClockwise)
            .bind("q", Shortcut::RotateCounterClockwise)
            .bind("ArrowLeft", Shortcut::NudgeLeft)
            .bind("ArrowRight", Shortcut::NudgeRight)
            .bind("ArrowUp", Shortcut::NudgeUp)
            .bind("ArrowDown", Shortcut::NudgeDown)
            .bind("+", Shortcut::InputIncrement)
            .bind("=", Shortcut::InputIncrement)
            .bind("-", Shortcut::InputDecrement)
            .bind("d", Shortcut::Duplicate)
            .bind("Delete", Shortcut::Delete)
            .bind("Backspace", Shortcut::Delete)
    }
}
