//! Bridge to the external per-plate context menu.
//!
//! The widget itself lives outside the core. The layer only tells the host
//! which items a plate offers and maps clicked item aliases back to actions.

use serde::Serialize;
use serde_json::Value;

use crate::geometry::Point;
use crate::kind::{InputRange, PlateKind};
use crate::plate::PlateId;

pub const ALIAS_REMOVE: &str = "remove";
pub const ALIAS_ROTATE_CW: &str = "rotate_cw";
pub const ALIAS_ROTATE_CCW: &str = "rotate_ccw";
pub const ALIAS_DUPLICATE: &str = "duplicate";
pub const ALIAS_INPUT_VALUE: &str = "input_value";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MenuAction {
    Remove,
    RotateClockwise,
    RotateCounterClockwise,
    Duplicate,
    SetInputValue(f64),
}

impl MenuAction {
    /// Closed dispatch table. Unknown aliases, and an input item without a
    /// numeric value, yield `None`.
    pub fn from_alias(alias: &str, value: Option<&Value>) -> Option<Self> {
        match alias {
            ALIAS_REMOVE => Some(MenuAction::Remove),
            ALIAS_ROTATE_CW => Some(MenuAction::RotateClockwise),
            ALIAS_ROTATE_CCW => Some(MenuAction::RotateCounterClockwise),
            ALIAS_DUPLICATE => Some(MenuAction::Duplicate),
            ALIAS_INPUT_VALUE => value.and_then(number_of).map(MenuAction::SetInputValue),
            _ => None,
        }
    }
}

fn number_of(v: &Value) -> Option<f64> {
    match v {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MenuItem {
    pub alias: &'static str,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<MenuInput>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MenuInput {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

impl MenuInput {
    fn new(range: InputRange, value: f64) -> Self {
        MenuInput { min: range.min, max: range.max, step: range.step, value }
    }
}

/// Items offered for a plate of `kind` whose input currently reads `input`.
pub fn menu_items(kind: PlateKind, input: Option<f64>) -> Vec<MenuItem> {
    let mut items = Vec::with_capacity(5);
    if let Some(range) = kind.input_range() {
        items.push(MenuItem {
            alias: ALIAS_INPUT_VALUE,
            label: "Input value",
            input: Some(MenuInput::new(range, input.unwrap_or(range.min))),
        });
    }
    items.push(MenuItem { alias: ALIAS_ROTATE_CW, label: "Rotate clockwise", input: None });
    items.push(MenuItem { alias: ALIAS_ROTATE_CCW, label: "Rotate counter-clockwise", input: None });
    items.push(MenuItem { alias: ALIAS_DUPLICATE, label: "Duplicate", input: None });
    items.push(MenuItem { alias: ALIAS_REMOVE, label: "Remove", input: None });
    items
}

/// The external menu widget.
pub trait ContextMenuHost {
    fn open_menu(&mut self, plate: PlateId, at: Point, items: &[MenuItem]);
    fn close_menu(&mut self) {}
}
