//! Wire/persisted shapes: single plates, whole compositions and the
//! prototype list consumed by random generation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::geometry::{CellIdx, Orientation, Position};
use crate::grid::GridSpec;
use crate::kind::Properties;
use crate::plate::{PlateId, PlateState};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedPlate {
    pub id: PlateId,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Position,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<PlateState>,
}

impl SerializedPlate {
    pub fn new(id: PlateId, kind: &str, x: i32, y: i32, orientation: Orientation) -> Self {
        SerializedPlate {
            id,
            kind: kind.to_string(),
            position: Position::new(CellIdx::new(x, y), orientation),
            properties: Properties::new(),
            dynamic: None,
        }
    }

    pub fn with_property(mut self, key: &str, value: Value) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.dynamic.get_or_insert_with(PlateState::default).input = Some(input);
        self
    }
}

/// A grid together with the plates placed on it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default)]
    pub plates: Vec<SerializedPlate>,
}

/// One entry of a random-generation pool: `quantity` units of `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatePrototype {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub properties: Properties,
}

fn one() -> u32 {
    1
}

impl PlatePrototype {
    pub fn new(kind: &str, quantity: u32) -> Self {
        PlatePrototype { kind: kind.to_string(), quantity, properties: Properties::new() }
    }
}
