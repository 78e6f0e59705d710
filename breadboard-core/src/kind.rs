//! Closed catalog of plate kinds and the alias registry.
//!
//! Every kind answers the same questions: its wire alias, the cells it covers
//! in the North frame, whether a 180° turn is visually the same plate, its
//! default properties and whether it has a user-adjustable input.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value, json};

use crate::error::{DrawError, RegistryError};
use crate::geometry::CellIdx;

pub type Properties = Map<String, Value>;

/// Upper bound for `length`-driven kinds.
pub const MAX_LENGTH: u64 = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlateKind {
    Bridge,
    Resistor,
    Photoresistor,
    Rheostat,
    Capacitor,
    Button,
    Switch,
    Led,
    Diode,
    Transistor,
    Buzzer,
    Strip,
    Dummy,
}

/// Numeric range of an adjustable input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl InputRange {
    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }
}

const TWO: &[CellIdx] = &[CellIdx::new(0, 0), CellIdx::new(1, 0)];
const THREE: &[CellIdx] = &[CellIdx::new(0, 0), CellIdx::new(1, 0), CellIdx::new(2, 0)];
const TEE: &[CellIdx] = &[
    CellIdx::new(0, 0),
    CellIdx::new(1, 0),
    CellIdx::new(2, 0),
    CellIdx::new(1, 1),
];
const ONE: &[CellIdx] = &[CellIdx::new(0, 0)];

impl PlateKind {
    pub const ALL: [PlateKind; 13] = [
        PlateKind::Bridge,
        PlateKind::Resistor,
        PlateKind::Photoresistor,
        PlateKind::Rheostat,
        PlateKind::Capacitor,
        PlateKind::Button,
        PlateKind::Switch,
        PlateKind::Led,
        PlateKind::Diode,
        PlateKind::Transistor,
        PlateKind::Buzzer,
        PlateKind::Strip,
        PlateKind::Dummy,
    ];

    pub fn alias(self) -> &'static str {
        match self {
            PlateKind::Bridge => "bridge",
            PlateKind::Resistor => "resistor",
            PlateKind::Photoresistor => "photoresistor",
            PlateKind::Rheostat => "rheostat",
            PlateKind::Capacitor => "capacitor",
            PlateKind::Button => "button",
            PlateKind::Switch => "switch",
            PlateKind::Led => "LED",
            PlateKind::Diode => "diode",
            PlateKind::Transistor => "transistor",
            PlateKind::Buzzer => "buzzer",
            PlateKind::Strip => "strip",
            PlateKind::Dummy => "dummy",
        }
    }

    /// Registry lookup. An unknown alias is never silently skipped.
    pub fn from_alias(alias: &str) -> Result<Self, RegistryError> {
        Self::ALL
            .into_iter()
            .find(|k| k.alias() == alias)
            .ok_or_else(|| RegistryError::TypeNotFound(alias.to_string()))
    }

    /// Polarity-free kinds look the same after a half turn.
    pub fn is_reversible(self) -> bool {
        matches!(
            self,
            PlateKind::Bridge
                | PlateKind::Resistor
                | PlateKind::Photoresistor
                | PlateKind::Capacitor
                | PlateKind::Button
                | PlateKind::Strip
                | PlateKind::Dummy
        )
    }

    pub fn default_properties(self) -> Properties {
        let v = match self {
            PlateKind::Bridge => json!({ "length": 2 }),
            PlateKind::Strip => json!({ "length": 4 }),
            PlateKind::Resistor => json!({ "resistance": 200 }),
            PlateKind::Rheostat => json!({ "resistance_max": 10000 }),
            PlateKind::Capacitor => json!({ "capacitance": 0.0001 }),
            PlateKind::Led => json!({ "colour": "red" }),
            _ => json!({}),
        };
        match v {
            Value::Object(map) => map,
            _ => Properties::new(),
        }
    }

    /// Defaults overlaid with the supplied values.
    pub fn normalize_properties(self, props: &Properties) -> Properties {
        let mut out = self.default_properties();
        for (k, v) in props {
            out.insert(k.clone(), v.clone());
        }
        out
    }

    /// Cells covered in the North frame, relative to the origin.
    pub fn surface(self, props: &Properties) -> Result<Vec<CellIdx>, DrawError> {
        match self {
            PlateKind::Bridge | PlateKind::Strip => {
                let len = self.length(props)?;
                Ok((0..len as i32).map(|x| CellIdx::new(x, 0)).collect())
            }
            PlateKind::Rheostat | PlateKind::Transistor => Ok(TEE.to_vec()),
            PlateKind::Switch => Ok(THREE.to_vec()),
            PlateKind::Dummy => Ok(ONE.to_vec()),
            _ => Ok(TWO.to_vec()),
        }
    }

    fn length(self, props: &Properties) -> Result<u64, DrawError> {
        let invalid = |reason: String| DrawError::InvalidProperty {
            alias: self.alias(),
            key: "length".to_string(),
            reason,
        };
        let Some(v) = props.get("length") else {
            return Err(invalid("missing".to_string()));
        };
        match v.as_u64() {
            Some(n) if (1..=MAX_LENGTH).contains(&n) => Ok(n),
            _ => Err(invalid(format!("expected an integer in 1..={MAX_LENGTH}, got {v}"))),
        }
    }

    pub fn input_range(self) -> Option<InputRange> {
        match self {
            PlateKind::Photoresistor => Some(InputRange { min: 0.0, max: 255.0, step: 1.0 }),
            PlateKind::Rheostat => Some(InputRange { min: 0.0, max: 100.0, step: 1.0 }),
            _ => None,
        }
    }
}

impl fmt::Display for PlateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

impl FromStr for PlateKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlateKind::from_alias(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alias_resolves_back() {
        for k in PlateKind::ALL {
            assert_eq!(PlateKind::from_alias(k.alias()), Ok(k));
        }
    }

    #[test]
    fn unknown_alias_is_type_not_found() {
        assert_eq!(
            PlateKind::from_alias("flux_capacitor"),
            Err(RegistryError::TypeNotFound("flux_capacitor".into()))
        );
    }

    #[test]
    fn bridge_surface_follows_length() {
        let mut props = PlateKind::Bridge.default_properties();
        assert_eq!(PlateKind::Bridge.surface(&props).unwrap().len(), 2);
        props.insert("length".into(), json!(5));
        let surface = PlateKind::Bridge.surface(&props).unwrap();
        assert_eq!(surface.last(), Some(&CellIdx::new(4, 0)));
        props.insert("length".into(), json!(0));
        assert!(matches!(
            PlateKind::Bridge.surface(&props),
            Err(DrawError::InvalidProperty { .. })
        ));
    }

    #[test]
    fn normalize_keeps_explicit_values() {
        let mut props = Properties::new();
        props.insert("resistance".into(), json!(1000));
        let n = PlateKind::Resistor.normalize_properties(&props);
        assert_eq!(n.get("resistance"), Some(&json!(1000)));
        let n = PlateKind::Resistor.normalize_properties(&Properties::new());
        assert_eq!(n.get("resistance"), Some(&json!(200)));
    }
}
