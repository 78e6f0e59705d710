use breadboard_core::{
    Composition, Grid, LayerChange, Orientation, PlateLayer, SerializedPlate, match_compositions,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

const LESSON: &str = r#"{
  "grid": { "cols": 12, "rows": 8 },
  "plates": [
    { "id": 1, "type": "bridge", "position": { "cell": { "x": 0, "y": 0 }, "orientation": "E" },
      "properties": { "length": 3 } },
    { "id": 2, "type": "resistor", "position": { "cell": { "x": 4, "y": 2 }, "orientation": "N" },
      "properties": { "resistance": 1000 } },
    { "id": 3, "type": "photoresistor", "position": { "cell": { "x": 7, "y": 5 }, "orientation": "W" },
      "dynamic": { "input": 128 } },
    { "id": 5, "type": "LED", "position": { "cell": { "x": 10, "y": 1 }, "orientation": "S" } }
  ]
}"#;

fn load(text: &str) -> (PlateLayer, Composition) {
    let composition: Composition = serde_json::from_str(text).unwrap();
    let grid = Grid::from_spec(&composition.grid).unwrap();
    let mut layer = PlateLayer::new(grid);
    layer.set_plates(&composition.plates).unwrap();
    (layer, composition)
}

#[test]
fn composition_file_loads_and_serializes_back() {
    let (layer, composition) = load(LESSON);
    assert_eq!(layer.len(), 4);
    assert!(layer.intersections().is_empty());

    let out = layer.get_serialized_plates();
    for (before, after) in composition.plates.iter().zip(&out) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.kind, after.kind);
        assert_eq!(before.position, after.position);
        for (k, v) in &before.properties {
            assert_eq!(after.properties.get(k), Some(v), "{} lost {k}", before.kind);
        }
    }
    assert_eq!(out[2].dynamic.as_ref().and_then(|d| d.input.clone()), Some(json!(128)));

    // A second load of what we wrote is a no-op.
    let (mut again, _) = load(LESSON);
    assert!(!again.set_plates(&out).unwrap());
}

#[test]
fn serialized_json_uses_the_wire_names() {
    let (layer, _) = load(LESSON);
    let v = serde_json::to_value(layer.get_serialized_plates()).unwrap();
    assert_eq!(v[0]["type"], "bridge");
    assert_eq!(v[0]["position"]["orientation"], "E");
    assert_eq!(v[3]["type"], "LED");
    assert_eq!(v[3]["position"]["cell"], json!({ "x": 10, "y": 1 }));
}

#[test]
fn ids_keep_counting_after_loaded_plates() {
    let (mut layer, _) = load(LESSON);
    let id = layer
        .add_plate(&breadboard_core::PlateSpec::new("dummy").at(11, 7).facing(Orientation::North))
        .unwrap();
    assert_eq!(id, Some(6));
}

#[test]
fn bulk_change_carries_the_whole_composition() {
    let composition: Composition = serde_json::from_str(LESSON).unwrap();
    let mut layer = PlateLayer::new(Grid::from_spec(&composition.grid).unwrap());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    layer.on_change(move |change| {
        if let LayerChange::Composition(plates) = change {
            sink.borrow_mut().push(plates.keys().copied().collect::<Vec<_>>());
        }
    });
    layer.set_plates(&composition.plates).unwrap();
    layer.set_plates(&composition.plates[1..]).unwrap();
    assert_eq!(*seen.borrow(), vec![vec![1, 2, 3, 5], vec![2, 3, 5]]);
}

#[test]
fn student_solution_is_graded_against_the_lesson() {
    let (_, reference) = load(LESSON);
    let mut solution = reference.plates.clone();
    // Same cells, built from the other end.
    solution[0] = SerializedPlate::new(20, "bridge", 0, 2, Orientation::West).with_property("length", json!(3));
    // Right cells, wrong direction for a polar part.
    solution[3] = SerializedPlate::new(21, "LED", 10, 2, Orientation::North);

    let report = match_compositions(&reference.plates, &solution).unwrap();
    assert_eq!(report.matched.len(), 3);
    assert!(report.matched.contains(&(1, 20)));
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].id, 5);
    assert_eq!(report.extra[0].id, 21);
}
