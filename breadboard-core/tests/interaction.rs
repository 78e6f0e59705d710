use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use breadboard_core::input::Channel;
use breadboard_core::layer::DragState;
use breadboard_core::menu::MenuItem;
use breadboard_core::{
    CellIdx, ChangeAction, ContextMenuHost, DrawSurface, EventSource, Grid, InputEvent, LayerChange,
    MouseButton, Orientation, PlateId, PlateLayer, PlateSnapshot, PlateSpec, Point,
};
use serde_json::json;

#[derive(Default)]
struct Recorded {
    channels: BTreeSet<Channel>,
    drawn: Vec<PlateSnapshot>,
    erased: Vec<PlateId>,
    menus: Vec<(PlateId, Vec<&'static str>)>,
    changes: Vec<(PlateId, ChangeAction)>,
    drag_starts: Vec<PlateId>,
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Recorded>>);

impl EventSource for Recorder {
    fn subscribe(&mut self, channel: Channel) {
        self.0.borrow_mut().channels.insert(channel);
    }
    fn unsubscribe(&mut self, channel: Channel) {
        self.0.borrow_mut().channels.remove(&channel);
    }
}

impl DrawSurface for Recorder {
    fn draw_plate(&mut self, plate: &PlateSnapshot) {
        self.0.borrow_mut().drawn.push(plate.clone());
    }
    fn erase_plate(&mut self, id: PlateId) {
        self.0.borrow_mut().erased.push(id);
    }
}

impl ContextMenuHost for Recorder {
    fn open_menu(&mut self, plate: PlateId, _at: Point, items: &[MenuItem]) {
        self.0.borrow_mut().menus.push((plate, items.iter().map(|i| i.alias).collect()));
    }
}

fn setup() -> (PlateLayer, Recorder) {
    let rec = Recorder::default();
    let mut layer = PlateLayer::new(Grid::with_dim(10, 10).unwrap())
        .with_surface(rec.clone())
        .with_event_source(rec.clone())
        .with_menu_host(rec.clone());
    let sink = rec.clone();
    layer.on_change(move |c| {
        if let LayerChange::Plate { id, action } = c {
            sink.0.borrow_mut().changes.push((id, action));
        }
    });
    let sink = rec.clone();
    layer.on_drag_start(move |id| sink.0.borrow_mut().drag_starts.push(id));
    (layer, rec)
}

fn place(layer: &mut PlateLayer, kind: &str, x: i32, y: i32) -> PlateId {
    layer
        .add_plate(&PlateSpec::new(kind).at(x, y).facing(Orientation::North))
        .unwrap()
        .unwrap()
}

fn down(id: PlateId, x: f64, y: f64) -> InputEvent {
    InputEvent::PlateMouseDown { id, button: MouseButton::Primary, point: Point::new(x, y) }
}

fn key(k: &str) -> InputEvent {
    InputEvent::KeyDown { key: k.to_string() }
}

#[test]
fn inert_layer_ignores_input() {
    let (mut layer, rec) = setup();
    let id = place(&mut layer, "resistor", 2, 2);
    assert!(!layer.dispatch(&down(id, 50.0, 50.0)));
    assert!(!layer.dispatch(&key("e")));
    assert_eq!(layer.selected(), None);
    assert!(rec.0.borrow().channels.is_empty());
}

#[test]
fn editable_toggle_installs_and_removes_listeners() {
    let (mut layer, rec) = setup();
    let id = place(&mut layer, "resistor", 2, 2);
    layer.set_editable(true);
    let expected: BTreeSet<_> = [Channel::Click, Channel::Keyboard, Channel::ContextMenu].into();
    assert_eq!(rec.0.borrow().channels, expected);

    layer.dispatch(&InputEvent::PlateMouseDown {
        id,
        button: MouseButton::Secondary,
        point: Point::new(50.0, 50.0),
    });
    assert_eq!(layer.selected(), Some(id));

    layer.set_editable(false);
    assert!(rec.0.borrow().channels.is_empty());
    assert_eq!(layer.selected(), None);
    assert!(!layer.get_plate_by_id(id).unwrap().flags().selected);
}

#[test]
fn selection_is_exclusive() {
    let (mut layer, _) = setup();
    let a = place(&mut layer, "resistor", 0, 0);
    let b = place(&mut layer, "LED", 0, 5);
    layer.set_editable(true);
    layer.dispatch(&down(a, 10.0, 10.0));
    layer.dispatch(&InputEvent::MouseUp { point: Point::new(10.0, 10.0) });
    layer.dispatch(&down(b, 10.0, 110.0));
    layer.dispatch(&InputEvent::MouseUp { point: Point::new(10.0, 110.0) });
    assert_eq!(layer.selected(), Some(b));
    assert!(!layer.get_plate_by_id(a).unwrap().flags().selected);
    assert!(layer.get_plate_by_id(b).unwrap().flags().selected);

    // Click on empty space deselects.
    assert!(layer.dispatch(&InputEvent::Click { target: None }));
    assert_eq!(layer.selected(), None);
}

#[test]
fn drag_moves_continuously_then_snaps() {
    let (mut layer, rec) = setup();
    let a = place(&mut layer, "resistor", 2, 2);
    let b = place(&mut layer, "LED", 6, 6);
    layer.set_editable(true);

    assert!(layer.dispatch(&down(a, 50.0, 50.0)));
    assert!(matches!(layer.drag_state(), DragState::Dragging { id, .. } if id == a));
    assert!(rec.0.borrow().channels.contains(&Channel::DragMove));
    assert!(layer.get_plate_by_id(b).unwrap().flags().frozen);
    assert_eq!(rec.0.borrow().drag_starts, vec![a]);

    // A frozen plate ignores its own mousedown.
    assert!(!layer.dispatch(&down(b, 130.0, 130.0)));

    layer.dispatch(&InputEvent::MouseMove { point: Point::new(63.0, 52.0) });
    layer.dispatch(&InputEvent::MouseMove { point: Point::new(88.0, 71.0) });
    let p = layer.get_plate_by_id(a).unwrap();
    assert_eq!(p.position().cell, CellIdx::new(2, 2));
    assert_eq!(p.drag_offset(), Point::new(38.0, 21.0));
    let last = rec.0.borrow().drawn.last().cloned().unwrap();
    assert_eq!(last.origin_px, Point::new(88.0, 71.0));

    layer.dispatch(&InputEvent::MouseUp { point: Point::new(91.0, 70.0) });
    let p = layer.get_plate_by_id(a).unwrap();
    assert_eq!(p.position().cell, CellIdx::new(4, 3));
    assert_eq!(p.drag_offset(), Point::ZERO);
    assert!(!p.flags().dragging);
    assert_eq!(layer.drag_state(), DragState::Idle);
    assert!(!layer.get_plate_by_id(b).unwrap().flags().frozen);
    assert!(!rec.0.borrow().channels.contains(&Channel::DragMove));
    assert!(!rec.0.borrow().channels.contains(&Channel::DragEnd));
    assert_eq!(rec.0.borrow().changes, vec![(a, ChangeAction::Move)]);

    // After release, movement no longer reaches the plate.
    assert!(!layer.dispatch(&InputEvent::MouseMove { point: Point::new(200.0, 200.0) }));
}

#[test]
fn drop_outside_the_grid_returns_plate() {
    let (mut layer, _) = setup();
    let a = place(&mut layer, "resistor", 2, 2);
    layer.set_editable(true);
    layer.dispatch(&down(a, 50.0, 50.0));
    layer.dispatch(&InputEvent::MouseUp { point: Point::new(600.0, 50.0) });
    assert_eq!(layer.get_plate_by_id(a).unwrap().position().cell, CellIdx::new(2, 2));
}

#[test]
fn keyboard_shortcuts_act_on_selection() {
    let (mut layer, rec) = setup();
    let id = place(&mut layer, "rheostat", 3, 3);
    layer.set_editable(true);

    // Nothing selected yet.
    assert!(!layer.dispatch(&key("e")));

    layer.dispatch(&down(id, 70.0, 70.0));
    layer.dispatch(&InputEvent::MouseUp { point: Point::new(70.0, 70.0) });
    assert!(layer.dispatch(&key("e")));
    assert_eq!(layer.get_plate_by_id(id).unwrap().position().orientation, Orientation::East);
    assert!(layer.dispatch(&key("Q")));
    assert_eq!(layer.get_plate_by_id(id).unwrap().position().orientation, Orientation::North);
    assert!(layer.dispatch(&key("ArrowRight")));
    assert_eq!(layer.get_plate_by_id(id).unwrap().position().cell, CellIdx::new(4, 3));
    assert!(layer.dispatch(&key("+")));
    assert!(layer.dispatch(&key("+")));
    assert!(layer.dispatch(&key("-")));
    assert_eq!(layer.get_plate_by_id(id).unwrap().state().input_f64(), Some(1.0));
    assert!(!layer.dispatch(&InputEvent::KeyUp { key: "e".into() }));

    assert!(layer.dispatch(&key("d")));
    assert_eq!(layer.len(), 2);

    assert!(layer.dispatch(&key("Delete")));
    assert_eq!(layer.len(), 1);
    assert!(!layer.contains(id));
    assert_eq!(layer.selected(), None);
    assert!(rec.0.borrow().erased.contains(&id));

    let changes = rec.0.borrow().changes.clone();
    assert_eq!(changes.first(), Some(&(id, ChangeAction::Rotate)));
    assert_eq!(changes.last(), Some(&(id, ChangeAction::Remove)));
    assert!(changes.contains(&(id, ChangeAction::Move)));
    assert!(changes.contains(&(id, ChangeAction::State)));
}

#[test]
fn context_menu_opens_and_dispatches() {
    let (mut layer, rec) = setup();
    let id = place(&mut layer, "photoresistor", 1, 1);
    let led = place(&mut layer, "LED", 5, 5);
    layer.set_editable(true);

    assert!(!layer.dispatch(&InputEvent::ContextMenu { target: None, point: Point::ZERO }));
    assert!(layer.dispatch(&InputEvent::ContextMenu { target: Some(id), point: Point::ZERO }));
    assert!(layer.dispatch(&InputEvent::ContextMenu { target: Some(led), point: Point::ZERO }));
    {
        let r = rec.0.borrow();
        assert_eq!(r.menus[0].0, id);
        assert!(r.menus[0].1.contains(&"input_value"));
        assert!(!r.menus[1].1.contains(&"input_value"));
    }

    assert!(layer.handle_menu_click(id, "input_value", Some(&json!(300))));
    assert_eq!(layer.get_plate_by_id(id).unwrap().state().input_f64(), Some(255.0));
    assert!(layer.handle_menu_click(id, "rotate_cw", None));
    assert_eq!(layer.get_plate_by_id(id).unwrap().position().orientation, Orientation::East);
    assert!(!layer.handle_menu_click(id, "self_destruct", None));
    assert!(layer.handle_menu_click(led, "remove", None));
    assert!(!layer.contains(led));
    assert!(!layer.handle_menu_click(led, "remove", None));
}

#[test]
fn removing_the_dragged_plate_ends_the_drag() {
    let (mut layer, rec) = setup();
    let a = place(&mut layer, "resistor", 2, 2);
    let b = place(&mut layer, "dummy", 7, 7);
    layer.set_editable(true);
    layer.dispatch(&down(a, 50.0, 50.0));
    layer.remove_plate(a).unwrap();
    assert_eq!(layer.drag_state(), DragState::Idle);
    assert!(!layer.get_plate_by_id(b).unwrap().flags().frozen);
    assert!(!rec.0.borrow().channels.contains(&Channel::DragMove));
}
