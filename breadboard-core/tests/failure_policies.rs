//! The layer reports problems three different ways. These tests pin which
//! way each operation uses, including what ends up in the log.

use std::sync::{Arc, Mutex};

use breadboard_core::{
    Grid, LayerError, Orientation, PlateLayer, PlateSpec, PlateState, RegistryError, SerializedPlate,
};
use serde_json::json;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Clone, Debug)]
struct CapturedEvent {
    level: Level,
    message: String,
}

#[derive(Clone, Default)]
struct Capture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Capture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

fn with_capture<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let capture = Capture::default();
    let events = capture.events.clone();
    let subscriber = tracing_subscriber::registry().with(capture);
    tracing::subscriber::with_default(subscriber, f);
    let out = events.lock().unwrap().clone();
    out
}

fn warnings(events: &[CapturedEvent]) -> Vec<&str> {
    events
        .iter()
        .filter(|e| e.level == Level::WARN)
        .map(|e| e.message.as_str())
        .collect()
}

#[test]
fn placement_failure_logs_a_warning_and_returns_nothing() {
    let events = with_capture(|| {
        let mut layer = PlateLayer::new(Grid::with_dim(10, 10).unwrap());
        let spec = PlateSpec::new("switch").at(8, 0).facing(Orientation::North);
        assert_eq!(layer.add_plate(&spec).unwrap(), None);
        assert!(layer.is_empty());
    });
    assert_eq!(warnings(&events), vec!["could not place plate"]);
}

#[test]
fn suppressed_placement_failure_is_silent() {
    let events = with_capture(|| {
        let mut layer = PlateLayer::new(Grid::with_dim(10, 10).unwrap());
        let spec = PlateSpec::new("switch").at(8, 0).facing(Orientation::North).quiet();
        assert_eq!(layer.add_plate(&spec).unwrap(), None);
    });
    assert!(warnings(&events).is_empty());
}

#[test]
fn state_of_missing_plate_logs_and_returns_false() {
    let events = with_capture(|| {
        let mut layer = PlateLayer::new(Grid::with_dim(10, 10).unwrap());
        assert!(!layer.set_plate_state(99, &PlateState::with_input(json!(5))));
    });
    assert_eq!(warnings(&events), vec!["cannot set state of a missing plate"]);
}

#[test]
fn fail_fast_errors_do_not_log_or_mutate() {
    let events = with_capture(|| {
        let mut layer = PlateLayer::new(Grid::with_dim(10, 10).unwrap());
        layer
            .add_plate(&PlateSpec::new("LED").at(1, 1).facing(Orientation::North))
            .unwrap();

        let err = layer.add_plate(&PlateSpec::new("flux_capacitor").at(0, 0).facing(Orientation::North));
        assert_eq!(
            err,
            Err(LayerError::Registry(RegistryError::TypeNotFound("flux_capacitor".into())))
        );
        let no_orientation = PlateSpec::new("LED").at(3, 3);
        assert!(matches!(layer.add_plate(&no_orientation), Err(LayerError::InvalidArgument(_))));
        assert_eq!(layer.remove_plate(42), Err(LayerError::PlateNotFound(42)));
        assert_eq!(layer.len(), 1);
    });
    assert!(warnings(&events).is_empty());
}

#[test]
fn type_clash_on_an_id_is_logged_as_an_error() {
    let events = with_capture(|| {
        let mut layer = PlateLayer::new(Grid::with_dim(10, 10).unwrap());
        let first = SerializedPlate::new(4, "resistor", 0, 0, Orientation::North);
        let second = SerializedPlate::new(4, "capacitor", 5, 5, Orientation::North);
        layer.add_plate_serialized(&first).unwrap();
        assert_eq!(layer.add_plate_serialized(&second).unwrap(), Some(4));
        assert_eq!(layer.get_plate_by_id(4).unwrap().alias(), "capacitor");
    });
    assert!(events.iter().any(|e| e.level == Level::ERROR));
}

#[test]
fn error_messages_name_the_culprit() {
    let mut layer = PlateLayer::new(Grid::with_dim(10, 10).unwrap());
    let err = layer
        .add_plate(&PlateSpec::new("tesla_coil").at(0, 0).facing(Orientation::North))
        .unwrap_err();
    assert!(err.to_string().contains("tesla_coil"));
    assert!(layer.remove_plate(7).unwrap_err().to_string().contains('7'));
}
