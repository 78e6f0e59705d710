use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, MouseEvent};

use breadboard_core::{PlateId, Point};

/// Log a message to the browser console.
pub fn log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

pub fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Mouse position relative to the top-left corner of `root`.
pub fn event_point(e: &MouseEvent, root: &Element) -> Point {
    let rect = root.get_bounding_client_rect();
    Point::new(e.client_x() as f64 - rect.left(), e.client_y() as f64 - rect.top())
}

/// Id of the plate group an event originated in, if any.
pub fn event_plate(e: &Event) -> Option<PlateId> {
    let target = e.target()?.dyn_into::<Element>().ok()?;
    let group = target.closest("[data-plate]").ok()??;
    group.get_attribute("data-plate")?.parse().ok()
}
