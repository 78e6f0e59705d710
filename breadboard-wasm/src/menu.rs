use js_sys::Function;
use wasm_bindgen::JsValue;

use breadboard_core::{ContextMenuHost, MenuItem, PlateId, Point};

use crate::utils::log;

/// Forwards menu requests to page callbacks. The page answers a click with
/// `BoardLayer.handleMenuClick`.
pub struct JsMenuHost {
    open: Function,
    close: Option<Function>,
}

impl JsMenuHost {
    pub fn new(open: Function, close: Option<Function>) -> Self {
        JsMenuHost { open, close }
    }
}

impl ContextMenuHost for JsMenuHost {
    fn open_menu(&mut self, plate: PlateId, at: Point, items: &[MenuItem]) {
        let items = match serde_json::to_string(items)
            .map_err(|e| JsValue::from_str(&e.to_string()))
            .and_then(|s| js_sys::JSON::parse(&s))
        {
            Ok(v) => v,
            Err(err) => {
                log(&format!("Failed to encode menu items: {:?}", err));
                return;
            }
        };
        let args = js_sys::Array::of4(
            &JsValue::from(plate),
            &JsValue::from(at.x),
            &JsValue::from(at.y),
            &items,
        );
        if let Err(err) = self.open.apply(&JsValue::NULL, &args) {
            log(&format!("Context menu callback failed: {:?}", err));
        }
    }

    fn close_menu(&mut self) {
        if let Some(close) = &self.close
            && let Err(err) = close.call0(&JsValue::NULL)
        {
            log(&format!("Context menu close callback failed: {:?}", err));
        }
    }
}
