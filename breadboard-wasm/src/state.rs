use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsValue;

use breadboard_core::PlateLayer;

/// The layer shared between the exported handle and the DOM callbacks.
pub type Shared = Rc<RefCell<PlateLayer>>;
pub type Handle = Weak<RefCell<PlateLayer>>;

/// Run `f` on the layer unless it is already borrowed further up the stack,
/// e.g. by a change callback calling back into the exported API.
pub fn with_layer<R>(layer: &Shared, f: impl FnOnce(&mut PlateLayer) -> R) -> Result<R, JsValue> {
    let mut guard = layer
        .try_borrow_mut()
        .map_err(|_| JsValue::from_str("plate layer is busy"))?;
    Ok(f(&mut guard))
}

/// Callback flavour of [`with_layer`]: a dropped layer or a busy one simply
/// swallows the event.
pub fn dispatch_from(handle: &Handle, f: impl FnOnce(&mut PlateLayer)) {
    if let Some(layer) = handle.upgrade()
        && let Ok(mut guard) = layer.try_borrow_mut()
    {
        f(&mut guard);
    }
}
