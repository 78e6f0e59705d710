use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use breadboard_core::{
    Grid, GridSpec, KeyBindings, LayerChange, Orientation, Plate, PlateId, PlateLayer,
    PlatePrototype, PlateSpec, PlateState, Properties, RandomConfig, SerializedPlate,
};

mod events;
mod menu;
mod state;
mod svg;
mod utils;

use events::DomEvents;
use menu::JsMenuHost;
use state::{Handle, Shared, with_layer};
use svg::SvgSurface;
use utils::{js_err, log};

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let text = serde_json::to_string(value).map_err(js_err)?;
    js_sys::JSON::parse(&text)
}

fn parse<T: serde::de::DeserializeOwned>(what: &str, text: &str) -> Result<T, JsValue> {
    serde_json::from_str(text).map_err(|e| JsValue::from_str(&format!("invalid {what}: {e}")))
}

/// Breadboard plate layer bound to an `<svg>` (or `<g>`) element.
#[wasm_bindgen]
pub struct BoardLayer {
    layer: Shared,
}

#[wasm_bindgen]
impl BoardLayer {
    /// `grid` is a JSON `{cols, rows, cell_px?, gap_px?}`; 10x10 if omitted.
    /// `keys` maps key names to shortcut names and replaces the defaults.
    /// `open_menu(id, x, y, items)` and `close_menu()` drive the page's
    /// context-menu widget.
    #[wasm_bindgen(constructor)]
    pub fn new(
        root_id: &str,
        grid: Option<String>,
        keys: Option<String>,
        open_menu: Option<Function>,
        close_menu: Option<Function>,
    ) -> Result<BoardLayer, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let root = document
            .get_element_by_id(root_id)
            .ok_or_else(|| JsValue::from_str(&format!("board root #{root_id} not found")))?;
        let spec = match grid {
            Some(text) => parse::<GridSpec>("grid", &text)?,
            None => GridSpec::default(),
        };
        let grid = Grid::from_spec(&spec).map_err(js_err)?;
        let bindings = match keys {
            Some(text) => parse::<KeyBindings>("key bindings", &text)?,
            None => KeyBindings::default(),
        };

        let layer = Rc::new_cyclic(|handle: &Handle| {
            let mut layer = PlateLayer::new(grid.clone())
                .with_surface(SvgSurface::new(document.clone(), root.clone(), grid.clone(), handle.clone()))
                .with_event_source(DomEvents::new(document.clone(), root.clone(), handle.clone()))
                .with_key_bindings(bindings);
            if let Some(open) = open_menu {
                layer = layer.with_menu_host(JsMenuHost::new(open, close_menu));
            }
            RefCell::new(layer)
        });
        log(&format!("Board layer ready: {}x{}", spec.cols, spec.rows));
        Ok(BoardLayer { layer })
    }

    /// `cb(kind, payload)`: kind is `state`, `rotate`, `move` or `remove`
    /// with a plate id, or `composition` with the full plate list.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, cb: Function) -> Result<(), JsValue> {
        with_layer(&self.layer, |l| {
            l.on_change(move |change| {
                let (kind, payload) = match change {
                    LayerChange::Plate { id, action } => (action.as_str(), Ok(JsValue::from(id))),
                    LayerChange::Composition(plates) => {
                        let list: Vec<SerializedPlate> = plates.values().map(Plate::serialize).collect();
                        ("composition", to_js(&list))
                    }
                };
                let result = payload.and_then(|p| cb.call2(&JsValue::NULL, &JsValue::from_str(kind), &p));
                if let Err(err) = result {
                    log(&format!("Change callback failed: {:?}", err));
                }
            })
        })
    }

    #[wasm_bindgen(js_name = onDragStart)]
    pub fn on_drag_start(&self, cb: Function) -> Result<(), JsValue> {
        with_layer(&self.layer, |l| {
            l.on_drag_start(move |id| {
                if let Err(err) = cb.call1(&JsValue::NULL, &JsValue::from(id)) {
                    log(&format!("Drag callback failed: {:?}", err));
                }
            })
        })
    }

    /// Returns the new plate id, or `undefined` when the plate could not be
    /// placed. Missing coordinates and unknown types throw.
    #[wasm_bindgen(js_name = addPlate)]
    #[allow(clippy::too_many_arguments)]
    pub fn add_plate(
        &self,
        kind: &str,
        x: Option<i32>,
        y: Option<i32>,
        orientation: Option<String>,
        id: Option<PlateId>,
        properties: Option<String>,
        animate: Option<bool>,
        suppress_error: Option<bool>,
    ) -> Result<Option<PlateId>, JsValue> {
        let orientation = orientation
            .map(|o| o.parse::<Orientation>())
            .transpose()
            .map_err(js_err)?;
        let properties = match properties {
            Some(text) => parse::<Properties>("properties", &text)?,
            None => Properties::new(),
        };
        let spec = PlateSpec {
            kind: kind.to_string(),
            x,
            y,
            orientation,
            id,
            properties,
            animate: animate.unwrap_or(false),
            suppress_error: suppress_error.unwrap_or(false),
        };
        with_layer(&self.layer, |l| l.add_plate(&spec))?.map_err(js_err)
    }

    #[wasm_bindgen(js_name = removePlate)]
    pub fn remove_plate(&self, id: PlateId) -> Result<(), JsValue> {
        with_layer(&self.layer, |l| l.remove_plate(id))?.map_err(js_err)
    }

    #[wasm_bindgen(js_name = removeAllPlates)]
    pub fn remove_all_plates(&self) -> Result<(), JsValue> {
        with_layer(&self.layer, |l| l.remove_all_plates())
    }

    #[wasm_bindgen(js_name = getPlateById)]
    pub fn get_plate_by_id(&self, id: PlateId) -> Result<JsValue, JsValue> {
        let plate = with_layer(&self.layer, |l| l.get_plate_by_id(id).map(Plate::serialize))?.map_err(js_err)?;
        to_js(&plate)
    }

    #[wasm_bindgen(js_name = getSerializedPlates)]
    pub fn get_serialized_plates(&self) -> Result<JsValue, JsValue> {
        to_js(&with_layer(&self.layer, |l| l.get_serialized_plates())?)
    }

    /// Reconcile with a JSON plate list. Returns whether anything changed.
    #[wasm_bindgen(js_name = setPlates)]
    pub fn set_plates(&self, plates: &str) -> Result<bool, JsValue> {
        let list = parse::<Vec<SerializedPlate>>("plate list", plates)?;
        with_layer(&self.layer, |l| l.set_plates(&list))?.map_err(js_err)
    }

    /// Merge JSON state into a plate. `false` when the id is unknown.
    #[wasm_bindgen(js_name = setPlateState)]
    pub fn set_plate_state(&self, id: PlateId, state: &str) -> Result<bool, JsValue> {
        let state = parse::<PlateState>("plate state", state)?;
        with_layer(&self.layer, |l| l.set_plate_state(id, &state))
    }

    #[wasm_bindgen(js_name = hasIntersections)]
    pub fn has_intersections(&self, id: PlateId) -> Result<bool, JsValue> {
        with_layer(&self.layer, |l| l.has_intersections(id))?.map_err(js_err)
    }

    /// Overlapping `[a, b]` id pairs across the whole layer.
    pub fn intersections(&self) -> Result<JsValue, JsValue> {
        to_js(&with_layer(&self.layer, |l| l.intersections())?)
    }

    #[wasm_bindgen(js_name = highlightPlates)]
    pub fn highlight_plates(&self, ids: Vec<PlateId>) -> Result<(), JsValue> {
        with_layer(&self.layer, |l| l.highlight_plates(&ids))
    }

    #[wasm_bindgen(js_name = clearHighlight)]
    pub fn clear_highlight(&self) -> Result<(), JsValue> {
        with_layer(&self.layer, |l| l.clear_highlight())
    }

    /// Fill the layer from a JSON prototype list. Without `seed` the
    /// generator is seeded from `Math.random`.
    #[wasm_bindgen(js_name = setRandom)]
    pub fn set_random(&self, prototypes: &str, config: Option<String>, seed: Option<f64>) -> Result<usize, JsValue> {
        let prototypes = parse::<Vec<PlatePrototype>>("prototype list", prototypes)?;
        let config = match config {
            Some(text) => parse::<RandomConfig>("random config", &text)?,
            None => RandomConfig::default(),
        };
        let seed = seed.unwrap_or_else(|| js_sys::Math::random() * u32::MAX as f64);
        let mut rng = SmallRng::seed_from_u64(seed as u64);
        with_layer(&self.layer, |l| l.set_random(&mut rng, &prototypes, &config))?.map_err(js_err)
    }

    #[wasm_bindgen(js_name = setEditable)]
    pub fn set_editable(&self, editable: bool) -> Result<(), JsValue> {
        with_layer(&self.layer, |l| l.set_editable(editable))
    }

    #[wasm_bindgen(js_name = isEditable)]
    pub fn is_editable(&self) -> Result<bool, JsValue> {
        with_layer(&self.layer, |l| l.is_editable())
    }

    /// Apply the menu item `alias` picked for plate `id`. `value` carries the
    /// number entered in an input item.
    #[wasm_bindgen(js_name = handleMenuClick)]
    pub fn handle_menu_click(&self, id: PlateId, alias: &str, value: JsValue) -> Result<bool, JsValue> {
        let value = value
            .as_f64()
            .map(Value::from)
            .or_else(|| value.as_string().map(Value::from));
        with_layer(&self.layer, |l| l.handle_menu_click(id, alias, value.as_ref()))
    }
}

/// Visual equivalence of two JSON serialized plates. Needs no grid; a
/// trailing grid argument from JS is ignored.
#[wasm_bindgen(js_name = comparePlates)]
pub fn compare_plates(a: &str, b: &str) -> Result<bool, JsValue> {
    let a = parse::<SerializedPlate>("plate", a)?;
    let b = parse::<SerializedPlate>("plate", b)?;
    breadboard_core::compare_plates(&a, &b).map_err(js_err)
}

/// Pair a solution plate list with a reference one.
#[wasm_bindgen(js_name = matchCompositions)]
pub fn match_compositions(reference: &str, solution: &str) -> Result<JsValue, JsValue> {
    let reference = parse::<Vec<SerializedPlate>>("reference", reference)?;
    let solution = parse::<Vec<SerializedPlate>>("solution", solution)?;
    let report = breadboard_core::match_compositions(&reference, &solution).map_err(js_err)?;
    to_js(&report)
}
