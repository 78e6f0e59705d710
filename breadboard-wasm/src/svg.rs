//! SVG drawing surface: one `<g data-plate=id>` per plate inside the board
//! root, each cell a `<rect>`.

use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, MouseEvent};

use breadboard_core::input::MouseButton;
use breadboard_core::{DrawSurface, Grid, InputEvent, PlateId, PlateSnapshot};

use crate::state::{Handle, dispatch_from};
use crate::utils::{event_point, log};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

struct PlateNode {
    group: Element,
    mousedown: Closure<dyn FnMut(MouseEvent)>,
}

pub struct SvgSurface {
    document: Document,
    root: Element,
    grid: Grid,
    layer: Handle,
    nodes: HashMap<PlateId, PlateNode>,
}

impl SvgSurface {
    pub fn new(document: Document, root: Element, grid: Grid, layer: Handle) -> Self {
        SvgSurface { document, root, grid, layer, nodes: HashMap::new() }
    }

    fn create_node(&self, id: PlateId) -> Result<PlateNode, JsValue> {
        let group = self.document.create_element_ns(Some(SVG_NS), "g")?;
        group.set_attribute("data-plate", &id.to_string())?;
        let layer = self.layer.clone();
        let root = self.root.clone();
        let mousedown = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            e.stop_propagation();
            let event = InputEvent::PlateMouseDown {
                id,
                button: MouseButton::from_dom(e.button()),
                point: event_point(&e, &root),
            };
            dispatch_from(&layer, |l| {
                l.dispatch(&event);
            });
        }));
        group.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
        self.root.append_child(&group)?;
        Ok(PlateNode { group, mousedown })
    }

    fn render(&mut self, plate: &PlateSnapshot) -> Result<(), JsValue> {
        if !self.nodes.contains_key(&plate.id) {
            let node = self.create_node(plate.id)?;
            self.nodes.insert(plate.id, node);
        }
        let Some(node) = self.nodes.get(&plate.id) else {
            return Ok(());
        };
        let group = &node.group;

        let mut class = format!("plate plate-{}", plate.kind.alias().to_lowercase());
        for (on, name) in [
            (plate.flags.selected, "selected"),
            (plate.flags.dragging, "dragging"),
            (plate.flags.frozen, "frozen"),
            (plate.flags.highlighted, "highlighted"),
            (plate.animate, "appear"),
        ] {
            if on {
                class.push(' ');
                class.push_str(name);
            }
        }
        group.set_attribute("class", &class)?;
        group.set_attribute("data-orientation", plate.position.orientation.as_str())?;

        // Cells are laid out relative to the origin cell so that a drag only
        // has to move the group.
        let origin = self.grid.center_of(plate.position.cell);
        let shift = plate.origin_px - origin;
        group.set_attribute("transform", &format!("translate({} {})", shift.x, shift.y))?;

        group.set_inner_html("");
        let size = self.grid.cell_size();
        for cell in &plate.cells {
            let c = self.grid.center_of(*cell);
            let rect = self.document.create_element_ns(Some(SVG_NS), "rect")?;
            rect.set_attribute("x", &(c.x - size.x / 2.0).to_string())?;
            rect.set_attribute("y", &(c.y - size.y / 2.0).to_string())?;
            rect.set_attribute("width", &size.x.to_string())?;
            rect.set_attribute("height", &size.y.to_string())?;
            group.append_child(&rect)?;
        }
        if let Some(input) = &plate.input {
            group.set_attribute("data-input", &input.to_string())?;
        } else {
            group.remove_attribute("data-input")?;
        }
        Ok(())
    }
}

impl DrawSurface for SvgSurface {
    fn draw_plate(&mut self, plate: &PlateSnapshot) {
        if let Err(err) = self.render(plate) {
            log(&format!("Failed to draw plate {}: {:?}", plate.id, err));
        }
    }

    fn erase_plate(&mut self, id: PlateId) {
        if let Some(node) = self.nodes.remove(&id) {
            let _ = node
                .group
                .remove_event_listener_with_callback("mousedown", node.mousedown.as_ref().unchecked_ref());
            node.group.remove();
        }
    }
}
