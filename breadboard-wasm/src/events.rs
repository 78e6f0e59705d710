use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, KeyboardEvent, MouseEvent};

use breadboard_core::{Channel, EventSource, InputEvent};

use crate::state::{Handle, dispatch_from};
use crate::utils::{event_plate, event_point, log};

type Listener = Closure<dyn FnMut(Event)>;

struct Installed {
    target: EventTarget,
    name: &'static str,
    callback: Listener,
}

/// Installs document and board listeners on demand and turns DOM events
/// into [`InputEvent`]s for the layer.
pub struct DomEvents {
    document: Document,
    root: Element,
    layer: Handle,
    installed: HashMap<Channel, Vec<Installed>>,
    // A listener may be removed from inside its own callback; keep it alive
    // until the next subscription.
    retired: Vec<Installed>,
}

impl DomEvents {
    pub fn new(document: Document, root: Element, layer: Handle) -> Self {
        DomEvents { document, root, layer, installed: HashMap::new(), retired: Vec::new() }
    }

    fn listeners(&self, channel: Channel) -> Vec<(EventTarget, &'static str, Listener)> {
        let doc: EventTarget = self.document.clone().into();
        let board: EventTarget = self.root.clone().into();
        match channel {
            Channel::Click => vec![(board, "click", self.listener(|e, _| {
                Some(InputEvent::Click { target: event_plate(e) })
            }))],
            Channel::Keyboard => vec![
                (doc.clone(), "keydown", self.listener(|e, _| {
                    let key = e.dyn_ref::<KeyboardEvent>()?.key();
                    Some(InputEvent::KeyDown { key })
                })),
                (doc, "keyup", self.listener(|e, _| {
                    let key = e.dyn_ref::<KeyboardEvent>()?.key();
                    Some(InputEvent::KeyUp { key })
                })),
            ],
            Channel::ContextMenu => vec![(board, "contextmenu", self.listener(|e, root| {
                e.prevent_default();
                let point = event_point(e.dyn_ref::<MouseEvent>()?, root);
                Some(InputEvent::ContextMenu { target: event_plate(e), point })
            }))],
            Channel::DragMove => vec![(doc, "mousemove", self.listener(|e, root| {
                let point = event_point(e.dyn_ref::<MouseEvent>()?, root);
                Some(InputEvent::MouseMove { point })
            }))],
            Channel::DragEnd => vec![(doc, "mouseup", self.listener(|e, root| {
                let point = event_point(e.dyn_ref::<MouseEvent>()?, root);
                Some(InputEvent::MouseUp { point })
            }))],
        }
    }

    fn listener(&self, translate: fn(&Event, &Element) -> Option<InputEvent>) -> Listener {
        let layer = self.layer.clone();
        let root = self.root.clone();
        Closure::<dyn FnMut(Event)>::wrap(Box::new(move |e: Event| {
            if let Some(event) = translate(&e, &root) {
                dispatch_from(&layer, |l| {
                    l.dispatch(&event);
                });
            }
        }))
    }
}

impl EventSource for DomEvents {
    fn subscribe(&mut self, channel: Channel) {
        self.retired.clear();
        if self.installed.contains_key(&channel) {
            return;
        }
        let mut done = Vec::new();
        for (target, name, callback) in self.listeners(channel) {
            if let Err(err) = target.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref()) {
                log(&format!("Failed to listen for {name}: {err:?}"));
                continue;
            }
            done.push(Installed { target, name, callback });
        }
        self.installed.insert(channel, done);
    }

    fn unsubscribe(&mut self, channel: Channel) {
        for l in self.installed.remove(&channel).unwrap_or_default() {
            let _ = l
                .target
                .remove_event_listener_with_callback(l.name, l.callback.as_ref().unchecked_ref());
            self.retired.push(l);
        }
    }
}
