//! Handle table and change application for the live document.

use std::collections::HashMap;

use log::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleDeclaration, Document, Element, HtmlElement};

use folio_motion_core::Change;

/// Attribute stamped on every element the adapter hands to the engine.
pub const HANDLE_ATTR: &str = "data-motion-handle";

#[derive(Default)]
pub struct Handles {
    next: u32,
    nodes: HashMap<String, Element>,
    /// Width writes for a handle go here instead (skill bar fill spans).
    fills: HashMap<String, Element>,
}

impl Handles {
    /// Handle for `el`, allocating one on first sight. Elements with an id
    /// use it; others get a generated `@n` handle.
    pub fn bind(&mut self, el: &Element) -> String {
        if let Some(handle) = self.handle_of(el) {
            return handle;
        }
        let id = el.id();
        let handle = if id.is_empty() || self.nodes.contains_key(&id) {
            self.next += 1;
            format!("@{}", self.next)
        } else {
            id
        };
        if let Err(e) = el.set_attribute(HANDLE_ATTR, &handle) {
            warn!("could not tag '{handle}': {e:?}");
        }
        self.nodes.insert(handle.clone(), el.clone());
        handle
    }

    pub fn bind_fill(&mut self, handle: &str, fill: Element) {
        self.fills.insert(handle.to_string(), fill);
    }

    /// Handle previously bound to `el`, if any.
    pub fn handle_of(&self, el: &Element) -> Option<String> {
        el.get_attribute(HANDLE_ATTR)
            .filter(|h| self.nodes.contains_key(h))
    }

    pub fn get(&self, handle: &str) -> Option<&Element> {
        self.nodes.get(handle)
    }

    fn width_target(&self, handle: &str) -> Option<&Element> {
        self.fills.get(handle).or_else(|| self.nodes.get(handle))
    }
}

/// Apply changes in order. Changes for unknown handles are logged and skipped.
pub fn apply(handles: &Handles, changes: &[Change]) {
    for change in changes {
        let target = match change {
            Change::Width { handle, .. } => handles.width_target(handle),
            other => handles.get(other.handle()),
        };
        let Some(el) = target else {
            warn!("change for unbound handle '{}'", change.handle());
            continue;
        };
        if let Err(e) = apply_change(el, change) {
            warn!("could not apply change to '{}': {e:?}", change.handle());
        }
    }
}

fn apply_change(el: &Element, change: &Change) -> Result<(), JsValue> {
    match change {
        Change::Text { text, .. } => el.set_text_content(Some(text.as_str())),
        Change::Width { width, .. } => style(el)?.set_property("width", width)?,
        Change::Class { class, present, .. } => {
            el.class_list().toggle_with_force(class, *present)?;
        }
        Change::Display { visible, .. } => {
            let s = style(el)?;
            if *visible {
                s.remove_property("display")?;
            } else {
                s.set_property("display", "none")?;
            }
        }
        Change::Attribute { name, value, .. } => el.set_attribute(name, value)?,
    }
    Ok(())
}

pub fn style(el: &Element) -> Result<CssStyleDeclaration, JsValue> {
    el.dyn_ref::<HtmlElement>()
        .map(HtmlElement::style)
        .ok_or_else(|| JsValue::from_str("not an HTML element"))
}

/// Every element matching `selector`, in document order.
pub fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
    let list = document.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

/// `value` property of a form control, "" if the element is missing.
pub fn control_value(document: &Document, id: &str) -> String {
    document
        .get_element_by_id(id)
        .and_then(|el| js_sys::Reflect::get(&el, &JsValue::from_str("value")).ok())
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}
