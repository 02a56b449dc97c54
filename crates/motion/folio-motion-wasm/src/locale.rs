//! Counter text in the visitor's locale via `Intl.NumberFormat`.

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use folio_motion_core::CountFormat;

/// Formats counts exactly as `Number.prototype.toLocaleString(locale)`
/// would, including non-uniform grouping (en-IN) and locales that skip
/// grouping below five digits (es).
#[derive(Debug)]
pub struct IntlCountFormat {
    format: Function,
}

impl IntlCountFormat {
    /// Fails when `Intl` is missing or `locale` is not a well-formed tag.
    pub fn new(locale: &str) -> Result<Self, JsValue> {
        let intl = Reflect::get(&js_sys::global(), &JsValue::from_str("Intl"))?;
        let ctor: Function = Reflect::get(&intl, &JsValue::from_str("NumberFormat"))?.dyn_into()?;
        let formatter = Reflect::construct(&ctor, &Array::of1(&JsValue::from_str(locale)))?;
        // the `format` getter returns a function already bound to its formatter
        let format: Function = Reflect::get(&formatter, &JsValue::from_str("format"))?.dyn_into()?;
        Ok(Self { format })
    }
}

impl CountFormat for IntlCountFormat {
    fn format(&self, value: u64) -> String {
        self.format
            .call1(&JsValue::UNDEFINED, &JsValue::from_f64(value as f64))
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_else(|| value.to_string())
    }
}
