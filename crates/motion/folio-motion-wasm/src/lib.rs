use js_sys::Function;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use folio_motion_core::{Config, ElementSpec, Engine, MonitorKind, Outputs, Rect};

mod dom;
pub mod locale;
pub mod logger;
mod page;
pub mod storage;

pub use locale::IntlCountFormat;
pub use page::MountOptions;

/// Engine handle for hosts that drive visibility and frames themselves.
/// `mount` wires the same engine to the live document instead.
#[wasm_bindgen]
pub struct FolioMotion {
    core: Engine,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn parse_kind(kind: &str) -> Result<MonitorKind, JsError> {
    match kind {
        "dispatch" => Ok(MonitorKind::Dispatch),
        "reveal" => Ok(MonitorKind::Reveal),
        other => Err(JsError::new(&format!(
            "unknown monitor '{other}' (expected 'dispatch' or 'reveal')"
        ))),
    }
}

fn outputs_to_js(out: &Outputs) -> Result<JsValue, JsError> {
    swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
}

/// Calls `rect_of(handle) -> {x, y, width, height} | null | undefined`.
struct JsRectSource {
    f: Function,
}

impl JsRectSource {
    fn rect(&self, handle: &str) -> Option<Rect> {
        let val = self
            .f
            .call1(&JsValue::UNDEFINED, &JsValue::from_str(handle))
            .ok()?;
        if jsvalue_is_undefined_or_null(&val) {
            return None;
        }
        swb::from_value(val).ok()
    }
}

#[wasm_bindgen]
impl FolioMotion {
    /// Create an engine. Pass a partial config object or undefined/null for defaults.
    /// Example:
    ///   new FolioMotion({ counter_duration_ms: 800 })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<FolioMotion, JsError> {
        set_panic_hook();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let core = Engine::new(cfg).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(FolioMotion { core })
    }

    /// Register an element from `{ handle, role, count?, width? }`. Returns its id.
    #[wasm_bindgen]
    pub fn observe(&mut self, spec: JsValue) -> Result<u32, JsError> {
        let spec: ElementSpec =
            swb::from_value(spec).map_err(|e| JsError::new(&format!("element spec error: {e}")))?;
        let id = self
            .core
            .observe(spec)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(id.0)
    }

    /// `count` is the raw `data-count` attribute, if present.
    #[wasm_bindgen(js_name = observe_counter)]
    pub fn observe_counter(&mut self, handle: &str, count: Option<String>) -> Result<u32, JsError> {
        let id = self
            .core
            .observe_counter(handle, count.as_deref())
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(id.0)
    }

    /// `width` is the fill's inline width before collapsing ("" if none).
    #[wasm_bindgen(js_name = observe_bar)]
    pub fn observe_bar(&mut self, handle: &str, width: &str) -> Result<u32, JsError> {
        let id = self
            .core
            .observe_bar(handle, width)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(id.0)
    }

    #[wasm_bindgen(js_name = observe_section)]
    pub fn observe_section(&mut self, handle: &str) -> Result<u32, JsError> {
        let id = self
            .core
            .observe_section(handle)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(id.0)
    }

    #[wasm_bindgen]
    pub fn start(&mut self) {
        self.core.start();
    }

    #[wasm_bindgen]
    pub fn stop(&mut self) {
        self.core.stop();
    }

    #[wasm_bindgen(js_name = is_running)]
    pub fn is_running(&self) -> bool {
        self.core.is_running()
    }

    /// Feed a visible fraction to the "dispatch" or "reveal" monitor.
    #[wasm_bindgen]
    pub fn report(
        &mut self,
        kind: &str,
        handle: &str,
        ratio: f64,
        now_ms: f64,
    ) -> Result<(), JsError> {
        let kind = parse_kind(kind)?;
        self.core
            .report(kind, handle, ratio, now_ms)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Recompute both monitors from geometry. The resolver is called as
    /// `rect_of(handle) -> {x, y, width, height} | null`.
    #[wasm_bindgen]
    pub fn recompute(
        &mut self,
        viewport: JsValue,
        rect_of: Function,
        now_ms: f64,
    ) -> Result<(), JsError> {
        let viewport: Rect =
            swb::from_value(viewport).map_err(|e| JsError::new(&format!("viewport error: {e}")))?;
        let source = JsRectSource { f: rect_of };
        self.core.recompute(&viewport, |h| source.rect(h), now_ms);
        Ok(())
    }

    /// Advance animations to `now_ms`. Returns Outputs JSON.
    #[wasm_bindgen]
    pub fn tick(&mut self, now_ms: f64) -> Result<JsValue, JsError> {
        let out = self.core.tick(now_ms);
        outputs_to_js(&out)
    }

    /// Take changes produced by observe/report without advancing time.
    #[wasm_bindgen(js_name = drain_outputs)]
    pub fn drain_outputs(&mut self) -> Result<JsValue, JsError> {
        let out = self.core.drain_outputs();
        outputs_to_js(&out)
    }

    /// Whether the host should schedule another animation frame.
    #[wasm_bindgen(js_name = wants_frame)]
    pub fn wants_frame(&self) -> bool {
        self.core.wants_frame()
    }

    #[wasm_bindgen(js_name = is_revealed)]
    pub fn is_revealed(&self, handle: &str) -> bool {
        self.core.is_revealed(handle)
    }
}

/// Wire motion and page affordances to the current document.
/// Options: `{ motion?: Config, log_level?: string, detect_locale?: bool, locale?: string }`.
#[wasm_bindgen]
pub fn mount(options: JsValue) -> Result<(), JsError> {
    set_panic_hook();
    let options: MountOptions = if jsvalue_is_undefined_or_null(&options) {
        MountOptions::default()
    } else {
        swb::from_value(options).map_err(|e| JsError::new(&format!("mount options error: {e}")))?
    };
    logger::init(logger::parse_level(&options.log_level));
    page::mount(options).map_err(|e| JsError::new(&format!("mount failed: {e:?}")))
}

/// Disconnect observers and stop the mounted engine. Safe to call twice.
#[wasm_bindgen]
pub fn unmount() {
    page::unmount();
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
