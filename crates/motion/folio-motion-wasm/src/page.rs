//! Live document wiring: intersection observers, the frame loop and the
//! page affordances (theme, nav, filter, contact form, focus, back-to-top).
//!
//! Everything stateful lives in the core types; this module only reads the
//! DOM, forwards events, and applies the resulting changes.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Function};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlFormElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent,
    ScrollBehavior, ScrollToOptions, Window,
};

use folio_motion_core::{
    BackToTop, Change, Config, ContactForm, Engine, Field, FilterButton, KeyboardFocus,
    MonitorKind, NavToggle, ProjectCard, ProjectFilter, SubmissionFlow, SubmitStatus,
    ThemePreference,
};

use crate::dom::{self, Handles};
use crate::locale::IntlCountFormat;
use crate::storage::LocalStorageStore;

const COUNTERS_AND_BARS: &str = ".stat .num, .meter";
const REVEALABLE: &str = ".section, .project-card";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MountOptions {
    pub motion: Config,
    /// `log` level name for the console logger.
    pub log_level: String,
    /// Format counter text with `Intl.NumberFormat` instead of
    /// `motion.grouping_separator`.
    pub detect_locale: bool,
    /// Locale tag for counter text; `navigator.language` when unset.
    pub locale: Option<String>,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            motion: Config::default(),
            log_level: "warn".into(),
            detect_locale: true,
            locale: None,
        }
    }
}

type EntriesCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

struct Watch {
    observer: IntersectionObserver,
    _callback: EntriesCallback,
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

struct Page {
    engine: Engine,
    handles: Handles,
    store: LocalStorageStore,
    theme: ThemePreference,
    nav: NavToggle,
    filter: ProjectFilter,
    flow: SubmissionFlow,
    back_to_top: BackToTop,
    focus: KeyboardFocus,
    watches: Vec<Watch>,
    listeners: Vec<Listener>,
    frame_pending: bool,
    frame_id: Option<i32>,
    timeouts: Vec<i32>,
    /// Set by `unmount`; callbacks already queued by the browser bail out.
    disposed: bool,
}

type Shared = Rc<RefCell<Page>>;

thread_local! {
    static MOUNTED: RefCell<Option<Shared>> = RefCell::new(None);
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

pub fn mount(options: MountOptions) -> Result<(), JsValue> {
    unmount();
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let cfg = options.motion.clone();
    let engine = match counter_format(&window, &options) {
        Some(format) => Engine::with_format(cfg.clone(), format),
        None => Engine::new(cfg.clone()),
    }
    .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let mut store = LocalStorageStore::open();
    let prefers_dark = window
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten()
        .map(|m| m.matches())
        .unwrap_or(false);
    let theme = ThemePreference::startup(&mut store, &cfg.theme_key, prefers_dark);

    let shared: Shared = Rc::new(RefCell::new(Page {
        engine,
        handles: Handles::default(),
        store,
        theme,
        nav: NavToggle::new(cfg.classes.nav_open.clone()),
        filter: ProjectFilter::new(cfg.classes.active_filter.clone()),
        flow: SubmissionFlow::new(cfg.submit_delay_ms),
        back_to_top: BackToTop::new(cfg.back_to_top_offset),
        focus: KeyboardFocus::new(),
        watches: Vec::new(),
        listeners: Vec::new(),
        frame_pending: false,
        frame_id: None,
        timeouts: Vec::new(),
        disposed: false,
    }));

    init_theme(&shared, &document)?;
    init_nav(&shared, &document)?;
    init_year(&document);
    init_motion(&shared, &document, &cfg)?;
    init_filter(&shared, &document)?;
    init_form(&shared, &document, cfg.submit_delay_ms)?;
    init_focus(&shared, &window, &document, cfg.classes.user_tabbing.clone())?;
    init_back_to_top(&shared, &window, &document, cfg.classes.back_to_top_visible.clone())?;

    MOUNTED.with(|m| *m.borrow_mut() = Some(shared));
    info!("folio motion mounted");
    Ok(())
}

pub fn unmount() {
    let Some(shared) = MOUNTED.with(|m| m.borrow_mut().take()) else {
        return;
    };
    let (watches, listeners, frame, timeouts) = {
        let mut page = shared.borrow_mut();
        page.engine.stop();
        page.disposed = true;
        page.frame_pending = false;
        (
            std::mem::take(&mut page.watches),
            std::mem::take(&mut page.listeners),
            page.frame_id.take(),
            std::mem::take(&mut page.timeouts),
        )
    };
    if let Some(window) = web_sys::window() {
        if let Some(id) = frame {
            if let Err(e) = window.cancel_animation_frame(id) {
                warn!("could not cancel animation frame: {e:?}");
            }
        }
        for id in timeouts {
            window.clear_timeout_with_handle(id);
        }
    }
    for w in &watches {
        w.observer.disconnect();
    }
    for l in &listeners {
        if let Err(e) = l
            .target
            .remove_event_listener_with_callback(l.event, l.callback.as_ref().unchecked_ref())
        {
            warn!("could not remove {} listener: {e:?}", l.event);
        }
    }
    debug!(
        "unmounted: {} observers, {} listeners",
        watches.len(),
        listeners.len()
    );
}

/// Intl formatter for counter text, or None to keep the fixed separator.
fn counter_format(window: &Window, options: &MountOptions) -> Option<IntlCountFormat> {
    if !options.detect_locale {
        return None;
    }
    let lang = options
        .locale
        .clone()
        .or_else(|| window.navigator().language())?;
    match IntlCountFormat::new(&lang) {
        Ok(format) => Some(format),
        Err(e) => {
            warn!("no number format for '{lang}', using the configured separator: {e:?}");
            None
        }
    }
}

fn listen_with(
    shared: &Shared,
    target: &EventTarget,
    event: &'static str,
    options: Option<&AddEventListenerOptions>,
    handler: impl FnMut(Event) + 'static,
) -> Result<Function, JsValue> {
    let callback = Closure::<dyn FnMut(Event)>::new(handler);
    let function: Function = callback.as_ref().unchecked_ref::<Function>().clone();
    match options {
        Some(opts) => target
            .add_event_listener_with_callback_and_add_event_listener_options(event, &function, opts)?,
        None => target.add_event_listener_with_callback(event, &function)?,
    }
    shared.borrow_mut().listeners.push(Listener {
        target: target.clone(),
        event,
        callback,
    });
    Ok(function)
}

fn listen(
    shared: &Shared,
    target: &EventTarget,
    event: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<Function, JsValue> {
    listen_with(shared, target, event, None, handler)
}

// ---------- motion ----------

fn init_motion(shared: &Shared, document: &Document, cfg: &Config) -> Result<(), JsValue> {
    let mut dispatch_targets = Vec::new();
    let mut reveal_targets = Vec::new();
    {
        let mut guard = shared.borrow_mut();
        let page = &mut *guard;
        for el in dom::query_all(document, COUNTERS_AND_BARS)? {
            let handle = page.handles.bind(&el);
            let registered = if el.class_list().contains("meter") {
                let Some(fill) = el.query_selector("span")? else {
                    warn!("skill bar '{handle}' has no fill span");
                    continue;
                };
                let width = dom::style(&fill)
                    .and_then(|s| s.get_property_value("width"))
                    .unwrap_or_default();
                page.handles.bind_fill(&handle, fill);
                page.engine.observe_bar(&handle, &width)
            } else {
                let count = el.get_attribute("data-count");
                page.engine.observe_counter(&handle, count.as_deref())
            };
            match registered {
                Ok(_) => dispatch_targets.push(el),
                Err(e) => warn!("{e}"),
            }
        }
        for el in dom::query_all(document, REVEALABLE)? {
            let handle = page.handles.bind(&el);
            match page.engine.observe_section(&handle) {
                Ok(_) => reveal_targets.push(el),
                Err(e) => warn!("{e}"),
            }
        }
        // collapse bars and mark sections before the first paint
        let out = page.engine.drain_outputs();
        dom::apply(&page.handles, &out.changes);
    }
    watch(shared, MonitorKind::Dispatch, cfg.dispatch_threshold, &dispatch_targets)?;
    watch(shared, MonitorKind::Reveal, cfg.reveal_threshold, &reveal_targets)?;
    debug!(
        "watching {} counters/bars and {} sections",
        dispatch_targets.len(),
        reveal_targets.len()
    );
    Ok(())
}

fn watch(
    shared: &Shared,
    kind: MonitorKind,
    threshold: f32,
    targets: &[Element],
) -> Result<(), JsValue> {
    let cb_shared = shared.clone();
    let callback: EntriesCallback =
        Closure::new(move |entries: Array, _observer: IntersectionObserver| {
            on_entries(&cb_shared, kind, &entries);
        });
    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(f64::from(threshold)));
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    for el in targets {
        observer.observe(el);
    }
    shared.borrow_mut().watches.push(Watch {
        observer,
        _callback: callback,
    });
    Ok(())
}

fn on_entries(shared: &Shared, kind: MonitorKind, entries: &Array) {
    let now = now_ms();
    let wants_frame = {
        let mut page = shared.borrow_mut();
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            let Some(handle) = page.handles.handle_of(&entry.target()) else {
                continue;
            };
            if let Err(e) = page
                .engine
                .report(kind, &handle, entry.intersection_ratio(), now)
            {
                warn!("{e}");
            }
        }
        let out = page.engine.drain_outputs();
        dom::apply(&page.handles, &out.changes);
        page.engine.wants_frame()
    };
    if wants_frame {
        request_frame(shared);
    }
}

/// Schedule one animation frame unless one is already pending.
fn request_frame(shared: &Shared) {
    let Some(window) = web_sys::window() else {
        return;
    };
    {
        let mut page = shared.borrow_mut();
        if page.frame_pending || page.disposed {
            return;
        }
        page.frame_pending = true;
    }
    let cb_shared = shared.clone();
    let callback = Closure::once_into_js(move |now: f64| on_frame(&cb_shared, now));
    match window.request_animation_frame(callback.unchecked_ref()) {
        Ok(id) => shared.borrow_mut().frame_id = Some(id),
        Err(e) => {
            warn!("requestAnimationFrame failed: {e:?}");
            shared.borrow_mut().frame_pending = false;
        }
    }
}

fn on_frame(shared: &Shared, now: f64) {
    let wants_frame = {
        let mut page = shared.borrow_mut();
        page.frame_id = None;
        if page.disposed {
            return;
        }
        page.frame_pending = false;
        let out = page.engine.tick(now);
        dom::apply(&page.handles, &out.changes);
        page.engine.wants_frame()
    };
    if wants_frame {
        request_frame(shared);
    }
}

// ---------- affordances ----------

fn init_theme(shared: &Shared, document: &Document) -> Result<(), JsValue> {
    let Some(root) = document.document_element() else {
        return Ok(());
    };
    let root_handle = {
        let mut page = shared.borrow_mut();
        let handle = page.handles.bind(&root);
        let change = page.theme.root_change(&handle);
        dom::apply(&page.handles, &[change]);
        handle
    };
    let Some(button) = document.get_element_by_id("theme-toggle") else {
        debug!("no #theme-toggle; theme is fixed");
        return Ok(());
    };
    let cb_shared = shared.clone();
    listen(shared, &button, "click", move |_| {
        let mut guard = cb_shared.borrow_mut();
        let page = &mut *guard;
        let theme = page.theme.toggle(&mut page.store);
        debug!("theme -> {}", theme.as_str());
        let change = page.theme.root_change(&root_handle);
        dom::apply(&page.handles, &[change]);
    })?;
    Ok(())
}

fn init_nav(shared: &Shared, document: &Document) -> Result<(), JsValue> {
    let button = document.query_selector(".nav-toggle")?;
    let nav = document.get_element_by_id("site-nav");
    let (Some(button), Some(nav)) = (button, nav) else {
        debug!("no mobile nav on this page");
        return Ok(());
    };
    let (nav_handle, button_handle) = {
        let mut page = shared.borrow_mut();
        (page.handles.bind(&nav), page.handles.bind(&button))
    };
    let cb_shared = shared.clone();
    listen(shared, &button, "click", move |_| {
        let mut guard = cb_shared.borrow_mut();
        let page = &mut *guard;
        let changes = page.nav.toggle(&nav_handle, &button_handle);
        dom::apply(&page.handles, &changes);
    })?;
    Ok(())
}

fn init_year(document: &Document) {
    if let Some(el) = document.get_element_by_id("year") {
        let year = js_sys::Date::new_0().get_full_year();
        el.set_text_content(Some(year.to_string().as_str()));
    }
}

fn init_filter(shared: &Shared, document: &Document) -> Result<(), JsValue> {
    let buttons = dom::query_all(document, ".filter")?;
    if buttons.is_empty() {
        return Ok(());
    }
    let cards = dom::query_all(document, ".project-card")?;
    let bound: Vec<(String, Element)> = {
        let mut guard = shared.borrow_mut();
        let page = &mut *guard;
        for card in &cards {
            let handle = page.handles.bind(card);
            let tags = card.get_attribute("data-tags");
            page.filter
                .add_card(ProjectCard::from_attr(handle, tags.as_deref()));
        }
        buttons
            .into_iter()
            .map(|button| {
                let handle = page.handles.bind(&button);
                page.filter.add_button(FilterButton {
                    handle: handle.clone(),
                    tag: button.get_attribute("data-filter").unwrap_or_default(),
                });
                (handle, button)
            })
            .collect()
    };
    for (handle, button) in bound {
        let cb_shared = shared.clone();
        listen(shared, &button, "click", move |_| {
            let mut guard = cb_shared.borrow_mut();
            let page = &mut *guard;
            if let Some(changes) = page.filter.activate(&handle) {
                dom::apply(&page.handles, &changes);
            }
        })?;
    }
    Ok(())
}

fn init_form(shared: &Shared, document: &Document, delay_ms: f64) -> Result<(), JsValue> {
    let Some(form) = document.get_element_by_id("contact-form") else {
        return Ok(());
    };
    let status = document.query_selector(".form-status")?;
    let cb_shared = shared.clone();
    let doc = document.clone();
    let form_el = form.clone();
    listen(shared, &form, "submit", move |event| {
        event.prevent_default();
        let contact = ContactForm::new(
            &dom::control_value(&doc, Field::Name.id()),
            &dom::control_value(&doc, Field::Email.id()),
            &dom::control_value(&doc, Field::Message.id()),
        );
        let report = contact.validate();
        for field in Field::ALL {
            let message = report.get(field).map(|e| e.to_string()).unwrap_or_default();
            set_field_error(&doc, field.id(), &message);
        }

        let now = now_ms();
        let started = cb_shared.borrow_mut().flow.submit(&contact, now);
        let Ok(sending) = started else {
            return;
        };
        show_status(status.as_ref(), &sending);
        schedule_sent(&cb_shared, status.clone(), form_el.clone(), now + delay_ms, delay_ms);
    })?;
    Ok(())
}

fn schedule_sent(shared: &Shared, status: Option<Element>, form: Element, due: f64, delay_ms: f64) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let cb_shared = shared.clone();
    let callback = Closure::once_into_js(move || {
        let done = {
            let mut page = cb_shared.borrow_mut();
            if page.disposed {
                return;
            }
            // equal delays fire in scheduling order, so this is the oldest id
            if !page.timeouts.is_empty() {
                page.timeouts.remove(0);
            }
            // timers may fire a hair before the monotonic clock agrees
            page.flow.poll(now_ms().max(due))
        };
        let Some(done) = done else {
            return;
        };
        show_status(status.as_ref(), &done);
        if done.reset_form {
            if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
                form.reset();
            }
        }
    });
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay_ms.round() as i32,
    ) {
        Ok(id) => shared.borrow_mut().timeouts.push(id),
        Err(e) => warn!("setTimeout failed: {e:?}"),
    }
}

fn set_field_error(document: &Document, id: &str, message: &str) {
    let slot = document
        .get_element_by_id(id)
        .and_then(|field| field.parent_element())
        .and_then(|parent| parent.query_selector(".error").ok().flatten());
    match slot {
        Some(el) => el.set_text_content(Some(message)),
        None => debug!("no .error slot next to #{id}"),
    }
}

fn show_status(status: Option<&Element>, update: &SubmitStatus) {
    let Some(el) = status else {
        return;
    };
    el.set_text_content(Some(update.text));
    let styled = dom::style(el).and_then(|s| match update.color {
        Some(color) => s.set_property("color", color),
        None => s.remove_property("color").map(|_| ()),
    });
    if let Err(e) = styled {
        warn!("could not colour form status: {e:?}");
    }
}

fn init_focus(
    shared: &Shared,
    window: &Window,
    document: &Document,
    class: String,
) -> Result<(), JsValue> {
    let registered: Rc<RefCell<Option<Function>>> = Rc::default();
    let slot = registered.clone();
    let cb_shared = shared.clone();
    let doc = document.clone();
    let function = listen(shared, window, "keydown", move |event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
            return;
        };
        if !cb_shared.borrow_mut().focus.on_key(&key) {
            return;
        }
        if let Some(body) = doc.body() {
            if let Err(e) = body.class_list().add_1(&class) {
                warn!("could not mark keyboard navigation: {e:?}");
            }
        }
        if let (Some(w), Some(f)) = (web_sys::window(), slot.borrow_mut().take()) {
            if let Err(e) = w.remove_event_listener_with_callback("keydown", &f) {
                warn!("could not remove keydown listener: {e:?}");
            }
        }
    })?;
    *registered.borrow_mut() = Some(function);
    Ok(())
}

fn init_back_to_top(
    shared: &Shared,
    window: &Window,
    document: &Document,
    class: String,
) -> Result<(), JsValue> {
    let Some(button) = document.get_element_by_id("backToTop") else {
        return Ok(());
    };
    let handle = shared.borrow_mut().handles.bind(&button);
    let cb_shared = shared.clone();
    let passive = AddEventListenerOptions::new();
    passive.set_passive(true);
    listen_with(shared, window, "scroll", Some(&passive), move |_| {
        let y = web_sys::window()
            .and_then(|w| w.scroll_y().ok())
            .unwrap_or(0.0);
        let mut guard = cb_shared.borrow_mut();
        let page = &mut *guard;
        if let Some(visible) = page.back_to_top.on_scroll(y) {
            let change = Change::Class {
                handle: handle.clone(),
                class: class.clone(),
                present: visible,
            };
            dom::apply(&page.handles, &[change]);
        }
    })?;
    listen(shared, &button, "click", |_| {
        if let Some(w) = web_sys::window() {
            let opts = ScrollToOptions::new();
            opts.set_top(0.0);
            opts.set_behavior(ScrollBehavior::Smooth);
            w.scroll_to_with_scroll_to_options(&opts);
        }
    })?;
    Ok(())
}
