#![allow(dead_code)]
//! Shared harness: fixture page layouts and a tiny document model that
//! applies engine outputs the way the browser adapter does.

use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;

use folio_motion_core::{Change, Config, ElementSpec, Engine, Outputs, Rect, Role};

#[derive(Debug, Deserialize)]
pub struct PageLayout {
    pub viewport: Rect,
    pub elements: Vec<PageElement>,
}

#[derive(Debug, Deserialize)]
pub struct PageElement {
    pub handle: String,
    pub role: Role,
    #[serde(default)]
    pub count: Option<String>,
    #[serde(default)]
    pub width: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    pub rect: Rect,
}

#[derive(Debug, Deserialize)]
pub struct ScrollScript {
    pub frame_ms: f64,
    pub steps: Vec<ScrollStep>,
}

#[derive(Debug, Deserialize)]
pub struct ScrollStep {
    pub at_ms: f64,
    pub scroll_y: f64,
}

impl PageLayout {
    pub fn load(name: &str) -> PageLayout {
        folio_test_fixtures::pages::layout(name).expect("page layout fixture")
    }

    pub fn rect(&self, handle: &str) -> Option<Rect> {
        self.elements
            .iter()
            .find(|e| e.handle == handle)
            .map(|e| e.rect)
    }

    pub fn handles(&self, role: Role) -> Vec<&str> {
        self.elements
            .iter()
            .filter(|e| e.role == role)
            .map(|e| e.handle.as_str())
            .collect()
    }
}

#[derive(Debug, Default, Clone)]
pub struct Node {
    pub text: Option<String>,
    pub width: Option<String>,
    pub classes: BTreeSet<String>,
    pub hidden: bool,
    pub attrs: HashMap<String, String>,
}

#[derive(Debug, Default)]
pub struct Dom {
    pub nodes: HashMap<String, Node>,
}

impl Dom {
    pub fn apply(&mut self, out: &Outputs) {
        for change in &out.changes {
            let node = self.nodes.entry(change.handle().to_string()).or_default();
            match change {
                Change::Text { text, .. } => node.text = Some(text.clone()),
                Change::Width { width, .. } => node.width = Some(width.clone()),
                Change::Class { class, present, .. } => {
                    if *present {
                        node.classes.insert(class.clone());
                    } else {
                        node.classes.remove(class);
                    }
                }
                Change::Display { visible, .. } => node.hidden = !*visible,
                Change::Attribute { name, value, .. } => {
                    node.attrs.insert(name.clone(), value.clone());
                }
            }
        }
    }

    pub fn node(&self, handle: &str) -> Node {
        self.nodes.get(handle).cloned().unwrap_or_default()
    }

    pub fn text(&self, handle: &str) -> Option<String> {
        self.node(handle).text
    }

    pub fn has_class(&self, handle: &str, class: &str) -> bool {
        self.node(handle).classes.contains(class)
    }
}

/// Engine plus document, driven by a virtual clock.
pub struct Page {
    pub layout: PageLayout,
    pub engine: Engine,
    pub dom: Dom,
    pub now_ms: f64,
    pub scroll_y: f64,
    pub log: Vec<Outputs>,
}

impl Page {
    pub fn mount(name: &str) -> Page {
        Self::mount_with(name, Config::default())
    }

    pub fn mount_with(name: &str, cfg: Config) -> Page {
        let layout = PageLayout::load(name);
        let mut engine = Engine::new(cfg).expect("engine");
        for el in &layout.elements {
            engine
                .observe(ElementSpec {
                    handle: el.handle.clone(),
                    role: el.role,
                    count: el.count.clone(),
                    width: el.width.clone(),
                })
                .expect("observe element");
        }
        let mut page = Page {
            layout,
            engine,
            dom: Dom::default(),
            now_ms: 0.0,
            scroll_y: 0.0,
            log: Vec::new(),
        };
        page.flush();
        page
    }

    fn record(&mut self, out: Outputs) {
        self.dom.apply(&out);
        self.log.push(out);
    }

    pub fn flush(&mut self) {
        let out = self.engine.drain_outputs();
        self.record(out);
    }

    pub fn scroll_to(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y;
        let layout = &self.layout;
        self.engine.recompute(
            &layout.viewport,
            |h| layout.rect(h).map(|r| r.offset_y(-scroll_y)),
            self.now_ms,
        );
        self.flush();
    }

    /// Tick once per `frame_ms` up to and including `until_ms`.
    pub fn run_frames(&mut self, frame_ms: f64, until_ms: f64) {
        while self.now_ms + frame_ms <= until_ms {
            self.now_ms += frame_ms;
            let out = self.engine.tick(self.now_ms);
            self.record(out);
        }
        self.now_ms = self.now_ms.max(until_ms);
    }

    /// Every text written to `handle`, oldest first.
    pub fn texts(&self, handle: &str) -> Vec<String> {
        self.log
            .iter()
            .flat_map(|o| o.changes.iter())
            .filter_map(|c| match c {
                Change::Text { handle: h, text } if h == handle => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

pub fn digits(text: &str) -> u64 {
    text.chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}
