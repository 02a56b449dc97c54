//! Observed elements and the handle table.
//!
//! The document owns its nodes. The core only keeps small string handles that
//! adapters resolve back to nodes when applying changes.

use serde::{Deserialize, Serialize};

use crate::ids::ElementId;

/// Opaque element handle (small string key chosen by the adapter).
pub type TargetHandle = String;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Counter,
    Bar,
    Section,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Counter => "counter",
            Role::Bar => "bar",
            Role::Section => "section",
        }
    }

    /// Roles implied by an element's class list.
    /// `num` marks a counter, `meter` a skill bar, `section`/`project-card` a
    /// reveal target. An element may carry more than one role.
    pub fn from_classes<'a, I>(classes: I) -> Vec<Role>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut roles = Vec::new();
        for class in classes {
            let role = match class {
                "num" => Role::Counter,
                "meter" => Role::Bar,
                "section" | "project-card" => Role::Section,
                _ => continue,
            };
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        roles
    }
}

/// Host description of an element to observe.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElementSpec {
    pub handle: TargetHandle,
    pub role: Role,
    /// Raw `data-count` attribute for counters.
    #[serde(default)]
    pub count: Option<String>,
    /// Inline width of a bar's fill at load time.
    #[serde(default)]
    pub width: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ObservedElement {
    pub id: ElementId,
    pub handle: TargetHandle,
    pub role: Role,
}

#[derive(Default, Debug)]
pub struct ElementTable {
    rows: Vec<ObservedElement>,
}

impl ElementTable {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn insert(&mut self, row: ObservedElement) {
        self.rows.push(row);
    }

    pub fn get(&self, id: ElementId) -> Option<&ObservedElement> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn find(&self, handle: &str, role: Role) -> Option<&ObservedElement> {
        self.rows
            .iter()
            .find(|r| r.handle == handle && r.role == role)
    }

    /// Every row registered under `handle`, one per role.
    pub fn by_handle<'a>(&'a self, handle: &'a str) -> impl Iterator<Item = &'a ObservedElement> {
        self.rows.iter().filter(move |r| r.handle == handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObservedElement> {
        self.rows.iter()
    }
}
