//! Output contracts from the core engine.
//!
//! Outputs carry the presentation changes produced since the last drain,
//! keyed by element handle, and a separate list of semantic events.
//! Adapters apply changes to the host document and forward events.

use serde::{Deserialize, Serialize};

use crate::element::TargetHandle;
use crate::ids::ElementId;

/// One presentation change for one element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    /// Replace the element's text content.
    Text { handle: TargetHandle, text: String },
    /// Set the inline CSS width of the element.
    Width { handle: TargetHandle, width: String },
    /// Add (`present == true`) or remove a class.
    Class {
        handle: TargetHandle,
        class: String,
        present: bool,
    },
    /// Show the element with its stylesheet display, or hide it.
    Display { handle: TargetHandle, visible: bool },
    /// Set an attribute.
    Attribute {
        handle: TargetHandle,
        name: String,
        value: String,
    },
}

impl Change {
    pub fn handle(&self) -> &str {
        match self {
            Change::Text { handle, .. }
            | Change::Width { handle, .. }
            | Change::Class { handle, .. }
            | Change::Display { handle, .. }
            | Change::Attribute { handle, .. } => handle,
        }
    }
}

/// Discrete semantic signals emitted while reacting to the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum CoreEvent {
    CounterStarted {
        element: ElementId,
        target: u64,
    },
    CounterFinished {
        element: ElementId,
        target: u64,
    },
    BarScheduled {
        element: ElementId,
        width: String,
    },
    BarSettled {
        element: ElementId,
        width: String,
    },
    RevealChanged {
        element: ElementId,
        revealed: bool,
    },
    /// A frame or delayed write whose token was superseded.
    StaleDropped {
        element: ElementId,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<CoreEvent>,
}

impl Outputs {
    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: CoreEvent) {
        self.events.push(event);
    }

    /// Most recent text written to `handle`, if any.
    pub fn last_text(&self, handle: &str) -> Option<&str> {
        self.changes.iter().rev().find_map(|c| match c {
            Change::Text { handle: h, text } if h == handle => Some(text.as_str()),
            _ => None,
        })
    }
}
