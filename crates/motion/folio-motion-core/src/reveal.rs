//! Reveal Controller: mirrors intersection state onto a presentation class.
//!
//! The class is added while a section/card is visible and removed when it
//! leaves, so the entrance animation replays on every re-entry.

use hashbrown::HashSet;

use crate::element::TargetHandle;
use crate::ids::ElementId;
use crate::outputs::Change;
use crate::visibility::Notification;

#[derive(Debug)]
pub struct RevealController {
    prepare_class: String,
    revealed_class: String,
    revealed: HashSet<ElementId>,
}

impl RevealController {
    pub fn new(prepare_class: impl Into<String>, revealed_class: impl Into<String>) -> Self {
        Self {
            prepare_class: prepare_class.into(),
            revealed_class: revealed_class.into(),
            revealed: HashSet::new(),
        }
    }

    /// Change marking an element as a reveal target (initial hidden state).
    pub fn prepare(&self, handle: &str) -> Change {
        Change::Class {
            handle: handle.to_string(),
            class: self.prepare_class.clone(),
            present: true,
        }
    }

    /// Set the revealed flag to exactly `n.is_intersecting`. Always returns
    /// the class change; applying it twice has no further effect.
    pub fn apply(&mut self, n: &Notification, handle: TargetHandle) -> Change {
        if n.is_intersecting {
            self.revealed.insert(n.element);
        } else {
            self.revealed.remove(&n.element);
        }
        Change::Class {
            handle,
            class: self.revealed_class.clone(),
            present: n.is_intersecting,
        }
    }

    pub fn is_revealed(&self, element: ElementId) -> bool {
        self.revealed.contains(&element)
    }
}
