//! Project filter: tag buttons show or hide project cards.

use serde::{Deserialize, Serialize};

use crate::element::TargetHandle;
use crate::outputs::Change;

/// Filter tag that shows every card.
pub const FILTER_ALL: &str = "all";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FilterButton {
    pub handle: TargetHandle,
    /// `data-filter` value.
    pub tag: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectCard {
    pub handle: TargetHandle,
    pub tags: Vec<String>,
}

impl ProjectCard {
    /// Build from a space-separated `data-tags` attribute.
    pub fn from_attr(handle: impl Into<TargetHandle>, tags: Option<&str>) -> Self {
        Self {
            handle: handle.into(),
            tags: tags
                .unwrap_or("")
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn matches(&self, tag: &str) -> bool {
        tag == FILTER_ALL || self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProjectFilter {
    active_class: String,
    buttons: Vec<FilterButton>,
    cards: Vec<ProjectCard>,
    active: Option<String>,
}

impl ProjectFilter {
    pub fn new(active_class: impl Into<String>) -> Self {
        Self {
            active_class: active_class.into(),
            ..Self::default()
        }
    }

    pub fn add_button(&mut self, button: FilterButton) {
        self.buttons.push(button);
    }

    pub fn add_card(&mut self, card: ProjectCard) {
        self.cards.push(card);
    }

    /// Tag of the last activated button.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Handles of the cards `tag` shows, in page order.
    pub fn visible_for<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.cards
            .iter()
            .filter(move |c| c.matches(tag))
            .map(|c| c.handle.as_str())
    }

    /// Activate the button with `button_handle`: it alone gets the active
    /// class, and every card is shown or hidden by its tag. Returns None for
    /// an unknown button.
    pub fn activate(&mut self, button_handle: &str) -> Option<Vec<Change>> {
        let tag = self
            .buttons
            .iter()
            .find(|b| b.handle == button_handle)?
            .tag
            .clone();
        let mut changes = Vec::with_capacity(self.buttons.len() + self.cards.len());
        for b in &self.buttons {
            changes.push(Change::Class {
                handle: b.handle.clone(),
                class: self.active_class.clone(),
                present: b.handle == button_handle,
            });
        }
        for card in &self.cards {
            changes.push(Change::Display {
                handle: card.handle.clone(),
                visible: card.matches(&tag),
            });
        }
        self.active = Some(tag);
        Some(changes)
    }
}
