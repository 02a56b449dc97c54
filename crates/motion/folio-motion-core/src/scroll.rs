//! Scroll and keyboard affordances: back-to-top button and focus outlines.

#[derive(Debug, Clone)]
pub struct BackToTop {
    offset: f64,
    visible: bool,
}

impl BackToTop {
    pub fn new(offset: f64) -> Self {
        Self {
            offset,
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Update for a new scroll offset. Returns the visibility whenever it
    /// changed.
    pub fn on_scroll(&mut self, scroll_y: f64) -> Option<bool> {
        let visible = scroll_y > self.offset;
        if visible == self.visible {
            return None;
        }
        self.visible = visible;
        Some(visible)
    }
}

/// Turns on focus outlines the first time the visitor presses Tab, then
/// stays on for the rest of the visit.
#[derive(Debug, Clone, Default)]
pub struct KeyboardFocus {
    tabbing: bool,
}

impl KeyboardFocus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tabbing(&self) -> bool {
        self.tabbing
    }

    /// Whether the key listener is still needed.
    pub fn is_armed(&self) -> bool {
        !self.tabbing
    }

    /// Returns true exactly once: on the first Tab.
    pub fn on_key(&mut self, key: &str) -> bool {
        if self.tabbing || key != "Tab" {
            return false;
        }
        self.tabbing = true;
        true
    }
}
