//! Mobile navigation toggle.

use crate::outputs::Change;

#[derive(Debug, Clone)]
pub struct NavToggle {
    open_class: String,
    open: bool,
}

impl NavToggle {
    pub fn new(open_class: impl Into<String>) -> Self {
        Self {
            open_class: open_class.into(),
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Flip the menu. Returns the class change for the nav and the
    /// `aria-expanded` change for the button.
    pub fn toggle(&mut self, nav_handle: &str, button_handle: &str) -> [Change; 2] {
        self.open = !self.open;
        [
            Change::Class {
                handle: nav_handle.to_string(),
                class: self.open_class.clone(),
                present: self.open,
            },
            Change::Attribute {
                handle: button_handle.to_string(),
                name: "aria-expanded".into(),
                value: self.open.to_string(),
            },
        ]
    }
}
