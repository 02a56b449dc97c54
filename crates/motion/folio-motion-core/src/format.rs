//! Integer rendering with thousands grouping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Renders a counter value as display text. Browser hosts plug in the
/// locale's number formatter; everything else uses [`NumberFormat`].
pub trait CountFormat: fmt::Debug {
    fn format(&self, value: u64) -> String;
}

/// Groups digits in threes with a fixed separator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    pub separator: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            separator: ",".into(),
        }
    }
}

impl NumberFormat {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub fn format(&self, value: u64) -> String {
        let digits = value.to_string();
        if self.separator.is_empty() || digits.len() <= 3 {
            return digits;
        }
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 * self.separator.len());
        let lead = digits.len() % 3;
        for (i, ch) in digits.chars().enumerate() {
            if i != 0 && (i + 3 - lead) % 3 == 0 {
                out.push_str(&self.separator);
            }
            out.push(ch);
        }
        out
    }
}

impl CountFormat for NumberFormat {
    fn format(&self, value: u64) -> String {
        NumberFormat::format(self, value)
    }
}
