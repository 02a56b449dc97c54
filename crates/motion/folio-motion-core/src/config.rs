//! Core configuration for folio-motion-core.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Timing, threshold and naming configuration shared by every component.
/// Every field has a default so hosts can pass a partial object.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Length of a count-up progression.
    pub counter_duration_ms: f64,
    /// Delay between collapsing a skill bar and writing its target width.
    pub bar_delay_ms: f64,

    /// Visible fraction that triggers counters and bars.
    pub dispatch_threshold: f32,
    /// Visible fraction that toggles the reveal class on sections/cards.
    pub reveal_threshold: f32,

    /// Scroll offset (px) above which the back-to-top button shows.
    pub back_to_top_offset: f64,
    /// Simulated send delay for the contact form.
    pub submit_delay_ms: f64,

    /// Preference store key for the theme.
    pub theme_key: String,
    /// Thousands separator used when rendering counters.
    pub grouping_separator: String,

    pub classes: ClassNames,
}

/// Presentation class names the page stylesheet keys on.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    pub reveal: String,
    pub revealed: String,
    pub nav_open: String,
    pub active_filter: String,
    pub back_to_top_visible: String,
    pub user_tabbing: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            reveal: "reveal".into(),
            revealed: "in".into(),
            nav_open: "open".into(),
            active_filter: "active".into(),
            back_to_top_visible: "show".into(),
            user_tabbing: "user-tabbing".into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            counter_duration_ms: 1200.0,
            bar_delay_ms: 50.0,
            dispatch_threshold: 0.3,
            reveal_threshold: 0.15,
            back_to_top_offset: 400.0,
            submit_delay_ms: 900.0,
            theme_key: "theme".into(),
            grouping_separator: ",".into(),
            classes: ClassNames::default(),
        }
    }
}

impl Config {
    /// Reject values no monitor or animator can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("dispatch_threshold", self.dispatch_threshold),
            ("reveal_threshold", self.reveal_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Threshold { name, value });
            }
        }
        for (name, value) in [
            ("counter_duration_ms", self.counter_duration_ms),
            ("bar_delay_ms", self.bar_delay_ms),
            ("back_to_top_offset", self.back_to_top_offset),
            ("submit_delay_ms", self.submit_delay_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Duration { name, value });
            }
        }
        Ok(())
    }
}
