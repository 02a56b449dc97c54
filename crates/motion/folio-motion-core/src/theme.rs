//! Theme preference: a single persisted "light"/"dark" flag.
//!
//! Storage sits behind [`PreferenceStore`] so the browser adapter can back it
//! with `localStorage` and tests with [`MemoryStore`].

use hashbrown::HashMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::outputs::Change;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Theme used when nothing valid was stored.
    pub fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

/// Minimal key-value persistence.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and hosts without persistence.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(key: &str, value: &str) -> Self {
        let mut items = HashMap::new();
        items.insert(key.to_string(), value.to_string());
        Self { items }
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The page's current theme plus the key it persists under.
#[derive(Debug, Clone)]
pub struct ThemePreference {
    key: String,
    current: Theme,
}

impl ThemePreference {
    /// Resolve the startup theme: a valid stored value wins, otherwise the OS
    /// preference. The resolved theme is written back to the store.
    pub fn startup(store: &mut dyn PreferenceStore, key: &str, prefers_dark: bool) -> Self {
        let stored = store.get(key);
        let current = match stored.as_deref().and_then(Theme::parse) {
            Some(theme) => theme,
            None => {
                if let Some(raw) = stored {
                    warn!("ignoring unrecognised stored theme '{raw}'");
                }
                Theme::from_system(prefers_dark)
            }
        };
        let pref = Self {
            key: key.to_string(),
            current,
        };
        pref.persist(store);
        debug!("theme at startup: {}", current.as_str());
        pref
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// Flip the theme and persist it. Returns the new theme.
    pub fn toggle(&mut self, store: &mut dyn PreferenceStore) -> Theme {
        self.current = self.current.toggled();
        self.persist(store);
        self.current
    }

    fn persist(&self, store: &mut dyn PreferenceStore) {
        if let Err(e) = store.set(&self.key, self.current.as_str()) {
            warn!("{e}; theme applies for this visit only");
        }
    }

    /// `data-theme` attribute change for the document root.
    pub fn root_change(&self, root_handle: &str) -> Change {
        Change::Attribute {
            handle: root_handle.to_string(),
            name: "data-theme".into(),
            value: self.current.as_str().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ReadOnlyStore;

    impl PreferenceStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError {
                key: key.to_string(),
                reason: "quota exceeded".into(),
            })
        }
    }

    #[test]
    fn stored_value_wins_over_system() {
        let mut store = MemoryStore::with("theme", "light");
        let pref = ThemePreference::startup(&mut store, "theme", true);
        assert_eq!(pref.current(), Theme::Light);
    }

    #[test]
    fn falls_back_to_system_and_persists() {
        let mut store = MemoryStore::new();
        let pref = ThemePreference::startup(&mut store, "theme", true);
        assert_eq!(pref.current(), Theme::Dark);
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn garbage_is_ignored() {
        let mut store = MemoryStore::with("theme", "sepia");
        let pref = ThemePreference::startup(&mut store, "theme", false);
        assert_eq!(pref.current(), Theme::Light);
        assert_eq!(store.get("theme").as_deref(), Some("light"));
    }

    #[test]
    fn toggle_flips_and_writes() {
        let mut store = MemoryStore::new();
        let mut pref = ThemePreference::startup(&mut store, "theme", false);
        assert_eq!(pref.toggle(&mut store), Theme::Dark);
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
        assert_eq!(pref.toggle(&mut store), Theme::Light);
        assert_eq!(
            pref.root_change("root"),
            Change::Attribute {
                handle: "root".into(),
                name: "data-theme".into(),
                value: "light".into()
            }
        );
    }

    #[test]
    fn failing_store_still_toggles() {
        let mut store = ReadOnlyStore;
        let mut pref = ThemePreference::startup(&mut store, "theme", false);
        assert_eq!(pref.toggle(&mut store), Theme::Dark);
    }
}
