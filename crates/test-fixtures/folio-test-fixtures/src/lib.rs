//! Shared JSON fixtures for the motion crates' integration tests. Names are
//! resolved through `fixtures/manifest.json` at the workspace root.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    pages: HashMap<String, PageEntry>,
    forms: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    layout: String,
    #[serde(default)]
    scroll: Option<String>,
}

/// One file under `fixtures/`, addressed relative to that directory.
struct FixtureFile<'a>(&'a str);

impl FixtureFile<'_> {
    fn path(&self) -> PathBuf {
        [env!("CARGO_MANIFEST_DIR"), "..", "..", "..", "fixtures", self.0]
            .iter()
            .collect()
    }

    fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        let path = self.path();
        let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("decoding {} as JSON", self.0))
    }
}

fn entry<'a, T>(kind: &str, table: &'a HashMap<String, T>, name: &str) -> Result<&'a T> {
    match table.get(name) {
        Some(found) => Ok(found),
        None => bail!("unknown {kind} fixture '{name}'"),
    }
}

/// Page layouts: observed elements with document-space rects, plus an
/// optional scripted scroll session.
pub mod pages {
    use super::*;

    fn page(name: &str) -> Result<&'static PageEntry> {
        entry("page", &MANIFEST.pages, name)
    }

    pub fn keys() -> Vec<String> {
        MANIFEST.pages.keys().cloned().collect()
    }

    pub fn layout<T: DeserializeOwned>(name: &str) -> Result<T> {
        FixtureFile(&page(name)?.layout).parse()
    }

    pub fn scroll<T: DeserializeOwned>(name: &str) -> Result<Option<T>> {
        page(name)?
            .scroll
            .as_deref()
            .map(|rel| FixtureFile(rel).parse())
            .transpose()
    }

    pub fn layout_path(name: &str) -> Result<PathBuf> {
        Ok(FixtureFile(&page(name)?.layout).path())
    }
}

/// Contact form validation cases.
pub mod forms {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.forms.keys().cloned().collect()
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        FixtureFile(entry("form", &MANIFEST.forms, name)?).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_entries_resolve() {
        for name in pages::keys() {
            assert!(
                pages::layout_path(&name).expect("path").exists(),
                "missing layout for {name}"
            );
            let _: serde_json::Value = pages::layout(&name).expect("layout parses");
            let _: Option<serde_json::Value> = pages::scroll(&name).expect("scroll parses");
        }
        for name in forms::keys() {
            let _: serde_json::Value = forms::load(&name).expect("form cases parse");
        }
    }

    #[test]
    fn unknown_fixture_errors() {
        let err = pages::layout::<serde_json::Value>("nope").unwrap_err();
        assert!(err.to_string().contains("unknown page fixture 'nope'"));
        let err = forms::load::<serde_json::Value>("nope").unwrap_err();
        assert!(err.to_string().contains("unknown form fixture 'nope'"));
    }
}
