//! Light/dark theme preference.
//!
//! The preference is resolved once at startup from storage, then from the
//! operating system signal, and finally defaults to light. Toggling updates
//! the rendering root and writes through to storage on a best-effort basis.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

/// Storage key holding the preference.
pub const STORAGE_KEY: &str = "theme";

/// Class set on the rendering root while the dark theme is active.
pub const DARK_CLASS: &str = "dark";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == ThemePreference::Dark
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            other => Err(Error::InvalidThemePreference {
                value: other.to_string(),
            }),
        }
    }
}

/// Pick the initial preference: stored value, then system signal, then light.
pub fn resolve(
    stored: Option<ThemePreference>,
    system: Option<ThemePreference>,
) -> ThemePreference {
    stored.or(system).unwrap_or_default()
}

/// Read the terminal colour scheme from `COLORFGBG` ("fg;bg" or "fg;default;bg").
pub fn system_preference() -> Option<ThemePreference> {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|value| parse_colorfgbg(&value))
}

fn parse_colorfgbg(value: &str) -> Option<ThemePreference> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    match background {
        0..=6 | 8 => Some(ThemePreference::Dark),
        _ => Some(ThemePreference::Light),
    }
}

/// Key/value persistence for preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, e.g. `{"theme":"dark"}`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Default location inside a site directory.
    pub fn in_site(site_dir: &Path) -> PathBuf {
        site_dir.join(".vitrine").join("preferences.json")
    }

    /// Open a store, treating a missing or unreadable file as empty.
    pub fn open(path: PathBuf) -> Self {
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed preferences");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };

        Self { path, values }
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)
            .map_err(|e| Error::Other(format!("failed to serialize preferences: {}", e)))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Class list of the element the page is rendered under (`<html>`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderRoot {
    classes: BTreeSet<String>,
}

impl RenderRoot {
    pub fn apply(&mut self, preference: ThemePreference) {
        if preference.is_dark() {
            self.classes.insert(DARK_CLASS.to_string());
        } else {
            self.classes.remove(DARK_CLASS);
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// Space-separated class attribute value.
    pub fn class_attr(&self) -> String {
        self.classes.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
    }
}

/// Owns the current preference, the root it styles, and its storage.
#[derive(Debug)]
pub struct ThemeController<S> {
    preference: ThemePreference,
    root: RenderRoot,
    store: S,
}

impl<S: PreferenceStore> ThemeController<S> {
    /// Resolve the initial preference and apply it to a fresh root.
    pub fn init(store: S, system: Option<ThemePreference>) -> Self {
        let stored = store.get(STORAGE_KEY).and_then(|value| match value.parse() {
            Ok(preference) => Some(preference),
            Err(_) => {
                tracing::debug!(%value, "ignoring unrecognised stored theme");
                None
            }
        });

        let preference = resolve(stored, system);
        let mut root = RenderRoot::default();
        root.apply(preference);

        tracing::debug!(
            ?stored,
            ?system,
            resolved = %preference,
            "theme preference resolved"
        );

        Self {
            preference,
            root,
            store,
        }
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn root(&self) -> &RenderRoot {
        &self.root
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Flip the preference.
    pub fn toggle(&mut self) -> ThemePreference {
        self.set(self.preference.toggled())
    }

    /// Set the preference explicitly, applying and persisting it.
    pub fn set(&mut self, preference: ThemePreference) -> ThemePreference {
        self.preference = preference;
        self.root.apply(preference);

        if let Err(e) = self.store.set(STORAGE_KEY, preference.as_str()) {
            tracing::warn!(error = %e, "failed to persist theme preference");
        }

        self.preference
    }
}
