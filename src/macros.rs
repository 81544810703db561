//! Text shortcuts expanded when a word ends (`btw` → `by the way`).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::config::EngineConfig;
use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    entries: HashMap<String, String>,
}

#[derive(Deserialize)]
struct MacroFile {
    #[serde(default)]
    macros: HashMap<String, String>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the `[macros]` table of a settings file. Other keys are ignored,
    /// so the same file can carry the engine settings.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let file: MacroFile = toml::from_str(text)?;
        let mut table = Self::new();
        for (trigger, expansion) in file.macros {
            table.insert(trigger, expansion)?;
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let table = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), count = table.len(), "loaded macros");
        Ok(table)
    }

    /// Adds or replaces a macro, returning the previous expansion.
    pub fn insert(
        &mut self,
        trigger: impl Into<String>,
        expansion: impl Into<String>,
    ) -> ConfigResult<Option<String>> {
        let trigger = trigger.into();
        let expansion = expansion.into();
        if trigger.is_empty() {
            return Err(ConfigError::EmptyTrigger(expansion));
        }
        Ok(self.entries.insert(trigger, expansion))
    }

    pub fn remove(&mut self, trigger: &str) -> Option<String> {
        self.entries.remove(trigger)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expansion for the word `trigger`, if macros are active.
    ///
    /// An exact match wins. Otherwise, with `auto_caps_macro`, a capitalised
    /// or all-caps trigger matches its lowercase entry and the expansion is
    /// capitalised or upper-cased the same way.
    pub fn try_expand(&self, trigger: &str, config: &EngineConfig) -> Option<String> {
        if trigger.is_empty() || !config.macros_active() {
            return None;
        }
        if let Some(expansion) = self.entries.get(trigger) {
            return Some(expansion.clone());
        }
        if !config.auto_caps_macro {
            return None;
        }

        let lower = trigger.to_lowercase();
        if lower == trigger {
            return None;
        }
        let expansion = self.entries.get(&lower)?;

        let mut letters = trigger.chars().filter(|c| c.is_alphabetic());
        let all_caps = letters.clone().count() > 1 && letters.all(char::is_uppercase);
        if all_caps {
            Some(expansion.to_uppercase())
        } else if trigger.chars().next().is_some_and(char::is_uppercase) {
            Some(capitalize(expansion))
        } else {
            None
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
