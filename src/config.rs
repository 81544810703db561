//! Engine configuration.
//!
//! One `EngineConfig` value is owned by each [`crate::EngineController`] and
//! handed by reference to the transform, spelling and macro code. Settings
//! can be read from TOML:
//!
//! ```toml
//! input_method = "vni"
//! code_table = "tcvn3"
//! modern_orthography = false
//!
//! [macros]
//! btw = "by the way"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codetable::CodeTable;
use crate::error::{ConfigError, ConfigResult};
use crate::modes::InputMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    #[default]
    Vietnamese,
}

impl Language {
    /// 0 is English, anything above is Vietnamese.
    pub fn from_index(index: i32) -> Self {
        if index <= 0 { Language::English } else { Language::Vietnamese }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::English => Language::Vietnamese,
            Language::Vietnamese => Language::English,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub language: Language,
    pub input_method: InputMethod,
    pub code_table: CodeTable,
    /// Diacritic keys may modify any matching letter of the word instead of
    /// only the one typed right before them.
    pub free_mark: bool,
    pub check_spelling: bool,
    /// `hoà`, `thuỳ` instead of `hòa`, `thùy`.
    pub modern_orthography: bool,
    pub quick_telex: bool,
    pub restore_if_wrong_spelling: bool,
    pub macro_enabled: bool,
    pub macro_in_english_mode: bool,
    pub auto_caps_macro: bool,
    pub smart_switch_key: bool,
    pub upper_case_first_char: bool,
    pub allow_consonant_zfwj: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language: Language::Vietnamese,
            input_method: InputMethod::Telex,
            code_table: CodeTable::Unicode,
            free_mark: false,
            check_spelling: true,
            modern_orthography: true,
            quick_telex: false,
            restore_if_wrong_spelling: false,
            macro_enabled: true,
            macro_in_english_mode: false,
            auto_caps_macro: true,
            smart_switch_key: true,
            upper_case_first_char: true,
            allow_consonant_zfwj: true,
        }
    }
}

impl EngineConfig {
    /// Parses settings from TOML. Unknown keys (such as a `[macros]` table)
    /// are ignored; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded engine config");
        Ok(config)
    }

    /// Whether macros fire in the current language.
    #[inline(always)]
    pub fn macros_active(&self) -> bool {
        self.macro_enabled
            && (self.language == Language::Vietnamese || self.macro_in_english_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.language, Language::Vietnamese);
        assert_eq!(c.input_method, InputMethod::Telex);
        assert_eq!(c.code_table, CodeTable::Unicode);
        assert!(c.check_spelling);
        assert!(c.modern_orthography);
        assert!(!c.restore_if_wrong_spelling);
        assert!(!c.quick_telex);
    }

    #[test]
    fn toml_overrides_and_ignores_macros() {
        let c = EngineConfig::from_toml_str(
            r#"
            input_method = "vni"
            code_table = "vni_windows"
            modern_orthography = false

            [macros]
            btw = "by the way"
            "#,
        )
        .unwrap();
        assert_eq!(c.input_method, InputMethod::Vni);
        assert_eq!(c.code_table, CodeTable::VniWindows);
        assert!(!c.modern_orthography);
        assert!(c.check_spelling);
    }

    #[test]
    fn bad_toml_is_an_error() {
        let err = EngineConfig::from_toml_str("input_method = \"dvorak\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn language_from_index_clamps() {
        assert_eq!(Language::from_index(-3), Language::English);
        assert_eq!(Language::from_index(0), Language::English);
        assert_eq!(Language::from_index(7), Language::Vietnamese);
        assert_eq!(Language::English.toggled(), Language::Vietnamese);
    }

    #[test]
    fn macros_follow_language() {
        let mut c = EngineConfig::default();
        assert!(c.macros_active());
        c.language = Language::English;
        assert!(!c.macros_active());
        c.macro_in_english_mode = true;
        assert!(c.macros_active());
    }
}
