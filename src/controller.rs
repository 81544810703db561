//! Host-facing engine: turns key events into text edits, owns the buffer,
//! the settings and the macro table, and handles everything around a word
//! (boundaries, backspace, shortcuts, application switches).

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::codetable::{self, CodeTable};
use crate::config::{EngineConfig, Language};
use crate::engine::{self, TransformResult};
use crate::keys::{Key, KeyEvent, Modifiers};
use crate::macros::MacroTable;
use crate::modes::InputMethod;
use crate::spelling;
use crate::syllable::{CharSlot, SyllableBuffer};
use crate::tone::{LetterKind, classify};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No word in progress.
    Idle,
    Composing,
}

#[derive(Debug, Clone, Default)]
pub struct EngineController {
    config: EngineConfig,
    buffer: SyllableBuffer,
    macros: MacroTable,
    /// The next letter starts a sentence.
    pending_capital: bool,
    /// A sentence terminator was typed; whitespace arms `pending_capital`.
    after_terminator: bool,
    app_languages: HashMap<String, Language>,
    current_app: Option<String>,
}

impl EngineController {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn with_macros(config: EngineConfig, macros: MacroTable) -> Self {
        Self { config, macros, ..Self::default() }
    }

    #[inline(always)]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline(always)]
    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn state(&self) -> EngineState {
        if self.buffer.is_empty() { EngineState::Idle } else { EngineState::Composing }
    }

    /// The word being composed, in Unicode.
    pub fn word(&self) -> String {
        self.buffer.render()
    }

    /// Host entry point: `current_text` is the text before the caret. Returns
    /// the corrected text, or `current_text` itself when the key should go
    /// through untouched.
    pub fn process(&mut self, key_code: u16, modifiers: u32, current_text: &str) -> String {
        self.resync(current_text);
        let event = KeyEvent::new(key_code, Modifiers::from_bits(modifiers));
        match self.handle_key(event) {
            TransformResult::NoChange => current_text.to_owned(),
            TransformResult::Replace { text, consumed } => {
                let keep = current_text.chars().count().saturating_sub(consumed);
                let mut out: String = current_text.chars().take(keep).collect();
                out.push_str(&text);
                out
            }
        }
    }

    /// Forgets the word when the text before the caret no longer ends with
    /// it (caret moved, text edited by the host).
    fn resync(&mut self, current_text: &str) {
        if self.buffer.is_empty() {
            return;
        }
        let rendered = self.rendered();
        if !current_text.ends_with(rendered.as_str()) {
            tracing::debug!(%rendered, "text changed under the word, resetting");
            self.buffer.reset();
        }
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> TransformResult {
        tracing::trace!(code = event.code, modifiers = event.modifiers.bits(), "key");
        if event.modifiers.is_shortcut() {
            self.buffer.reset();
            return TransformResult::NoChange;
        }
        match event.key() {
            Key::Char(c) => self.type_char(c),
            Key::Space => self.end_word(' ', true),
            Key::Enter => self.end_word('\n', true),
            Key::Tab => self.end_word('\t', true),
            Key::Backspace => self.backspace(),
            Key::Escape | Key::Navigation | Key::Other => {
                self.buffer.reset();
                TransformResult::NoChange
            }
        }
    }

    /// Feeds one typed character, as if its key had been pressed.
    /// `\u{8}` and `\u{7f}` act as backspace.
    pub fn type_char(&mut self, c: char) -> TransformResult {
        match c {
            '\u{8}' | '\u{7f}' => self.backspace(),
            _ if self.is_word_char(c) => self.compose(c),
            _ if c.is_ascii_digit() => self.end_word(c, false),
            _ => self.end_word(c, true),
        }
    }

    fn is_word_char(&self, c: char) -> bool {
        classify(c).kind != LetterKind::Other
            || (c.is_ascii_digit() && self.config.input_method == InputMethod::Vni)
    }

    fn restore_active(&self) -> bool {
        self.config.language == Language::Vietnamese
            && self.config.check_spelling
            && self.config.restore_if_wrong_spelling
    }

    fn rendered(&self) -> String {
        codetable::encode(&self.buffer.render(), self.config.code_table)
    }

    fn compose(&mut self, typed: char) -> TransformResult {
        let key = if self.capitalize_next() && self.buffer.is_empty() && typed.is_lowercase() {
            typed.to_uppercase().next().unwrap_or(typed)
        } else {
            typed
        };
        self.pending_capital = false;
        self.after_terminator = false;

        let before = self.rendered();
        let snapshot = self.restore_active().then(|| self.buffer.clone());
        let result = engine::apply(&mut self.buffer, key, &self.config);

        if let Some(snapshot) = snapshot {
            let word = self.buffer.render();
            if result.is_replace() && !spelling::is_valid_prefix(&word, &self.config) {
                tracing::debug!(%word, %key, "transform breaks spelling, rolling back");
                self.buffer = snapshot;
                self.buffer.record_key(key);
                if self.buffer.append(CharSlot::literal(key)).is_err() {
                    self.buffer.reset();
                }
            }
        }

        engine::diff(&before, self.rendered(), typed)
    }

    fn capitalize_next(&self) -> bool {
        self.pending_capital
            && self.config.upper_case_first_char
            && self.config.language == Language::Vietnamese
    }

    /// Ends the word with `boundary`. With `expand`, macros fire and a
    /// misspelt transformed word goes back to the keys typed.
    fn end_word(&mut self, boundary: char, expand: bool) -> TransformResult {
        let before = self.rendered();
        let word = self.buffer.render();

        let mut replacement = None;
        if expand && !word.is_empty() {
            if let Some(expansion) = self.macros.try_expand(&word, &self.config) {
                tracing::debug!(%word, %expansion, "macro");
                replacement = Some(expansion);
            } else if self.restore_active() && !spelling::is_valid(&word, &self.config) {
                if let Some(raw) = self.buffer.raw_keys().filter(|raw| *raw != word) {
                    tracing::debug!(%word, %raw, "restoring keys of misspelt word");
                    replacement = Some(raw.to_owned());
                }
            }
        }
        self.buffer.reset();
        self.track_sentence(boundary);

        match replacement {
            Some(text) => {
                let mut text = codetable::encode(&text, self.config.code_table);
                text.push(boundary);
                TransformResult::Replace { text, consumed: before.chars().count() }
            }
            None => TransformResult::NoChange,
        }
    }

    fn track_sentence(&mut self, boundary: char) {
        match boundary {
            '.' | '?' | '!' => {
                self.after_terminator = true;
                self.pending_capital = false;
            }
            '\n' => {
                self.after_terminator = false;
                self.pending_capital = true;
            }
            ' ' | '\t' => {
                self.pending_capital |= self.after_terminator;
                self.after_terminator = false;
            }
            _ => {
                self.after_terminator = false;
                self.pending_capital = false;
            }
        }
    }

    fn backspace(&mut self) -> TransformResult {
        if self.buffer.is_empty() {
            return TransformResult::NoChange;
        }
        if !self.config.code_table.is_single_unit() {
            self.buffer.reset();
            return TransformResult::NoChange;
        }

        let before = self.rendered();
        self.buffer.pop();
        engine::relocate_tone(&mut self.buffer, &self.config);
        let after = self.rendered();

        // One character less at the end is what the host's own backspace does.
        let mut expected = before.clone();
        expected.pop();
        if after == expected {
            TransformResult::NoChange
        } else {
            TransformResult::Replace { text: after, consumed: before.chars().count() }
        }
    }

    /// Drops the word and any pending sentence capitalisation, leaving the
    /// engine as it was when built.
    pub fn reset_buffer(&mut self) {
        self.buffer.reset();
        self.pending_capital = false;
        self.after_terminator = false;
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        tracing::debug!(?config, "config replaced");
        self.config = config;
    }

    pub fn set_macros(&mut self, macros: MacroTable) {
        tracing::debug!(count = macros.len(), "macro table replaced");
        self.macros = macros;
    }

    pub fn set_input_method(&mut self, index: i32) {
        self.config.input_method = InputMethod::from_index(index);
        tracing::debug!(method = ?self.config.input_method, "input method");
    }

    pub fn set_code_table(&mut self, index: i32) {
        self.config.code_table = CodeTable::from_index(index);
        tracing::debug!(table = ?self.config.code_table, "code table");
    }

    pub fn set_free_mark(&mut self, value: i32) {
        self.config.free_mark = value > 0;
        tracing::debug!(free_mark = self.config.free_mark, "free mark");
    }

    pub fn set_check_spelling(&mut self, value: i32) {
        self.config.check_spelling = value > 0;
        tracing::debug!(check_spelling = self.config.check_spelling, "check spelling");
    }

    pub fn set_language(&mut self, value: i32) {
        self.config.language = Language::from_index(value);
        tracing::debug!(language = ?self.config.language, "language");
    }

    pub fn toggle_language(&mut self) -> Language {
        self.config.language = self.config.language.toggled();
        self.buffer.reset();
        tracing::debug!(language = ?self.config.language, "language toggled");
        self.config.language
    }

    /// The frontmost application changed. With smart switching, each
    /// application keeps the language it was last used with.
    pub fn on_app_changed(&mut self, app_id: &str) {
        self.buffer.reset();
        if !self.config.smart_switch_key {
            return;
        }
        if let Some(previous) = self.current_app.take() {
            self.app_languages.insert(previous, self.config.language);
        }
        if let Some(&language) = self.app_languages.get(app_id) {
            self.config.language = language;
        }
        tracing::debug!(app_id, language = ?self.config.language, "application switched");
        self.current_app = Some(app_id.to_owned());
    }
}

/// A controller shared between threads; every call holds the lock for one
/// whole key.
#[derive(Debug, Default)]
pub struct SharedEngine {
    inner: Mutex<EngineController>,
}

impl SharedEngine {
    pub fn new(controller: EngineController) -> Self {
        Self { inner: Mutex::new(controller) }
    }

    pub fn process(&self, key_code: u16, modifiers: u32, current_text: &str) -> String {
        self.with(|engine| engine.process(key_code, modifiers, current_text))
    }

    /// Runs `f` with the controller locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut EngineController) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::code;

    fn type_all(engine: &mut EngineController, text: &str) -> String {
        let mut field = String::new();
        for c in text.chars() {
            engine.type_char(c).apply_to(&mut field, c);
        }
        field
    }

    #[test]
    fn state_follows_buffer() {
        let mut e = EngineController::default();
        assert_eq!(e.state(), EngineState::Idle);
        e.type_char('a');
        assert_eq!(e.state(), EngineState::Composing);
        e.type_char(' ');
        assert_eq!(e.state(), EngineState::Idle);
    }

    #[test]
    fn shortcuts_and_navigation_reset() {
        let mut e = EngineController::default();
        type_all(&mut e, "ba");
        assert_eq!(e.handle_key(KeyEvent::new(code::S, Modifiers::COMMAND)), TransformResult::NoChange);
        assert_eq!(e.state(), EngineState::Idle);
        type_all(&mut e, "ba");
        e.handle_key(KeyEvent::new(code::LEFT, Modifiers::NONE));
        assert_eq!(e.state(), EngineState::Idle);
        // The next tone key has nothing to attach to.
        assert_eq!(e.handle_key(KeyEvent::new(code::S, Modifiers::NONE)), TransformResult::NoChange);
    }

    #[test]
    fn backspace_pops_and_moves_tone() {
        let mut config = EngineConfig::default();
        config.modern_orthography = false;
        let mut e = EngineController::new(config);
        assert_eq!(type_all(&mut e, "hoanf"), "hoàn");
        assert_eq!(
            e.type_char('\u{8}'),
            TransformResult::Replace { text: "hòa".into(), consumed: 4 }
        );
        assert_eq!(e.type_char('\u{8}'), TransformResult::NoChange);
        assert_eq!(e.word(), "hò");
    }

    #[test]
    fn backspace_resets_multi_unit_tables() {
        let mut e = EngineController::default();
        e.set_code_table(2);
        type_all(&mut e, "as");
        assert_eq!(e.type_char('\u{8}'), TransformResult::NoChange);
        assert_eq!(e.state(), EngineState::Idle);
    }

    #[test]
    fn resync_resets_on_foreign_text() {
        let mut e = EngineController::default();
        assert_eq!(e.process(code::A, 0, "x"), "x");
        e.type_char('a');
        // Host says the caret is somewhere else now.
        assert_eq!(e.process(code::S, 0, "zzz"), "zzz");
        assert_eq!(e.word(), "s");
    }

    #[test]
    fn smart_switch_remembers_language_per_app() {
        let mut e = EngineController::default();
        e.on_app_changed("com.apple.Terminal");
        e.set_language(0);
        e.on_app_changed("com.apple.TextEdit");
        assert_eq!(e.config().language, Language::English);
        e.set_language(1);
        e.on_app_changed("com.apple.Terminal");
        assert_eq!(e.config().language, Language::English);
        e.on_app_changed("com.apple.TextEdit");
        assert_eq!(e.config().language, Language::Vietnamese);
    }

    #[test]
    fn shared_engine_locks_per_call() {
        let shared = SharedEngine::new(EngineController::default());
        let text = shared.process(code::A, 0, "");
        let text = shared.process(code::A, 0, &(text + "a"));
        assert_eq!(text, "â");
        assert_eq!(shared.with(|e| e.state()), EngineState::Composing);
    }
}
