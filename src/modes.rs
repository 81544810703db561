use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::syllable::SyllableBuffer;
use crate::tone::{Mark, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMethod {
    #[default]
    Telex,
    Vni,
    /// Telex without the free-standing `w` and with strictly adjacent marks.
    Simple,
}

impl InputMethod {
    /// Host-side numbering (0 Telex, 1 VNI, 2 Simple Telex); out-of-range
    /// values clamp to the nearest method.
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=0 => InputMethod::Telex,
            1 => InputMethod::Vni,
            _ => InputMethod::Simple,
        }
    }

    pub fn table(self) -> &'static dyn TransformTable {
        match self {
            InputMethod::Telex => &TELEX,
            InputMethod::Vni => &VNI,
            InputMethod::Simple => &SIMPLE_TELEX,
        }
    }
}

/// What a key does in a scheme, before looking at the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Tone(Tone),
    ClearTone,
    /// Adds a diacritic to the nearest letter whose base is listed.
    Mark(&'static [(char, Mark)]),
    /// Quick Telex: a doubled initial consonant becomes a digraph ending in
    /// this letter (`cc` → `ch`).
    QuickConsonant(char),
}

/// Per-scheme key table. One implementation per [`InputMethod`].
pub trait TransformTable: Sync {
    fn method(&self) -> InputMethod;

    fn action(&self, key: char, config: &EngineConfig) -> Option<KeyAction>;

    /// Letter typed by a mark key that found nothing to modify.
    fn standalone(
        &self,
        _key: char,
        _buffer: &SyllableBuffer,
        _config: &EngineConfig,
    ) -> Option<char> {
        None
    }

    /// Whether free marking may reach letters before the last one.
    fn allows_free_mark(&self) -> bool {
        true
    }
}

const CIRCUMFLEX_A: &[(char, Mark)] = &[('a', Mark::Circumflex)];
const CIRCUMFLEX_E: &[(char, Mark)] = &[('e', Mark::Circumflex)];
const CIRCUMFLEX_O: &[(char, Mark)] = &[('o', Mark::Circumflex)];
const CIRCUMFLEX_AEO: &[(char, Mark)] =
    &[('a', Mark::Circumflex), ('e', Mark::Circumflex), ('o', Mark::Circumflex)];
const TELEX_W: &[(char, Mark)] = &[('a', Mark::Breve), ('o', Mark::Horn), ('u', Mark::Horn)];
const HORN_OU: &[(char, Mark)] = &[('o', Mark::Horn), ('u', Mark::Horn)];
const BREVE_A: &[(char, Mark)] = &[('a', Mark::Breve)];
const STROKE_D: &[(char, Mark)] = &[('d', Mark::Stroke)];

pub const TONE_TELEX: [u8; 128] = {
    let mut t = [0u8; 128];
    t[b's' as usize] = 1;
    t[b'f' as usize] = 2;
    t[b'r' as usize] = 3;
    t[b'x' as usize] = 4;
    t[b'j' as usize] = 5;
    t
};

pub const TONE_VNI: [u8; 128] = {
    let mut t = [0u8; 128];
    t[b'1' as usize] = 1;
    t[b'2' as usize] = 2;
    t[b'3' as usize] = 3;
    t[b'4' as usize] = 4;
    t[b'5' as usize] = 5;
    t
};

#[inline(always)]
fn ascii_lower(key: char) -> Option<u8> {
    key.is_ascii().then(|| key.to_ascii_lowercase() as u8)
}

pub struct Telex;
pub struct Vni;
pub struct SimpleTelex;

pub static TELEX: Telex = Telex;
pub static VNI: Vni = Vni;
pub static SIMPLE_TELEX: SimpleTelex = SimpleTelex;

fn telex_action(b: u8) -> Option<KeyAction> {
    if let Some(tone) = Tone::from_index(TONE_TELEX[b as usize]) {
        return Some(KeyAction::Tone(tone));
    }
    match b {
        b'z' => Some(KeyAction::ClearTone),
        b'a' => Some(KeyAction::Mark(CIRCUMFLEX_A)),
        b'e' => Some(KeyAction::Mark(CIRCUMFLEX_E)),
        b'o' => Some(KeyAction::Mark(CIRCUMFLEX_O)),
        b'w' => Some(KeyAction::Mark(TELEX_W)),
        b'd' => Some(KeyAction::Mark(STROKE_D)),
        _ => None,
    }
}

impl TransformTable for Telex {
    fn method(&self) -> InputMethod {
        InputMethod::Telex
    }

    fn action(&self, key: char, config: &EngineConfig) -> Option<KeyAction> {
        let b = ascii_lower(key)?;
        if let Some(action) = telex_action(b) {
            return Some(action);
        }
        if !config.quick_telex {
            return None;
        }
        let second = match b {
            b'c' | b'k' | b'p' | b't' => 'h',
            b'g' => 'i',
            b'n' => 'g',
            b'q' => 'u',
            _ => return None,
        };
        Some(KeyAction::QuickConsonant(second))
    }

    fn standalone(&self, key: char, buffer: &SyllableBuffer, config: &EngineConfig) -> Option<char> {
        if !key.eq_ignore_ascii_case(&'w') || !config.quick_telex {
            return None;
        }
        // A word may start with a literal w when foreign initials are allowed.
        if buffer.is_empty() && config.allow_consonant_zfwj {
            return None;
        }
        Some('ư')
    }
}

impl TransformTable for SimpleTelex {
    fn method(&self) -> InputMethod {
        InputMethod::Simple
    }

    fn action(&self, key: char, _config: &EngineConfig) -> Option<KeyAction> {
        telex_action(ascii_lower(key)?)
    }

    fn allows_free_mark(&self) -> bool {
        false
    }
}

impl TransformTable for Vni {
    fn method(&self) -> InputMethod {
        InputMethod::Vni
    }

    fn action(&self, key: char, _config: &EngineConfig) -> Option<KeyAction> {
        let b = ascii_lower(key)?;
        if let Some(tone) = Tone::from_index(TONE_VNI[b as usize]) {
            return Some(KeyAction::Tone(tone));
        }
        match b {
            b'0' => Some(KeyAction::ClearTone),
            b'6' => Some(KeyAction::Mark(CIRCUMFLEX_AEO)),
            b'7' => Some(KeyAction::Mark(HORN_OU)),
            b'8' => Some(KeyAction::Mark(BREVE_A)),
            b'9' => Some(KeyAction::Mark(STROKE_D)),
            _ => None,
        }
    }
}
