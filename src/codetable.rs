//! Output encoders. The engine works in Unicode; hosts using a legacy font
//! get the text re-encoded here. Legacy bytes travel as chars U+0000–U+00FF
//! so that one `String` type serves every table.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::tone::{LetterKind, Mark, Tone, classify, compose, vietnamese_letters, vowel_row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeTable {
    #[default]
    Unicode,
    Tcvn3,
    VniWindows,
    /// Precomposed letter followed by a combining tone mark.
    UnicodeCompound,
}

impl CodeTable {
    /// Host-side numbering (0 Unicode, 1 TCVN3, 2 VNI-Windows, 3 Unicode
    /// compound), clamped.
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=0 => CodeTable::Unicode,
            1 => CodeTable::Tcvn3,
            2 => CodeTable::VniWindows,
            _ => CodeTable::UnicodeCompound,
        }
    }

    /// Whether every letter is exactly one character in this table, so one
    /// backspace removes one slot.
    #[inline(always)]
    pub fn is_single_unit(self) -> bool {
        matches!(self, CodeTable::Unicode | CodeTable::Tcvn3)
    }
}

/// TCVN3 codes of a ă â e ê i o ô ơ u ư y, untoned then the five tones.
const TCVN3_VOWELS: [[u8; 6]; 12] = [
    [0x61, 0xB8, 0xB5, 0xB6, 0xB7, 0xB9],
    [0xA8, 0xBE, 0xBB, 0xBC, 0xBD, 0xC6],
    [0xA9, 0xCA, 0xC7, 0xC8, 0xC9, 0xCB],
    [0x65, 0xD0, 0xCC, 0xCE, 0xCF, 0xD1],
    [0xAA, 0xD5, 0xD2, 0xD3, 0xD4, 0xD6],
    [0x69, 0xDD, 0xD7, 0xD8, 0xDC, 0xDE],
    [0x6F, 0xE3, 0xDF, 0xE1, 0xE2, 0xE4],
    [0xAB, 0xE8, 0xE5, 0xE6, 0xE7, 0xE9],
    [0xAC, 0xED, 0xEA, 0xEB, 0xEC, 0xEE],
    [0x75, 0xF3, 0xEF, 0xF1, 0xF2, 0xF4],
    [0xAD, 0xF8, 0xF5, 0xF6, 0xF7, 0xF9],
    [0x79, 0xFD, 0xFA, 0xFB, 0xFC, 0xFE],
];

/// Untoned capitals. Toned capitals share the lowercase code.
const TCVN3_UPPER: [u8; 12] = [0x41, 0xA1, 0xA2, 0x45, 0xA3, 0x49, 0x4F, 0xA4, 0xA5, 0x55, 0xA6, 0x59];

const TCVN3_D: u8 = 0xAE;
const TCVN3_D_UPPER: u8 = 0xA7;

/// VNI-Windows tone bytes in [`Tone`] order.
const VNI_TONE: [u8; 5] = [0xF9, 0xF8, 0xFB, 0xF5, 0xEF];
const VNI_CIRCUMFLEX: [u8; 6] = [0xE2, 0xE1, 0xE0, 0xE5, 0xE3, 0xE4];
const VNI_BREVE: [u8; 6] = [0xEA, 0xE9, 0xE8, 0xFA, 0xFC, 0xEB];
const VNI_I: [u8; 6] = [b'i', 0xED, 0xEC, 0xE6, 0xF3, 0xF2];
const VNI_O_HORN: u8 = 0xF4;
const VNI_U_HORN: u8 = 0xF6;
const VNI_Y_DOT: u8 = 0xEE;
const VNI_D: u8 = 0xF1;
/// Capital forms sit 0x20 below the lowercase mark bytes.
const VNI_CASE_SHIFT: u8 = 0x20;

/// Combining marks in [`Tone`] order.
const COMBINING_TONE: [char; 5] = ['\u{301}', '\u{300}', '\u{309}', '\u{303}', '\u{323}'];

#[inline(always)]
fn tone_slot(tone: Option<Tone>) -> usize {
    tone.map_or(0, Tone::index)
}

fn tcvn3(c: char) -> Option<u8> {
    let info = classify(c);
    match info.kind {
        LetterKind::Vowel => {
            let row = vowel_row(info.base, info.mark)?;
            if info.upper && info.tone.is_none() {
                Some(TCVN3_UPPER[row])
            } else {
                Some(TCVN3_VOWELS[row][tone_slot(info.tone)])
            }
        }
        LetterKind::Consonant if info.mark == Some(Mark::Stroke) => {
            Some(if info.upper { TCVN3_D_UPPER } else { TCVN3_D })
        }
        _ => None,
    }
}

/// VNI-Windows units of `c`: a base byte and an optional mark byte.
fn vni(c: char) -> Option<(u8, Option<u8>)> {
    let info = classify(c);
    let t = tone_slot(info.tone);
    let tone_byte = info.tone.map(|tone| VNI_TONE[tone.index() - 1]);

    let (base, mark) = match (info.kind, info.base, info.mark) {
        (LetterKind::Vowel, b, Some(Mark::Circumflex)) => (b as u8, Some(VNI_CIRCUMFLEX[t])),
        (LetterKind::Vowel, 'a', Some(Mark::Breve)) => (b'a', Some(VNI_BREVE[t])),
        (LetterKind::Vowel, 'o', Some(Mark::Horn)) => (VNI_O_HORN, tone_byte),
        (LetterKind::Vowel, 'u', Some(Mark::Horn)) => (VNI_U_HORN, tone_byte),
        (LetterKind::Vowel, 'i', None) => (VNI_I[t], None),
        (LetterKind::Vowel, 'y', None) if info.tone == Some(Tone::Dot) => (VNI_Y_DOT, None),
        (LetterKind::Vowel, b, None) => (b as u8, tone_byte),
        (LetterKind::Consonant, 'd', Some(Mark::Stroke)) => (VNI_D, None),
        _ => return None,
    };

    if !info.upper {
        return Some((base, mark));
    }
    let base = if base.is_ascii_lowercase() {
        base.to_ascii_uppercase()
    } else {
        base - VNI_CASE_SHIFT
    };
    Some((base, mark.map(|m| m - VNI_CASE_SHIFT)))
}

fn push_compound(c: char, out: &mut String) {
    let info = classify(c);
    match info.tone {
        Some(tone) => {
            out.push(compose(info.base, info.mark, None, info.upper));
            out.push(COMBINING_TONE[tone.index() - 1]);
        }
        None => out.push(c),
    }
}

/// Re-encodes Unicode `text` for `table`. For the legacy tables each unit is
/// a `char` in `U+0000..=U+00FF` standing for one byte; ASCII the table does
/// not remap passes through and any other character becomes `?`, since its
/// own code point would read back as a different letter.
pub fn encode(text: &str, table: CodeTable) -> String {
    if table == CodeTable::Unicode {
        return text.to_owned();
    }
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        match table {
            CodeTable::Unicode => out.push(c),
            CodeTable::UnicodeCompound => push_compound(c, &mut out),
            CodeTable::Tcvn3 => out.push(tcvn3(c).map_or_else(|| unmapped(c), char::from)),
            CodeTable::VniWindows => match vni(c) {
                Some((base, mark)) => {
                    out.push(char::from(base));
                    out.extend(mark.map(char::from));
                }
                None => out.push(unmapped(c)),
            },
        }
    }
    out
}

fn unmapped(c: char) -> char {
    if c.is_ascii() { c } else { '?' }
}

/// Encodes `text` to the bytes a host writes out: UTF-8 for the Unicode
/// tables, one byte per unit for the legacy ones (`?` when a character has
/// no code).
pub fn encode_bytes(text: &str, table: CodeTable) -> Vec<u8> {
    let encoded = encode(text, table);
    if matches!(table, CodeTable::Unicode | CodeTable::UnicodeCompound) {
        return encoded.into_bytes();
    }
    encoded
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn tcvn3_decoder() -> &'static HashMap<char, char> {
    static MAP: OnceLock<HashMap<char, char>> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut map = HashMap::new();
        // Capitals first so the shared lowercase codes end up lowercase.
        for letter in vietnamese_letters() {
            let upper = letter.to_uppercase().next().unwrap_or(letter);
            for c in [upper, letter] {
                if let Some(code) = tcvn3(c) {
                    map.insert(char::from(code), c);
                }
            }
        }
        map
    })
}

fn vni_decoder() -> &'static HashMap<(char, Option<char>), char> {
    static MAP: OnceLock<HashMap<(char, Option<char>), char>> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut map = HashMap::new();
        for letter in vietnamese_letters() {
            let upper = letter.to_uppercase().next().unwrap_or(letter);
            for c in [letter, upper] {
                if let Some((base, mark)) = vni(c) {
                    map.insert((char::from(base), mark.map(char::from)), c);
                }
            }
        }
        map
    })
}

/// Converts `table`-encoded text back to Unicode.
pub fn decode(text: &str, table: CodeTable) -> String {
    match table {
        CodeTable::Unicode => text.to_owned(),
        CodeTable::Tcvn3 => {
            let map = tcvn3_decoder();
            text.chars().map(|c| map.get(&c).copied().unwrap_or(c)).collect()
        }
        CodeTable::VniWindows => decode_vni(text),
        CodeTable::UnicodeCompound => decode_compound(text),
    }
}

fn decode_vni(text: &str) -> String {
    let map = vni_decoder();
    let units: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < units.len() {
        let pair = units.get(i + 1).and_then(|&next| map.get(&(units[i], Some(next))));
        if let Some(&c) = pair {
            out.push(c);
            i += 2;
            continue;
        }
        out.push(map.get(&(units[i], None)).copied().unwrap_or(units[i]));
        i += 1;
    }
    out
}

fn decode_compound(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let info = classify(c);
        let tone = chars.peek().and_then(|next| {
            COMBINING_TONE.iter().position(|m| m == next).and_then(|i| Tone::from_index(i as u8 + 1))
        });
        match tone {
            Some(tone) if info.kind == LetterKind::Vowel && info.tone.is_none() => {
                chars.next();
                out.push(compose(info.base, info.mark, Some(tone), info.upper));
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(s: &str) -> Vec<u32> {
        s.chars().map(u32::from).collect()
    }

    #[test]
    fn unicode_is_identity() {
        assert_eq!(encode("Tiếng Việt", CodeTable::Unicode), "Tiếng Việt");
        assert_eq!(decode("Tiếng Việt", CodeTable::Unicode), "Tiếng Việt");
    }

    #[test]
    fn tcvn3_codes() {
        assert_eq!(bytes(&encode("việt", CodeTable::Tcvn3)), [0x76, 0x69, 0xD6, 0x74]);
        assert_eq!(bytes(&encode("Đà", CodeTable::Tcvn3)), [0xA7, 0xB5]);
        assert_eq!(bytes(&encode("Ư", CodeTable::Tcvn3)), [0xA6]);
        // No capital code for toned letters.
        assert_eq!(encode("Ấ", CodeTable::Tcvn3), encode("ấ", CodeTable::Tcvn3));
    }

    #[test]
    fn vni_codes() {
        assert_eq!(bytes(&encode("việt", CodeTable::VniWindows)), [0x76, 0x69, 0x65, 0xE4, 0x74]);
        assert_eq!(bytes(&encode("đường", CodeTable::VniWindows)), [
            0xF1, 0xF6, 0xF4, 0xF8, 0x6E, 0x67
        ]);
        assert_eq!(bytes(&encode("Á", CodeTable::VniWindows)), [0x41, 0xD9]);
        assert_eq!(bytes(&encode("Ỵ", CodeTable::VniWindows)), [0xCE]);
        assert_eq!(bytes(&encode("ì", CodeTable::VniWindows)), [0xEC]);
    }

    #[test]
    fn compound_splits_tone() {
        assert_eq!(encode("hoà", CodeTable::UnicodeCompound), "hoa\u{300}");
        assert_eq!(encode("Ợ", CodeTable::UnicodeCompound), "Ơ\u{323}");
        assert_eq!(decode("hoa\u{300}", CodeTable::UnicodeCompound), "hoà");
    }

    #[test]
    fn unknown_characters() {
        for table in [CodeTable::Tcvn3, CodeTable::VniWindows] {
            assert_eq!(encode("x + 1 €", table), "x + 1 ?");
            assert_eq!(encode("ñü", table), "??");
        }
        assert_eq!(encode("x + 1 €", CodeTable::UnicodeCompound), "x + 1 €");
        assert_eq!(encode_bytes("a€", CodeTable::Tcvn3), b"a?");
        assert_eq!(encode_bytes("ạ", CodeTable::Unicode), "ạ".as_bytes());
    }

    #[test]
    fn latin1_letters_do_not_become_vietnamese() {
        let bytes = encode_bytes("ñ ü", CodeTable::Tcvn3);
        assert_eq!(bytes, b"? ?");
        let text: String = bytes.iter().map(|&b| char::from(b)).collect();
        assert_eq!(decode(&text, CodeTable::Tcvn3), "? ?");
        assert_eq!(decode(&encode("ñ", CodeTable::VniWindows), CodeTable::VniWindows), "?");
    }

    #[test]
    fn every_letter_round_trips() {
        for letter in vietnamese_letters() {
            let upper = letter.to_uppercase().next().unwrap();
            for table in [CodeTable::VniWindows, CodeTable::UnicodeCompound] {
                for c in [letter, upper] {
                    let s = c.to_string();
                    assert_eq!(decode(&encode(&s, table), table), s, "{c} in {table:?}");
                }
            }
            let s = letter.to_string();
            assert_eq!(decode(&encode(&s, CodeTable::Tcvn3), CodeTable::Tcvn3), s);
        }
    }

    #[test]
    fn encoded_text_round_trips() {
        let text = "Người Việt học tiếng Anh, ĐƯỜNG xa";
        for table in [CodeTable::Tcvn3, CodeTable::VniWindows, CodeTable::UnicodeCompound] {
            let encoded = encode(text, table);
            assert_eq!(encode(&decode(&encoded, table), table), encoded, "{table:?}");
        }
    }

    #[test]
    fn from_index_clamps() {
        assert_eq!(CodeTable::from_index(-5), CodeTable::Unicode);
        assert_eq!(CodeTable::from_index(1), CodeTable::Tcvn3);
        assert_eq!(CodeTable::from_index(2), CodeTable::VniWindows);
        assert_eq!(CodeTable::from_index(40), CodeTable::UnicodeCompound);
        assert!(CodeTable::Tcvn3.is_single_unit());
        assert!(!CodeTable::VniWindows.is_single_unit());
    }
}
