//! Syllable validator: checks rendered text against Vietnamese syllable
//! structure (initial consonant, vowel nucleus, final consonant, tone).

use crate::config::EngineConfig;
use crate::tone::{LetterKind, Mark, Tone, classify, compose};

const INITIALS: &[&str] = &[
    "ngh", "ng", "nh", "ch", "gh", "gi", "kh", "ph", "th", "tr", "qu", "b", "c", "d", "đ", "g",
    "h", "k", "l", "m", "n", "p", "q", "r", "s", "t", "v", "x",
];

const FOREIGN_INITIALS: &[&str] = &["z", "f", "w", "j"];

const CODAS: &[&str] = &["ch", "ng", "nh", "c", "m", "n", "p", "t"];

const STOP_CODAS: &[&str] = &["c", "ch", "p", "t"];

const NUCLEI: &[&str] = &[
    "a", "ă", "â", "e", "ê", "i", "o", "ô", "ơ", "u", "ư", "y", //
    "ai", "ao", "au", "ay", "âu", "ây", "eo", "êu", "ia", "iê", "iu", "oa", "oă", "oe", "oi",
    "ôi", "ơi", "oo", "ua", "uâ", "uê", "ui", "uô", "uơ", "uy", "ưa", "ưi", "ươ", "ưu", "yê",
    "iêu", "oai", "oao", "oay", "oeo", "uây", "uôi", "uya", "uyê", "uyu", "ươi", "ươu", "yêu",
];

/// Nuclei that only occur before a final consonant.
const NEEDS_CODA: &[&str] = &["ă", "â", "iê", "yê", "uô", "ươ", "uyê", "oă", "uâ", "oo"];

/// Nuclei ending in a glide, plus the open `ia`/`ua`/`ưa`/`uơ`: never followed
/// by a final consonant.
const OPEN_ONLY: &[&str] = &[
    "ai", "ao", "au", "ay", "âu", "ây", "eo", "êu", "ia", "iu", "oi", "ôi", "ơi", "ua", "ui",
    "uơ", "ưa", "ưi", "ưu", "iêu", "oai", "oao", "oay", "oeo", "uây", "uôi", "uya", "uyu", "ươi",
    "ươu", "yêu",
];

/// True when `text` is one complete, well-formed Vietnamese syllable.
pub fn is_valid(text: &str, config: &EngineConfig) -> bool {
    check(text, config, false)
}

/// True when `text` is a syllable or can still grow into one by typing more
/// letters or adding diacritics. The empty string is a valid prefix.
pub fn is_valid_prefix(text: &str, config: &EngineConfig) -> bool {
    check(text, config, true)
}

struct Normalized {
    /// Lowercase letters without tone.
    text: String,
    tone: Option<Tone>,
}

fn normalize(text: &str) -> Option<Normalized> {
    let mut out = String::with_capacity(text.len());
    let mut tone = None;
    for c in text.chars() {
        let info = classify(c);
        if info.kind == LetterKind::Other {
            return None;
        }
        if let Some(t) = info.tone {
            if tone.is_some() {
                return None;
            }
            tone = Some(t);
        }
        out.push(compose(info.base, info.mark, None, false));
    }
    Some(Normalized { text: out, tone })
}

fn check(text: &str, config: &EngineConfig, partial: bool) -> bool {
    if text.is_empty() {
        return partial;
    }
    let Some(norm) = normalize(text) else {
        return false;
    };
    let s = norm.text.as_str();

    let foreign: &[&str] = if config.allow_consonant_zfwj { FOREIGN_INITIALS } else { &[] };
    INITIALS
        .iter()
        .chain(foreign.iter())
        .chain(std::iter::once(&""))
        .filter(|initial| s.starts_with(**initial))
        .any(|initial| check_rest(&s[initial.len()..], initial, norm.tone, partial))
}

fn check_rest(rest: &str, initial: &str, tone: Option<Tone>, partial: bool) -> bool {
    let split = rest.char_indices().find(|(_, c)| classify(*c).kind != LetterKind::Vowel);
    let (nucleus, coda) = match split {
        Some((i, _)) => rest.split_at(i),
        None => (rest, ""),
    };

    if nucleus.is_empty() {
        // Only the initial so far.
        return partial && coda.is_empty() && !initial.is_empty() && tone.is_none();
    }

    if partial {
        let open = coda.is_empty();
        NUCLEI.iter().any(|pattern| {
            nucleus_can_become(nucleus, pattern, open)
                && check_shape(initial, pattern, coda, tone, partial)
        })
    } else {
        NUCLEI.contains(&nucleus) && check_shape(initial, nucleus, coda, tone, partial)
    }
}

/// Whether the typed vowels can still turn into `pattern` by adding
/// diacritics to unmarked letters (and, when `open`, by typing more vowels).
fn nucleus_can_become(typed: &str, pattern: &str, open: bool) -> bool {
    let mut wanted = pattern.chars();
    for t in typed.chars() {
        let Some(p) = wanted.next() else {
            return false;
        };
        if t == p {
            continue;
        }
        let (ti, pi) = (classify(t), classify(p));
        if ti.mark.is_some() || ti.base != pi.base {
            return false;
        }
    }
    open || wanted.next().is_none()
}

fn check_shape(initial: &str, nucleus: &str, coda: &str, tone: Option<Tone>, partial: bool) -> bool {
    if !initial_fits(initial, nucleus) {
        return false;
    }
    if coda.is_empty() {
        return partial || !NEEDS_CODA.contains(&nucleus);
    }

    let coda_ok = if partial {
        CODAS.iter().any(|c| c.starts_with(coda))
    } else {
        CODAS.contains(&coda)
    };
    if !coda_ok || OPEN_ONLY.contains(&nucleus) {
        return false;
    }
    if matches!(coda, "ch" | "nh") && !palatal_coda_fits(nucleus) {
        return false;
    }

    // Stop finals take sắc or nặng; an unfinished word may not have its tone yet.
    let stop = STOP_CODAS.contains(&coda);
    match tone {
        Some(t) if stop => t.fits_stop_coda(),
        None if stop => partial,
        _ => true,
    }
}

fn initial_fits(initial: &str, nucleus: &str) -> bool {
    let Some(first) = nucleus.chars().next() else {
        return true;
    };
    let info = classify(first);
    let front = matches!(info.base, 'e' | 'i' | 'y');
    match initial {
        "k" | "gh" | "ngh" => front,
        "c" | "ng" => !front,
        // gì, gìn: g + i is fine, g + e/ê is spelled gh.
        "g" => info.base != 'e',
        "q" => false,
        "qu" => info.base != 'u',
        _ => true,
    }
}

/// `ch` and `nh` only follow a, ê, i and y.
fn palatal_coda_fits(nucleus: &str) -> bool {
    let Some(last) = nucleus.chars().last() else {
        return false;
    };
    let info = classify(last);
    match info.base {
        'a' => info.mark.is_none(),
        'e' => info.mark == Some(Mark::Circumflex),
        'i' | 'y' => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(s: &str) -> bool {
        is_valid(s, &EngineConfig::default())
    }

    fn prefix(s: &str) -> bool {
        is_valid_prefix(s, &EngineConfig::default())
    }

    #[test]
    fn common_syllables_are_valid() {
        for word in [
            "việt", "nam", "người", "nghiêng", "khuỷu", "quá", "giá", "gì", "thuở", "hoà",
            "hòa", "tiếng", "rượu", "khuya", "uyên", "đường", "yêu", "xoong", "ếch", "anh",
            "Huỳnh", "các", "học", "a", "ở", "cáng", "Đà",
        ] {
            assert!(valid(word), "{word} should be valid");
        }
    }

    #[test]
    fn structural_errors_are_invalid() {
        for word in [
            "clear", "free", "pro", "str", "ka", "ge", "ci", "ngi", "tâ", "tiê", "cac", "càc",
            "tuan", "ach1", "víệt", "ech", "aich", "q", "",
        ] {
            assert!(!valid(word), "{word} should be invalid");
        }
    }

    #[test]
    fn prefixes_can_be_incomplete() {
        for p in [
            "", "ng", "q", "qu", "nghi", "tiê", "tươ", "cac", "đ", "thu", "kh", "viê", "huo",
            "tuan", "enh",
        ] {
            assert!(prefix(p), "{p} should be a valid prefix");
        }
        for p in ["cl", "btw", "pr", "st", "càc", "ka", "tuân1", "aich"] {
            assert!(!prefix(p), "{p} should not be a valid prefix");
        }
    }

    #[test]
    fn foreign_initials_follow_config() {
        let mut c = EngineConfig::default();
        assert!(is_valid("fan", &c));
        assert!(is_valid_prefix("w", &c));
        c.allow_consonant_zfwj = false;
        assert!(!is_valid("fan", &c));
        assert!(!is_valid_prefix("w", &c));
    }
}
