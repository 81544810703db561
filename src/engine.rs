//! Transform rule engine: decides whether a key is a literal letter or a
//! tone/diacritic trigger, mutates the syllable buffer accordingly and keeps
//! the tone on the right vowel as the word grows.

use crate::config::{EngineConfig, Language};
use crate::modes::{KeyAction, TransformTable};
use crate::spelling;
use crate::syllable::{CharSlot, Mutation, SyllableBuffer};
use crate::tone::{Mark, Tone};

/// What the host has to do with the text before the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformResult {
    /// Let the key through unchanged.
    NoChange,
    /// Swallow the key, delete `consumed` characters and insert `text`.
    Replace { text: String, consumed: usize },
}

impl TransformResult {
    #[inline(always)]
    pub fn is_replace(&self) -> bool {
        matches!(self, TransformResult::Replace { .. })
    }

    /// Performs the edit on `field` the way a text field would, with `key`
    /// as the character the key types when it is let through.
    pub fn apply_to(&self, field: &mut String, key: char) {
        match self {
            TransformResult::NoChange => field.push(key),
            TransformResult::Replace { text, consumed } => {
                for _ in 0..*consumed {
                    field.pop();
                }
                field.push_str(text);
            }
        }
    }
}

/// Feeds `key` into `buffer`.
///
/// The key either transforms the word (tone, diacritic, shortcut) or is
/// appended as a literal letter; triggers that find nothing to modify fall
/// back to the literal letter. When the buffer is full it is reset and the
/// key passes through.
pub fn apply(buffer: &mut SyllableBuffer, key: char, config: &EngineConfig) -> TransformResult {
    let before = buffer.render();
    buffer.record_key(key);

    let transformed = config.language == Language::Vietnamese && transform(buffer, key, config);
    if !transformed && buffer.append(CharSlot::literal(key)).is_err() {
        tracing::trace!(%before, %key, "syllable buffer full, passing key through");
        buffer.reset();
        return TransformResult::NoChange;
    }

    if config.language == Language::Vietnamese {
        complete_horn_pair(buffer);
        relocate_tone(buffer, config);
    }

    diff(&before, buffer.render(), key)
}

/// `NoChange` when `after` is `before` with `key` typed at the end,
/// otherwise the replacement of all of `before` by `after`.
pub fn diff(before: &str, after: String, key: char) -> TransformResult {
    let appended = after.strip_prefix(before).is_some_and(|tail| {
        let mut tail = tail.chars();
        tail.next() == Some(key) && tail.next().is_none()
    });
    if appended {
        TransformResult::NoChange
    } else {
        TransformResult::Replace { text: after, consumed: before.chars().count() }
    }
}

/// Where the word's tone belongs: the vowel chosen by Vietnamese orthography,
/// or `None` when there is no vowel yet.
///
/// The `u` of `qu` and the `i` of `gi` belong to the initial when another
/// vowel follows. A diacritic vowel takes the tone (last one for `ươ`), three
/// vowels put it in the middle, two vowels followed by a final consonant put
/// it on the second. Open `oa`, `oe`, `uy` put it on the second vowel with
/// modern orthography and on the first otherwise; other open pairs use the
/// first.
pub fn tone_target(slots: &[CharSlot], modern: bool) -> Option<usize> {
    let mut start = slots.iter().position(CharSlot::is_vowel)?;
    if start == 1 && slots.get(2).is_some_and(CharSlot::is_vowel) {
        let (c0, c1) = (slots[0].base, slots[1].base);
        if (c0 == 'q' && c1 == 'u') || (c0 == 'g' && c1 == 'i') {
            start = 2;
        }
    }

    let len = slots[start..].iter().take_while(|s| s.is_vowel()).count();
    let nucleus = &slots[start..start + len];
    let has_coda = start + len < slots.len();

    let offset = if len == 1 {
        0
    } else if let Some(i) = nucleus.iter().rposition(|s| s.mark.is_some()) {
        i
    } else if len >= 3 || has_coda {
        1
    } else {
        match (nucleus[0].base, nucleus[1].base) {
            ('o', 'a') | ('o', 'e') | ('u', 'y') if modern => 1,
            _ => 0,
        }
    };
    Some(start + offset)
}

/// Puts an existing tone back where [`tone_target`] wants it.
pub fn relocate_tone(buffer: &mut SyllableBuffer, config: &EngineConfig) {
    if buffer.tone_slot().is_none() {
        return;
    }
    if let Some(target) = tone_target(buffer.slots(), config.modern_orthography) {
        buffer.move_tone_to(target);
    }
}

fn transform(buffer: &mut SyllableBuffer, key: char, config: &EngineConfig) -> bool {
    let table = config.input_method.table();
    let Some(action) = table.action(key, config) else {
        return false;
    };

    if config.check_spelling && !spelling::is_valid_prefix(&buffer.render(), config) {
        tracing::trace!(%key, "word is not Vietnamese, typing trigger literally");
        return false;
    }

    let trigger = key.to_ascii_lowercase();
    let done = match action {
        KeyAction::Tone(tone) => apply_tone(buffer, trigger, tone, config),
        KeyAction::ClearTone => buffer.clear_tone().is_some(),
        KeyAction::Mark(targets) => apply_mark(buffer, trigger, targets, table, config),
        KeyAction::QuickConsonant(second) => quick_consonant(buffer, key, second),
    };
    if done {
        return true;
    }

    match table.standalone(key, buffer, config) {
        Some(letter) => {
            let letter = if key.is_uppercase() {
                letter.to_uppercase().next().unwrap_or(letter)
            } else {
                letter
            };
            buffer.append(CharSlot::produced(letter, key)).is_ok()
        }
        None => false,
    }
}

fn apply_tone(buffer: &mut SyllableBuffer, trigger: char, tone: Tone, config: &EngineConfig) -> bool {
    let Some(target) = tone_target(buffer.slots(), config.modern_orthography) else {
        return false;
    };
    if buffer.slots()[target].undone == Some(trigger) {
        return false;
    }

    if let Some((at, current)) = buffer.tone_slot() {
        if current == tone {
            buffer.mutate_at(at, Mutation::Tone(tone), true);
            if let Some(slot) = buffer.slot_mut(at) {
                slot.undone = Some(trigger);
            }
            return true;
        }
    }

    if !buffer.mutate_at(target, Mutation::Tone(tone), false) {
        return false;
    }
    if let Some(slot) = buffer.slot_mut(target) {
        slot.record_key(trigger);
    }
    true
}

fn apply_mark(
    buffer: &mut SyllableBuffer,
    trigger: char,
    targets: &[(char, Mark)],
    table: &dyn TransformTable,
    config: &EngineConfig,
) -> bool {
    let free = config.free_mark && table.allows_free_mark();

    if targets.contains(&('o', Mark::Horn)) {
        if let Some(u) = horn_pair(buffer.slots(), free) {
            return toggle_horn_pair(buffer, u, trigger);
        }
    }

    let Some((index, mark)) = find_mark_target(buffer.slots(), targets, free) else {
        return false;
    };
    let slot = &buffer.slots()[index];
    if slot.undone == Some(trigger) {
        return false;
    }

    if slot.mark == Some(mark) {
        buffer.mutate_at(index, Mutation::Mark(mark), true);
        if let Some(slot) = buffer.slot_mut(index) {
            slot.undone = Some(trigger);
        }
    } else {
        buffer.mutate_at(index, Mutation::Mark(mark), false);
        if let Some(slot) = buffer.slot_mut(index) {
            slot.record_key(trigger);
        }
    }
    true
}

/// The slot a diacritic key modifies: the last slot, or with free marking the
/// nearest matching letter. A stroke only goes on the initial `d`.
fn find_mark_target(
    slots: &[CharSlot],
    targets: &[(char, Mark)],
    free: bool,
) -> Option<(usize, Mark)> {
    let last = slots.len().checked_sub(1)?;
    let first = if free { 0 } else { last };
    (first..=last).rev().find_map(|i| {
        let slot = &slots[i];
        let &(_, mark) = targets.iter().find(|(base, _)| *base == slot.base)?;
        let fits = match mark {
            Mark::Stroke => i == 0,
            _ => slot.is_vowel(),
        };
        fits.then_some((i, mark))
    })
}

/// Index of the `u` in a `uo` pair that a horn key modifies. The `u` of
/// `qu` does not count.
fn horn_pair(slots: &[CharSlot], free: bool) -> Option<usize> {
    let last = slots.len().checked_sub(1)?;
    let first = if free { 1 } else { last.max(1) };
    (first..=last).rev().map(|o| o - 1).find(|&u| {
        slots[u].base == 'u'
            && slots[u + 1].base == 'o'
            && slots[u + 1].mark != Some(Mark::Circumflex)
            && !(u > 0 && slots[u - 1].base == 'q')
    })
}

/// Open `uo` takes the horn on `o` only (`thuở`, `huơ`); with letters after
/// the pair both get it (`ươ`).
fn toggle_horn_pair(buffer: &mut SyllableBuffer, u: usize, trigger: char) -> bool {
    let slots = buffer.slots();
    if slots[u + 1].undone == Some(trigger) {
        return false;
    }
    let horned = slots[u + 1].mark == Some(Mark::Horn);
    let closed = u + 2 < slots.len();
    if horned {
        for i in [u, u + 1] {
            buffer.mutate_at(i, Mutation::Mark(Mark::Horn), true);
        }
    } else {
        buffer.mutate_at(u + 1, Mutation::Mark(Mark::Horn), false);
        if closed {
            buffer.mutate_at(u, Mutation::Mark(Mark::Horn), false);
        }
    }
    if let Some(slot) = buffer.slot_mut(u + 1) {
        if horned {
            slot.undone = Some(trigger);
        } else {
            slot.record_key(trigger);
        }
    }
    true
}

/// Turns `uơ` into `ươ` once another letter follows the pair.
fn complete_horn_pair(buffer: &mut SyllableBuffer) {
    let slots = buffer.slots();
    let Some(o) = slots.len().checked_sub(2) else {
        return;
    };
    let Some(u) = o.checked_sub(1) else {
        return;
    };
    let open_pair = slots[u].base == 'u'
        && slots[u].mark.is_none()
        && slots[o].base == 'o'
        && slots[o].mark == Some(Mark::Horn)
        && !(u > 0 && slots[u - 1].base == 'q');
    if open_pair {
        tracing::trace!("horn extended to the u of a closed uo pair");
        buffer.mutate_at(u, Mutation::Mark(Mark::Horn), false);
    }
}

/// Quick Telex: `cc` → `ch`, `nn` → `ng`, ... at the start of a word.
fn quick_consonant(buffer: &mut SyllableBuffer, key: char, second: char) -> bool {
    let [first] = buffer.slots() else {
        return false;
    };
    if first.base != key.to_ascii_lowercase() || first.mark.is_some() {
        return false;
    }
    let letter = if key.is_ascii_uppercase() { second.to_ascii_uppercase() } else { second };
    buffer.append(CharSlot::produced(letter, key)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::InputMethod;

    fn type_seq(config: &EngineConfig, seq: &str) -> String {
        let mut buffer = SyllableBuffer::new();
        for c in seq.chars() {
            apply(&mut buffer, c, config);
        }
        buffer.render()
    }

    fn slots(text: &str) -> Vec<CharSlot> {
        text.chars().map(CharSlot::literal).collect()
    }

    #[test]
    fn tone_target_rules() {
        assert_eq!(tone_target(&slots("b"), true), None);
        assert_eq!(tone_target(&slots("ba"), true), Some(1));
        assert_eq!(tone_target(&slots("hoa"), true), Some(2));
        assert_eq!(tone_target(&slots("hoa"), false), Some(1));
        assert_eq!(tone_target(&slots("hoan"), false), Some(2));
        assert_eq!(tone_target(&slots("mua"), true), Some(1));
        assert_eq!(tone_target(&slots("qua"), false), Some(2));
        assert_eq!(tone_target(&slots("gia"), false), Some(2));
        assert_eq!(tone_target(&slots("gi"), false), Some(1));
        assert_eq!(tone_target(&slots("khuyu"), true), Some(3));
        assert_eq!(tone_target(&slots("nguoi"), true), Some(3));
        assert_eq!(tone_target(&slots("người"), true), Some(3));
        assert_eq!(tone_target(&slots("tiên"), true), Some(2));
    }

    #[test]
    fn literal_letters_are_no_change() {
        let config = EngineConfig::default();
        let mut buffer = SyllableBuffer::new();
        assert_eq!(apply(&mut buffer, 'b', &config), TransformResult::NoChange);
        assert_eq!(apply(&mut buffer, 'a', &config), TransformResult::NoChange);
        assert_eq!(
            apply(&mut buffer, 's', &config),
            TransformResult::Replace { text: "bá".into(), consumed: 2 }
        );
    }

    #[test]
    fn moving_tone_reports_replace() {
        let mut config = EngineConfig::default();
        config.modern_orthography = false;
        let mut buffer = SyllableBuffer::new();
        for c in "hoaf".chars() {
            apply(&mut buffer, c, &config);
        }
        assert_eq!(buffer.render(), "hòa");
        assert_eq!(
            apply(&mut buffer, 'n', &config),
            TransformResult::Replace { text: "hoàn".into(), consumed: 3 }
        );
    }

    #[test]
    fn double_press_reverts_then_types() {
        let config = EngineConfig::default();
        assert_eq!(type_seq(&config, "as"), "á");
        assert_eq!(type_seq(&config, "ass"), "a");
        assert_eq!(type_seq(&config, "asss"), "as");
        assert_eq!(type_seq(&config, "aaa"), "a");
        assert_eq!(type_seq(&config, "dd"), "đ");
        assert_eq!(type_seq(&config, "ddd"), "d");
    }

    #[test]
    fn horn_pair_and_qu() {
        let config = EngineConfig::default();
        assert_eq!(type_seq(&config, "huow"), "huơ");
        assert_eq!(type_seq(&config, "thuowr"), "thuở");
        assert_eq!(type_seq(&config, "huowng"), "hương");
        assert_eq!(type_seq(&config, "tuowi"), "tươi");
        assert_eq!(type_seq(&config, "huoww"), "huo");
        assert_eq!(type_seq(&config, "quow"), "quơ");
        assert_eq!(type_seq(&config, "quown"), "quơn");
    }

    #[test]
    fn free_mark_reaches_back() {
        let mut config = EngineConfig::default();
        assert_eq!(type_seq(&config, "tienge"), "tienge");
        config.free_mark = true;
        assert_eq!(type_seq(&config, "tienge"), "tiêng");
        assert_eq!(type_seq(&config, "duongwd"), "đương");
    }

    #[test]
    fn simple_telex_ignores_free_mark() {
        let mut config = EngineConfig::default();
        config.input_method = InputMethod::Simple;
        config.free_mark = true;
        assert_eq!(type_seq(&config, "tienge"), "tienge");
        assert_eq!(type_seq(&config, "tiee"), "tiê");
    }

    #[test]
    fn quick_consonants() {
        let mut config = EngineConfig::default();
        config.quick_telex = true;
        assert_eq!(type_seq(&config, "nna"), "nga");
        assert_eq!(type_seq(&config, "TTa"), "THa");
        assert_eq!(type_seq(&config, "thw"), "thư");
        assert_eq!(type_seq(&config, "w"), "w");
    }

    #[test]
    fn english_mode_is_literal() {
        let mut config = EngineConfig::default();
        config.language = Language::English;
        assert_eq!(type_seq(&config, "vieetj"), "vieetj");
    }

    #[test]
    fn overflow_resets() {
        let config = EngineConfig::default();
        let mut buffer = SyllableBuffer::new();
        for _ in 0..crate::buffers::MAX_SLOTS {
            apply(&mut buffer, 'b', &config);
        }
        assert_eq!(apply(&mut buffer, 'b', &config), TransformResult::NoChange);
        assert!(buffer.is_empty());
    }

    #[test]
    fn apply_to_edits_like_a_text_field() {
        let mut field = String::from("x ba");
        TransformResult::NoChange.apply_to(&mut field, 'n');
        assert_eq!(field, "x ban");
        TransformResult::Replace { text: "bán".into(), consumed: 3 }.apply_to(&mut field, 's');
        assert_eq!(field, "x bán");
    }
}
