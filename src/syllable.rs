//! The rolling buffer holding the word currently being composed.

use crate::buffers::{
    KeyBuffer, RawBuffer, SlotVec, new_key_buffer, new_raw_buffer, new_slot_vec, push_raw,
    push_slot, push_slot_key,
};
use crate::tone::{Mark, Tone, classify, compose, is_vowel_base};

/// One rendered character of the word and the keys that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSlot {
    /// Lowercase base letter (`a` for `ặ`, `d` for `đ`).
    pub base: char,
    pub upper: bool,
    pub mark: Option<Mark>,
    pub tone: Option<Tone>,
    /// Keys that created or modified this slot, in typing order.
    pub keys: KeyBuffer,
    /// Trigger key whose transform on this slot was reverted by a double press.
    pub undone: Option<char>,
}

impl CharSlot {
    /// A slot for a key typed as-is. Already-composed letters keep their
    /// diacritic and tone.
    pub fn literal(key: char) -> Self {
        let info = classify(key);
        let mut keys = new_key_buffer();
        push_slot_key(&mut keys, key);
        Self {
            base: info.base,
            upper: info.upper,
            mark: info.mark,
            tone: info.tone,
            keys,
            undone: None,
        }
    }

    /// A slot for `letter` produced by a shortcut `key` (e.g. `w` → `ư`).
    pub fn produced(letter: char, key: char) -> Self {
        let mut slot = Self::literal(letter);
        slot.keys.clear();
        push_slot_key(&mut slot.keys, key);
        slot
    }

    #[inline(always)]
    pub fn is_vowel(&self) -> bool {
        is_vowel_base(self.base)
    }

    #[inline(always)]
    pub fn render(&self) -> char {
        compose(self.base, self.mark, self.tone, self.upper)
    }

    #[inline(always)]
    pub fn record_key(&mut self, key: char) {
        push_slot_key(&mut self.keys, key);
    }
}

/// A change applied to one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Tone(Tone),
    Mark(Mark),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyllableBuffer {
    slots: SlotVec,
    raw: RawBuffer,
    raw_complete: bool,
}

impl Default for SyllableBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SyllableBuffer {
    pub fn new() -> Self {
        Self { slots: new_slot_vec(), raw: new_raw_buffer(), raw_complete: true }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    pub fn slots(&self) -> &[CharSlot] {
        &self.slots
    }

    #[inline(always)]
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut CharSlot> {
        self.slots.get_mut(index)
    }

    /// Appends a slot. Hands the slot back when the buffer is full.
    pub fn append(&mut self, slot: CharSlot) -> Result<(), CharSlot> {
        push_slot(&mut self.slots, slot)
    }

    /// Logs a raw keystroke for the current word.
    pub fn record_key(&mut self, key: char) {
        if !push_raw(&mut self.raw, key) {
            self.raw_complete = false;
        }
    }

    /// The keys typed for this word, if all of them fitted in the log.
    pub fn raw_keys(&self) -> Option<&str> {
        if self.raw_complete { Some(self.raw.as_str()) } else { None }
    }

    /// Applies `mutation` to the last slot; see [`SyllableBuffer::mutate_at`].
    pub fn mutate_last(&mut self, mutation: Mutation, revert: bool) -> bool {
        match self.slots.len() {
            0 => false,
            n => self.mutate_at(n - 1, mutation, revert),
        }
    }

    /// Adds `mutation` to the slot at `index`, or removes it when `revert` is
    /// set. Returns whether the slot changed. Adding a tone moves it off any
    /// other slot so the word keeps a single tone.
    pub fn mutate_at(&mut self, index: usize, mutation: Mutation, revert: bool) -> bool {
        if index >= self.slots.len() {
            return false;
        }
        match (mutation, revert) {
            (Mutation::Tone(tone), true) => {
                let slot = &mut self.slots[index];
                if slot.tone != Some(tone) {
                    return false;
                }
                slot.tone = None;
                true
            }
            (Mutation::Tone(tone), false) => {
                if !self.slots[index].is_vowel() || self.slots[index].tone == Some(tone) {
                    return false;
                }
                self.clear_tone();
                self.slots[index].tone = Some(tone);
                true
            }
            (Mutation::Mark(mark), true) => {
                let slot = &mut self.slots[index];
                if slot.mark != Some(mark) {
                    return false;
                }
                slot.mark = None;
                true
            }
            (Mutation::Mark(mark), false) => {
                let slot = &mut self.slots[index];
                if slot.mark == Some(mark) {
                    return false;
                }
                slot.mark = Some(mark);
                true
            }
        }
    }

    /// Position and value of the word's tone, if any.
    pub fn tone_slot(&self) -> Option<(usize, Tone)> {
        self.slots.iter().enumerate().find_map(|(i, s)| s.tone.map(|t| (i, t)))
    }

    /// Removes the tone from the word, returning where it was.
    pub fn clear_tone(&mut self) -> Option<(usize, Tone)> {
        let found = self.tone_slot();
        if let Some((i, _)) = found {
            self.slots[i].tone = None;
        }
        found
    }

    /// Moves an existing tone to `target`. Returns whether anything moved.
    pub fn move_tone_to(&mut self, target: usize) -> bool {
        match self.tone_slot() {
            Some((i, tone)) if i != target && target < self.slots.len() => {
                self.slots[i].tone = None;
                self.slots[target].tone = Some(tone);
                true
            }
            _ => false,
        }
    }

    /// Drops the last slot (backspace). The raw key log is rebuilt from the
    /// remaining slots.
    pub fn pop(&mut self) -> Option<CharSlot> {
        let slot = self.slots.pop()?;
        self.raw.clear();
        self.raw_complete = true;
        for i in 0..self.slots.len() {
            for key in self.slots[i].keys.chars() {
                if !push_raw(&mut self.raw, key) {
                    self.raw_complete = false;
                }
            }
        }
        Some(slot)
    }

    pub fn reset(&mut self) {
        self.slots.clear();
        self.raw.clear();
        self.raw_complete = true;
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.slots.len() * 3);
        self.render_into(&mut out);
        out
    }

    pub fn render_into(&self, out: &mut String) {
        out.extend(self.slots.iter().map(CharSlot::render));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_of(text: &str) -> SyllableBuffer {
        let mut b = SyllableBuffer::new();
        for c in text.chars() {
            b.append(CharSlot::literal(c)).unwrap();
            b.record_key(c);
        }
        b
    }

    #[test]
    fn render_reflects_marks_and_tone() {
        let mut b = buffer_of("Viet");
        assert_eq!(b.render(), "Viet");
        assert!(b.mutate_at(2, Mutation::Mark(Mark::Circumflex), false));
        assert!(b.mutate_at(2, Mutation::Tone(Tone::Dot), false));
        assert_eq!(b.render(), "Việt");
        assert_eq!(b.len(), 4);
    }

    #[test]
    fn mutate_last_reverts() {
        let mut b = buffer_of("a");
        assert!(b.mutate_last(Mutation::Tone(Tone::Acute), false));
        assert_eq!(b.render(), "á");
        assert!(b.mutate_last(Mutation::Tone(Tone::Acute), true));
        assert_eq!(b.render(), "a");
        assert!(!b.mutate_last(Mutation::Tone(Tone::Acute), true));
    }

    #[test]
    fn single_tone_per_word() {
        let mut b = buffer_of("hoa");
        b.mutate_at(1, Mutation::Tone(Tone::Grave), false);
        b.mutate_at(2, Mutation::Tone(Tone::Grave), false);
        assert_eq!(b.render(), "hoà");
        assert_eq!(b.tone_slot(), Some((2, Tone::Grave)));
        assert!(b.move_tone_to(1));
        assert_eq!(b.render(), "hòa");
    }

    #[test]
    fn tone_needs_a_vowel() {
        let mut b = buffer_of("b");
        assert!(!b.mutate_last(Mutation::Tone(Tone::Hook), false));
    }

    #[test]
    fn overflow_hands_slot_back() {
        let mut b = SyllableBuffer::new();
        for _ in 0..crate::buffers::MAX_SLOTS {
            b.append(CharSlot::literal('a')).unwrap();
        }
        assert!(b.append(CharSlot::literal('b')).is_err());
    }

    #[test]
    fn pop_rebuilds_raw_log() {
        let mut b = buffer_of("ban");
        assert_eq!(b.pop().map(|s| s.base), Some('n'));
        assert_eq!(b.raw_keys(), Some("ba"));
        b.reset();
        assert!(b.is_empty());
        assert_eq!(b.raw_keys(), Some(""));
    }
}
