//! Key events as delivered by the macOS host: a virtual key code (ANSI
//! layout) plus Carbon modifier bits.

use std::ops::BitOr;

// macOS virtual key codes
pub mod code {
    pub const A: u16 = 0;
    pub const S: u16 = 1;
    pub const D: u16 = 2;
    pub const F: u16 = 3;
    pub const J: u16 = 38;
    pub const W: u16 = 13;
    pub const Z: u16 = 6;
    pub const RETURN: u16 = 36;
    pub const TAB: u16 = 48;
    pub const SPACE: u16 = 49;
    pub const DELETE: u16 = 51;
    pub const ESCAPE: u16 = 53;
    pub const HOME: u16 = 115;
    pub const PAGE_UP: u16 = 116;
    pub const FORWARD_DELETE: u16 = 117;
    pub const END: u16 = 119;
    pub const PAGE_DOWN: u16 = 121;
    pub const LEFT: u16 = 123;
    pub const RIGHT: u16 = 124;
    pub const DOWN: u16 = 125;
    pub const UP: u16 = 126;
}

/// Characters of the printable keys, unshifted and shifted, indexed by key
/// code. `'\0'` marks codes that are not printable.
const KEYMAP: [(char, char); 51] = [
    ('a', 'A'), ('s', 'S'), ('d', 'D'), ('f', 'F'), ('h', 'H'), ('g', 'G'), ('z', 'Z'),
    ('x', 'X'), ('c', 'C'), ('v', 'V'), ('\0', '\0'), ('b', 'B'), ('q', 'Q'), ('w', 'W'),
    ('e', 'E'), ('r', 'R'), ('y', 'Y'), ('t', 'T'), ('1', '!'), ('2', '@'), ('3', '#'),
    ('4', '$'), ('6', '^'), ('5', '%'), ('=', '+'), ('9', '('), ('7', '&'), ('-', '_'),
    ('8', '*'), ('0', ')'), (']', '}'), ('o', 'O'), ('u', 'U'), ('[', '{'), ('i', 'I'),
    ('p', 'P'), ('\0', '\0'), ('l', 'L'), ('j', 'J'), ('\'', '"'), ('k', 'K'), (';', ':'),
    ('\\', '|'), (',', '<'), ('/', '?'), ('n', 'N'), ('m', 'M'), ('.', '>'), ('\0', '\0'),
    ('\0', '\0'), ('`', '~'),
];

/// Carbon event modifier mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const COMMAND: Modifiers = Modifiers(0x0100);
    pub const SHIFT: Modifiers = Modifiers(0x0200);
    pub const CAPS_LOCK: Modifiers = Modifiers(0x0400);
    pub const OPTION: Modifiers = Modifiers(0x0800);
    pub const CONTROL: Modifiers = Modifiers(0x1000);

    const KNOWN: u32 = 0x1F00;

    /// Keeps the bits this engine understands and drops the rest.
    #[inline(always)]
    pub fn from_bits(bits: u32) -> Self {
        Modifiers(bits & Self::KNOWN)
    }

    #[inline(always)]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    /// Command, Control or Option held: the key is a shortcut, not text.
    #[inline(always)]
    pub fn is_shortcut(self) -> bool {
        self.0 & (Self::COMMAND.0 | Self::CONTROL.0 | Self::OPTION.0) != 0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// What a key event means to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Space,
    Enter,
    Tab,
    Backspace,
    Escape,
    /// Arrows, Home/End, Page Up/Down, forward delete: the caret moves away
    /// from the word.
    Navigation,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: u16,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(code: u16, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// The event that types `c` on an ANSI keyboard, if any key does.
    pub fn from_char(c: char) -> Option<Self> {
        if c == ' ' {
            return Some(Self::new(code::SPACE, Modifiers::NONE));
        }
        if c == '\n' {
            return Some(Self::new(code::RETURN, Modifiers::NONE));
        }
        KEYMAP.iter().enumerate().find_map(|(i, &(plain, shifted))| {
            let modifiers = if c == plain {
                Modifiers::NONE
            } else if c == shifted {
                Modifiers::SHIFT
            } else {
                return None;
            };
            (c != '\0').then(|| Self::new(i as u16, modifiers))
        })
    }

    pub fn key(&self) -> Key {
        match self.code {
            code::SPACE => Key::Space,
            code::RETURN => Key::Enter,
            code::TAB => Key::Tab,
            code::DELETE => Key::Backspace,
            code::ESCAPE => Key::Escape,
            code::HOME
            | code::PAGE_UP
            | code::FORWARD_DELETE
            | code::END
            | code::PAGE_DOWN
            | code::LEFT
            | code::RIGHT
            | code::DOWN
            | code::UP => Key::Navigation,
            c => match KEYMAP.get(c as usize) {
                Some(&(plain, _)) if plain == '\0' => Key::Other,
                Some(&(plain, shifted)) => Key::Char(self.resolve(plain, shifted)),
                None => Key::Other,
            },
        }
    }

    fn resolve(&self, plain: char, shifted: char) -> char {
        let shift = self.modifiers.contains(Modifiers::SHIFT);
        if plain.is_ascii_alphabetic() {
            // Caps lock inverts shift for letters only.
            if shift != self.modifiers.contains(Modifiers::CAPS_LOCK) { shifted } else { plain }
        } else if shift {
            shifted
        } else {
            plain
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_follow_shift_and_caps_lock() {
        assert_eq!(KeyEvent::new(code::A, Modifiers::NONE).key(), Key::Char('a'));
        assert_eq!(KeyEvent::new(code::A, Modifiers::SHIFT).key(), Key::Char('A'));
        assert_eq!(KeyEvent::new(code::A, Modifiers::CAPS_LOCK).key(), Key::Char('A'));
        assert_eq!(
            KeyEvent::new(code::A, Modifiers::CAPS_LOCK | Modifiers::SHIFT).key(),
            Key::Char('a')
        );
    }

    #[test]
    fn digits_shift_to_symbols_not_caps() {
        assert_eq!(KeyEvent::new(18, Modifiers::NONE).key(), Key::Char('1'));
        assert_eq!(KeyEvent::new(18, Modifiers::SHIFT).key(), Key::Char('!'));
        assert_eq!(KeyEvent::new(18, Modifiers::CAPS_LOCK).key(), Key::Char('1'));
    }

    #[test]
    fn special_keys() {
        assert_eq!(KeyEvent::new(code::SPACE, Modifiers::NONE).key(), Key::Space);
        assert_eq!(KeyEvent::new(code::DELETE, Modifiers::NONE).key(), Key::Backspace);
        assert_eq!(KeyEvent::new(code::LEFT, Modifiers::NONE).key(), Key::Navigation);
        assert_eq!(KeyEvent::new(10, Modifiers::NONE).key(), Key::Other);
        assert_eq!(KeyEvent::new(200, Modifiers::NONE).key(), Key::Other);
    }

    #[test]
    fn from_char_inverts_key() {
        for c in "abcdefghijklmnopqrstuvwxyzABCXYZ0123456789!?.,;'[]` ".chars() {
            let event = KeyEvent::from_char(c).unwrap();
            let expected = if c == ' ' { Key::Space } else { Key::Char(c) };
            assert_eq!(event.key(), expected, "{c:?}");
        }
        assert_eq!(KeyEvent::from_char('ư'), None);
    }

    #[test]
    fn modifier_bits() {
        let m = Modifiers::from_bits(0x0100 | 0x0200 | 0x1_0000);
        assert_eq!(m.bits(), 0x0300);
        assert!(m.is_shortcut());
        assert!(!Modifiers::SHIFT.is_shortcut());
        assert!(Modifiers::OPTION.is_shortcut());
    }
}
