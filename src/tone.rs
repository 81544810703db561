//! Character classifier: splits a Vietnamese letter into its base letter,
//! diacritic and tone, and composes them back.

/// Lexical tone. Discriminants follow the Telex/VNI key order
/// (s/1 sắc, f/2 huyền, r/3 hỏi, x/4 ngã, j/5 nặng).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    /// sắc
    Acute = 1,
    /// huyền
    Grave = 2,
    /// hỏi
    Hook = 3,
    /// ngã
    Tilde = 4,
    /// nặng
    Dot = 5,
}

impl Tone {
    #[inline(always)]
    pub fn from_index(index: u8) -> Option<Tone> {
        match index {
            1 => Some(Tone::Acute),
            2 => Some(Tone::Grave),
            3 => Some(Tone::Hook),
            4 => Some(Tone::Tilde),
            5 => Some(Tone::Dot),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Only sắc and nặng may close on c, ch, p, t.
    #[inline(always)]
    pub fn fits_stop_coda(self) -> bool {
        matches!(self, Tone::Acute | Tone::Dot)
    }
}

/// Vowel-modifying (or, for `đ`, consonant-modifying) diacritic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    /// â ê ô
    Circumflex,
    /// ă
    Breve,
    /// ơ ư
    Horn,
    /// đ
    Stroke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterKind {
    Vowel,
    Consonant,
    Other,
}

/// Result of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharInfo {
    /// Lowercase ASCII base letter, or the character itself for `Other`.
    pub base: char,
    pub kind: LetterKind,
    pub mark: Option<Mark>,
    pub tone: Option<Tone>,
    pub upper: bool,
}

struct VowelRow {
    base: char,
    mark: Option<Mark>,
    /// Untoned form followed by the five toned forms in [`Tone`] order.
    forms: [char; 6],
}

const VOWEL_ROWS: [VowelRow; 12] = [
    VowelRow { base: 'a', mark: None, forms: ['a', 'á', 'à', 'ả', 'ã', 'ạ'] },
    VowelRow { base: 'a', mark: Some(Mark::Breve), forms: ['ă', 'ắ', 'ằ', 'ẳ', 'ẵ', 'ặ'] },
    VowelRow { base: 'a', mark: Some(Mark::Circumflex), forms: ['â', 'ấ', 'ầ', 'ẩ', 'ẫ', 'ậ'] },
    VowelRow { base: 'e', mark: None, forms: ['e', 'é', 'è', 'ẻ', 'ẽ', 'ẹ'] },
    VowelRow { base: 'e', mark: Some(Mark::Circumflex), forms: ['ê', 'ế', 'ề', 'ể', 'ễ', 'ệ'] },
    VowelRow { base: 'i', mark: None, forms: ['i', 'í', 'ì', 'ỉ', 'ĩ', 'ị'] },
    VowelRow { base: 'o', mark: None, forms: ['o', 'ó', 'ò', 'ỏ', 'õ', 'ọ'] },
    VowelRow { base: 'o', mark: Some(Mark::Circumflex), forms: ['ô', 'ố', 'ồ', 'ổ', 'ỗ', 'ộ'] },
    VowelRow { base: 'o', mark: Some(Mark::Horn), forms: ['ơ', 'ớ', 'ờ', 'ở', 'ỡ', 'ợ'] },
    VowelRow { base: 'u', mark: None, forms: ['u', 'ú', 'ù', 'ủ', 'ũ', 'ụ'] },
    VowelRow { base: 'u', mark: Some(Mark::Horn), forms: ['ư', 'ứ', 'ừ', 'ử', 'ữ', 'ự'] },
    VowelRow { base: 'y', mark: None, forms: ['y', 'ý', 'ỳ', 'ỷ', 'ỹ', 'ỵ'] },
];

#[inline(always)]
fn to_lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

#[inline(always)]
fn to_upper(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

#[inline(always)]
fn find_row(base: char, mark: Option<Mark>) -> Option<&'static VowelRow> {
    VOWEL_ROWS.iter().find(|row| row.base == base && row.mark == mark)
}

/// Classifies `c`. Never fails: anything outside the Vietnamese alphabet is
/// `LetterKind::Other`.
pub fn classify(c: char) -> CharInfo {
    let lower = to_lower(c);
    let upper = lower != c;

    for row in VOWEL_ROWS.iter() {
        if let Some(i) = row.forms.iter().position(|&f| f == lower) {
            return CharInfo {
                base: row.base,
                kind: LetterKind::Vowel,
                mark: row.mark,
                tone: Tone::from_index(i as u8),
                upper,
            };
        }
    }

    if lower == 'đ' {
        return CharInfo {
            base: 'd',
            kind: LetterKind::Consonant,
            mark: Some(Mark::Stroke),
            tone: None,
            upper,
        };
    }

    if lower.is_ascii_lowercase() {
        return CharInfo { base: lower, kind: LetterKind::Consonant, mark: None, tone: None, upper };
    }

    CharInfo { base: c, kind: LetterKind::Other, mark: None, tone: None, upper: false }
}

/// Builds the letter for `base` + `mark` + `tone`. A mark that does not exist
/// for the base (e.g. breve on `e`) is dropped; a tone on a consonant is ignored.
pub fn compose(base: char, mark: Option<Mark>, tone: Option<Tone>, upper: bool) -> char {
    let lower = match find_row(base, mark).or_else(|| find_row(base, None)) {
        Some(row) => row.forms[tone.map_or(0, Tone::index)],
        None if base == 'd' && mark == Some(Mark::Stroke) => 'đ',
        None => base,
    };
    if upper { to_upper(lower) } else { lower }
}

/// Position of the vowel letter `base` + `mark` in the fixed letter order
/// a ă â e ê i o ô ơ u ư y.
#[inline(always)]
pub fn vowel_row(base: char, mark: Option<Mark>) -> Option<usize> {
    VOWEL_ROWS.iter().position(|row| row.base == base && row.mark == mark)
}

#[inline(always)]
pub fn is_vowel_base(base: char) -> bool {
    matches!(base, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Iterates over every lowercase letter the classifier knows that is not ASCII.
pub fn vietnamese_letters() -> impl Iterator<Item = char> {
    VOWEL_ROWS
        .iter()
        .flat_map(|row| row.forms.iter().copied())
        .filter(|c| !c.is_ascii())
        .chain(std::iter::once('đ'))
}
