//! Accent composition for `a6` brackets.
//!
//! The typewriter prints accented letters by overstriking a base letter
//! with a diacritic. Two layouts occur on disk:
//!
//! ```text
//! [2b a6 09 00 bb dd 09 a6 2b]          undecorated
//! [2b a6 0b 00 ss bb ss dd 0b a6 2b]    decorated, ss = 20/21/22
//!   0  1  2  3  4  5  6  7  8  9 10
//! ```
//!
//! `bb` is the EBCDIC base letter, `dd` the diacritic.

use super::codes;

/// Brackets longer than this carry a decoration selector.
const UNDECORATED_MAX_LEN: usize = 9;

/// Diacritic byte used for micro-stepping rather than accents.
const MICRO_STEP: u8 = 0x08;

/// `(diacritic, [(base, composed)])`
#[rustfmt::skip]
static ACCENTS: &[(u8, &[(u8, char)])] = &[
    // circumflex
    (
        0x5F,
        &[
            (0x81, 'â'), (0xC1, 'Â'), (0x85, 'ê'), (0xC5, 'Ê'), (0x89, 'î'),
            (0xC9, 'Î'), (0x96, 'ô'), (0xD6, 'Ô'), (0xA4, 'û'), (0xE4, 'Û'),
        ],
    ),
    // slash
    (0x61, &[(0x96, 'ø'), (0xD6, 'Ø')]),
    // grave
    (
        0x79,
        &[
            (0x81, 'à'), (0xC1, 'À'), (0x85, 'è'), (0xC5, 'È'), (0x89, 'ì'),
            (0xC9, 'Ì'), (0x96, 'ò'), (0xD6, 'Ò'), (0xA4, 'ù'), (0xE4, 'Ù'),
        ],
    ),
    // cedilla
    (0x9D, &[(0x83, 'ç'), (0xC3, 'Ç')]),
    // diaeresis
    (
        0xBD,
        &[
            (0x81, 'ä'), (0xC1, 'Ä'), (0x85, 'ë'), (0xC5, 'Ë'), (0x89, 'ï'),
            (0xC9, 'Ï'), (0x96, 'ö'), (0xD6, 'Ö'), (0xA4, 'ü'), (0xE4, 'Ü'),
        ],
    ),
    // acute
    (
        0xBE,
        &[
            (0x81, 'á'), (0xC1, 'Á'), (0x85, 'é'), (0xC5, 'É'), (0x89, 'í'),
            (0xC9, 'Í'), (0x96, 'ó'), (0xD6, 'Ó'), (0xA4, 'ú'), (0xE4, 'Ú'),
        ],
    ),
];

/// Decoration requested by a decorated accent bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Underline,
    Bold,
    BoldUnderline,
    /// Selector byte that is not a decoration code.
    Unknown(u8),
}

impl Selector {
    fn from_byte(byte: u8) -> Self {
        match byte {
            codes::UNDERLINE => Selector::Underline,
            codes::BOLD => Selector::Bold,
            codes::BOLD_UNDERLINE => Selector::BoldUnderline,
            other => Selector::Unknown(other),
        }
    }
}

/// The fields of an `a6` bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccentBracket {
    pub selector: Option<Selector>,
    pub base: u8,
    pub diacritic: u8,
}

impl AccentBracket {
    /// Pick the fields out of a complete bracket, or `None` if it is too
    /// short to hold a base and diacritic.
    pub fn parse(bracket: &[u8]) -> Option<Self> {
        if bracket.len() > UNDECORATED_MAX_LEN {
            Some(Self {
                selector: Some(Selector::from_byte(bracket[4])),
                base: bracket[5],
                diacritic: bracket[7],
            })
        } else if bracket.len() >= 6 {
            Some(Self {
                selector: None,
                base: bracket[4],
                diacritic: bracket[5],
            })
        } else {
            None
        }
    }
}

/// Result of composing a base letter with a diacritic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Composed(char),
    /// Horizontal micro-stepping; produces no text.
    MicroStep,
    Unresolved { base: u8, diacritic: u8 },
}

/// Look up the precomposed character for `base` overstruck by `diacritic`.
pub fn compose(base: u8, diacritic: u8) -> Accent {
    if diacritic == MICRO_STEP && (0x20..=0x2F).contains(&base) {
        return Accent::MicroStep;
    }

    ACCENTS
        .iter()
        .find(|(d, _)| *d == diacritic)
        .and_then(|(_, letters)| letters.iter().find(|(b, _)| *b == base))
        .map(|&(_, ch)| Accent::Composed(ch))
        .unwrap_or(Accent::Unresolved { base, diacritic })
}

/// Visible stand-in for an accent pair without a mapping.
pub fn placeholder(base: u8, diacritic: u8) -> String {
    format!("{{code {base:02x},{diacritic:02x}}}")
}
