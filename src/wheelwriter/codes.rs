//! Byte codes of the Wheelwriter disk format.

/// Opens and closes every bracket: `[2b kk ... kk 2b]`.
pub const MARKER: u8 = 0x2B;

pub const NUL: u8 = 0x00;
pub const PARAGRAPH: u8 = 0x06;
pub const HARD_PAGE: u8 = 0x07;
pub const HARD_LINE: u8 = 0x15;
pub const UNDERLINE: u8 = 0x20;
pub const BOLD: u8 = 0x21;
pub const BOLD_UNDERLINE: u8 = 0x22;
pub const HARD_SPACE: u8 = 0x28;
pub const SOFT_SPACE: u8 = 0x37;

/// Bracket kinds (second byte of a bracket).
pub const ACCENT: u8 = 0xA6;
pub const TITLE: u8 = 0xA7;
pub const TAB_LEFT: u8 = 0xC2;
pub const TAB_DECIMAL: u8 = 0xC3;
pub const SOFT_LINE: u8 = 0xD4;
pub const FILE_HEADER: u8 = 0xD6;

/// Length of the file header bracket. The header's size field counts
/// the bytes after it.
pub const HEADER_LEN: usize = 0x48;

/// Bracket written at the start of every line.
pub const MARGIN_BRACKET: [u8; 11] = [
    MARKER, SOFT_LINE, 0x60, 0x00, 0x20, 0x00, 0x1D, 0x01, 0x00, SOFT_LINE, MARKER,
];

/// EBCDIC `?`, written for characters that cannot be encoded.
pub const SUBSTITUTE: u8 = 0x6F;

/// Codes seen in files whose meaning is still unknown. They are dropped.
pub fn is_reserved(byte: u8) -> bool {
    matches!(byte, 0x29 | 0x2A | 0x2C..=0x2F | 0x30 | 0x31 | 0x33 | 0x34)
}

/// Whether the decoder treats `byte` as a control code rather than text.
pub fn is_control(byte: u8) -> bool {
    matches!(
        byte,
        NUL | PARAGRAPH
            | HARD_PAGE
            | HARD_LINE
            | UNDERLINE
            | BOLD
            | BOLD_UNDERLINE
            | HARD_SPACE
            | MARKER
            | SOFT_SPACE
    ) || is_reserved(byte)
}
