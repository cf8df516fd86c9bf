//! EBCDIC code table (IBM code page 1047).
//!
//! Wheelwriter text is stored as EBCDIC. The table maps every byte to a
//! character in U+0000..=U+00FF and back, so the mapping is a bijection
//! over all 256 byte values.

/// EBCDIC to Unicode lookup table for code page 1047.
#[rustfmt::skip]
const EBCDIC_TO_UNICODE_1047: [char; 256] = [
    // 0x00
    '\u{0000}', '\u{0001}', '\u{0002}', '\u{0003}', '\u{009C}', '\u{0009}', '\u{0086}', '\u{007F}',
    '\u{0097}', '\u{008D}', '\u{008E}', '\u{000B}', '\u{000C}', '\u{000D}', '\u{000E}', '\u{000F}',
    // 0x10
    '\u{0010}', '\u{0011}', '\u{0012}', '\u{0013}', '\u{009D}', '\u{000A}', '\u{0008}', '\u{0087}',
    '\u{0018}', '\u{0019}', '\u{0092}', '\u{008F}', '\u{001C}', '\u{001D}', '\u{001E}', '\u{001F}',
    // 0x20
    '\u{0080}', '\u{0081}', '\u{0082}', '\u{0083}', '\u{0084}', '\u{0085}', '\u{0017}', '\u{001B}',
    '\u{0088}', '\u{0089}', '\u{008A}', '\u{008B}', '\u{008C}', '\u{0005}', '\u{0006}', '\u{0007}',
    // 0x30
    '\u{0090}', '\u{0091}', '\u{0016}', '\u{0093}', '\u{0094}', '\u{0095}', '\u{0096}', '\u{0004}',
    '\u{0098}', '\u{0099}', '\u{009A}', '\u{009B}', '\u{0014}', '\u{0015}', '\u{009E}', '\u{001A}',
    // 0x40
    '\u{0020}', '\u{00A0}', '\u{00E2}', '\u{00E4}', '\u{00E0}', '\u{00E1}', '\u{00E3}', '\u{00E5}',
    '\u{00E7}', '\u{00F1}', '\u{00A2}', '\u{002E}', '\u{003C}', '\u{0028}', '\u{002B}', '\u{007C}',
    // 0x50
    '\u{0026}', '\u{00E9}', '\u{00EA}', '\u{00EB}', '\u{00E8}', '\u{00ED}', '\u{00EE}', '\u{00EF}',
    '\u{00EC}', '\u{00DF}', '\u{0021}', '\u{0024}', '\u{002A}', '\u{0029}', '\u{003B}', '\u{005E}',
    // 0x60
    '\u{002D}', '\u{002F}', '\u{00C2}', '\u{00C4}', '\u{00C0}', '\u{00C1}', '\u{00C3}', '\u{00C5}',
    '\u{00C7}', '\u{00D1}', '\u{00A6}', '\u{002C}', '\u{0025}', '\u{005F}', '\u{003E}', '\u{003F}',
    // 0x70
    '\u{00F8}', '\u{00C9}', '\u{00CA}', '\u{00CB}', '\u{00C8}', '\u{00CD}', '\u{00CE}', '\u{00CF}',
    '\u{00CC}', '\u{0060}', '\u{003A}', '\u{0023}', '\u{0040}', '\u{0027}', '\u{003D}', '\u{0022}',
    // 0x80
    '\u{00D8}', '\u{0061}', '\u{0062}', '\u{0063}', '\u{0064}', '\u{0065}', '\u{0066}', '\u{0067}',
    '\u{0068}', '\u{0069}', '\u{00AB}', '\u{00BB}', '\u{00F0}', '\u{00FD}', '\u{00FE}', '\u{00B1}',
    // 0x90
    '\u{00B0}', '\u{006A}', '\u{006B}', '\u{006C}', '\u{006D}', '\u{006E}', '\u{006F}', '\u{0070}',
    '\u{0071}', '\u{0072}', '\u{00AA}', '\u{00BA}', '\u{00E6}', '\u{00B8}', '\u{00C6}', '\u{00A4}',
    // 0xA0
    '\u{00B5}', '\u{007E}', '\u{0073}', '\u{0074}', '\u{0075}', '\u{0076}', '\u{0077}', '\u{0078}',
    '\u{0079}', '\u{007A}', '\u{00A1}', '\u{00BF}', '\u{00D0}', '\u{005B}', '\u{00DE}', '\u{00AE}',
    // 0xB0
    '\u{00AC}', '\u{00A3}', '\u{00A5}', '\u{00B7}', '\u{00A9}', '\u{00A7}', '\u{00B6}', '\u{00BC}',
    '\u{00BD}', '\u{00BE}', '\u{00DD}', '\u{00A8}', '\u{00AF}', '\u{005D}', '\u{00B4}', '\u{00D7}',
    // 0xC0
    '\u{007B}', '\u{0041}', '\u{0042}', '\u{0043}', '\u{0044}', '\u{0045}', '\u{0046}', '\u{0047}',
    '\u{0048}', '\u{0049}', '\u{00AD}', '\u{00F4}', '\u{00F6}', '\u{00F2}', '\u{00F3}', '\u{00F5}',
    // 0xD0
    '\u{007D}', '\u{004A}', '\u{004B}', '\u{004C}', '\u{004D}', '\u{004E}', '\u{004F}', '\u{0050}',
    '\u{0051}', '\u{0052}', '\u{00B9}', '\u{00FB}', '\u{00FC}', '\u{00F9}', '\u{00FA}', '\u{00FF}',
    // 0xE0
    '\u{005C}', '\u{00F7}', '\u{0053}', '\u{0054}', '\u{0055}', '\u{0056}', '\u{0057}', '\u{0058}',
    '\u{0059}', '\u{005A}', '\u{00B2}', '\u{00D4}', '\u{00D6}', '\u{00D2}', '\u{00D3}', '\u{00D5}',
    // 0xF0
    '\u{0030}', '\u{0031}', '\u{0032}', '\u{0033}', '\u{0034}', '\u{0035}', '\u{0036}', '\u{0037}',
    '\u{0038}', '\u{0039}', '\u{00B3}', '\u{00DB}', '\u{00DC}', '\u{00D9}', '\u{00DA}', '\u{009F}',
];

const UNICODE_TO_EBCDIC_1047: [u8; 256] = invert(&EBCDIC_TO_UNICODE_1047);

/// Build the inverse table. Fails const evaluation if any entry lies
/// outside U+0000..=U+00FF.
const fn invert(forward: &[char; 256]) -> [u8; 256] {
    let mut inverse = [0u8; 256];
    let mut byte = 0;
    while byte < 256 {
        inverse[forward[byte] as u32 as usize] = byte as u8;
        byte += 1;
    }
    inverse
}

static CP1047: CodeTable = CodeTable {
    forward: &EBCDIC_TO_UNICODE_1047,
    inverse: &UNICODE_TO_EBCDIC_1047,
};

/// Bidirectional mapping between EBCDIC bytes and characters.
#[derive(Debug, Clone, Copy)]
pub struct CodeTable {
    forward: &'static [char; 256],
    inverse: &'static [u8; 256],
}

impl CodeTable {
    /// The process-wide code page 1047 table.
    pub fn cp1047() -> &'static CodeTable {
        &CP1047
    }

    /// Translate one EBCDIC byte.
    pub fn to_char(&self, byte: u8) -> char {
        self.forward[byte as usize]
    }

    /// Translate a character back to EBCDIC.
    ///
    /// Returns `None` for characters outside the table.
    pub fn to_byte(&self, ch: char) -> Option<u8> {
        let code = ch as u32;
        if code < 256 {
            Some(self.inverse[code as usize])
        } else {
            None
        }
    }

    /// Translate a run of EBCDIC bytes.
    pub fn decode_str(&self, bytes: &[u8]) -> String {
        bytes.iter().map(|&b| self.to_char(b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_letters_and_digits() {
        let table = CodeTable::cp1047();
        assert_eq!(table.to_char(0xC1), 'A');
        assert_eq!(table.to_char(0x81), 'a');
        assert_eq!(table.to_char(0xF0), '0');
        assert_eq!(table.to_char(0x40), ' ');
        assert_eq!(table.to_byte('Z'), Some(0xE9));
        assert_eq!(table.to_byte('z'), Some(0xA9));
    }

    #[test]
    fn test_cp1047_specific_positions() {
        let table = CodeTable::cp1047();
        assert_eq!(table.to_char(0x5F), '^');
        assert_eq!(table.to_char(0xAD), '[');
        assert_eq!(table.to_char(0xBD), ']');
        assert_eq!(table.to_char(0xB0), '\u{00AC}');
    }

    #[test]
    fn test_table_is_bijective() {
        let table = CodeTable::cp1047();
        for byte in 0..=255u8 {
            let ch = table.to_char(byte);
            assert_eq!(table.to_byte(ch), Some(byte), "byte {byte:#04x}");
        }
    }

    #[test]
    fn test_accented_latin1() {
        let table = CodeTable::cp1047();
        assert_eq!(table.to_byte('â'), Some(0x42));
        assert_eq!(table.to_byte('Ö'), Some(0xEC));
        assert_eq!(table.to_byte('\u{00A0}'), Some(0x41));
    }

    #[test]
    fn test_unmapped_char() {
        assert_eq!(CodeTable::cp1047().to_byte('€'), None);
    }

    #[test]
    fn test_decode_str() {
        let bytes = [0xC8, 0x85, 0x93, 0x93, 0x96];
        assert_eq!(CodeTable::cp1047().decode_str(&bytes), "Hello");
    }

    proptest! {
        #[test]
        fn prop_latin1_roundtrip(code in 0u32..256) {
            let table = CodeTable::cp1047();
            let ch = char::from_u32(code).unwrap();
            let byte = table.to_byte(ch).unwrap();
            prop_assert_eq!(table.to_char(byte), ch);
        }
    }
}
