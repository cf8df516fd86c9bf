//! Bracket accumulation and classification.
//!
//! A bracket is a run `[2b kk ... kk 2b]`. Its length is not declared up
//! front, so bytes are collected until the next marker.

use memchr::memchr;

use super::codes;
use crate::ebcdic::CodeTable;

/// What a completed bracket describes, by its second byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Accent,
    Title,
    /// Tab markers; their settings are not interpreted yet.
    Tab,
    SoftLine,
    FileHeader,
    Unknown(u8),
}

impl BracketKind {
    pub fn classify(bracket: &[u8]) -> Self {
        match bracket.get(1).copied() {
            Some(codes::ACCENT) => BracketKind::Accent,
            Some(codes::TITLE) => BracketKind::Title,
            Some(codes::TAB_LEFT | codes::TAB_DECIMAL) => BracketKind::Tab,
            Some(codes::SOFT_LINE) => BracketKind::SoftLine,
            Some(codes::FILE_HEADER) => BracketKind::FileHeader,
            Some(other) => BracketKind::Unknown(other),
            None => BracketKind::Unknown(codes::MARKER),
        }
    }
}

/// Bytes of the bracket currently being read.
///
/// Most brackets end at the next marker. A bracket started with
/// [`BracketBuffer::start_fixed`] whose kind byte matches is instead read
/// to a fixed length, since its payload may contain the marker byte.
#[derive(Debug, Default)]
pub struct BracketBuffer {
    bytes: Vec<u8>,
    complete: bool,
    /// `(kind, length)` of a fixed-length bracket that may start here.
    fixed: Option<(u8, usize)>,
    /// Length to read to, once the kind byte has matched `fixed`.
    target: Option<usize>,
}

impl BracketBuffer {
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(512),
            ..Self::default()
        }
    }

    /// Begin a bracket with its opening marker.
    pub fn start(&mut self) {
        self.bytes.clear();
        self.bytes.push(codes::MARKER);
        self.complete = false;
        self.fixed = None;
        self.target = None;
    }

    /// Begin a bracket that is read to exactly `len` bytes if its kind
    /// byte is `kind`.
    pub fn start_fixed(&mut self, kind: u8, len: usize) {
        self.start();
        self.fixed = Some((kind, len));
    }

    /// Append input up to the end of the bracket. Returns the number of
    /// bytes consumed.
    pub fn fill(&mut self, input: &[u8]) -> usize {
        let mut consumed = 0;
        if self.bytes.len() == 1 {
            let Some(&kind) = input.first() else {
                return 0;
            };
            self.bytes.push(kind);
            consumed = 1;
            if kind == codes::MARKER {
                self.complete = true;
                return consumed;
            }
            self.target = self
                .fixed
                .and_then(|(fixed_kind, len)| (fixed_kind == kind).then_some(len));
        }

        let rest = &input[consumed..];
        match self.target {
            Some(len) => {
                let take = len.saturating_sub(self.bytes.len()).min(rest.len());
                self.bytes.extend_from_slice(&rest[..take]);
                self.complete = self.bytes.len() >= len;
                consumed + take
            }
            None => match memchr(codes::MARKER, rest) {
                Some(index) => {
                    self.bytes.extend_from_slice(&rest[..=index]);
                    self.complete = true;
                    consumed + index + 1
                }
                None => {
                    self.bytes.extend_from_slice(rest);
                    consumed + rest.len()
                }
            },
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Hand over the collected bytes and reset.
    pub fn take(&mut self) -> Vec<u8> {
        self.complete = false;
        self.fixed = None;
        self.target = None;
        std::mem::take(&mut self.bytes)
    }
}

/// Contents of an `a7` title bracket:
///
/// ```text
/// [2b a7 19 40 c1 d9 d8 e4 c9 e3 c5 c3 4b 40 c1 e2
///  e3 e4 d9 c9 c1 e2 19 a7 2b]
/// ```
///
/// The third byte is the length of the whole bracket and is repeated
/// before the closing kind byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub declared_len: u8,
    pub text: String,
}

impl Title {
    pub fn parse(bracket: &[u8]) -> Self {
        let declared_len = bracket.get(2).copied().unwrap_or(0);
        let end = (declared_len as usize)
            .min(bracket.len())
            .saturating_sub(3);
        let text = if end > 3 {
            CodeTable::cp1047().decode_str(&bracket[3..end])
        } else {
            String::new()
        };
        Self { declared_len, text }
    }

    pub fn comment(&self) -> String {
        format!(" title[{}]: {}\n", self.declared_len, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITLE: [u8; 25] = [
        0x2b, 0xa7, 0x19, 0x40, 0xc1, 0xd9, 0xd8, 0xe4, 0xc9, 0xe3, 0xc5, 0xc3, 0x4b, 0x40, 0xc1,
        0xe2, 0xe3, 0xe4, 0xd9, 0xc9, 0xc1, 0xe2, 0x19, 0xa7, 0x2b,
    ];

    #[test]
    fn test_classify() {
        assert_eq!(BracketKind::classify(&[0x2b, 0xa6, 0x2b]), BracketKind::Accent);
        assert_eq!(BracketKind::classify(&TITLE), BracketKind::Title);
        assert_eq!(BracketKind::classify(&[0x2b, 0xc2, 0xe0, 0x01, 0xc2, 0x2b]), BracketKind::Tab);
        assert_eq!(BracketKind::classify(&[0x2b, 0xc3, 0x80, 0x01, 0xc3, 0x2b]), BracketKind::Tab);
        assert_eq!(BracketKind::classify(&[0x2b, 0xd4, 0xd4, 0x2b]), BracketKind::SoftLine);
        assert_eq!(BracketKind::classify(&[0x2b, 0xd6, 0xd6, 0x2b]), BracketKind::FileHeader);
        assert_eq!(
            BracketKind::classify(&[0x2b, 0xd5, 0x6c, 0x00, 0x00, 0x00, 0xd5, 0x2b]),
            BracketKind::Unknown(0xd5)
        );
    }

    #[test]
    fn test_title() {
        let title = Title::parse(&TITLE);
        assert_eq!(title.declared_len, 25);
        assert_eq!(title.text, " ARQUITEC. ASTURIAS");
        assert_eq!(title.comment(), " title[25]:  ARQUITEC. ASTURIAS\n");
    }

    #[test]
    fn test_title_with_bogus_length() {
        let title = Title::parse(&[0x2b, 0xa7, 0xff, 0xc1, 0xc2, 0xff, 0xa7, 0x2b]);
        assert_eq!(title.text, "AB");
        let title = Title::parse(&[0x2b, 0xa7, 0x02, 0xa7, 0x2b]);
        assert_eq!(title.text, "");
    }

    #[test]
    fn test_fill_across_chunks() {
        let mut buffer = BracketBuffer::new();
        buffer.start();
        assert_eq!(buffer.fill(&[0xd4, 0x60, 0x00]), 3);
        assert!(!buffer.is_complete());
        assert_eq!(buffer.fill(&[0xd4, 0x2b, 0xc1, 0xc2]), 2);
        assert!(buffer.is_complete());
        assert_eq!(buffer.take(), vec![0x2b, 0xd4, 0x60, 0x00, 0xd4, 0x2b]);
        assert!(!buffer.is_complete());
        assert!(buffer.take().is_empty());
    }

    #[test]
    fn test_fixed_length_ignores_inner_marker() {
        let mut bracket = vec![0x2b, 0xd6, 0x40, 0xf2, 0x7e, 0x2b, 0x2b, 0x80];
        bracket.resize(codes::HEADER_LEN - 2, 0x2b);
        bracket.extend_from_slice(&[0xd6, 0x2b]);

        let mut buffer = BracketBuffer::new();
        buffer.start_fixed(codes::FILE_HEADER, codes::HEADER_LEN);
        // opening marker already consumed; feed the rest in small pieces
        let mut consumed = 0;
        for chunk in bracket[1..].chunks(5) {
            assert!(!buffer.is_complete());
            consumed += buffer.fill(chunk);
        }
        assert!(buffer.is_complete());
        assert_eq!(consumed, codes::HEADER_LEN - 1);
        assert_eq!(buffer.take(), bracket);
    }

    #[test]
    fn test_fixed_length_only_for_matching_kind() {
        let mut buffer = BracketBuffer::new();
        buffer.start_fixed(codes::FILE_HEADER, codes::HEADER_LEN);
        assert_eq!(buffer.fill(&[0xd4, 0x60, 0xd4, 0x2b, 0xc1]), 4);
        assert!(buffer.is_complete());
        assert_eq!(buffer.take(), vec![0x2b, 0xd4, 0x60, 0xd4, 0x2b]);
    }

    #[test]
    fn test_fixed_length_stops_at_length() {
        let mut buffer = BracketBuffer::new();
        buffer.start_fixed(0xd6, 4);
        assert_eq!(buffer.fill(&[0xd6, 0x2b, 0x2b, 0xc1]), 3);
        assert!(buffer.is_complete());
        assert_eq!(buffer.take(), vec![0x2b, 0xd6, 0x2b, 0x2b]);
    }
}
