//! The file header record (`d6` bracket).
//!
//! Every document starts with a fixed 72-byte bracket:
//!
//! ```text
//! [2b d6 40 f1 7e c9 08 80 48 00 84 00 54 03 84 00
//!  54 03 74 01 64 02 00 00 00 00 00 00 00 00 00 00
//!  ...
//!  00 00 00 00 00 00 d6 2b]
//! ```
//!
//! Bytes 2..5 hold the file id in EBCDIC (`" 1="`), 5..7 the little-endian
//! length of the file after the header, byte 7 a status byte, and from
//! byte 8 a list of little-endian words (margins and tab stops) padded
//! with zeros.

use super::codes::{FILE_HEADER, HEADER_LEN, MARKER, SUBSTITUTE};
use crate::ebcdic::CodeTable;
use crate::error::{Error, Result};

const ID_OFFSET: usize = 2;
const ID_LEN: usize = 3;
const SIZE_OFFSET: usize = 5;
const STATUS_OFFSET: usize = 7;
const WORDS_OFFSET: usize = 8;

/// Words read back from a header; the last slot is never consulted.
const WORDS_DECODED: usize = 30;
/// Word slots written into a header.
const WORD_SLOTS: usize = 31;

/// Margin and tab settings written by default.
const DEFAULT_WORDS: [u16; 10] = [72, 96, 1008, 96, 1008, 108, 144, 240, 588, 720];

/// Decoded file header record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Three characters, a file number followed by `=`.
    pub id: String,
    /// Length of the file after the header.
    pub size: u16,
    pub status: u8,
    /// Margin/tab words without trailing zeros.
    pub words: Vec<u16>,
}

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            id: " 2=".to_string(),
            size: 0,
            status: 0x80,
            words: DEFAULT_WORDS.to_vec(),
        }
    }
}

impl FileHeader {
    /// Parse a complete `d6` bracket, markers included.
    pub fn parse(bracket: &[u8]) -> Result<Self> {
        if bracket.len() < WORDS_OFFSET + 2 {
            return Err(Error::InvalidHeader(format!(
                "header bracket too short: {} bytes",
                bracket.len()
            )));
        }
        if bracket[0] != MARKER || bracket[1] != FILE_HEADER {
            return Err(Error::InvalidHeader(format!(
                "not a header bracket: {:02x} {:02x}",
                bracket[0], bracket[1]
            )));
        }

        let table = CodeTable::cp1047();
        let id = table.decode_str(&bracket[ID_OFFSET..ID_OFFSET + ID_LEN]);
        let size = u16::from_le_bytes([bracket[SIZE_OFFSET], bracket[SIZE_OFFSET + 1]]);
        let status = bracket[STATUS_OFFSET];

        // The closing kind byte and marker are not part of the word list.
        let body = &bracket[WORDS_OFFSET..bracket.len() - 2];
        let mut words: Vec<u16> = body
            .chunks_exact(2)
            .take(WORDS_DECODED)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        while words.last() == Some(&0) {
            words.pop();
        }

        Ok(Self {
            id,
            size,
            status,
            words,
        })
    }

    /// Total file length declared by the header.
    pub fn file_length(&self) -> usize {
        self.size as usize + HEADER_LEN
    }

    /// File number from the id, if it holds one.
    pub fn number(&self) -> Option<u32> {
        let digits: String = self.id.chars().filter(char::is_ascii_digit).collect();
        digits.parse().ok()
    }

    /// Serialize as a complete header bracket of [`HEADER_LEN`] bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let table = CodeTable::cp1047();
        let mut bytes = Vec::with_capacity(HEADER_LEN);
        bytes.push(MARKER);
        bytes.push(FILE_HEADER);

        let mut id: Vec<u8> = self
            .id
            .chars()
            .take(ID_LEN)
            .map(|c| table.to_byte(c).unwrap_or(SUBSTITUTE))
            .collect();
        id.resize(ID_LEN, 0x40);
        bytes.extend_from_slice(&id);

        bytes.extend_from_slice(&self.size.to_le_bytes());
        bytes.push(self.status);

        if self.words.len() > WORD_SLOTS {
            log::warn!(
                "header holds {} words, only {WORD_SLOTS} are written",
                self.words.len()
            );
        }
        for slot in 0..WORD_SLOTS {
            let word = self.words.get(slot).copied().unwrap_or(0);
            bytes.extend_from_slice(&word.to_le_bytes());
        }

        bytes.push(FILE_HEADER);
        bytes.push(MARKER);
        bytes
    }

    /// One-line description used in diagnostic comments.
    pub fn summary(&self) -> String {
        let words: Vec<String> = self.words.iter().map(u16::to_string).collect();
        format!(
            " file header: id=\"{}\", size={}, status=0x{:02x}, words=[{}]\n",
            self.id,
            self.file_length(),
            self.status,
            words.join(" ")
        )
    }
}

/// Store the length of `output` after the header into the header's size
/// field. `output` must start with a header record.
pub fn patch_size(output: &mut [u8]) {
    if output.len() < HEADER_LEN {
        log::warn!("output shorter than a header record; size not patched");
        return;
    }
    let after = output.len() - HEADER_LEN;
    let size = u16::try_from(after).unwrap_or_else(|_| {
        log::warn!("document body of {after} bytes exceeds the header size field");
        u16::MAX
    });
    output[SIZE_OFFSET..SIZE_OFFSET + 2].copy_from_slice(&size.to_le_bytes());
}
