//! Encoding markup events back into Wheelwriter bytes.
//!
//! Only the text layer survives: characters, paragraph and line breaks,
//! and page breaks. Decorations, accents and bracket payloads are not
//! reconstructed.

use std::convert::Infallible;

use super::codes;
use super::header::{FileHeader, patch_size};
use crate::ebcdic::CodeTable;
use crate::markup::{Attributes, MarkupEvent, MarkupSink, tags};

/// Configuration for encoding.
#[derive(Debug, Clone, Default)]
pub struct EncoderConfig {
    /// Header record written at the start. Its size field is replaced.
    pub header: FileHeader,
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, header: FileHeader) -> Self {
        self.header = header;
        self
    }
}

/// Markup sink producing a Wheelwriter document.
pub struct Encoder {
    table: &'static CodeTable,
    output: Vec<u8>,
    substitutions: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self::with_config(EncoderConfig::default())
    }

    pub fn with_config(config: EncoderConfig) -> Self {
        let mut output = config.header.to_bytes();
        output.extend_from_slice(&codes::MARGIN_BRACKET);
        Self {
            table: CodeTable::cp1047(),
            output,
            substitutions: 0,
        }
    }

    /// Patch the header size field and return the document.
    pub fn finish(mut self) -> Vec<u8> {
        if self.substitutions > 0 {
            log::warn!(
                "{} characters could not be encoded and were replaced",
                self.substitutions
            );
        }
        patch_size(&mut self.output);
        self.output
    }

    fn new_line(&mut self) {
        self.output.push(codes::PARAGRAPH);
        self.output.extend_from_slice(&codes::MARGIN_BRACKET);
    }

    fn open_element(&mut self, tag: &str, attributes: &Attributes) {
        match tag {
            tags::PARAGRAPH => self.new_line(),
            tags::LINE => {
                if attributes.get(tags::TYPE_ATTR).map(String::as_str) != Some(tags::SOFT) {
                    self.new_line();
                }
            }
            tags::PAGE => self.output.push(codes::HARD_PAGE),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\n' => self.new_line(),
                '\r' => {}
                '\u{00A0}' => self.output.push(codes::HARD_SPACE),
                _ => match self.table.to_byte(ch) {
                    Some(byte) if !codes::is_control(byte) => self.output.push(byte),
                    _ => {
                        log::debug!("cannot encode {ch:?}; writing substitute");
                        self.substitutions += 1;
                        self.output.push(codes::SUBSTITUTE);
                    }
                },
            }
        }
    }
}

impl MarkupSink for Encoder {
    type Error = Infallible;

    fn event(&mut self, event: MarkupEvent) -> Result<(), Infallible> {
        match event {
            MarkupEvent::StartElement { tag, attributes } => self.open_element(&tag, &attributes),
            MarkupEvent::Characters { text } => self.text(&text),
            MarkupEvent::EndElement { .. } | MarkupEvent::Comment { .. } | MarkupEvent::LineBreak => {}
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), Infallible> {
        self.text(text);
        Ok(())
    }
}
