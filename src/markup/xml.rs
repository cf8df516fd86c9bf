//! XML transport for markup events.
//!
//! [`XmlWriter`] renders an event stream as a small XHTML-like document and
//! [`read_events`] turns such a document back into events. This is enough
//! to carry decoded documents to disk and back; it makes no attempt at being
//! a general XML serializer.

use std::io::Write;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use super::{Attributes, MarkupEvent, MarkupSink};
use crate::error::{Error, Result};

pub const ROOT_TAG: &str = "html";
pub const BODY_TAG: &str = "body";

/// Markup sink that serializes events as XML text.
///
/// A start tag is held back until the next event so that elements without
/// content collapse to `<tag/>`.
pub struct XmlWriter<W: Write> {
    writer: W,
    pending: Option<(String, Attributes)>,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pending: None,
        }
    }

    /// Write the XML declaration and open the document envelope.
    pub fn start_document(&mut self) -> Result<()> {
        self.writer
            .write_all(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")?;
        writeln!(self.writer, "<{ROOT_TAG}>")?;
        writeln!(self.writer, "<{BODY_TAG}>")?;
        Ok(())
    }

    /// Close the envelope and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.flush_pending(false)?;
        writeln!(self.writer, "</{BODY_TAG}>")?;
        writeln!(self.writer, "</{ROOT_TAG}>")?;
        self.into_inner()
    }

    /// Hand back the underlying writer without closing the envelope.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush_pending(false)?;
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn flush_pending(&mut self, empty: bool) -> Result<()> {
        if let Some((tag, attributes)) = self.pending.take() {
            write!(self.writer, "<{tag}")?;
            for (key, value) in &attributes {
                write!(self.writer, " {key}=\"{}\"", escape_xml(value))?;
            }
            self.writer.write_all(if empty { b"/>" } else { b">" })?;
        }
        Ok(())
    }
}

impl<W: Write> MarkupSink for XmlWriter<W> {
    type Error = Error;

    fn event(&mut self, event: MarkupEvent) -> Result<()> {
        match event {
            MarkupEvent::StartElement { tag, attributes } => {
                self.flush_pending(false)?;
                self.pending = Some((tag, attributes));
            }
            MarkupEvent::EndElement { tag } => {
                if self.pending.as_ref().is_some_and(|(open, _)| *open == tag) {
                    self.flush_pending(true)?;
                } else {
                    self.flush_pending(false)?;
                    write!(self.writer, "</{tag}>")?;
                }
            }
            MarkupEvent::Characters { text } => {
                self.flush_pending(false)?;
                self.writer.write_all(escape_xml(&text).as_bytes())?;
            }
            MarkupEvent::Comment { text } => {
                self.flush_pending(false)?;
                write!(self.writer, "<!--{}-->", sanitize_comment(&text))?;
            }
            MarkupEvent::LineBreak => {
                self.flush_pending(false)?;
                self.writer.write_all(b"\n")?;
            }
        }
        Ok(())
    }
}

/// Escape text for element content and attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Comments may not contain `--` or end in `-`.
fn sanitize_comment(text: &str) -> String {
    let mut result = text.to_string();
    while result.contains("--") {
        result = result.replace("--", "- -");
    }
    if result.ends_with('-') {
        result.push(' ');
    }
    result
}

/// Parse an XML document into markup events.
///
/// Entity and character references are resolved into the surrounding text.
/// Line ends in text become [`MarkupEvent::LineBreak`]s, the inverse of how
/// [`XmlWriter`] renders them.
pub fn read_events(xml: &str) -> Result<Vec<MarkupEvent>> {
    let mut reader = Reader::from_str(xml);
    let mut events = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                flush_text(&mut text, &mut events);
                let (tag, attributes) = element(&e)?;
                events.push(MarkupEvent::start_with(tag, attributes));
            }
            Event::Empty(e) => {
                flush_text(&mut text, &mut events);
                let (tag, attributes) = element(&e)?;
                events.push(MarkupEvent::start_with(tag.clone(), attributes));
                events.push(MarkupEvent::end(tag));
            }
            Event::End(e) => {
                flush_text(&mut text, &mut events);
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                events.push(MarkupEvent::end(tag));
            }
            Event::Text(e) => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Event::CData(e) => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                match resolve_entity(&entity) {
                    Some(ch) => text.push(ch),
                    None => {
                        log::warn!("unknown entity &{entity}; kept literally");
                        text.push('&');
                        text.push_str(&entity);
                        text.push(';');
                    }
                }
            }
            Event::Comment(e) => {
                flush_text(&mut text, &mut events);
                events.push(MarkupEvent::comment(String::from_utf8_lossy(e.as_ref())));
            }
            Event::Eof => break,
            _ => {}
        }
    }
    flush_text(&mut text, &mut events);

    Ok(events)
}

fn element(e: &BytesStart<'_>) -> Result<(String, Attributes)> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Attributes::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        attributes.insert(key, unescape(&raw)?.into_owned());
    }
    Ok((tag, attributes))
}

fn flush_text(text: &mut String, events: &mut Vec<MarkupEvent>) {
    if text.is_empty() {
        return;
    }
    let mut lines = text.split('\n').peekable();
    while let Some(line) = lines.next() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if !line.is_empty() {
            events.push(MarkupEvent::characters(line));
        }
        if lines.peek().is_some() {
            events.push(MarkupEvent::LineBreak);
        }
    }
    text.clear();
}

fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}
