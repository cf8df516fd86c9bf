//! Markup event vocabulary shared by the decoder and the encoder.
//!
//! The decoder pushes events into a [`MarkupSink`]; the encoder is itself a
//! sink. Concrete transports (XML text, JSON lines, in-memory vectors) live
//! outside the codec and only meet it through this interface.

use std::collections::BTreeMap;
use std::convert::Infallible;

pub mod xml;

pub use xml::{XmlWriter, read_events};

/// Element and attribute names used by the Wheelwriter codec.
pub mod tags {
    /// Paragraph end (empty element).
    pub const PARAGRAPH: &str = "p";
    /// Line break (empty element); soft breaks carry `type="soft"`.
    pub const LINE: &str = "br";
    /// Hard page break (empty element).
    pub const PAGE: &str = "page";
    pub const BOLD: &str = "b";
    pub const UNDERLINE: &str = "u";

    pub const TYPE_ATTR: &str = "type";
    pub const STYLE_ATTR: &str = "style";
    pub const SOFT: &str = "soft";
}

/// Element attributes. Order carries no meaning; a sorted map keeps
/// serialized output stable.
pub type Attributes = BTreeMap<String, String>;

/// One item of the markup stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(tag = "kind", rename_all = "snake_case"))]
pub enum MarkupEvent {
    StartElement { tag: String, attributes: Attributes },
    EndElement { tag: String },
    Characters { text: String },
    Comment { text: String },
    /// Cosmetic newline in the serialized markup. Carries no content.
    LineBreak,
}

impl MarkupEvent {
    pub fn start(tag: impl Into<String>) -> Self {
        MarkupEvent::StartElement {
            tag: tag.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn start_with(tag: impl Into<String>, attributes: Attributes) -> Self {
        MarkupEvent::StartElement {
            tag: tag.into(),
            attributes,
        }
    }

    pub fn end(tag: impl Into<String>) -> Self {
        MarkupEvent::EndElement { tag: tag.into() }
    }

    pub fn characters(text: impl Into<String>) -> Self {
        MarkupEvent::Characters { text: text.into() }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        MarkupEvent::Comment { text: text.into() }
    }

    /// Text carried by a `Characters` event.
    pub fn text(&self) -> Option<&str> {
        match self {
            MarkupEvent::Characters { text } => Some(text),
            _ => None,
        }
    }

    /// Whether this is a start tag named `tag`.
    pub fn is_start_of(&self, tag: &str) -> bool {
        matches!(self, MarkupEvent::StartElement { tag: t, .. } if t == tag)
    }
}

/// Consumer of markup events.
///
/// Implementors only provide [`MarkupSink::event`]; the remaining methods
/// are conveniences mirroring the event vocabulary.
pub trait MarkupSink {
    type Error;

    fn event(&mut self, event: MarkupEvent) -> Result<(), Self::Error>;

    fn start_element(&mut self, tag: &str, attributes: Attributes) -> Result<(), Self::Error> {
        self.event(MarkupEvent::start_with(tag, attributes))
    }

    fn end_element(&mut self, tag: &str) -> Result<(), Self::Error> {
        self.event(MarkupEvent::end(tag))
    }

    /// Start and immediately end `tag`.
    fn empty_element(&mut self, tag: &str, attributes: Attributes) -> Result<(), Self::Error> {
        self.start_element(tag, attributes)?;
        self.end_element(tag)
    }

    fn characters(&mut self, text: &str) -> Result<(), Self::Error> {
        self.event(MarkupEvent::characters(text))
    }

    fn comment(&mut self, text: &str) -> Result<(), Self::Error> {
        self.event(MarkupEvent::comment(text))
    }

    fn line_break(&mut self) -> Result<(), Self::Error> {
        self.event(MarkupEvent::LineBreak)
    }
}

impl MarkupSink for Vec<MarkupEvent> {
    type Error = Infallible;

    fn event(&mut self, event: MarkupEvent) -> Result<(), Infallible> {
        self.push(event);
        Ok(())
    }
}

impl<S: MarkupSink + ?Sized> MarkupSink for &mut S {
    type Error = S::Error;

    fn event(&mut self, event: MarkupEvent) -> Result<(), Self::Error> {
        (**self).event(event)
    }
}

/// Build an attribute map from `(key, value)` pairs.
pub fn attributes<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Attributes {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
