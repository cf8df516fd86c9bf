//! # wheelwriter
//!
//! Converter for documents written by IBM 6788 and Wheelwriter electronic
//! typewriters.
//!
//! ## Features
//!
//! - Decode typewriter disk files into a stream of markup events
//! - Compose overstruck accents into precomposed characters
//! - Read the file header record (id, length, margins and tabs)
//! - Encode text and breaks back into a file the typewriter can load
//! - Serialize events as XML and read them back
//!
//! ## Quick Start
//!
//! ```no_run
//! use wheelwriter::{decode_to_xml, encode_xml};
//!
//! let bytes = std::fs::read("letter.txt").unwrap();
//! let xml = decode_to_xml(&bytes).unwrap();
//! println!("{xml}");
//!
//! let back = encode_xml(&xml).unwrap();
//! std::fs::write("letter-copy.txt", back).unwrap();
//! ```
//!
//! ## Streaming
//!
//! [`Decoder`] is resumable and accepts input in chunks of any size. Any
//! [`MarkupSink`] can receive the events:
//!
//! ```
//! use wheelwriter::{Decoder, MarkupEvent};
//!
//! let mut events: Vec<MarkupEvent> = Vec::new();
//! let mut decoder = Decoder::new();
//! decoder.feed(&[0xC8, 0x89], &mut events).unwrap();
//! decoder.finish(&mut events).unwrap();
//! assert_eq!(events, vec![MarkupEvent::characters("Hi")]);
//! ```

pub mod codec;
pub mod ebcdic;
pub mod error;
pub mod markup;
pub(crate) mod util;
pub mod wheelwriter;

pub use codec::Format;
pub use ebcdic::CodeTable;
pub use error::{Error, Result};
pub use markup::{MarkupEvent, MarkupSink, XmlWriter};
pub use wheelwriter::{
    Decoder, DecoderConfig, Decoration, DocumentInfo, Encoder, EncoderConfig, FileHeader,
};

use util::infallible;

/// Decode a complete document into events.
pub fn decode(bytes: &[u8]) -> Vec<MarkupEvent> {
    decode_with(bytes, DecoderConfig::default()).0
}

/// Decode a complete document with `config`, returning the events and
/// the header and title found.
pub fn decode_with(bytes: &[u8], config: DecoderConfig) -> (Vec<MarkupEvent>, DocumentInfo) {
    let mut events = Vec::new();
    let mut decoder = Decoder::with_config(config);
    infallible(decoder.feed(bytes, &mut events));
    infallible(decoder.finish(&mut events));
    (events, decoder.into_info())
}

/// Encode events into a complete document.
pub fn encode(events: &[MarkupEvent]) -> Vec<u8> {
    codec::encode_events(events.iter().cloned(), EncoderConfig::default())
}

/// Decode a complete document into an XML string.
pub fn decode_to_xml(bytes: &[u8]) -> Result<String> {
    let mut writer = XmlWriter::new(Vec::new());
    writer.start_document()?;
    let mut decoder = Decoder::new();
    decoder.feed(bytes, &mut writer)?;
    decoder.finish(&mut writer)?;
    let out = writer.finish()?;
    String::from_utf8(out).map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Encode an XML document, as written by [`decode_to_xml`], into bytes.
pub fn encode_xml(xml: &str) -> Result<Vec<u8>> {
    let events = markup::read_events(xml)?;
    Ok(codec::encode_events(events, EncoderConfig::default()))
}
