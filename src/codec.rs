//! Format selection and streaming drivers.

use std::fmt;
use std::io::{ErrorKind, Read};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::markup::{MarkupEvent, MarkupSink};
use crate::util::infallible;
use crate::wheelwriter::{Decoder, DecoderConfig, DocumentInfo, Encoder, EncoderConfig};

/// Read buffer size used when streaming input through the decoder.
pub const CHUNK_SIZE: usize = 4096;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// IBM 6788 / Wheelwriter typewriter disk file.
    Wheelwriter,
}

impl Format {
    /// Look a format up by its code name (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "ibm6788" | "6788" | "wheelwriter" => Some(Format::Wheelwriter),
            _ => None,
        }
    }

    /// Guess a format from a file extension.
    ///
    /// Typewriter disks carry no distinctive extension; files are usually
    /// copied off with `.txt`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(Format::Wheelwriter),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Format::Wheelwriter => "ibm6788",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Format::Wheelwriter => "IBM 6788 / Wheelwriter",
        }
    }

    /// Decode a whole stream into `sink`.
    pub fn decode_reader<R, S>(self, reader: R, sink: &mut S, config: DecoderConfig) -> Result<DocumentInfo>
    where
        R: Read,
        S: MarkupSink + ?Sized,
        Error: From<S::Error>,
    {
        match self {
            Format::Wheelwriter => decode_reader(reader, sink, config),
        }
    }

    /// Encode a sequence of events into a complete document.
    pub fn encode_events<I>(self, events: I, config: EncoderConfig) -> Vec<u8>
    where
        I: IntoIterator<Item = MarkupEvent>,
    {
        match self {
            Format::Wheelwriter => encode_events(events, config),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Format::from_code(s).ok_or_else(|| Error::UnsupportedFormat(s.to_string()))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Stream a Wheelwriter document from `reader` into `sink`, reading
/// [`CHUNK_SIZE`] bytes at a time.
pub fn decode_reader<R, S>(mut reader: R, sink: &mut S, config: DecoderConfig) -> Result<DocumentInfo>
where
    R: Read,
    S: MarkupSink + ?Sized,
    Error: From<S::Error>,
{
    let mut decoder = Decoder::with_config(config);
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0usize;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        total += n;
        decoder.feed(&buf[..n], sink)?;
    }
    decoder.finish(sink)?;

    let info = decoder.into_info();
    if let Some(header) = &info.header
        && header.file_length() != total
    {
        log::debug!(
            "header declares {} bytes, stream has {total}",
            header.file_length()
        );
    }
    Ok(info)
}

/// Encode events into a complete Wheelwriter document.
pub fn encode_events<I>(events: I, config: EncoderConfig) -> Vec<u8>
where
    I: IntoIterator<Item = MarkupEvent>,
{
    let mut encoder = Encoder::with_config(config);
    for event in events {
        infallible(encoder.event(event));
    }
    encoder.finish()
}
