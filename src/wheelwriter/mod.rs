//! IBM 6788 / Wheelwriter disk format.
//!
//! A document is a stream of EBCDIC bytes. Printable bytes are text; a
//! handful of low codes are control characters (paragraph end, line end,
//! page end, bold/underline prefixes, spaces); and everything else is
//! wrapped in brackets:
//!
//! ```text
//! 2b kk ... kk 2b
//! ```
//!
//! where `kk` names the bracket kind. The first bracket of a file is a
//! 72-byte header record holding the file id, the length of the rest of
//! the file and the margin and tab settings.
//!
//! [`Decoder`] turns bytes into [`MarkupEvent`](crate::markup::MarkupEvent)s
//! and [`Encoder`] turns them back into bytes. Only text and breaks
//! survive the trip.

pub mod accent;
pub mod bracket;
pub mod codes;
mod decoder;
mod encoder;
pub mod header;

pub use decoder::{Decoder, DecoderConfig, Decoration, DocumentInfo, Underline};
pub use encoder::{Encoder, EncoderConfig};
pub use header::FileHeader;
