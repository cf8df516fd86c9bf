//! Error types for wheelwriter operations.

use std::convert::Infallible;

use thiserror::Error;

/// Errors that can occur while converting Wheelwriter documents.
///
/// Content the decoder does not understand is never an error: unknown
/// brackets and unmapped accents are rendered as diagnostics instead.
/// These variants cover I/O, the markup transport, and structural
/// precondition failures.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML escape error: {0}")]
    XmlEscape(#[from] quick_xml::escape::EscapeError),

    #[error("Invalid file header: {0}")]
    InvalidHeader(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

pub type Result<T> = std::result::Result<T, Error>;
