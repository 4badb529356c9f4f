//! Error types for the folio PDF reader.

use thiserror::Error;

/// Primary error type for PDF reading operations.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("malformed token at position {pos}: {msg}")]
    MalformedToken { pos: usize, msg: String },

    #[error("malformed structure: {0}")]
    MalformedStructure(String),

    #[error("unresolved reference: {objid} {genno} R")]
    UnresolvedReference { objid: u32, genno: u32 },

    #[error("unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("trailer not found")]
    TrailerNotFound,

    #[error("not a PDF document")]
    NotPdf,

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },

    #[error("key not found: {0}")]
    KeyError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    DecodeError(String),

    #[error("unknown glyph name: {0}")]
    UnknownGlyph(String),

    #[error("CMap not found: {0}")]
    CMapNotFound(String),

    #[error("document has no page labels")]
    NoPageLabels,
}

impl PdfError {
    /// Errors that leave the caller with no usable document.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::NotPdf | Self::Io(_))
    }
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;
