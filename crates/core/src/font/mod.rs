//! Font handling for text extraction.
//!
//! - `encoding` - simple font encodings and glyph names
//! - `cmap` - code to CID and code to Unicode maps
//! - `pdffont` - fonts built from their dictionaries

pub mod cmap;
pub mod encoding;
mod glyphlist;
pub mod latin_enc;
pub mod pdffont;

pub use cmap::{CMap, CodespaceRange, EmbeddedCMap, ToUnicodeMap};
pub use encoding::{BaseEncoding, DiffEntry, EncodingDB, glyph_to_char, name2unicode};
pub use pdffont::{FontKind, PDFFont, REPLACEMENT};
