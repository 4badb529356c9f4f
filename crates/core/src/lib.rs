//! folio - a read-only PDF engine: lazy object resolution, stream decoding
//! and content-stream interpretation for text and image extraction.

pub mod api;
pub mod codec;
pub mod document;
pub mod error;
pub mod font;
pub mod interp;
pub mod model;
pub mod parser;
pub mod utils;

pub use api::high_level;
pub use api::{ExtractOptions, extract_images, extract_text, extract_text_runs};
pub use document::{PDFDocument, PDFPage, ParseOptions};
pub use error::{PdfError, Result};
pub use interp::{ImageInfo, TextRun};
pub use model::{PDFDict, PDFObjRef, PDFObject, PDFStream};
