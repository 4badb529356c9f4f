//! High-level API for text and image extraction.
//!
//! # Example
//!
//! ```ignore
//! use folio_core::api::{extract_text, ExtractOptions};
//!
//! let pdf_bytes = std::fs::read("document.pdf")?;
//! let text = extract_text(&pdf_bytes, Some(ExtractOptions::new().maxpages(2)))?;
//! ```

pub mod high_level;

pub use high_level::{
    ExtractOptions, extract_images, extract_pages_text, extract_text, extract_text_runs,
    extract_text_with_document,
};
