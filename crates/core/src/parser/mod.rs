//! PDF tokenizing and object parsing.
//!
//! - `lexer`: byte-level tokenizer
//! - `pdf_parser`: object parser, indirect objects and stream capture

pub mod lexer;
pub mod pdf_parser;

pub use lexer::{Keyword, Lexer, Token};
pub use pdf_parser::{IndirectObject, LengthResolver, PDFParser};
