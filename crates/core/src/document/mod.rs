//! PDF Document module - document structure and object resolution.
//!
//! This module contains:
//! - `xref` - cross-reference tables, xref streams and recovery scanning
//! - `catalog` - object resolution and the document handle (PDFDocument)
//! - `objstm` - object streams
//! - `page` - page tree iteration and inherited attributes (PDFPage)
//! - `labels` - page labels
//! - `names` - name trees and embedded files
//! - `forms` - AcroForm fields

pub mod catalog;
pub mod forms;
pub mod labels;
pub mod names;
pub mod objstm;
pub mod page;
pub mod xref;

pub use catalog::{PDFDocument, ParseOptions, decode_text_string};
pub use forms::FormField;
pub use labels::{LabelStyle, PageLabels};
pub use names::EmbeddedFile;
pub use objstm::ObjectStream;
pub use page::{Annotation, PDFPage, PageIterator};
pub use xref::{XRefEntry, XRefLocation, XRefTable};
