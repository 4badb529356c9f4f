//! Content stream interpretation.
//!
//! - `content`: tokenizes content streams into operands and operators
//! - `interpreter`: executes them against the graphics state
//! - `device`: receives the text runs and images a page paints

pub mod content;
pub mod device;
pub mod interpreter;

pub use content::{ContentParser, ContentToken};
pub use device::{ImageCollector, ImageInfo, PDFDevice, PlainTextDevice, TextCollector, TextRun};
pub use interpreter::{DEFAULT_MAX_FORM_DEPTH, PDFPageInterpreter};
