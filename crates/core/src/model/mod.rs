//! PDF model types - objects and interpreter state.
//!
//! - `objects` - PDF object types (PDFObject, PDFStream, PDFObjRef)
//! - `state` - Interpreter state (PDFGraphicState, PDFTextState)

pub mod objects;
pub mod state;

pub use objects::{PDFDict, PDFObjRef, PDFObject, PDFStream};
pub use state::{PDFGraphicState, PDFTextState};
