//! Text state carried by the content-stream interpreter.

use crate::font::PDFFont;
use crate::utils::{MATRIX_IDENTITY, Matrix, Point};
use std::sync::Arc;

/// PDF Text State - text positioning and rendering parameters.
///
/// Saved and restored together with the CTM by `q` and `Q`.
#[derive(Debug, Clone)]
pub struct PDFTextState {
    /// Current font (None if not set)
    pub font: Option<Arc<PDFFont>>,
    /// Current font resource name (e.g., "F1")
    pub fontname: Option<String>,
    /// Font size in text space units
    pub fontsize: f64,
    /// Character spacing (Tc)
    pub charspace: f64,
    /// Word spacing (Tw), applied to single-byte code 32
    pub wordspace: f64,
    /// Horizontal scaling percentage (100 = normal)
    pub scaling: f64,
    /// Text leading (TL)
    pub leading: f64,
    /// Text rendering mode (0-7)
    pub render: i32,
    /// Text rise
    pub rise: f64,
    /// Text matrix (Tm)
    pub matrix: Matrix,
    /// Start of the current line, in text space
    pub linematrix: Point,
}

impl PDFTextState {
    pub fn new() -> Self {
        Self {
            font: None,
            fontname: None,
            fontsize: 0.0,
            charspace: 0.0,
            wordspace: 0.0,
            scaling: 100.0,
            leading: 0.0,
            render: 0,
            rise: 0.0,
            matrix: MATRIX_IDENTITY,
            linematrix: (0.0, 0.0),
        }
    }

    /// Reset text matrix and line matrix. Called by `BT`.
    pub fn reset(&mut self) {
        self.matrix = MATRIX_IDENTITY;
        self.linematrix = (0.0, 0.0);
    }
}

impl Default for PDFTextState {
    fn default() -> Self {
        Self::new()
    }
}

/// The part of the graphics state the interpreter tracks.
///
/// One of these is pushed by `q` and popped by `Q`.
#[derive(Debug, Clone)]
pub struct PDFGraphicState {
    /// Current transformation matrix
    pub ctm: Matrix,
    pub text: PDFTextState,
}

impl PDFGraphicState {
    pub fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            text: PDFTextState::new(),
        }
    }
}

impl Default for PDFGraphicState {
    fn default() -> Self {
        Self::new(MATRIX_IDENTITY)
    }
}
