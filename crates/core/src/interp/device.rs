//! Output devices: where the interpreter sends what a page paints.

use bytes::Bytes;

use crate::utils::{Matrix, Rect};

/// A run of text shown by one text operator.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Zero-based page the run was painted on
    pub page_index: usize,
    pub text: String,
    /// Text rendering matrix at the start of the run (font size and rise
    /// folded in), in device space
    pub matrix: Matrix,
    /// `/BaseFont` of the font, else its resource name
    pub font: Option<String>,
    /// Font size from `Tf`
    pub size: f64,
    /// Advance of the run along its baseline, in device space
    pub width: f64,
}

impl TextRun {
    /// Start of the baseline in device space.
    pub fn origin(&self) -> (f64, f64) {
        (self.matrix.4, self.matrix.5)
    }

    /// Effective font size after all transformations.
    pub fn scaled_size(&self) -> f64 {
        let (_, _, c, d, _, _) = self.matrix;
        c.hypot(d)
    }
}

/// An image painted by `Do` or an inline image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub page_index: usize,
    /// XObject resource name, or `inlineN` for inline images
    pub name: String,
    pub width: i64,
    pub height: i64,
    /// Color space name; for arrays such as `[/ICCBased 5 0 R]` the family name
    pub color_space: Option<String>,
    pub bits_per_component: i64,
    pub image_mask: bool,
    pub data: Bytes,
    /// Filter still applied to `data`, when it was left encoded
    pub filter: Option<String>,
    /// Placement of the unit square in device space
    pub ctm: Matrix,
}

/// Receives page events from the interpreter. All methods default to no-ops.
pub trait PDFDevice {
    /// Begin processing a page.
    fn begin_page(&mut self, _page_index: usize, _mediabox: Rect, _ctm: Matrix) {}

    /// End processing a page.
    fn end_page(&mut self, _page_index: usize) {}

    /// Entering a form XObject.
    fn begin_figure(&mut self, _name: &str, _bbox: Rect, _matrix: Matrix) {}

    fn end_figure(&mut self, _name: &str) {}

    fn render_text(&mut self, _run: TextRun) {}

    fn render_image(&mut self, _image: ImageInfo) {}
}

/// Collects every text run.
#[derive(Debug, Default)]
pub struct TextCollector {
    pub runs: Vec<TextRun>,
}

impl TextCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_runs(self) -> Vec<TextRun> {
        self.runs
    }
}

impl PDFDevice for TextCollector {
    fn render_text(&mut self, run: TextRun) {
        if !run.text.is_empty() {
            self.runs.push(run);
        }
    }
}

/// Collects every image.
#[derive(Debug, Default)]
pub struct ImageCollector {
    pub images: Vec<ImageInfo>,
    /// Whether images left in an undecoded filter are kept
    pub include_raw: bool,
}

impl ImageCollector {
    pub fn new(include_raw: bool) -> Self {
        Self {
            images: Vec::new(),
            include_raw,
        }
    }

    pub fn into_images(self) -> Vec<ImageInfo> {
        self.images
    }
}

impl PDFDevice for ImageCollector {
    fn render_image(&mut self, image: ImageInfo) {
        if image.filter.is_none() || self.include_raw {
            self.images.push(image);
        }
    }
}

/// Lays text runs out as plain text, one page at a time.
///
/// Runs on a new baseline start a new line. A space is inserted between
/// runs on the same line when the gap exceeds a fraction of the font size.
#[derive(Debug, Default)]
pub struct PlainTextDevice {
    out: String,
    last: Option<(f64, f64, f64)>,
}

impl PlainTextDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl PDFDevice for PlainTextDevice {
    fn begin_page(&mut self, _page_index: usize, _mediabox: Rect, _ctm: Matrix) {
        self.last = None;
    }

    fn end_page(&mut self, _page_index: usize) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        // form feed between pages
        self.out.push('\x0c');
    }

    fn render_text(&mut self, run: TextRun) {
        if run.text.is_empty() {
            return;
        }
        let (x, y) = run.origin();
        let size = run.scaled_size().max(1.0);
        if let Some((end_x, last_y, last_size)) = self.last {
            if (y - last_y).abs() > last_size.min(size) * 0.5 {
                self.out.push('\n');
            } else if x - end_x > size * 0.15 && !self.out.ends_with(' ') && !run.text.starts_with(' ') {
                self.out.push(' ');
            }
        }
        self.out.push_str(&run.text);
        self.last = Some((x + run.width, y, size));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, x: f64, y: f64, width: f64) -> TextRun {
        TextRun {
            page_index: 0,
            text: text.into(),
            matrix: (10.0, 0.0, 0.0, 10.0, x, y),
            font: None,
            size: 10.0,
            width,
        }
    }

    #[test]
    fn plain_text_lines_and_spaces() {
        let mut dev = PlainTextDevice::new();
        dev.begin_page(0, (0.0, 0.0, 612.0, 792.0), crate::utils::MATRIX_IDENTITY);
        dev.render_text(run("Hello", 72.0, 700.0, 25.0));
        dev.render_text(run("world", 100.0, 700.0, 25.0));
        dev.render_text(run("again", 72.0, 686.0, 25.0));
        dev.render_text(run("!", 97.0, 686.0, 3.0));
        dev.end_page(0);
        assert_eq!(dev.into_string(), "Hello world\nagain!\n\x0c");
    }

    #[test]
    fn image_collector_filters_raw() {
        let image = ImageInfo {
            page_index: 0,
            name: "Im1".into(),
            width: 1,
            height: 1,
            color_space: Some("DeviceRGB".into()),
            bits_per_component: 8,
            image_mask: false,
            data: Bytes::from_static(b"\xff\xd8"),
            filter: Some("DCTDecode".into()),
            ctm: crate::utils::MATRIX_IDENTITY,
        };
        let mut keep = ImageCollector::new(true);
        keep.render_image(image.clone());
        assert_eq!(keep.into_images().len(), 1);
        let mut drop = ImageCollector::new(false);
        drop.render_image(image);
        assert!(drop.into_images().is_empty());
    }
}
