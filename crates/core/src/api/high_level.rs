//! High-level extraction API.
//!
//! - `extract_text()` - all text of a PDF as one string
//! - `extract_pages_text()` - text per page
//! - `extract_text_runs()` - positioned text runs
//! - `extract_images()` - images with their metadata and payloads

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::document::{PDFDocument, PDFPage, ParseOptions};
use crate::error::{PdfError, Result};
use crate::interp::{
    DEFAULT_MAX_FORM_DEPTH, ImageCollector, ImageInfo, PDFDevice, PDFPageInterpreter,
    PlainTextDevice, TextCollector, TextRun,
};

/// Options for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Zero-indexed page numbers to extract. None means all pages.
    pub page_numbers: Option<Vec<usize>>,

    /// Maximum number of pages to extract. 0 means no limit.
    pub maxpages: usize,

    /// Nesting limit for form XObjects.
    pub max_form_depth: usize,

    /// Keep images whose data is still encoded (DCT, JPX, CCITT, JBIG2).
    pub include_raw_images: bool,

    /// Worker threads for page interpretation. 1 runs on the calling thread.
    pub threads: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            page_numbers: None,
            maxpages: 0,
            max_form_depth: DEFAULT_MAX_FORM_DEPTH,
            include_raw_images: true,
            threads: 1,
        }
    }
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_numbers(mut self, pages: impl IntoIterator<Item = usize>) -> Self {
        self.page_numbers = Some(pages.into_iter().collect());
        self
    }

    pub fn maxpages(mut self, n: usize) -> Self {
        self.maxpages = n;
        self
    }

    pub fn max_form_depth(mut self, depth: usize) -> Self {
        self.max_form_depth = depth;
        self
    }

    pub fn include_raw_images(mut self, include: bool) -> Self {
        self.include_raw_images = include;
        self
    }

    pub fn threads(mut self, n: usize) -> Self {
        self.threads = n.max(1);
        self
    }
}

/// Parse `pdf_data` and return its text, pages separated by form feeds.
///
/// # Example
/// ```ignore
/// use folio_core::api::{extract_text, ExtractOptions};
///
/// let pdf_bytes = std::fs::read("document.pdf")?;
/// let text = extract_text(&pdf_bytes, None)?;
/// println!("{}", text);
/// ```
pub fn extract_text(pdf_data: &[u8], options: Option<ExtractOptions>) -> Result<String> {
    let doc = PDFDocument::with_options(pdf_data, ParseOptions::default())?;
    extract_text_with_document(&doc, &options.unwrap_or_default())
}

/// Text of an already-parsed document.
pub fn extract_text_with_document(doc: &PDFDocument, options: &ExtractOptions) -> Result<String> {
    Ok(extract_pages_text(doc, options)?
        .into_iter()
        .map(|(_, text)| text)
        .collect())
}

/// `(page_index, text)` for each selected page. Each text ends with a form feed.
pub fn extract_pages_text(doc: &PDFDocument, options: &ExtractOptions) -> Result<Vec<(usize, String)>> {
    for_each_page(doc, options, |page| {
        let mut device = PlainTextDevice::new();
        interpret(doc, page, options, &mut device);
        (page.index, device.into_string())
    })
}

/// Text runs of the selected pages in page order.
pub fn extract_text_runs(doc: &PDFDocument, options: &ExtractOptions) -> Result<Vec<TextRun>> {
    let pages = for_each_page(doc, options, |page| {
        let mut device = TextCollector::new();
        interpret(doc, page, options, &mut device);
        device.into_runs()
    })?;
    Ok(pages.into_iter().flatten().collect())
}

/// Images of the selected pages in page order.
pub fn extract_images(doc: &PDFDocument, options: &ExtractOptions) -> Result<Vec<ImageInfo>> {
    let pages = for_each_page(doc, options, |page| {
        let mut device = ImageCollector::new(options.include_raw_images);
        interpret(doc, page, options, &mut device);
        device.into_images()
    })?;
    Ok(pages.into_iter().flatten().collect())
}

fn interpret<D: PDFDevice>(doc: &PDFDocument, page: &PDFPage, options: &ExtractOptions, device: &mut D) {
    debug!(page = page.index, "interpreting page");
    PDFPageInterpreter::new(doc, device)
        .with_max_form_depth(options.max_form_depth)
        .process_page(page);
}

/// Pages chosen by `page_numbers` and `maxpages`, in document order.
///
/// The page tree is walked once, and only as far as the selection needs.
pub(crate) fn select_pages(doc: &PDFDocument, options: &ExtractOptions) -> Vec<PDFPage> {
    let wanted = options.page_numbers.as_deref();
    let last_wanted = wanted.and_then(|nums| nums.iter().max().copied());
    let mut selected = Vec::new();
    let mut walked = 0;
    let mut stopped = false;
    for page in doc.pages() {
        if (options.maxpages > 0 && selected.len() >= options.maxpages)
            || last_wanted.is_some_and(|last| page.index > last)
        {
            stopped = true;
            break;
        }
        walked = page.index + 1;
        if wanted.is_some_and(|nums| !nums.contains(&page.index)) {
            continue;
        }
        selected.push(page);
    }
    if let Some(nums) = wanted
        && !stopped
    {
        for missing in nums.iter().filter(|&&n| n >= walked) {
            warn!(page = missing, count = walked, "requested page does not exist");
        }
    }
    selected
}

fn for_each_page<T, F>(doc: &PDFDocument, options: &ExtractOptions, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&PDFPage) -> T + Send + Sync,
{
    let pages = select_pages(doc, options);
    if options.threads <= 1 {
        return Ok(pages.iter().map(f).collect());
    }
    let pool = ThreadPoolBuilder::new()
        .num_threads(options.threads)
        .build()
        .map_err(|e| PdfError::DecodeError(e.to_string()))?;
    // indexed collect keeps page order
    Ok(pool.install(|| pages.par_iter().map(f).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_setters() {
        let opts = ExtractOptions::new()
            .page_numbers([0, 2])
            .maxpages(1)
            .max_form_depth(4)
            .include_raw_images(false)
            .threads(0);
        assert_eq!(opts.page_numbers, Some(vec![0, 2]));
        assert_eq!(opts.maxpages, 1);
        assert_eq!(opts.max_form_depth, 4);
        assert!(!opts.include_raw_images);
        assert_eq!(opts.threads, 1);
    }

    #[test]
    fn defaults() {
        let opts = ExtractOptions::default();
        assert_eq!(opts.page_numbers, None);
        assert_eq!(opts.maxpages, 0);
        assert_eq!(opts.max_form_depth, 32);
        assert!(opts.include_raw_images);
    }

    #[test]
    fn not_pdf_is_an_error() {
        assert!(extract_text(b"hello world", None).is_err());
    }
}
