//! PDF Page - page tree traversal and inherited page attributes.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use super::catalog::PDFDocument;
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject};
use crate::utils::{Rect, decode_text, normalize_rect};

/// Attributes a page takes from its ancestors when it lacks them.
pub const INHERITABLE: [&str; 4] = ["Resources", "MediaBox", "CropBox", "Rotate"];

/// US Letter, used when no MediaBox is found anywhere up the tree.
const DEFAULT_MEDIABOX: Rect = (0.0, 0.0, 612.0, 792.0);

/// A PDF page object.
#[derive(Debug, Clone)]
pub struct PDFPage {
    /// Page object ID; `None` for a page dictionary inlined in `/Kids`
    pub pageid: Option<u32>,
    /// Zero-based position in document order
    pub index: usize,
    /// The page's own dictionary, without inherited entries
    pub attrs: PDFDict,
    /// `Pages` nodes above this page, nearest first
    ancestors: Vec<Arc<PDFObject>>,
}

impl PDFPage {
    /// Look up `key`, walking up the tree for inheritable attributes.
    pub fn get(&self, doc: &PDFDocument, key: &str) -> Option<Arc<PDFObject>> {
        if let Some(v) = doc.get_resolved(&self.attrs, key) {
            return Some(v);
        }
        if !INHERITABLE.contains(&key) {
            return None;
        }
        self.ancestors
            .iter()
            .filter_map(|node| node.as_dict().ok())
            .find_map(|dict| doc.get_resolved(dict, key))
    }

    pub fn resources(&self, doc: &PDFDocument) -> PDFDict {
        self.get(doc, "Resources")
            .and_then(|r| r.as_dict().ok().cloned())
            .unwrap_or_default()
    }

    pub fn mediabox(&self, doc: &PDFDocument) -> Rect {
        self.get(doc, "MediaBox")
            .and_then(|b| parse_rect(doc, &b))
            .unwrap_or(DEFAULT_MEDIABOX)
    }

    /// Falls back to the MediaBox.
    pub fn cropbox(&self, doc: &PDFDocument) -> Rect {
        self.get(doc, "CropBox")
            .and_then(|b| parse_rect(doc, &b))
            .unwrap_or_else(|| self.mediabox(doc))
    }

    /// Rotation in degrees, normalized to 0, 90, 180 or 270.
    pub fn rotate(&self, doc: &PDFDocument) -> i64 {
        let r = self
            .get(doc, "Rotate")
            .and_then(|r| r.as_int().ok())
            .unwrap_or(0);
        (r.rem_euclid(360) / 90) * 90
    }

    /// Decoded content streams in order. Unreadable parts are skipped.
    pub fn contents(&self, doc: &PDFDocument) -> Vec<Bytes> {
        let Some(contents) = doc.get_resolved(&self.attrs, "Contents") else {
            return Vec::new();
        };
        let streams: Vec<Arc<PDFObject>> = match contents.as_ref() {
            PDFObject::Array(items) => items
                .iter()
                .filter_map(|item| doc.resolve_deep(item).ok())
                .collect(),
            _ => vec![contents],
        };
        streams
            .iter()
            .filter_map(|obj| match obj.as_stream() {
                Ok(stream) => match doc.decode_stream(stream) {
                    Ok(decoded) if decoded.encoded_with.is_none() => Some(decoded.data),
                    Ok(decoded) => {
                        warn!(page = self.index, filter = ?decoded.encoded_with, "content stream left encoded");
                        None
                    }
                    Err(e) => {
                        warn!(page = self.index, error = %e, "skipping unreadable content stream");
                        None
                    }
                },
                Err(_) => None,
            })
            .collect()
    }

    /// All content streams joined into one buffer.
    ///
    /// Streams are separated by a newline, so an operator split across
    /// two streams does not fuse into one token.
    pub fn content_data(&self, doc: &PDFDocument) -> Bytes {
        let parts = self.contents(doc);
        if parts.len() == 1 {
            return parts.into_iter().next().unwrap_or_default();
        }
        let mut out = BytesMut::new();
        for part in parts {
            out.extend_from_slice(&part);
            out.extend_from_slice(b"\n");
        }
        out.freeze()
    }

    /// The page's `/Annots`, with references followed.
    pub fn annotations(&self, doc: &PDFDocument) -> Vec<Annotation> {
        let Some(annots) = doc.get_resolved(&self.attrs, "Annots") else {
            return Vec::new();
        };
        let Ok(items) = annots.as_array() else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| doc.resolve_deep(item).ok())
            .filter_map(|obj| obj.as_dict().ok().map(|d| Annotation::from_dict(doc, d)))
            .collect()
    }
}

fn parse_rect(doc: &PDFDocument, obj: &PDFObject) -> Option<Rect> {
    let arr = obj.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let mut v = [0.0f64; 4];
    for (slot, item) in v.iter_mut().zip(arr) {
        *slot = doc.resolve_deep(item).ok()?.as_num().ok()?;
    }
    Some(normalize_rect((v[0], v[1], v[2], v[3])))
}

/// A page annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub subtype: String,
    pub rect: Option<Rect>,
    /// `/Contents`, decoded
    pub contents: Option<String>,
    /// `/A /URI` for link annotations
    pub uri: Option<String>,
    /// The annotation dictionary itself
    pub attrs: PDFDict,
}

impl Annotation {
    fn from_dict(doc: &PDFDocument, d: &PDFDict) -> Self {
        let text = |key: &str, dict: &PDFDict| {
            doc.get_resolved(dict, key)
                .and_then(|v| v.as_string().ok().map(decode_text))
        };
        let uri = doc
            .get_resolved(d, "A")
            .and_then(|a| a.as_dict().ok().and_then(|a| text("URI", a)));
        Self {
            subtype: doc
                .get_resolved(d, "Subtype")
                .and_then(|s| s.as_name().ok().map(str::to_string))
                .unwrap_or_default(),
            rect: doc.get_resolved(d, "Rect").and_then(|r| parse_rect(doc, &r)),
            contents: text("Contents", d),
            uri,
            attrs: d.clone(),
        }
    }
}

/// A `Pages` node being walked.
struct Frame {
    objid: Option<u32>,
    node: Arc<PDFObject>,
    next: usize,
}

/// Lazy, order-preserving page iterator. One-shot; call
/// [`PDFDocument::pages`] again to restart.
pub struct PageIterator<'a> {
    doc: &'a PDFDocument,
    stack: Vec<Frame>,
    index: usize,
    /// Used when the catalog has no usable page tree.
    fallback: Option<std::vec::IntoIter<u32>>,
}

impl<'a> PageIterator<'a> {
    fn new(doc: &'a PDFDocument) -> Self {
        let mut it = Self {
            doc,
            stack: Vec::new(),
            index: 0,
            fallback: None,
        };
        let root = doc.catalog().get("Pages");
        let objid = root.and_then(|r| r.as_objref().ok()).map(|r| r.objid);
        match root.and_then(|r| doc.resolve_deep(r).ok()) {
            Some(node) if node.as_dict().is_ok() => it.stack.push(Frame {
                objid,
                node,
                next: 0,
            }),
            _ => {
                warn!("catalog has no page tree, scanning objects for pages");
                it.fallback = Some(doc.xref().objids().into_iter());
            }
        }
        it
    }

    fn on_path(&self, objid: u32) -> bool {
        self.stack.iter().any(|f| f.objid == Some(objid))
    }

    fn make_page(&mut self, pageid: Option<u32>, attrs: PDFDict) -> PDFPage {
        let ancestors = self.stack.iter().rev().map(|f| Arc::clone(&f.node)).collect();
        let page = PDFPage {
            pageid,
            index: self.index,
            attrs,
            ancestors,
        };
        self.index += 1;
        page
    }

    fn next_fallback(&mut self) -> Option<PDFPage> {
        loop {
            let objid = self.fallback.as_mut()?.next()?;
            let Ok(obj) = self.doc.getobj_shared(objid) else {
                continue;
            };
            if let Ok(d) = obj.as_dict()
                && matches!(d.get("Type"), Some(PDFObject::Name(t)) if t == "Page")
            {
                let attrs = d.clone();
                return Some(self.make_page(Some(objid), attrs));
            }
        }
    }
}

impl Iterator for PageIterator<'_> {
    type Item = PDFPage;

    fn next(&mut self) -> Option<PDFPage> {
        if self.fallback.is_some() {
            return self.next_fallback();
        }
        loop {
            let frame = self.stack.last_mut()?;
            let Some(kid) = frame
                .node
                .get("Kids")
                .and_then(|k| k.as_array().ok())
                .and_then(|kids| kids.get(frame.next))
                .cloned()
            else {
                self.stack.pop();
                continue;
            };
            frame.next += 1;

            let kid_id = kid.as_objref().ok().map(|r| r.objid);
            if let Some(id) = kid_id
                && self.on_path(id)
            {
                warn!(objid = id, "cycle in page tree");
                continue;
            }
            let Ok(node) = self.doc.resolve_deep(&kid) else {
                continue;
            };
            let Ok(dict) = node.as_dict() else {
                debug!(objid = ?kid_id, "page tree kid is not a dictionary");
                continue;
            };
            let is_pages = match dict.get("Type") {
                Some(PDFObject::Name(t)) if t == "Pages" => true,
                Some(PDFObject::Name(t)) if t == "Page" => false,
                _ => dict.contains_key("Kids"),
            };
            if is_pages {
                self.stack.push(Frame {
                    objid: kid_id,
                    node,
                    next: 0,
                });
            } else {
                let attrs = dict.clone();
                return Some(self.make_page(kid_id, attrs));
            }
        }
    }
}

impl PDFDocument {
    /// Pages in document order.
    pub fn pages(&self) -> PageIterator<'_> {
        PageIterator::new(self)
    }

    pub fn page_count(&self) -> usize {
        self.pages().count()
    }

    /// Page at zero-based `index`.
    pub fn page(&self, index: usize) -> Result<PDFPage> {
        self.pages()
            .nth(index)
            .ok_or_else(|| PdfError::KeyError(format!("page index {index}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_pdf(objects: &[&str]) -> Vec<u8> {
        let mut out = b"%PDF-1.7\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }
        let xref = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for off in offsets {
            out.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!("trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n", objects.len() + 1)
                .as_bytes(),
        );
        out
    }

    #[test]
    fn nested_tree_keeps_order_and_inherits() {
        let data = build_pdf(&[
            "<< /Type /Catalog /Pages 2 0 R >>",
            "<< /Type /Pages /Kids [3 0 R 4 0 R] /Count 3 /Resources << /Font << >> >> /MediaBox [0 0 200 100] /Rotate -90 >>",
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 50 50] >>",
            "<< /Kids [5 0 R] /Parent 2 0 R /CropBox [10 10 20 20] >>",
            "<< /Type /Page /Parent 4 0 R /Resources << /XObject << >> >> >>",
        ]);
        let doc = PDFDocument::new(&data).unwrap();
        let pages: Vec<PDFPage> = doc.pages().collect();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].pageid, Some(3));
        assert_eq!(pages[1].pageid, Some(5));
        assert_eq!(pages[1].index, 1);

        assert!(pages[0].resources(&doc).contains_key("Font"));
        assert!(pages[1].resources(&doc).contains_key("XObject"));
        assert_eq!(pages[0].mediabox(&doc), (0.0, 0.0, 50.0, 50.0));
        assert_eq!(pages[1].mediabox(&doc), (0.0, 0.0, 200.0, 100.0));
        assert_eq!(pages[1].cropbox(&doc), (10.0, 10.0, 20.0, 20.0));
        assert_eq!(pages[0].cropbox(&doc), (0.0, 0.0, 50.0, 50.0));
        assert_eq!(pages[1].rotate(&doc), 270);
        // inheritance is computed, not merged into the page
        assert!(!pages[0].attrs.contains_key("Resources"));
        // non-inheritable keys stay local
        assert!(pages[1].get(&doc, "Count").is_none());
    }

    #[test]
    fn cyclic_kids_are_skipped() {
        let data = build_pdf(&[
            "<< /Type /Catalog /Pages 2 0 R >>",
            "<< /Type /Pages /Kids [3 0 R 2 0 R 4 0 R] /Count 2 >>",
            "<< /Type /Page >>",
            "<< /Type /Pages /Kids [2 0 R 5 0 R] >>",
            "<< /Type /Page >>",
        ]);
        let doc = PDFDocument::new(&data).unwrap();
        let ids: Vec<Option<u32>> = doc.pages().map(|p| p.pageid).collect();
        assert_eq!(ids, vec![Some(3), Some(5)]);
    }

    #[test]
    fn iterator_restarts() {
        let data = build_pdf(&[
            "<< /Type /Catalog /Pages 2 0 R >>",
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>",
            "<< /Type /Page >>",
        ]);
        let doc = PDFDocument::new(&data).unwrap();
        let mut it = doc.pages();
        assert!(it.next().is_some());
        assert!(it.next().is_none());
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.page(0).unwrap().mediabox(&doc), DEFAULT_MEDIABOX);
        assert!(doc.page(1).is_err());
    }

    #[test]
    fn annotations_are_collected() {
        let data = build_pdf(&[
            "<< /Type /Catalog /Pages 2 0 R >>",
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>",
            "<< /Type /Page /Annots [4 0 R << /Subtype /Text /Contents (note) >>] >>",
            "<< /Subtype /Link /Rect [100 700 10 690] /A << /S /URI /URI (https://example.com) >> >>",
        ]);
        let doc = PDFDocument::new(&data).unwrap();
        let annots = doc.page(0).unwrap().annotations(&doc);
        assert_eq!(annots.len(), 2);
        assert_eq!(annots[0].subtype, "Link");
        assert_eq!(annots[0].rect, Some((10.0, 690.0, 100.0, 700.0)));
        assert_eq!(annots[0].uri.as_deref(), Some("https://example.com"));
        assert_eq!(annots[1].contents.as_deref(), Some("note"));
    }
}
