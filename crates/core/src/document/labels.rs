//! Page labels from the catalog's `/PageLabels` number tree.

use rustc_hash::FxHashSet;

use super::catalog::PDFDocument;
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFObject, int_or};
use crate::utils::{decode_text, format_int_alpha, format_int_roman};

/// Numbering style of a label range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    Decimal,
    UpperRoman,
    LowerRoman,
    UpperAlpha,
    LowerAlpha,
    /// Prefix only.
    None,
}

impl LabelStyle {
    fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("D") => Self::Decimal,
            Some("R") => Self::UpperRoman,
            Some("r") => Self::LowerRoman,
            Some("A") => Self::UpperAlpha,
            Some("a") => Self::LowerAlpha,
            _ => Self::None,
        }
    }

    fn format(self, value: u32) -> String {
        match self {
            Self::Decimal => value.to_string(),
            Self::UpperRoman => format_int_roman(value).to_uppercase(),
            Self::LowerRoman => format_int_roman(value),
            Self::UpperAlpha => format_int_alpha(value).to_uppercase(),
            Self::LowerAlpha => format_int_alpha(value),
            Self::None => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LabelRange {
    start: usize,
    style: LabelStyle,
    prefix: String,
    first: u32,
}

/// Label ranges, sorted by first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLabels {
    ranges: Vec<LabelRange>,
}

impl PageLabels {
    /// Label of the page at zero-based `index`.
    pub fn label(&self, index: usize) -> String {
        let pos = self.ranges.partition_point(|r| r.start <= index);
        let Some(range) = pos.checked_sub(1).map(|p| &self.ranges[p]) else {
            // pages before the first range are labelled plainly
            return (index + 1).to_string();
        };
        let value = range.first.saturating_add((index - range.start) as u32);
        format!("{}{}", range.prefix, range.style.format(value))
    }

    /// Labels of the first `count` pages.
    pub fn labels(&self, count: usize) -> impl Iterator<Item = String> + '_ {
        (0..count).map(|i| self.label(i))
    }
}

impl PDFDocument {
    /// Parse `/PageLabels`. Fails with `NoPageLabels` when there is none.
    pub fn page_labels(&self) -> Result<PageLabels> {
        let root = self
            .get_resolved(self.catalog(), "PageLabels")
            .ok_or(PdfError::NoPageLabels)?;
        let mut entries = Vec::new();
        let mut seen = FxHashSet::default();
        collect_numbers(self, &root, &mut entries, &mut seen, 0);
        if entries.is_empty() {
            return Err(PdfError::NoPageLabels);
        }
        let mut ranges: Vec<LabelRange> = entries
            .into_iter()
            .filter_map(|(start, value)| {
                let dict = value.as_dict().ok()?;
                Some(LabelRange {
                    start: usize::try_from(start).ok()?,
                    style: LabelStyle::from_name(dict.get("S").and_then(|s| s.as_name().ok())),
                    prefix: self
                        .get_resolved(dict, "P")
                        .and_then(|p| p.as_string().ok().map(decode_text))
                        .unwrap_or_default(),
                    first: int_or(dict.get("St"), 1).clamp(1, u32::MAX as i64) as u32,
                })
            })
            .collect();
        ranges.sort_by_key(|r| r.start);
        Ok(PageLabels { ranges })
    }
}

/// Walk a number tree, collecting `(key, value)` leaves with values resolved.
fn collect_numbers(
    doc: &PDFDocument,
    node: &PDFObject,
    out: &mut Vec<(i64, PDFObject)>,
    seen: &mut FxHashSet<u32>,
    depth: usize,
) {
    let Ok(dict) = node.as_dict() else { return };
    if depth > doc.options().max_ref_depth {
        return;
    }
    if let Some(nums) = doc.get_resolved(dict, "Nums")
        && let Ok(items) = nums.as_array()
    {
        for pair in items.chunks_exact(2) {
            if let (Ok(key), Ok(value)) = (pair[0].as_int(), doc.resolve_deep(&pair[1])) {
                out.push((key, value.as_ref().clone()));
            }
        }
    }
    if let Some(kids) = doc.get_resolved(dict, "Kids")
        && let Ok(kids) = kids.as_array()
    {
        for kid in kids {
            if let PDFObject::Ref(r) = kid
                && !seen.insert(r.objid)
            {
                continue;
            }
            if let Ok(kid) = doc.resolve_deep(kid) {
                collect_numbers(doc, &kid, out, seen, depth + 1);
            }
        }
    }
}
