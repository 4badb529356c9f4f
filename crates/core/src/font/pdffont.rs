//! Fonts as seen by text extraction: code splitting, Unicode mapping and
//! glyph widths.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::cmap::{CMap, ToUnicodeMap};
use super::encoding::{BaseEncoding, DiffEntry, EncodingDB, parse_differences};
use crate::document::PDFDocument;
use crate::model::objects::{PDFDict, PDFObject, num_or};

/// Marker emitted for codes with no Unicode mapping.
pub const REPLACEMENT: char = '\u{FFFD}';

/// Width assumed for glyphs of a simple font that declares no widths at all,
/// in thousandths of text space.
const FALLBACK_WIDTH: f64 = 500.0;

/// How a font turns bytes into character codes.
#[derive(Debug, Clone, PartialEq)]
pub enum FontKind {
    /// One byte per code, mapped through an encoding table.
    Simple { encoding: FxHashMap<u8, String> },
    /// Type0: codes and CIDs from a CMap.
    Composite { cmap: CMap },
}

/// A font ready for decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct PDFFont {
    /// `/BaseFont`
    pub basefont: Option<String>,
    /// `/Subtype`
    pub subtype: Option<String>,
    kind: FontKind,
    tounicode: Option<ToUnicodeMap>,
    /// Indexed by code for simple fonts and by CID for composite ones.
    widths: FxHashMap<u32, f64>,
    default_width: f64,
}

impl PDFFont {
    /// A simple font with the given base encoding and differences.
    pub fn simple(base: BaseEncoding, differences: Option<&[DiffEntry]>) -> Self {
        Self {
            basefont: None,
            subtype: Some("Type1".into()),
            kind: FontKind::Simple {
                encoding: EncodingDB::get_encoding(base, differences),
            },
            tounicode: None,
            widths: FxHashMap::default(),
            default_width: FALLBACK_WIDTH,
        }
    }

    /// A composite font over `cmap`.
    pub fn composite(cmap: CMap) -> Self {
        Self {
            basefont: None,
            subtype: Some("Type0".into()),
            kind: FontKind::Composite { cmap },
            tounicode: None,
            widths: FxHashMap::default(),
            default_width: 1000.0,
        }
    }

    pub fn with_tounicode(mut self, map: ToUnicodeMap) -> Self {
        self.tounicode = (!map.is_empty()).then_some(map);
        self
    }

    /// Build a font from its dictionary. Broken parts degrade to defaults:
    /// a font is always produced.
    pub fn from_dict(doc: &PDFDocument, spec: &PDFDict) -> Self {
        let name = |key: &str| {
            doc.get_resolved(spec, key)
                .and_then(|v| v.as_name().ok().map(str::to_string))
        };
        let basefont = name("BaseFont");
        let subtype = name("Subtype");

        let mut font = if subtype.as_deref() == Some("Type0") {
            let mut font = Self::composite(composite_cmap(doc, spec));
            if let Some(descendant) = descendant_font(doc, spec) {
                font.default_width = num_or(descendant.get("DW"), 1000.0);
                if let Some(w) = doc.get_resolved(&descendant, "W")
                    && let Ok(items) = w.as_array()
                {
                    font.widths = cid_widths(doc, items);
                }
            }
            font
        } else {
            let (base, differences) = simple_encoding(doc, spec, basefont.as_deref());
            let mut font = Self::simple(base, Some(&differences));
            let (widths, declared) = simple_widths(doc, spec);
            font.widths = widths;
            font.default_width = if declared {
                doc.get_resolved(spec, "FontDescriptor")
                    .and_then(|d| d.as_dict().ok().map(|d| num_or(d.get("MissingWidth"), 0.0)))
                    .unwrap_or(0.0)
            } else {
                FALLBACK_WIDTH
            };
            font
        };
        font.basefont = basefont;
        font.subtype = subtype;

        match doc.get_resolved(spec, "ToUnicode").as_deref() {
            Some(PDFObject::Stream(stream)) => match doc.decode_stream(stream) {
                Ok(decoded) => font = font.with_tounicode(ToUnicodeMap::parse(&decoded.data)),
                Err(e) => warn!(error = %e, "ToUnicode stream unreadable"),
            },
            Some(PDFObject::Name(name)) if name.contains("Identity") => {
                font = font.with_tounicode(ToUnicodeMap::identity());
            }
            Some(other) => debug!(got = other.type_name(), "unusable ToUnicode ignored"),
            None if font.is_multibyte() && unicode_ordering(doc, spec) => {
                // Adobe-UCS CIDs are code points already
                font = font.with_tounicode(ToUnicodeMap::identity());
            }
            None => {}
        }
        font
    }

    pub fn kind(&self) -> &FontKind {
        &self.kind
    }

    pub fn is_multibyte(&self) -> bool {
        matches!(self.kind, FontKind::Composite { .. })
    }

    pub fn is_vertical(&self) -> bool {
        match &self.kind {
            FontKind::Composite { cmap } => cmap.is_vertical(),
            FontKind::Simple { .. } => false,
        }
    }

    /// Split `data` into `(code, cid)` pairs. Simple fonts use each byte as both.
    pub fn codes(&self, data: &[u8]) -> Vec<(u32, u32)> {
        match &self.kind {
            FontKind::Simple { .. } => data.iter().map(|&b| (b as u32, b as u32)).collect(),
            FontKind::Composite { cmap } => cmap.decode(data),
        }
    }

    /// Unicode text of one code. `ToUnicode` wins over the encoding.
    pub fn to_unichr(&self, code: u32) -> Option<String> {
        if let Some(text) = self.tounicode.as_ref().and_then(|m| m.get(code)) {
            return Some(text);
        }
        match &self.kind {
            FontKind::Simple { encoding } => {
                u8::try_from(code).ok().and_then(|b| encoding.get(&b).cloned())
            }
            FontKind::Composite { .. } => None,
        }
    }

    /// Decode a string operand into `(code, text)` pairs, with
    /// [`REPLACEMENT`] standing in for unmapped codes.
    pub fn decode(&self, data: &[u8]) -> Vec<(u32, String)> {
        self.codes(data)
            .into_iter()
            .map(|(code, _)| {
                let text = self
                    .to_unichr(code)
                    .unwrap_or_else(|| REPLACEMENT.to_string());
                (code, text)
            })
            .collect()
    }

    /// Decode a string operand to text.
    pub fn decode_text(&self, data: &[u8]) -> String {
        self.decode(data).into_iter().map(|(_, t)| t).collect()
    }

    /// Horizontal advance of a glyph in text space units (1/1000 scaled).
    pub fn char_width(&self, cid: u32) -> f64 {
        self.widths.get(&cid).copied().unwrap_or(self.default_width) / 1000.0
    }
}

fn descendant_font(doc: &PDFDocument, spec: &PDFDict) -> Option<PDFDict> {
    let fonts = doc.get_resolved(spec, "DescendantFonts")?;
    let first = fonts.as_array().ok()?.first()?;
    let dict = doc.resolve_deep(first).ok()?;
    dict.as_dict().ok().cloned()
}

/// True when the descendant's `/CIDSystemInfo` is `Adobe-UCS`.
fn unicode_ordering(doc: &PDFDocument, spec: &PDFDict) -> bool {
    let Some(descendant) = descendant_font(doc, spec) else {
        return false;
    };
    let Some(info) = doc.get_resolved(&descendant, "CIDSystemInfo") else {
        return false;
    };
    let Ok(info) = info.as_dict() else {
        return false;
    };
    let is = |key: &str, want: &[u8]| {
        doc.get_resolved(info, key)
            .is_some_and(|v| v.as_string().is_ok_and(|s| s == want))
    };
    is("Registry", b"Adobe") && is("Ordering", b"UCS")
}

fn composite_cmap(doc: &PDFDocument, spec: &PDFDict) -> CMap {
    match doc.get_resolved(spec, "Encoding").as_deref() {
        Some(PDFObject::Name(name)) => CMap::predefined(name).unwrap_or_else(|e| {
            warn!(cmap = %name, error = %e, "predefined CMap unavailable, using Identity-H");
            CMap::Identity { vertical: false }
        }),
        Some(PDFObject::Stream(stream)) => match doc.decode_stream(stream) {
            Ok(decoded) => CMap::parse(&decoded.data),
            Err(e) => {
                warn!(error = %e, "embedded CMap unreadable, using Identity-H");
                CMap::Identity { vertical: false }
            }
        },
        _ => CMap::Identity { vertical: false },
    }
}

fn simple_encoding(
    doc: &PDFDocument,
    spec: &PDFDict,
    basefont: Option<&str>,
) -> (BaseEncoding, Vec<DiffEntry>) {
    let builtin = basefont
        .and_then(BaseEncoding::builtin_for)
        .unwrap_or(BaseEncoding::Standard);
    match doc.get_resolved(spec, "Encoding").as_deref() {
        Some(PDFObject::Name(name)) => (BaseEncoding::from_name(name).unwrap_or(builtin), Vec::new()),
        Some(PDFObject::Dict(dict)) => {
            let base = doc
                .get_resolved(dict, "BaseEncoding")
                .and_then(|b| b.as_name().ok().and_then(BaseEncoding::from_name))
                .unwrap_or(builtin);
            let differences = doc
                .get_resolved(dict, "Differences")
                .and_then(|d| d.as_array().ok().map(|items| parse_differences(items)))
                .unwrap_or_default();
            (base, differences)
        }
        _ => (builtin, Vec::new()),
    }
}

/// `/Widths` from `/FirstChar`. The flag tells whether any were declared.
fn simple_widths(doc: &PDFDocument, spec: &PDFDict) -> (FxHashMap<u32, f64>, bool) {
    let mut widths = FxHashMap::default();
    let Some(items) = doc.get_resolved(spec, "Widths") else {
        return (widths, false);
    };
    let Ok(items) = items.as_array() else {
        return (widths, false);
    };
    let first = doc
        .get_resolved(spec, "FirstChar")
        .and_then(|f| f.as_int().ok())
        .unwrap_or(0);
    let Ok(first) = u32::try_from(first) else {
        warn!(first, "/FirstChar out of range, widths ignored");
        return (widths, true);
    };
    for (i, w) in items.iter().enumerate() {
        let Some(code) = u32::try_from(i).ok().and_then(|i| first.checked_add(i)) else {
            break;
        };
        if let Some(w) = doc.resolve_deep(w).ok().and_then(|w| w.as_num().ok()) {
            widths.insert(code, w);
        }
    }
    (widths, true)
}

/// CIDFont `/W`: `c [w1 w2 ...]` runs and `c_first c_last w` ranges.
fn cid_widths(doc: &PDFDocument, items: &[PDFObject]) -> FxHashMap<u32, f64> {
    let mut widths = FxHashMap::default();
    let mut pending: Vec<f64> = Vec::new();
    for item in items {
        let Ok(item) = doc.resolve_deep(item) else { continue };
        match item.as_ref() {
            PDFObject::Array(run) => {
                if let Some(start) = pending.pop() {
                    let start = start.max(0.0) as u32;
                    for (i, w) in run.iter().enumerate() {
                        let Some(cid) = u32::try_from(i).ok().and_then(|i| start.checked_add(i))
                        else {
                            break;
                        };
                        if let Ok(w) = w.as_num() {
                            widths.insert(cid, w);
                        }
                    }
                }
                pending.clear();
            }
            other => {
                let Ok(n) = other.as_num() else { continue };
                pending.push(n);
                if let [first, last, w] = pending[..] {
                    let (first, last) = (first.max(0.0) as u32, last.max(0.0) as u32);
                    // cap absurd ranges from broken producers
                    for cid in first..=last.min(first.saturating_add(0xFFFF)) {
                        widths.insert(cid, w);
                    }
                    pending.clear();
                }
            }
        }
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_font_decodes_and_replaces() {
        let font = PDFFont::simple(BaseEncoding::WinAnsi, None);
        assert_eq!(font.decode_text(b"Hello"), "Hello");
        assert_eq!(font.decode_text(&[0x48, 0x81]), "H\u{FFFD}");
    }

    #[test]
    fn composite_font_uses_tounicode() {
        let map = ToUnicodeMap::parse(b"1 beginbfchar <0041> <0041> endbfchar");
        let font = PDFFont::composite(CMap::Identity { vertical: false }).with_tounicode(map);
        assert!(font.is_multibyte());
        let decoded = font.decode(&[0x00, 0x41, 0x00, 0x42]);
        assert_eq!(decoded[0], (0x41, "A".to_string()));
        assert_eq!(decoded[1], (0x42, "\u{FFFD}".to_string()));
    }

    #[test]
    fn tounicode_overrides_encoding() {
        let map = ToUnicodeMap::parse(b"1 beginbfchar <41> <0058> endbfchar");
        let font = PDFFont::simple(BaseEncoding::Standard, None).with_tounicode(map);
        assert_eq!(font.decode_text(b"AB"), "XB");
    }

    #[test]
    fn widths_default_per_kind() {
        assert_eq!(PDFFont::simple(BaseEncoding::Standard, None).char_width(65), 0.5);
        assert_eq!(PDFFont::composite(CMap::Identity { vertical: false }).char_width(7), 1.0);
    }
}
