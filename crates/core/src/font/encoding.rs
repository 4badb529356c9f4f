//! Simple font encodings: code → glyph name → Unicode.
//!
//! Glyph names follow the Adobe Glyph List naming rules:
//! https://github.com/adobe-type-tools/agl-specification#2-the-mapping

use rustc_hash::FxHashMap;

use super::glyphlist::GLYPHS;
use super::latin_enc::{MAC_ROMAN, STANDARD, SYMBOL, WIN_ANSI};
use crate::error::{PdfError, Result};
use crate::model::objects::PDFObject;
use crate::utils::pdfdoc_char;

/// Look up a glyph name in the glyph list.
pub fn glyph_to_char(name: &str) -> Option<char> {
    GLYPHS
        .binary_search_by(|&(n, _)| n.as_bytes().cmp(name.as_bytes()))
        .ok()
        .map(|i| GLYPHS[i].1)
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|c| c.is_ascii_hexdigit())
}

fn decode_component(name: &str) -> Result<String> {
    let unknown = || PdfError::UnknownGlyph(name.to_string());

    // uniXXXX[XXXX...]: UTF-16 code units, surrogates rejected
    if let Some(hex) = name.strip_prefix("uni")
        && hex.len() >= 4
        && hex.len() % 4 == 0
        && is_hex(hex)
    {
        let mut out = String::with_capacity(hex.len() / 4);
        for chunk in hex.as_bytes().chunks(4) {
            let digits = std::str::from_utf8(chunk).map_err(|_| unknown())?;
            let cp = u32::from_str_radix(digits, 16).map_err(|_| unknown())?;
            out.push(char::from_u32(cp).ok_or_else(unknown)?);
        }
        return Ok(out);
    }

    // uXXXX[XX]: a single code point
    if let Some(hex) = name.strip_prefix('u')
        && (4..=6).contains(&hex.len())
        && is_hex(hex)
    {
        let cp = u32::from_str_radix(hex, 16).map_err(|_| unknown())?;
        return char::from_u32(cp).map(String::from).ok_or_else(unknown);
    }

    glyph_to_char(name).map(String::from).ok_or_else(unknown)
}

/// Convert a glyph name to its Unicode text.
///
/// Anything after the first `.` is dropped, then `_` separated components
/// are decoded one by one (`f_f_i` → "ffi").
///
/// # Errors
///
/// `PdfError::UnknownGlyph` when any component cannot be mapped.
pub fn name2unicode(name: &str) -> Result<String> {
    let base = name.split('.').next().unwrap_or_default();
    if base.is_empty() || base == "notdef" {
        return Err(PdfError::UnknownGlyph(name.to_string()));
    }
    base.split('_').map(decode_component).collect()
}

/// Base encodings a simple font can start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseEncoding {
    Standard,
    MacRoman,
    WinAnsi,
    PdfDoc,
    Symbol,
    ZapfDingbats,
}

impl BaseEncoding {
    /// Map an `/Encoding` or `/BaseEncoding` name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "StandardEncoding" => Some(Self::Standard),
            "MacRomanEncoding" => Some(Self::MacRoman),
            "WinAnsiEncoding" => Some(Self::WinAnsi),
            "PDFDocEncoding" => Some(Self::PdfDoc),
            "SymbolEncoding" => Some(Self::Symbol),
            "ZapfDingbatsEncoding" => Some(Self::ZapfDingbats),
            _ => None,
        }
    }

    /// The builtin encoding of a standard 14 font, if it has a special one.
    pub fn builtin_for(basefont: &str) -> Option<Self> {
        // subset fonts carry a "ABCDEF+" tag
        let name = basefont.split_once('+').map_or(basefont, |(_, rest)| rest);
        if name.starts_with("Symbol") {
            Some(Self::Symbol)
        } else if name.starts_with("ZapfDingbats") || name.starts_with("Dingbats") {
            Some(Self::ZapfDingbats)
        } else {
            None
        }
    }

    fn names(self) -> &'static [(u8, &'static str)] {
        match self {
            Self::Standard => STANDARD,
            Self::MacRoman => MAC_ROMAN,
            Self::WinAnsi => WIN_ANSI,
            Self::Symbol => SYMBOL,
            Self::PdfDoc | Self::ZapfDingbats => &[],
        }
    }
}

/// ITC Zapf Dingbats code to Unicode. The Unicode Dingbats block follows the
/// font's layout apart from the glyphs that were unified elsewhere.
fn zapf_dingbats_char(code: u8) -> Option<char> {
    let cp = match code {
        0x20 => 0x20,
        0x25 => 0x260E,
        0x2A => 0x261B,
        0x2B => 0x261E,
        0x48 => 0x2605,
        0x6C => 0x25CF,
        0x6E => 0x25A0,
        0x73 => 0x25B2,
        0x74 => 0x25BC,
        0x75 => 0x25C6,
        0x77 => 0x25D7,
        0x21..=0x7E => 0x2700 + (code as u32 - 0x20),
        0x80..=0x8D => 0x2768 + (code as u32 - 0x80),
        0xA8 => 0x2663,
        0xA9 => 0x2666,
        0xAA => 0x2665,
        0xAB => 0x2660,
        0xAC..=0xB5 => 0x2460 + (code as u32 - 0xAC),
        0xD5 => 0x2192,
        0xD6 => 0x2194,
        0xD7 => 0x2195,
        0xF0 => return None,
        0xA1..=0xFE => 0x2761 + (code as u32 - 0xA1),
        _ => return None,
    };
    char::from_u32(cp)
}

/// Entry in a Differences array
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffEntry {
    /// A code position
    Code(u8),
    /// A glyph name
    Name(String),
}

/// Read a `/Differences` array. Codes outside a byte and other junk are dropped.
pub fn parse_differences(items: &[PDFObject]) -> Vec<DiffEntry> {
    items
        .iter()
        .filter_map(|item| match item {
            PDFObject::Int(i) => u8::try_from(*i).ok().map(DiffEntry::Code),
            PDFObject::Name(n) => Some(DiffEntry::Name(n.clone())),
            _ => None,
        })
        .collect()
}

/// Standard PDF encoding databases
pub struct EncodingDB;

impl EncodingDB {
    /// Code → Unicode table for `base` with `differences` applied on top.
    ///
    /// A name in `differences` with no preceding code is ignored, as is a
    /// glyph name that maps to nothing.
    pub fn get_encoding(
        base: BaseEncoding,
        differences: Option<&[DiffEntry]>,
    ) -> FxHashMap<u8, String> {
        let mut encoding = FxHashMap::with_capacity_and_hasher(256, Default::default());
        match base {
            BaseEncoding::PdfDoc => {
                for code in 0..=u8::MAX {
                    if let Some(c) = pdfdoc_char(code) {
                        encoding.insert(code, c.to_string());
                    }
                }
            }
            BaseEncoding::ZapfDingbats => {
                for code in 0..=u8::MAX {
                    if let Some(c) = zapf_dingbats_char(code) {
                        encoding.insert(code, c.to_string());
                    }
                }
            }
            _ => {
                for &(code, glyph) in base.names() {
                    if let Ok(text) = name2unicode(glyph) {
                        encoding.insert(code, text);
                    }
                }
            }
        }

        let mut current: Option<u8> = None;
        for entry in differences.unwrap_or_default() {
            match entry {
                DiffEntry::Code(code) => current = Some(*code),
                DiffEntry::Name(glyph) => {
                    let Some(code) = current else { continue };
                    if let Ok(text) = name2unicode(glyph) {
                        encoding.insert(code, text);
                    }
                    current = code.checked_add(1);
                }
            }
        }
        encoding
    }
}
