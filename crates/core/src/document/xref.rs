//! Cross-reference data: classic `xref` tables, xref streams, the
//! `/Prev` revision chain and the brute-force object scan used when none
//! of them can be loaded.

use std::sync::LazyLock;

use bytes::Bytes;
use regex::bytes::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use super::objstm::ObjectStream;
use crate::codec::{decode, filter_chain};
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject, int_or};
use crate::parser::{Keyword, Lexer, PDFParser, Token};
use crate::utils::{nunpack, rfind_bytes};

static OBJ_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+(\d+)\s+obj\b").expect("object header pattern"));
static CATALOG_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Type\s*/Catalog\b").expect("catalog pattern"));
static OBJSTM_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Type\s*/ObjStm\b").expect("object stream pattern"));

/// Where an object lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XRefLocation {
    /// Free entry; never resolves to data.
    Free,
    /// Byte offset of `n g obj` in the file.
    Offset(usize),
    /// Index inside an object stream.
    Compressed { stream_objid: u32, index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XRefEntry {
    pub location: XRefLocation,
    pub genno: u32,
    /// 0 is the newest revision.
    pub revision: usize,
}

impl XRefEntry {
    pub const fn is_free(&self) -> bool {
        matches!(self.location, XRefLocation::Free)
    }
}

/// A single xref section with its trailer.
#[derive(Debug, Default)]
pub struct XRefSection {
    pub entries: FxHashMap<u32, (XRefLocation, u32)>,
    pub trailer: PDFDict,
}

/// Merged cross-reference table across every revision.
#[derive(Debug, Default)]
pub struct XRefTable {
    entries: FxHashMap<u32, XRefEntry>,
    /// Trailers, newest first.
    trailers: Vec<PDFDict>,
    fallback: bool,
}

impl XRefTable {
    pub fn get(&self, objid: u32) -> Option<&XRefEntry> {
        self.entries.get(&objid)
    }

    /// Object numbers with an in-use entry, ascending.
    pub fn objids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .entries
            .iter()
            .filter(|(_, e)| !e.is_free())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn revisions(&self) -> usize {
        self.trailers.len()
    }

    /// True when the table was synthesized by scanning for `n g obj`.
    pub const fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Trailer keys of every revision; a newer revision wins per key.
    pub fn trailer(&self) -> PDFDict {
        let mut merged = PDFDict::new();
        for trailer in &self.trailers {
            for (k, v) in trailer {
                if k == "Prev" || k == "XRefStm" {
                    continue;
                }
                merged.entry(k.clone()).or_insert_with(|| v.clone());
            }
        }
        merged
    }

    /// Merge an older section. Entries already present stay.
    fn merge(&mut self, section: XRefSection, revision: usize) {
        for (objid, (location, genno)) in section.entries {
            self.entries.entry(objid).or_insert(XRefEntry {
                location,
                genno,
                revision,
            });
        }
        self.trailers.push(section.trailer);
    }

    /// Merge the `/XRefStm` of a hybrid file into its own revision. Its
    /// entries replace free entries of the classic table.
    fn merge_hybrid(&mut self, section: XRefSection, revision: usize) {
        for (objid, (location, genno)) in section.entries {
            let entry = XRefEntry {
                location,
                genno,
                revision,
            };
            match self.entries.get(&objid) {
                Some(old) if old.revision == revision && old.is_free() => {
                    self.entries.insert(objid, entry);
                }
                Some(_) => {}
                None => {
                    self.entries.insert(objid, entry);
                }
            }
        }
    }
}

/// Offset recorded after the last `startxref` keyword.
pub fn find_startxref(data: &[u8]) -> Result<usize> {
    let kw = rfind_bytes(data, b"startxref").ok_or(PdfError::TrailerNotFound)?;
    let mut lexer = Lexer::new(data);
    lexer.set_pos(kw + b"startxref".len());
    match lexer.next_token() {
        Some(Ok((_, Token::Int(n)))) if n >= 0 && (n as usize) < data.len() => Ok(n as usize),
        _ => Err(PdfError::TrailerNotFound),
    }
}

/// Load the section at `pos` and every section reachable through `/Prev`
/// and `/XRefStm`.
pub fn load_xref_chain(data: &Bytes, startxref: usize) -> Result<XRefTable> {
    let mut table = XRefTable::default();
    let mut visited = FxHashSet::default();
    let mut next = Some(startxref);
    while let Some(pos) = next.take() {
        if !visited.insert(pos) {
            warn!(offset = pos, "loop in xref /Prev chain");
            break;
        }
        let section = match load_xref_section(data, pos) {
            Ok(section) => section,
            // the newest section must load, older ones are best effort
            Err(e) if table.revisions() == 0 => return Err(e),
            Err(e) => {
                warn!(offset = pos, error = %e, "unreadable older xref section");
                break;
            }
        };
        let revision = table.revisions();
        let hybrid = section
            .trailer
            .get("XRefStm")
            .and_then(|p| p.as_int().ok())
            .map(|p| p as usize);
        next = section
            .trailer
            .get("Prev")
            .and_then(|p| p.as_int().ok())
            .filter(|&p| p >= 0)
            .map(|p| p as usize);
        debug!(revision, offset = pos, entries = section.entries.len(), "loaded xref section");
        table.merge(section, revision);

        if let Some(stm) = hybrid
            && visited.insert(stm)
        {
            match parse_xref_stream(data, stm) {
                Ok(section) => table.merge_hybrid(section, revision),
                Err(e) => warn!(offset = stm, error = %e, "unreadable /XRefStm"),
            }
        }
    }
    Ok(table)
}

/// Classic table or xref stream, whichever sits at `pos`.
pub fn load_xref_section(data: &Bytes, pos: usize) -> Result<XRefSection> {
    let mut lexer = Lexer::new(data);
    lexer.set_pos(pos);
    lexer.skip_whitespace();
    if data[lexer.tell()..].starts_with(b"xref") {
        parse_xref_table(data, lexer.tell())
    } else {
        parse_xref_stream(data, pos)
    }
}

/// Parse `xref` subsections followed by `trailer << ... >>`.
pub fn parse_xref_table(data: &[u8], pos: usize) -> Result<XRefSection> {
    let malformed = |msg: &str| PdfError::MalformedStructure(format!("xref table at {pos}: {msg}"));
    let mut lexer = Lexer::new(data);
    lexer.set_pos(pos + b"xref".len());
    let mut section = XRefSection::default();

    loop {
        let start = match lexer.next_token().transpose()? {
            Some((_, Token::Keyword(Keyword::Trailer))) => break,
            Some((_, Token::Int(n))) if n >= 0 => n as u32,
            _ => return Err(malformed("expected subsection header or trailer")),
        };
        let count = match lexer.next_token().transpose()? {
            Some((_, Token::Int(n))) if n >= 0 => n as u32,
            _ => return Err(malformed("expected subsection count")),
        };
        let mut base = start;
        for i in 0..count {
            let (offset, genno, marker) = match (
                lexer.next_token().transpose()?,
                lexer.next_token().transpose()?,
                lexer.next_token().transpose()?,
            ) {
                (Some((_, Token::Int(o))), Some((_, Token::Int(g))), Some((_, Token::Keyword(kw)))) => {
                    (o, g, kw)
                }
                _ => return Err(malformed("bad entry")),
            };
            let in_use = match marker.as_bytes() {
                b"n" => true,
                b"f" => false,
                _ => return Err(malformed("entry marker is neither n nor f")),
            };
            // A subsection numbered from 1 that still lists the object 0 free entry.
            if i == 0 && base > 0 && !in_use && offset == 0 && genno == 65535 {
                base -= 1;
            }
            let location = if in_use && offset > 0 {
                XRefLocation::Offset(offset as usize)
            } else {
                XRefLocation::Free
            };
            section
                .entries
                .insert(base + i, (location, genno.clamp(0, u32::MAX as i64) as u32));
        }
    }

    let mut parser = PDFParser::new(data);
    parser.set_pos(lexer.tell());
    section.trailer = match parser.parse_object()? {
        PDFObject::Dict(d) => d,
        other => {
            return Err(PdfError::TypeError {
                expected: "trailer dict",
                got: other.type_name(),
            });
        }
    };
    Ok(section)
}

/// Parse a `/Type /XRef` stream object at `pos`.
pub fn parse_xref_stream(data: &Bytes, pos: usize) -> Result<XRefSection> {
    let mut parser = PDFParser::new_shared(data);
    parser.set_pos(pos);
    let (_, _, obj) = parser.parse_indirect_object()?;
    let PDFObject::Stream(stream) = obj else {
        return Err(PdfError::MalformedStructure(format!(
            "no xref stream at {pos}"
        )));
    };

    let widths: Vec<usize> = stream
        .get("W")
        .and_then(|w| w.as_array().ok())
        .map(|w| w.iter().map(|v| int_or(Some(v), 0).max(0) as usize).collect())
        .unwrap_or_default();
    let &[w0, w1, w2] = widths.as_slice() else {
        return Err(PdfError::MalformedStructure(format!(
            "xref stream at {pos}: /W must have three entries"
        )));
    };
    let size = int_or(stream.get("Size"), 0).max(0) as u32;
    let index: Vec<(u32, u32)> = match stream.get("Index").and_then(|i| i.as_array().ok()) {
        Some(arr) => arr
            .chunks_exact(2)
            .map(|p| (int_or(Some(&p[0]), 0).max(0) as u32, int_or(Some(&p[1]), 0).max(0) as u32))
            .collect(),
        None => vec![(0, size)],
    };

    let chain = filter_chain(stream.get("Filter"), stream.get("DecodeParms"))?;
    let decoded = decode(stream.rawdata_bytes(), &chain)?;
    if let Some(f) = decoded.encoded_with {
        return Err(PdfError::UnsupportedFilter(f.name().to_string()));
    }
    let body = decoded.data;

    let entry_size = w0 + w1 + w2;
    let mut section = XRefSection::default();
    if entry_size > 0 {
        let mut rows = body.chunks_exact(entry_size);
        'outer: for (start, count) in index {
            for i in 0..count {
                let Some(row) = rows.next() else {
                    break 'outer;
                };
                // a zero-width type field means type 1
                let kind = if w0 == 0 { 1 } else { nunpack(&row[..w0], 1) };
                let f1 = nunpack(&row[w0..w0 + w1], 0);
                let f2 = nunpack(&row[w0 + w1..], 0);
                let entry = match kind {
                    0 => (XRefLocation::Free, f2 as u32),
                    1 => (XRefLocation::Offset(f1 as usize), f2 as u32),
                    2 => (
                        XRefLocation::Compressed {
                            stream_objid: f1 as u32,
                            index: f2 as usize,
                        },
                        0,
                    ),
                    _ => continue,
                };
                section.entries.insert(start.saturating_add(i), entry);
            }
        }
    }

    section.trailer = xref_stream_trailer(&stream.attrs);
    Ok(section)
}

fn xref_stream_trailer(attrs: &PDFDict) -> PDFDict {
    attrs
        .iter()
        .filter(|(k, _)| !matches!(k.as_str(), "Length" | "Filter" | "DecodeParms" | "W" | "Index"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Every `n g obj` header in the buffer, mapped to `(offset, genno)`.
/// When an object number appears more than once the last one wins.
pub fn scan_object_headers(data: &[u8]) -> FxHashMap<u32, (usize, u32)> {
    let mut found = FxHashMap::default();
    for cap in OBJ_HEADER.captures_iter(data) {
        let (Some(whole), Some(id), Some(gen_)) = (cap.get(0), cap.get(1), cap.get(2)) else {
            continue;
        };
        // the match must start a token
        if whole.start() > 0 && data[whole.start() - 1].is_ascii_digit() {
            continue;
        }
        let (Some(objid), Some(genno)) = (parse_u32(id.as_bytes()), parse_u32(gen_.as_bytes())) else {
            continue;
        };
        found.insert(objid, (whole.start(), genno));
    }
    found
}

/// Objects packed in the `/Type /ObjStm` streams among `headers`, mapped
/// to `(stream objid, index)`. Streams that fail to decode are skipped; a
/// later stream in the file wins over an earlier one.
pub fn scan_object_streams(
    data: &Bytes,
    headers: &FxHashMap<u32, (usize, u32)>,
) -> FxHashMap<u32, (u32, usize)> {
    let mut by_offset: Vec<(usize, u32)> =
        headers.iter().map(|(id, (off, _))| (*off, *id)).collect();
    by_offset.sort_unstable();

    let mut streams: Vec<(usize, u32)> = Vec::new();
    for hit in OBJSTM_TYPE.find_iter(data) {
        let owner = by_offset.partition_point(|(off, _)| *off < hit.start());
        if let Some(&header) = owner.checked_sub(1).and_then(|i| by_offset.get(i))
            && streams.last() != Some(&header)
        {
            streams.push(header);
        }
    }

    let mut found = FxHashMap::default();
    for (offset, stream_objid) in streams {
        let mut parser = PDFParser::new_shared(data);
        parser.set_pos(offset);
        let stm = match parser.parse_indirect_object() {
            Ok((_, _, PDFObject::Stream(s))) if s.type_name() == Some("ObjStm") => {
                filter_chain(s.get("Filter"), s.get("DecodeParms"))
                    .and_then(|chain| decode(s.rawdata_bytes(), &chain))
                    .and_then(|decoded| ObjectStream::parse(stream_objid, &s, decoded.data))
            }
            _ => continue,
        };
        match stm {
            Ok(stm) => {
                for (index, objid) in stm.objids().enumerate() {
                    found.insert(objid, (stream_objid, index));
                }
            }
            Err(e) => debug!(stream_objid, error = %e, "object stream skipped during scan"),
        }
    }
    found
}

fn parse_u32(digits: &[u8]) -> Option<u32> {
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Rebuild a table from a raw scan of the buffer.
///
/// The trailer is the last `trailer` dictionary, else the last xref
/// stream's dictionary, else a synthesized one pointing at the object that
/// holds `/Type /Catalog`.
pub fn rebuild_xref(data: &Bytes) -> Result<XRefTable> {
    let headers = scan_object_headers(data);
    if headers.is_empty() {
        return Err(PdfError::NotPdf);
    }
    warn!(objects = headers.len(), "rebuilding xref by scanning for objects");

    let mut section = XRefSection::default();
    for (&objid, &(offset, genno)) in &headers {
        section.entries.insert(objid, (XRefLocation::Offset(offset), genno));
    }
    for (objid, (stream_objid, index)) in scan_object_streams(data, &headers) {
        section.entries.entry(objid).or_insert((
            XRefLocation::Compressed {
                stream_objid,
                index,
            },
            0,
        ));
    }
    section.trailer = find_trailer_dict(data)
        .or_else(|| last_xref_stream_dict(data, &headers))
        .or_else(|| catalog_trailer(data, &headers))
        .ok_or(PdfError::TrailerNotFound)?;

    let mut table = XRefTable {
        fallback: true,
        ..XRefTable::default()
    };
    table.merge(section, 0);
    Ok(table)
}

fn find_trailer_dict(data: &[u8]) -> Option<PDFDict> {
    let mut end = data.len();
    while let Some(pos) = rfind_bytes(&data[..end], b"trailer") {
        let mut parser = PDFParser::new(data);
        parser.set_pos(pos + b"trailer".len());
        if let Ok(PDFObject::Dict(d)) = parser.parse_object()
            && d.contains_key("Root")
        {
            return Some(d);
        }
        end = pos;
    }
    None
}

fn last_xref_stream_dict(data: &Bytes, headers: &FxHashMap<u32, (usize, u32)>) -> Option<PDFDict> {
    let mut offsets: Vec<usize> = headers.values().map(|(o, _)| *o).collect();
    offsets.sort_unstable_by(|a, b| b.cmp(a));
    offsets.into_iter().find_map(|offset| {
        let mut parser = PDFParser::new_shared(data);
        parser.set_pos(offset);
        match parser.parse_indirect_object() {
            Ok((_, _, PDFObject::Stream(s))) if s.type_name() == Some("XRef") && s.contains("Root") => {
                Some(xref_stream_trailer(&s.attrs))
            }
            _ => None,
        }
    })
}

fn catalog_trailer(data: &[u8], headers: &FxHashMap<u32, (usize, u32)>) -> Option<PDFDict> {
    let hit = CATALOG_TYPE.find_iter(data).last()?.start();
    let (&objid, &(_, genno)) = headers
        .iter()
        .filter(|(_, (offset, _))| *offset < hit)
        .max_by_key(|(_, (offset, _))| *offset)?;
    let mut trailer = PDFDict::new();
    trailer.insert(
        "Root".into(),
        PDFObject::Ref(crate::model::objects::PDFObjRef::new(objid, genno)),
    );
    Some(trailer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startxref_uses_last_occurrence() {
        let data = b"%PDF-1.4\nstartxref\n5\n%%EOF\nstartxref\n9\n%%EOF\n";
        assert_eq!(find_startxref(data).unwrap(), 9);
        assert!(matches!(find_startxref(b"%PDF-1.4\n"), Err(PdfError::TrailerNotFound)));
    }

    #[test]
    fn classic_table_entries_and_trailer() {
        let data = b"xref\n0 3\n0000000000 65535 f \n0000000017 00000 n \n0000000081 00002 n \ntrailer\n<< /Size 3 /Root 1 0 R >>\n";
        let section = parse_xref_table(data, 0).unwrap();
        assert_eq!(section.entries[&0], (XRefLocation::Free, 65535));
        assert_eq!(section.entries[&1], (XRefLocation::Offset(17), 0));
        assert_eq!(section.entries[&2], (XRefLocation::Offset(81), 2));
        assert!(section.trailer.contains_key("Root"));
    }

    #[test]
    fn off_by_one_subsection_is_realigned() {
        let data = b"xref\n1 2\n0000000000 65535 f \n0000000042 00000 n \ntrailer\n<< /Size 2 >>";
        let section = parse_xref_table(data, 0).unwrap();
        assert_eq!(section.entries[&1], (XRefLocation::Offset(42), 0));
    }

    #[test]
    fn xref_stream_rows_decode() {
        // W [1 2 1]: free 0, offset 0x0010 gen 0, compressed in 5 at index 3
        let rows = [0u8, 0, 0, 0, 1, 0, 0x10, 0, 2, 0, 5, 3];
        let mut file = b"7 0 obj\n<< /Type /XRef /W [1 2 1] /Size 3 /Root 1 0 R /Length 12 >>\nstream\n".to_vec();
        file.extend_from_slice(&rows);
        file.extend_from_slice(b"\nendstream\nendobj\n");
        let data = Bytes::from(file);
        let section = parse_xref_stream(&data, 0).unwrap();
        assert_eq!(section.entries[&0].0, XRefLocation::Free);
        assert_eq!(section.entries[&1], (XRefLocation::Offset(16), 0));
        assert_eq!(
            section.entries[&2].0,
            XRefLocation::Compressed {
                stream_objid: 5,
                index: 3
            }
        );
        assert!(section.trailer.contains_key("Root"));
        assert!(!section.trailer.contains_key("W"));
    }

    #[test]
    fn hybrid_xrefstm_fills_free_entries() {
        // W [1 2 1] /Index [2 2]: 2 packed in 5 at index 0, 3 at offset 0x20
        let rows = [2u8, 0, 5, 0, 1, 0, 0x20, 0];
        let mut file =
            b"9 0 obj\n<< /Type /XRef /W [1 2 1] /Index [2 2] /Size 4 /Length 8 >>\nstream\n".to_vec();
        file.extend_from_slice(&rows);
        file.extend_from_slice(b"\nendstream\nendobj\n");
        let table_pos = file.len();
        file.extend_from_slice(
            b"xref\n0 4\n0000000000 65535 f \n0000000100 00000 n \n0000000000 00000 f \n\
              0000000200 00000 n \ntrailer\n<< /Size 4 /Root 1 0 R /XRefStm 0 >>\n",
        );
        let table = load_xref_chain(&Bytes::from(file), table_pos).unwrap();

        assert_eq!(table.revisions(), 1);
        assert_eq!(table.get(1).unwrap().location, XRefLocation::Offset(100));
        assert_eq!(
            table.get(2).unwrap().location,
            XRefLocation::Compressed {
                stream_objid: 5,
                index: 0
            }
        );
        // the classic table keeps its in-use entries
        assert_eq!(table.get(3).unwrap().location, XRefLocation::Offset(200));
        assert!(!table.trailer().contains_key("XRefStm"));
    }

    #[test]
    fn rebuild_indexes_object_stream_members() {
        let data = Bytes::from_static(
            b"%PDF-1.5\n1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n\
              4 0 obj << /Type /ObjStm /N 2 /First 8 /Length 30 >>\nstream\n\
              2 0 3 5 true << /Type /Page >>\nendstream\nendobj\n\
              trailer << /Root 1 0 R >>\n",
        );
        let table = rebuild_xref(&data).unwrap();
        assert!(matches!(table.get(1).unwrap().location, XRefLocation::Offset(_)));
        assert_eq!(
            table.get(3).unwrap().location,
            XRefLocation::Compressed {
                stream_objid: 4,
                index: 1
            }
        );
    }

    #[test]
    fn newer_sections_shadow_older_ones() {
        let mut table = XRefTable::default();
        let mut newer = XRefSection::default();
        newer.entries.insert(4, (XRefLocation::Offset(900), 0));
        newer.entries.insert(5, (XRefLocation::Free, 1));
        let mut older = XRefSection::default();
        older.entries.insert(4, (XRefLocation::Offset(100), 0));
        older.entries.insert(5, (XRefLocation::Offset(200), 0));
        older.entries.insert(6, (XRefLocation::Offset(300), 0));
        table.merge(newer, 0);
        table.merge(older, 1);

        assert_eq!(table.get(4).unwrap().location, XRefLocation::Offset(900));
        assert!(table.get(5).unwrap().is_free());
        assert_eq!(table.get(6).unwrap().revision, 1);
        assert_eq!(table.objids(), vec![4, 6]);
    }

    #[test]
    fn scan_keeps_last_definition() {
        let data = b"1 0 obj (a) endobj\n2 0 obj (b) endobj\n1 0 obj (c) endobj\n";
        let found = scan_object_headers(data);
        assert_eq!(found.len(), 2);
        assert_eq!(found[&1].0, 38);
    }

    #[test]
    fn rebuild_without_trailer_finds_catalog() {
        let data = Bytes::from_static(
            b"%PDF-1.4\n1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n2 0 obj << /Type /Pages /Kids [] /Count 0 >> endobj\n",
        );
        let table = rebuild_xref(&data).unwrap();
        assert!(table.is_fallback());
        let trailer = table.trailer();
        assert_eq!(
            trailer.get("Root"),
            Some(&PDFObject::Ref(crate::model::objects::PDFObjRef::new(1, 0)))
        );
    }
}
