//! In-memory PDF fixtures with correct xref offsets.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;

#[derive(Debug, Clone, Copy)]
enum Entry {
    Offset(usize),
    Compressed { stream: u32, index: u32 },
}

/// Writes objects one after another and records where they land, so
/// classic xref tables and xref streams can be generated afterwards.
pub struct PdfBuilder {
    out: Vec<u8>,
    entries: BTreeMap<u32, Entry>,
    /// Objects written since the last xref section
    pending: Vec<u32>,
    last_xref: Option<usize>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self {
            out: b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n".to_vec(),
            entries: BTreeMap::new(),
            pending: Vec::new(),
            last_xref: None,
        }
    }

    pub fn object(&mut self, objid: u32, body: &str) -> &mut Self {
        self.object_bytes(objid, body.as_bytes())
    }

    pub fn object_bytes(&mut self, objid: u32, body: &[u8]) -> &mut Self {
        self.entries.insert(objid, Entry::Offset(self.out.len()));
        self.pending.push(objid);
        self.out.extend_from_slice(format!("{objid} 0 obj\n").as_bytes());
        self.out.extend_from_slice(body);
        self.out.extend_from_slice(b"\nendobj\n");
        self
    }

    /// A stream object with `/Length` filled in.
    pub fn stream(&mut self, objid: u32, dict: &str, data: &[u8]) -> &mut Self {
        let mut body = format!("<< {dict} /Length {} >>\nstream\n", data.len()).into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.object_bytes(objid, &body)
    }

    /// A FlateDecode stream holding `data`.
    pub fn flate_stream(&mut self, objid: u32, dict: &str, data: &[u8]) -> &mut Self {
        let compressed = deflate(data);
        self.stream(objid, &format!("{dict} /Filter /FlateDecode"), &compressed)
    }

    /// An object stream packing `objects`, deflated.
    pub fn object_stream(&mut self, objid: u32, objects: &[(u32, &str)]) -> &mut Self {
        let mut header = String::new();
        let mut body = String::new();
        for (index, (id, text)) in objects.iter().enumerate() {
            header.push_str(&format!("{id} {} ", body.len()));
            body.push_str(text);
            body.push('\n');
            self.entries.insert(
                *id,
                Entry::Compressed {
                    stream: objid,
                    index: index as u32,
                },
            );
        }
        let first = header.len();
        let data = format!("{header}{body}");
        self.flate_stream(
            objid,
            &format!("/Type /ObjStm /N {} /First {first}", objects.len()),
            data.as_bytes(),
        )
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.out.extend_from_slice(bytes);
        self
    }

    fn size(&self) -> u32 {
        self.entries.keys().max().map_or(1, |m| m + 1)
    }

    /// Classic xref table for the objects written since the previous section,
    /// then the trailer (with `/Size` and `/Prev` added) and `startxref`.
    pub fn xref_section(&mut self, trailer: &str) -> &mut Self {
        let pos = self.out.len();
        let mut ids = std::mem::take(&mut self.pending);
        ids.sort_unstable();
        ids.dedup();

        let mut table = String::from("xref\n");
        if self.last_xref.is_none() {
            table.push_str("0 1\n0000000000 65535 f \n");
        }
        for id in ids {
            if let Some(Entry::Offset(off)) = self.entries.get(&id) {
                table.push_str(&format!("{id} 1\n{off:010} 00000 n \n"));
            }
        }
        let prev = self.last_xref.map(|p| format!(" /Prev {p}")).unwrap_or_default();
        table.push_str(&format!(
            "trailer\n<< {trailer} /Size {}{prev} >>\nstartxref\n{pos}\n%%EOF\n",
            self.size()
        ));
        self.out.extend_from_slice(table.as_bytes());
        self.last_xref = Some(pos);
        self
    }

    /// Cross-reference stream object `objid` covering every object so far.
    pub fn xref_stream(&mut self, objid: u32, trailer: &str) -> &mut Self {
        let pos = self.out.len();
        self.entries.insert(objid, Entry::Offset(pos));
        let size = self.size();
        let mut rows = Vec::new();
        for id in 0..size {
            let (kind, f1, f2): (u8, u32, u16) = match self.entries.get(&id) {
                Some(Entry::Offset(off)) => (1, *off as u32, 0),
                Some(Entry::Compressed { stream, index }) => (2, *stream, *index as u16),
                None => (0, 0, if id == 0 { 0xFFFF } else { 0 }),
            };
            rows.push(kind);
            rows.extend_from_slice(&f1.to_be_bytes());
            rows.extend_from_slice(&f2.to_be_bytes());
        }
        let prev = self.last_xref.map(|p| format!(" /Prev {p}")).unwrap_or_default();
        let dict = format!("/Type /XRef /W [1 4 2] /Size {size}{prev} {trailer}");
        self.pending.clear();
        self.stream(objid, &dict, &rows);
        self.pending.clear();
        self.out
            .extend_from_slice(format!("startxref\n{pos}\n%%EOF\n").as_bytes());
        self.last_xref = Some(pos);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.out.clone()
    }
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// Catalog (1), a Pages node (2) with the given kids, and nothing else.
pub fn catalog(b: &mut PdfBuilder, kids: &[u32]) {
    let kids: Vec<String> = kids.iter().map(|k| format!("{k} 0 R")).collect();
    b.object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.object(
        2,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {} /MediaBox [0 0 612 792] >>",
            kids.join(" "),
            kids.len()
        ),
    );
}

/// Helvetica with WinAnsiEncoding as font resource `F1`.
pub const HELVETICA: &str = "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>";

/// A one-page document whose page (3) draws `content` (4) with F1 (5).
pub fn single_page(content: &str) -> Vec<u8> {
    let mut b = PdfBuilder::new();
    catalog(&mut b, &[3]);
    b.object(
        3,
        "<< /Type /Page /Parent 2 0 R /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>",
    );
    b.stream(4, "", content.as_bytes());
    b.object(5, HELVETICA);
    b.xref_section("/Root 1 0 R");
    b.build()
}

/// Pages 3, 4, ... each showing one line of text, sharing font 2 resources
/// through the Pages node.
pub fn multi_page(texts: &[&str]) -> Vec<u8> {
    let mut b = PdfBuilder::new();
    let first = 10;
    let kids: Vec<String> = (0..texts.len()).map(|i| format!("{} 0 R", first + 2 * i as u32)).collect();
    b.object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.object(
        2,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {} /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> >>",
            kids.join(" "),
            texts.len()
        ),
    );
    b.object(3, HELVETICA);
    for (i, text) in texts.iter().enumerate() {
        let page = first + 2 * i as u32;
        b.object(page, &format!("<< /Type /Page /Parent 2 0 R /Contents {} 0 R >>", page + 1));
        b.stream(page + 1, "", format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET").as_bytes());
    }
    b.xref_section("/Root 1 0 R");
    b.build()
}
