//! Object streams (`/Type /ObjStm`).

use bytes::Bytes;

use crate::error::{PdfError, Result};
use crate::model::objects::{PDFObject, PDFStream, int_or};
use crate::parser::{PDFParser, Token};

/// Decoded object stream: the `(objid, offset)` header plus the body.
#[derive(Debug)]
pub struct ObjectStream {
    objid: u32,
    first: usize,
    header: Vec<(u32, usize)>,
    data: Bytes,
}

impl ObjectStream {
    /// `decoded` is the stream payload after its filters ran.
    pub fn parse(objid: u32, stream: &PDFStream, decoded: Bytes) -> Result<Self> {
        if stream.type_name().is_some_and(|t| t != "ObjStm") {
            return Err(PdfError::MalformedStructure(format!(
                "object {objid} is not an object stream"
            )));
        }
        let n = int_or(stream.get("N"), -1);
        let first = int_or(stream.get("First"), -1);
        if n < 0 || first < 0 || first as usize > decoded.len() {
            return Err(PdfError::MalformedStructure(format!(
                "object stream {objid}: bad /N or /First"
            )));
        }
        let first = first as usize;

        let mut parser = PDFParser::new(&decoded[..first]);
        // /N is untrusted; the header itself bounds how many pairs exist
        let mut header = Vec::new();
        for _ in 0..n {
            let pair = (parser.next_token()?, parser.next_token()?);
            match pair {
                (Some((_, Token::Int(id))), Some((_, Token::Int(off)))) if id >= 0 && off >= 0 => {
                    header.push((id as u32, off as usize));
                }
                // a short header keeps the pairs read so far
                _ => break,
            }
        }
        Ok(Self {
            objid,
            first,
            header,
            data: decoded,
        })
    }

    pub const fn objid(&self) -> u32 {
        self.objid
    }

    pub fn len(&self) -> usize {
        self.header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    /// Object numbers in header order.
    pub fn objids(&self) -> impl Iterator<Item = u32> + '_ {
        self.header.iter().map(|(id, _)| *id)
    }

    /// Object at `index`, as `(objid, object)`.
    pub fn get(&self, index: usize) -> Result<(u32, PDFObject)> {
        let &(objid, offset) = self.header.get(index).ok_or_else(|| {
            PdfError::MalformedStructure(format!(
                "index {index} out of range in object stream {}",
                self.objid
            ))
        })?;
        let pos = self.first.saturating_add(offset);
        if pos > self.data.len() {
            return Err(PdfError::MalformedStructure(format!(
                "object {objid} lies past the end of object stream {}",
                self.objid
            )));
        }
        let mut parser = PDFParser::new_shared(&self.data);
        parser.set_pos(pos);
        Ok((objid, parser.parse_object()?))
    }

    /// Locate `objid` by scanning the header.
    pub fn find(&self, objid: u32) -> Option<usize> {
        self.header.iter().position(|(id, _)| *id == objid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::objects::PDFDict;

    fn objstm(n: i64, first: i64, body: &'static [u8]) -> Result<ObjectStream> {
        let mut attrs = PDFDict::new();
        attrs.insert("Type".into(), PDFObject::Name("ObjStm".into()));
        attrs.insert("N".into(), PDFObject::Int(n));
        attrs.insert("First".into(), PDFObject::Int(first));
        let stream = PDFStream::new(attrs, Bytes::new());
        ObjectStream::parse(9, &stream, Bytes::from_static(body))
    }

    #[test]
    fn objects_are_found_by_index_and_number() {
        let body = b"10 0 11 6 (ten) << /Eleven 11 >>";
        let stm = objstm(2, 10, body).unwrap();
        assert_eq!(stm.len(), 2);
        assert_eq!(stm.get(0).unwrap(), (10, PDFObject::String(b"ten".to_vec())));
        let (id, obj) = stm.get(stm.find(11).unwrap()).unwrap();
        assert_eq!(id, 11);
        assert_eq!(obj.get("Eleven"), Some(&PDFObject::Int(11)));
        assert!(stm.get(2).is_err());
    }

    #[test]
    fn huge_count_reads_only_the_pairs_present() {
        let stm = objstm(1_000_000_000_000_000_000, 4, b"7 0 true").unwrap();
        assert_eq!(stm.objids().collect::<Vec<_>>(), [7]);
        assert_eq!(stm.get(0).unwrap(), (7, PDFObject::Bool(true)));
    }

    #[test]
    fn bad_first_is_rejected() {
        assert!(matches!(
            objstm(1, 500, b"1 0 null"),
            Err(PdfError::MalformedStructure(_))
        ));
    }
}
