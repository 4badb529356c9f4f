//! PDF object parser - builds [`PDFObject`]s from lexer tokens.
//!
//! Handles `n g R` references with two tokens of lookahead, indirect object
//! definitions (`n g obj ... endobj`) and stream payload capture.

use std::collections::VecDeque;

use bytes::Bytes;
use tracing::warn;

use super::lexer::{Keyword, Lexer, Token, is_whitespace};
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObjRef, PDFObject, PDFStream};
use crate::utils::find_bytes;

/// Resolves an indirect `/Length` while a stream payload is captured.
///
/// Implemented by the document; the parser itself has no xref access.
pub trait LengthResolver {
    fn resolve_length(&self, r: &PDFObjRef) -> Option<i64>;
}

/// Deepest array/dict nesting accepted before the input is declared malformed.
pub const MAX_NESTING: usize = 256;

/// An indirect object definition: `(objid, genno, object)`.
pub type IndirectObject = (u32, u32, PDFObject);

/// PDF object parser.
pub struct PDFParser<'a> {
    lexer: Lexer<'a>,
    /// Shared handle on the buffer, so stream payloads can be zero-copy slices.
    shared: Option<&'a Bytes>,
    resolver: Option<&'a dyn LengthResolver>,
    lookahead: VecDeque<(usize, Token)>,
    /// Lexer error met while filling the lookahead; surfaced in order.
    pending: Option<PdfError>,
    /// Open arrays and dictionaries around the cursor
    depth: usize,
}

impl<'a> PDFParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            lexer: Lexer::new(data),
            shared: None,
            resolver: None,
            lookahead: VecDeque::new(),
            pending: None,
            depth: 0,
        }
    }

    /// Parser over a shared buffer. Stream payloads borrow from `data`.
    pub fn new_shared(data: &'a Bytes) -> Self {
        let mut parser = Self::new(data.as_ref());
        parser.shared = Some(data);
        parser
    }

    pub fn with_resolver(mut self, resolver: &'a dyn LengthResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Position of the next unread token.
    pub fn tell(&self) -> usize {
        self.lookahead
            .front()
            .map(|(pos, _)| *pos)
            .unwrap_or_else(|| self.lexer.tell())
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.lookahead.clear();
        self.pending = None;
        self.depth = 0;
        self.lexer.set_pos(pos);
    }

    pub fn data(&self) -> &'a [u8] {
        self.lexer.data()
    }

    fn fill(&mut self, n: usize) {
        while self.lookahead.len() < n && self.pending.is_none() {
            match self.lexer.next_token() {
                Some(Ok(tok)) => self.lookahead.push_back(tok),
                Some(Err(e)) => self.pending = Some(e),
                None => break,
            }
        }
    }

    /// Next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<(usize, Token)>> {
        if let Some(tok) = self.lookahead.pop_front() {
            return Ok(Some(tok));
        }
        if let Some(e) = self.pending.take() {
            return Err(e);
        }
        self.lexer.next_token().transpose()
    }

    fn peek(&mut self, i: usize) -> Option<&Token> {
        self.fill(i + 1);
        self.lookahead.get(i).map(|(_, t)| t)
    }

    fn push_front(&mut self, tok: (usize, Token)) {
        self.lookahead.push_front(tok);
    }

    /// Direct access to the lexer. Only valid while the lookahead is empty.
    pub(crate) fn lexer_mut(&mut self) -> Option<&mut Lexer<'a>> {
        if self.lookahead.is_empty() && self.pending.is_none() {
            Some(&mut self.lexer)
        } else {
            None
        }
    }

    /// Parse the next object.
    pub fn parse_object(&mut self) -> Result<PDFObject> {
        let (pos, token) = self.next_token()?.ok_or(PdfError::UnexpectedEof)?;
        self.object_from_token(pos, token)
    }

    /// Build an object starting from an already consumed token.
    pub fn object_from_token(&mut self, pos: usize, token: Token) -> Result<PDFObject> {
        match token {
            Token::Int(n) => {
                if let Some(r) = self.try_reference(n) {
                    return Ok(PDFObject::Ref(r));
                }
                Ok(PDFObject::Int(n))
            }
            Token::Real(n) => Ok(PDFObject::Real(n)),
            Token::Bool(b) => Ok(PDFObject::Bool(b)),
            Token::Name(s) => Ok(PDFObject::Name(s)),
            Token::String(s) | Token::HexString(s) => Ok(PDFObject::String(s)),
            Token::Keyword(Keyword::Null) => Ok(PDFObject::Null),
            Token::Keyword(Keyword::ArrayStart) => self.nested(pos, Self::parse_array),
            Token::Keyword(Keyword::DictStart) => {
                self.nested(pos, |p| p.parse_dict().map(PDFObject::Dict))
            }
            Token::Keyword(kw) => Err(PdfError::MalformedStructure(format!(
                "unexpected keyword {:?} at {pos}",
                String::from_utf8_lossy(kw.as_bytes())
            ))),
        }
    }

    fn nested(
        &mut self,
        pos: usize,
        f: impl FnOnce(&mut Self) -> Result<PDFObject>,
    ) -> Result<PDFObject> {
        if self.depth >= MAX_NESTING {
            return Err(PdfError::MalformedStructure(format!(
                "objects nested deeper than {MAX_NESTING} at {pos}"
            )));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Consumes `g R` after an integer when present.
    fn try_reference(&mut self, objid: i64) -> Option<PDFObjRef> {
        let genno = match self.peek(0) {
            Some(Token::Int(g)) => *g,
            _ => return None,
        };
        if !matches!(self.peek(1), Some(Token::Keyword(Keyword::R))) {
            return None;
        }
        self.lookahead.pop_front();
        self.lookahead.pop_front();
        if objid < 0 || genno < 0 || objid > u32::MAX as i64 || genno > u32::MAX as i64 {
            return None;
        }
        Some(PDFObjRef::new(objid as u32, genno as u32))
    }

    fn parse_array(&mut self) -> Result<PDFObject> {
        let mut arr = Vec::new();
        loop {
            let Some((pos, token)) = self.next_token()? else {
                return Err(PdfError::UnexpectedEof);
            };
            match token {
                Token::Keyword(Keyword::ArrayEnd) => break,
                Token::Keyword(Keyword::EndObj | Keyword::Stream | Keyword::Obj) => {
                    warn!(pos, "unterminated array");
                    self.push_front((pos, token));
                    break;
                }
                Token::Keyword(Keyword::Unknown(_) | Keyword::R) => continue,
                other => arr.push(self.object_from_token(pos, other)?),
            }
        }
        Ok(PDFObject::Array(arr))
    }

    fn parse_dict(&mut self) -> Result<PDFDict> {
        let mut dict = PDFDict::new();
        loop {
            let Some((pos, token)) = self.next_token()? else {
                return Err(PdfError::UnexpectedEof);
            };
            let key = match token {
                Token::Keyword(Keyword::DictEnd) => break,
                Token::Name(name) => name,
                Token::Keyword(Keyword::EndObj | Keyword::Stream | Keyword::Obj) => {
                    warn!(pos, "unterminated dictionary");
                    self.push_front((pos, token));
                    break;
                }
                _ => {
                    warn!(pos, "skipping non-name dictionary key");
                    continue;
                }
            };
            if matches!(self.peek(0), Some(Token::Keyword(Keyword::DictEnd))) {
                // Key without a value
                continue;
            }
            let value = self.parse_object()?;
            // A null value is the same as an absent key.
            if !value.is_null() {
                dict.insert(key, value);
            }
        }
        Ok(dict)
    }

    /// Parse `n g obj <object> [stream ... endstream] [endobj]` at the cursor.
    pub fn parse_indirect_object(&mut self) -> Result<IndirectObject> {
        let start = self.tell();
        let objid = self.expect_uint(start)?;
        let genno = self.expect_uint(start)?;
        match self.next_token()? {
            Some((_, Token::Keyword(Keyword::Obj))) => {}
            _ => {
                return Err(PdfError::MalformedStructure(format!(
                    "expected 'obj' header at {start}"
                )));
            }
        }
        let obj = match self.next_token()? {
            Some((_, Token::Keyword(Keyword::EndObj))) => return Ok((objid, genno, PDFObject::Null)),
            Some((pos, tok)) => self.object_from_token(pos, tok)?,
            None => return Err(PdfError::UnexpectedEof),
        };
        let obj = match obj {
            PDFObject::Dict(attrs)
                if matches!(self.peek(0), Some(Token::Keyword(Keyword::Stream))) =>
            {
                let mut stream = self.capture_stream(attrs)?;
                stream.set_objid(objid, genno);
                PDFObject::Stream(Box::new(stream))
            }
            other => other,
        };
        if matches!(self.peek(0), Some(Token::Keyword(Keyword::EndObj))) {
            self.lookahead.pop_front();
        }
        Ok((objid, genno, obj))
    }

    fn expect_uint(&mut self, start: usize) -> Result<u32> {
        match self.next_token()? {
            Some((_, Token::Int(n))) if (0..=u32::MAX as i64).contains(&n) => Ok(n as u32),
            _ => Err(PdfError::MalformedStructure(format!(
                "expected object header at {start}"
            ))),
        }
    }

    /// Capture the payload following a `stream` keyword.
    fn capture_stream(&mut self, mut attrs: PDFDict) -> Result<PDFStream> {
        let (kw_pos, _) = self
            .lookahead
            .pop_front()
            .ok_or(PdfError::UnexpectedEof)?;
        self.lookahead.clear();
        self.pending = None;
        let data = self.lexer.data();
        let mut start = kw_pos + b"stream".len();
        // The keyword is followed by CRLF or LF; tolerate a lone CR.
        if data.get(start) == Some(&b'\r') {
            start += 1;
        }
        if data.get(start) == Some(&b'\n') {
            start += 1;
        }
        let start = start.min(data.len());

        let declared = match attrs.get("Length") {
            Some(PDFObject::Int(n)) => Some(*n),
            Some(PDFObject::Ref(r)) => self.resolver.and_then(|res| res.resolve_length(r)),
            _ => None,
        };

        let end = match declared
            .filter(|&n| n >= 0)
            .map(|n| n as usize)
            .and_then(|n| start.checked_add(n))
            .filter(|&end| end <= data.len() && endstream_follows(data, end))
        {
            Some(end) => end,
            None => {
                let end = scan_endstream(data, start);
                warn!(
                    offset = start,
                    declared = ?declared,
                    actual = end - start,
                    "stream /Length unusable, scanned for endstream"
                );
                end
            }
        };

        let rawdata = match self.shared {
            Some(bytes) => bytes.slice(start..end),
            None => Bytes::copy_from_slice(&data[start..end]),
        };
        attrs.insert("Length".into(), PDFObject::Int((end - start) as i64));

        let mut resume = end;
        if let Some(p) = find_bytes(data, b"endstream", end) {
            if data[end..p].iter().all(|&b| is_whitespace(b)) {
                resume = p + b"endstream".len();
            }
        }
        self.lexer.set_pos(resume);
        Ok(PDFStream::new(attrs, rawdata))
    }
}

/// True when only whitespace separates `pos` from an `endstream` keyword.
fn endstream_follows(data: &[u8], pos: usize) -> bool {
    let mut i = pos;
    while i < data.len() && is_whitespace(data[i]) {
        i += 1;
    }
    data[i..].starts_with(b"endstream")
}

/// End of the payload found by scanning for `endstream`, without the EOL
/// that precedes the keyword. Runs to end of buffer when there is none.
fn scan_endstream(data: &[u8], start: usize) -> usize {
    let Some(p) = find_bytes(data, b"endstream", start) else {
        return data.len();
    };
    let mut end = p;
    if end > start && data[end - 1] == b'\n' {
        end -= 1;
    }
    if end > start && data[end - 1] == b'\r' {
        end -= 1;
    }
    end
}
