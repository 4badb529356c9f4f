//! Content stream tokenizer.
//!
//! Turns decoded content bytes into operands, operators and inline images.
//! Arrays and dictionaries are assembled here, so the interpreter only
//! sees complete operands.

use bytes::Bytes;
use tracing::debug;

use crate::model::objects::{PDFDict, PDFObject};
use crate::parser::lexer::{is_delimiter, is_whitespace};
use crate::parser::{Keyword, Lexer, Token};
use crate::utils::find_bytes;

/// Token types produced by [`ContentParser`].
#[derive(Debug, Clone, PartialEq)]
pub enum ContentToken {
    /// An operand (number, string, name, array, dict)
    Operand(PDFObject),
    /// An operator (BT, ET, Tj, ...)
    Operator(Keyword),
    /// `BI ... ID ... EI`, with abbreviated keys expanded
    InlineImage { dict: PDFDict, data: Bytes },
}

#[derive(Debug)]
enum Context {
    Array(Vec<PDFObject>),
    Dict(Vec<PDFObject>),
    /// `{ ... }` procedures only occur in Type 4 functions; kept as arrays.
    Proc(Vec<PDFObject>),
}

pub struct ContentParser<'a> {
    lexer: Lexer<'a>,
    data: &'a Bytes,
    context: Vec<Context>,
    /// Operands collected between `BI` and `ID`
    inline: Option<Vec<PDFObject>>,
}

impl<'a> ContentParser<'a> {
    pub fn new(data: &'a Bytes) -> Self {
        Self {
            lexer: Lexer::new(data),
            data,
            context: Vec::new(),
            inline: None,
        }
    }

    fn push(&mut self, obj: PDFObject) -> Option<ContentToken> {
        if let Some(ctx) = self.context.last_mut() {
            match ctx {
                Context::Array(items) | Context::Dict(items) | Context::Proc(items) => {
                    items.push(obj)
                }
            }
            None
        } else if let Some(items) = self.inline.as_mut() {
            items.push(obj);
            None
        } else {
            Some(ContentToken::Operand(obj))
        }
    }

    fn build_dict(items: Vec<PDFObject>) -> PDFDict {
        let mut dict = PDFDict::new();
        let mut iter = items.into_iter();
        while let Some(key) = iter.next() {
            if let PDFObject::Name(name) = key
                && let Some(value) = iter.next()
            {
                dict.insert(name, value);
            }
        }
        dict
    }

    /// Read the image payload that follows `ID` and leave the cursor after `EI`.
    fn inline_data(&mut self, dict: &PDFDict) -> Bytes {
        let data = self.data.as_ref();
        let mut start = self.lexer.tell();
        // exactly one whitespace byte separates ID from the data
        if data.get(start).copied().is_some_and(is_whitespace) {
            start += 1;
        }

        let ascii85 = match dict.get("Filter") {
            Some(PDFObject::Name(n)) => is_ascii85(n),
            Some(PDFObject::Array(items)) => {
                matches!(items.first(), Some(PDFObject::Name(n)) if is_ascii85(n))
            }
            _ => false,
        };
        let search_from = if ascii85 {
            find_bytes(data, b"~>", start).map_or(start, |p| p + 2)
        } else {
            start
        };

        match find_ei(data, search_from) {
            Some((end, resume)) => {
                self.lexer.set_pos(resume);
                self.data.slice(start..end.max(start))
            }
            None => {
                debug!(pos = start, "inline image without EI, taking the rest of the stream");
                self.lexer.set_pos(data.len());
                self.data.slice(start.min(data.len())..)
            }
        }
    }
}

fn is_ascii85(name: &str) -> bool {
    name == "A85" || name == "ASCII85Decode"
}

/// Find `EI` as a standalone token at or after `from`. Returns where the
/// image data ends (before the whitespace preceding `EI`) and where
/// tokenizing resumes.
fn find_ei(data: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut pos = from;
    while let Some(at) = find_bytes(data, b"EI", pos) {
        let after = at + 2;
        let ends = data.get(after).is_none_or(|&b| is_whitespace(b) || is_delimiter(b));
        let preceded = at > from && is_whitespace(data[at - 1]);
        if ends && (preceded || at == from) {
            let end = if preceded { at - 1 } else { at };
            return Some((end, after));
        }
        pos = at + 1;
    }
    None
}

/// Expand abbreviated inline image keys and names.
fn expand_inline(dict: PDFDict) -> PDFDict {
    dict.into_iter()
        .map(|(key, value)| {
            let key = match key.as_str() {
                "BPC" => "BitsPerComponent",
                "CS" => "ColorSpace",
                "D" => "Decode",
                "DP" => "DecodeParms",
                "F" => "Filter",
                "H" => "Height",
                "W" => "Width",
                "IM" => "ImageMask",
                "I" => "Interpolate",
                other => other,
            }
            .to_string();
            let value = match (key.as_str(), value) {
                ("ColorSpace", PDFObject::Name(n)) => PDFObject::Name(
                    match n.as_str() {
                        "G" => "DeviceGray",
                        "RGB" => "DeviceRGB",
                        "CMYK" => "DeviceCMYK",
                        "I" => "Indexed",
                        other => other,
                    }
                    .to_string(),
                ),
                (_, v) => v,
            };
            (key, value)
        })
        .collect()
}

impl Iterator for ContentParser<'_> {
    type Item = ContentToken;

    fn next(&mut self) -> Option<ContentToken> {
        loop {
            let token = match self.lexer.next_token()? {
                Ok((_, token)) => token,
                Err(e) => {
                    // the lexer has already moved past the bad bytes
                    debug!(error = %e, "skipping malformed content token");
                    continue;
                }
            };
            let obj = match token {
                Token::Int(i) => PDFObject::Int(i),
                Token::Real(r) => PDFObject::Real(r),
                Token::Bool(b) => PDFObject::Bool(b),
                Token::Name(n) => PDFObject::Name(n),
                Token::String(s) | Token::HexString(s) => PDFObject::String(s),
                Token::Keyword(kw) => match kw {
                    Keyword::Null => PDFObject::Null,
                    Keyword::ArrayStart => {
                        self.context.push(Context::Array(Vec::new()));
                        continue;
                    }
                    Keyword::DictStart => {
                        self.context.push(Context::Dict(Vec::new()));
                        continue;
                    }
                    Keyword::BraceOpen => {
                        self.context.push(Context::Proc(Vec::new()));
                        continue;
                    }
                    Keyword::ArrayEnd | Keyword::DictEnd | Keyword::BraceClose => {
                        let closed = match (kw, self.context.pop()) {
                            (Keyword::ArrayEnd, Some(Context::Array(items)))
                            | (Keyword::BraceClose, Some(Context::Proc(items))) => PDFObject::Array(items),
                            (Keyword::DictEnd, Some(Context::Dict(items))) => {
                                PDFObject::Dict(Self::build_dict(items))
                            }
                            (_, other) => {
                                // unbalanced: put back what was open and drop the closer
                                self.context.extend(other);
                                continue;
                            }
                        };
                        match self.push(closed) {
                            Some(tok) => return Some(tok),
                            None => continue,
                        }
                    }
                    Keyword::BI if self.context.is_empty() => {
                        self.inline = Some(Vec::new());
                        continue;
                    }
                    Keyword::ID if self.inline.is_some() => {
                        let items = self.inline.take().unwrap_or_default();
                        let dict = expand_inline(Self::build_dict(items));
                        let data = self.inline_data(&dict);
                        return Some(ContentToken::InlineImage { dict, data });
                    }
                    kw if self.context.is_empty() && self.inline.is_none() => {
                        return Some(ContentToken::Operator(kw));
                    }
                    // operators inside arrays are junk; inside BI they are values
                    Keyword::Unknown(bytes) if self.inline.is_some() => {
                        PDFObject::Name(String::from_utf8_lossy(&bytes).into_owned())
                    }
                    _ => continue,
                },
            };
            if let Some(tok) = self.push(obj) {
                return Some(tok);
            }
        }
    }
}
