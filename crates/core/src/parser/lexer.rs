//! PDF tokenizer.
//!
//! Turns raw bytes into [`Token`]s. Whitespace and `%` comments are skipped.
//! The lexer works over a borrowed buffer and supports random seeks, since
//! most of the document is parsed at offsets taken from the xref table.

use crate::error::{PdfError, Result};

/// PDF keyword. Known operators are zero-allocation variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Structural
    ArrayStart, // [
    ArrayEnd,   // ]
    DictStart,  // <<
    DictEnd,    // >>
    BraceOpen,  // {
    BraceClose, // }

    Null,

    // Object structure
    Obj,
    EndObj,
    R,
    Stream,
    EndStream,
    Xref,
    Trailer,
    StartXref,

    // Graphics state
    Qq, // q (save)
    Q,  // Q (restore)
    Cm,

    // Text object
    BT,
    ET,

    // Text state
    Tc,
    Tw,
    Tz,
    TL,
    Tf,
    Tr,
    Ts,

    // Text positioning
    Td,
    TD,
    Tm,
    TStar, // T*

    // Text showing
    Tj,
    TJ,
    Quote,       // '
    DoubleQuote, // "

    // XObject
    Do,

    // Inline image
    BI,
    ID,
    EI,

    // CMap structure
    BeginCMap,
    EndCMap,
    UseCMap,
    BeginCodeSpaceRange,
    EndCodeSpaceRange,
    BeginBfChar,
    EndBfChar,
    BeginBfRange,
    EndBfRange,
    BeginCidChar,
    EndCidChar,
    BeginCidRange,
    EndCidRange,
    BeginNotDefChar,
    EndNotDefChar,
    BeginNotDefRange,
    EndNotDefRange,
    Def,

    /// Anything else, with its original bytes.
    Unknown(Vec<u8>),
}

impl Keyword {
    pub fn from_bytes(b: &[u8]) -> Self {
        match b {
            b"[" => Self::ArrayStart,
            b"]" => Self::ArrayEnd,
            b"<<" => Self::DictStart,
            b">>" => Self::DictEnd,
            b"{" => Self::BraceOpen,
            b"}" => Self::BraceClose,
            b"null" => Self::Null,
            b"obj" => Self::Obj,
            b"endobj" => Self::EndObj,
            b"R" => Self::R,
            b"stream" => Self::Stream,
            b"endstream" => Self::EndStream,
            b"xref" => Self::Xref,
            b"trailer" => Self::Trailer,
            b"startxref" => Self::StartXref,
            b"q" => Self::Qq,
            b"Q" => Self::Q,
            b"cm" => Self::Cm,
            b"BT" => Self::BT,
            b"ET" => Self::ET,
            b"Tc" => Self::Tc,
            b"Tw" => Self::Tw,
            b"Tz" => Self::Tz,
            b"TL" => Self::TL,
            b"Tf" => Self::Tf,
            b"Tr" => Self::Tr,
            b"Ts" => Self::Ts,
            b"Td" => Self::Td,
            b"TD" => Self::TD,
            b"Tm" => Self::Tm,
            b"T*" => Self::TStar,
            b"Tj" => Self::Tj,
            b"TJ" => Self::TJ,
            b"'" => Self::Quote,
            b"\"" => Self::DoubleQuote,
            b"Do" => Self::Do,
            b"BI" => Self::BI,
            b"ID" => Self::ID,
            b"EI" => Self::EI,
            b"begincmap" => Self::BeginCMap,
            b"endcmap" => Self::EndCMap,
            b"usecmap" => Self::UseCMap,
            b"begincodespacerange" => Self::BeginCodeSpaceRange,
            b"endcodespacerange" => Self::EndCodeSpaceRange,
            b"beginbfchar" => Self::BeginBfChar,
            b"endbfchar" => Self::EndBfChar,
            b"beginbfrange" => Self::BeginBfRange,
            b"endbfrange" => Self::EndBfRange,
            b"begincidchar" => Self::BeginCidChar,
            b"endcidchar" => Self::EndCidChar,
            b"begincidrange" => Self::BeginCidRange,
            b"endcidrange" => Self::EndCidRange,
            b"beginnotdefchar" => Self::BeginNotDefChar,
            b"endnotdefchar" => Self::EndNotDefChar,
            b"beginnotdefrange" => Self::BeginNotDefRange,
            b"endnotdefrange" => Self::EndNotDefRange,
            b"def" => Self::Def,
            _ => Self::Unknown(b.to_vec()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::ArrayStart => b"[",
            Self::ArrayEnd => b"]",
            Self::DictStart => b"<<",
            Self::DictEnd => b">>",
            Self::BraceOpen => b"{",
            Self::BraceClose => b"}",
            Self::Null => b"null",
            Self::Obj => b"obj",
            Self::EndObj => b"endobj",
            Self::R => b"R",
            Self::Stream => b"stream",
            Self::EndStream => b"endstream",
            Self::Xref => b"xref",
            Self::Trailer => b"trailer",
            Self::StartXref => b"startxref",
            Self::Qq => b"q",
            Self::Q => b"Q",
            Self::Cm => b"cm",
            Self::BT => b"BT",
            Self::ET => b"ET",
            Self::Tc => b"Tc",
            Self::Tw => b"Tw",
            Self::Tz => b"Tz",
            Self::TL => b"TL",
            Self::Tf => b"Tf",
            Self::Tr => b"Tr",
            Self::Ts => b"Ts",
            Self::Td => b"Td",
            Self::TD => b"TD",
            Self::Tm => b"Tm",
            Self::TStar => b"T*",
            Self::Tj => b"Tj",
            Self::TJ => b"TJ",
            Self::Quote => b"'",
            Self::DoubleQuote => b"\"",
            Self::Do => b"Do",
            Self::BI => b"BI",
            Self::ID => b"ID",
            Self::EI => b"EI",
            Self::BeginCMap => b"begincmap",
            Self::EndCMap => b"endcmap",
            Self::UseCMap => b"usecmap",
            Self::BeginCodeSpaceRange => b"begincodespacerange",
            Self::EndCodeSpaceRange => b"endcodespacerange",
            Self::BeginBfChar => b"beginbfchar",
            Self::EndBfChar => b"endbfchar",
            Self::BeginBfRange => b"beginbfrange",
            Self::EndBfRange => b"endbfrange",
            Self::BeginCidChar => b"begincidchar",
            Self::EndCidChar => b"endcidchar",
            Self::BeginCidRange => b"begincidrange",
            Self::EndCidRange => b"endcidrange",
            Self::BeginNotDefChar => b"beginnotdefchar",
            Self::EndNotDefChar => b"endnotdefchar",
            Self::BeginNotDefRange => b"beginnotdefrange",
            Self::EndNotDefRange => b"endnotdefrange",
            Self::Def => b"def",
            Self::Unknown(bytes) => bytes.as_slice(),
        }
    }
}

/// Lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Real(f64),
    Bool(bool),
    /// Name (e.g. /Type), with `#xx` escapes decoded
    Name(String),
    /// Literal string `(...)`
    String(Vec<u8>),
    /// Hex string `<...>`
    HexString(Vec<u8>),
    Keyword(Keyword),
}

pub(crate) const fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x00' | b'\x0c')
}

pub(crate) const fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

const fn is_regular_end(b: u8) -> bool {
    is_whitespace(b) || is_delimiter(b)
}

const fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Names are kept byte-for-byte as Latin-1 characters.
pub(crate) fn name_from_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Byte-level tokenizer with random seek.
pub struct Lexer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current position in the buffer.
    pub fn tell(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.data.get(self.pos + offset).copied()
    }

    fn malformed(pos: usize, msg: impl Into<String>) -> PdfError {
        PdfError::MalformedToken {
            pos,
            msg: msg.into(),
        }
    }

    /// Skip whitespace and comments.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'%' {
                while let Some(c) = self.peek() {
                    if c == b'\r' || c == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            if !is_whitespace(b) {
                return;
            }
            self.pos += 1;
        }
    }

    fn parse_name(&mut self) -> Token {
        self.pos += 1; // '/'
        let mut name = Vec::new();
        while let Some(b) = self.peek() {
            if is_regular_end(b) {
                break;
            }
            if b == b'#' {
                if let (Some(h), Some(l)) = (
                    self.peek_at(1).and_then(hex_value),
                    self.peek_at(2).and_then(hex_value),
                ) {
                    name.push((h << 4) | l);
                    self.pos += 3;
                    continue;
                }
            }
            name.push(b);
            self.pos += 1;
        }
        Token::Name(name_from_bytes(&name))
    }

    fn parse_number(&mut self) -> Result<Token> {
        let start = self.pos;
        let mut has_dot = false;
        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.pos += 1;
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.pos += 1;
            } else if b == b'.' && !has_dot {
                has_dot = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        // ASCII by construction
        let text = std::str::from_utf8(&self.data[start..self.pos]).unwrap_or("");
        // Producers emit things like "--5" or "5-"; keep the numeric prefix.
        while let Some(b) = self.peek() {
            if b == b'-' || b == b'+' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if !has_dot {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Token::Int(n));
            }
        }
        let text = match text {
            "+" | "-" | "." | "+." | "-." => "0",
            t => t,
        };
        text.parse::<f64>()
            .map(Token::Real)
            .map_err(|_| Self::malformed(start, format!("invalid number {text:?}")))
    }

    fn parse_string(&mut self) -> Result<Token> {
        let start = self.pos;
        self.pos += 1; // '('
        let mut out = Vec::new();
        let mut depth = 1usize;
        loop {
            let Some(b) = self.peek() else {
                return Err(Self::malformed(start, "unterminated literal string"));
            };
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Token::String(out));
                    }
                    out.push(b);
                }
                b'\\' => {
                    let Some(e) = self.peek() else {
                        return Err(Self::malformed(start, "unterminated literal string"));
                    };
                    self.pos += 1;
                    match e {
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0c),
                        b'\r' => {
                            if self.peek() == Some(b'\n') {
                                self.pos += 1;
                            }
                        }
                        b'\n' => {}
                        b'0'..=b'7' => {
                            let mut value = (e - b'0') as u32;
                            for _ in 0..2 {
                                match self.peek() {
                                    Some(d @ b'0'..=b'7') => {
                                        value = value * 8 + (d - b'0') as u32;
                                        self.pos += 1;
                                    }
                                    _ => break,
                                }
                            }
                            out.push((value & 0xff) as u8);
                        }
                        other => out.push(other),
                    }
                }
                other => out.push(other),
            }
        }
    }

    fn parse_hex_string(&mut self) -> Result<Token> {
        let start = self.pos;
        self.pos += 1; // '<'
        let mut out = Vec::new();
        let mut high: Option<u8> = None;
        loop {
            let Some(c) = self.peek() else {
                return Err(Self::malformed(start, "unterminated hex string"));
            };
            self.pos += 1;
            if c == b'>' {
                break;
            }
            if is_whitespace(c) {
                continue;
            }
            let Some(nibble) = hex_value(c) else {
                // Resync after the closing bracket so the caller can continue.
                while let Some(b) = self.peek() {
                    self.pos += 1;
                    if b == b'>' {
                        break;
                    }
                }
                return Err(Self::malformed(
                    self.pos,
                    format!("invalid byte {c:#04x} in hex string"),
                ));
            };
            match high.take() {
                Some(h) => out.push((h << 4) | nibble),
                None => high = Some(nibble),
            }
        }
        if let Some(h) = high {
            out.push(h << 4);
        }
        Ok(Token::HexString(out))
    }

    fn parse_keyword(&mut self) -> Token {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_regular_end(b) {
                break;
            }
            self.pos += 1;
        }
        match &self.data[start..self.pos] {
            b"true" => Token::Bool(true),
            b"false" => Token::Bool(false),
            bytes => Token::Keyword(Keyword::from_bytes(bytes)),
        }
    }

    /// Get the next token with its starting offset.
    ///
    /// A malformed token is reported once and the cursor is left just past
    /// the offending bytes, so iteration can continue.
    pub fn next_token(&mut self) -> Option<Result<(usize, Token)>> {
        self.skip_whitespace();
        let pos = self.pos;
        let b = self.peek()?;
        let result = match b {
            b'/' => Ok(self.parse_name()),
            b'(' => self.parse_string(),
            b'<' if self.peek_at(1) == Some(b'<') => {
                self.pos += 2;
                Ok(Token::Keyword(Keyword::DictStart))
            }
            b'<' => self.parse_hex_string(),
            b'>' if self.peek_at(1) == Some(b'>') => {
                self.pos += 2;
                Ok(Token::Keyword(Keyword::DictEnd))
            }
            b'>' | b')' => {
                self.pos += 1;
                Err(Self::malformed(pos, format!("stray '{}'", b as char)))
            }
            b'[' | b']' | b'{' | b'}' => {
                self.pos += 1;
                Ok(Token::Keyword(Keyword::from_bytes(&[b])))
            }
            b'+' | b'-' | b'.' => {
                let next = self.peek_at(1);
                if matches!(next, Some(c) if c.is_ascii_digit() || (c == b'.' && b != b'.')) {
                    self.parse_number()
                } else {
                    Ok(self.parse_keyword())
                }
            }
            c if c.is_ascii_digit() => self.parse_number(),
            _ => Ok(self.parse_keyword()),
        };
        Some(result.map(|token| (pos, token)))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<(usize, Token)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(data: &[u8]) -> Vec<Token> {
        Lexer::new(data).map(|t| t.unwrap().1).collect()
    }

    #[test]
    fn keyword_table_is_symmetric() {
        for kw in [Keyword::Obj, Keyword::TStar, Keyword::BeginBfRange, Keyword::DoubleQuote] {
            assert_eq!(Keyword::from_bytes(kw.as_bytes()), kw);
        }
        assert_eq!(
            Keyword::from_bytes(b"sh"),
            Keyword::Unknown(b"sh".to_vec())
        );
    }

    #[test]
    fn numbers_and_names() {
        assert_eq!(
            tokens(b"0 +1 -2 .5 1.234 -.25 /a/BCD /foo#5fbar /A#2"),
            vec![
                Token::Int(0),
                Token::Int(1),
                Token::Int(-2),
                Token::Real(0.5),
                Token::Real(1.234),
                Token::Real(-0.25),
                Token::Name("a".into()),
                Token::Name("BCD".into()),
                Token::Name("foo_bar".into()),
                Token::Name("A#2".into()),
            ]
        );
    }

    #[test]
    fn literal_string_escapes() {
        let toks = tokens(b"(a (nested) b) (x\\n\\101\\\\) (line\\\ncont) (\\0053)");
        assert_eq!(
            toks,
            vec![
                Token::String(b"a (nested) b".to_vec()),
                Token::String(b"x\nA\\".to_vec()),
                Token::String(b"linecont".to_vec()),
                Token::String(b"\x053".to_vec()),
            ]
        );
    }

    #[test]
    fn hex_string_pads_odd_length() {
        assert_eq!(
            tokens(b"<48 65 6c6C6f> <abc> <>"),
            vec![
                Token::HexString(b"Hello".to_vec()),
                Token::HexString(vec![0xab, 0xc0]),
                Token::HexString(vec![]),
            ]
        );
    }

    #[test]
    fn comments_are_transparent() {
        assert_eq!(
            tokens(b"1 % comment ) > here\n2 (not % a comment)"),
            vec![
                Token::Int(1),
                Token::Int(2),
                Token::String(b"not % a comment".to_vec())
            ]
        );
    }

    #[test]
    fn delimiters_and_booleans() {
        assert_eq!(
            tokens(b"<</A[true false null]>>{}"),
            vec![
                Token::Keyword(Keyword::DictStart),
                Token::Name("A".into()),
                Token::Keyword(Keyword::ArrayStart),
                Token::Bool(true),
                Token::Bool(false),
                Token::Keyword(Keyword::Null),
                Token::Keyword(Keyword::ArrayEnd),
                Token::Keyword(Keyword::DictEnd),
                Token::Keyword(Keyword::BraceOpen),
                Token::Keyword(Keyword::BraceClose),
            ]
        );
    }

    #[test]
    fn malformed_tokens_report_position_and_resume() {
        let mut lexer = Lexer::new(b"1 ) 2");
        assert_eq!(lexer.next_token().unwrap().unwrap(), (0, Token::Int(1)));
        match lexer.next_token().unwrap() {
            Err(PdfError::MalformedToken { pos, .. }) => assert_eq!(pos, 2),
            other => panic!("expected MalformedToken, got {other:?}"),
        }
        assert_eq!(lexer.next_token().unwrap().unwrap(), (4, Token::Int(2)));
        assert!(lexer.next_token().is_none());
    }

    #[test]
    fn unterminated_string_is_malformed() {
        let mut lexer = Lexer::new(b"(abc");
        assert!(matches!(
            lexer.next_token(),
            Some(Err(PdfError::MalformedToken { pos: 0, .. }))
        ));
        let mut lexer = Lexer::new(b"<41 zz> 7");
        assert!(matches!(
            lexer.next_token(),
            Some(Err(PdfError::MalformedToken { .. }))
        ));
        assert_eq!(lexer.next_token().unwrap().unwrap().1, Token::Int(7));
    }

    #[test]
    fn seek_then_tokenize() {
        let mut lexer = Lexer::new(b"junk 12 0 obj");
        lexer.set_pos(5);
        assert_eq!(lexer.next_token().unwrap().unwrap(), (5, Token::Int(12)));
        assert_eq!(lexer.tell(), 7);
    }
}
