//! Character maps (CMaps).
//!
//! Two kinds are read from the same PostScript-like syntax:
//! - [`CMap`]: character codes to CIDs, for `/Encoding` of Type0 fonts
//! - [`ToUnicodeMap`]: character codes to Unicode text, for `/ToUnicode`

use rustc_hash::FxHashMap;
use tracing::debug;

use super::encoding::name2unicode;
use crate::error::{PdfError, Result};
use crate::parser::{Keyword, Lexer, Token};
use crate::utils::nunpack;

/// A codespace range. A code matches when it has the same length and each
/// byte lies within the bounds of the corresponding bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodespaceRange {
    low: Vec<u8>,
    high: Vec<u8>,
}

impl CodespaceRange {
    pub fn new(low: Vec<u8>, high: Vec<u8>) -> Self {
        Self { low, high }
    }

    pub fn len(&self) -> usize {
        self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_empty()
    }

    fn matches(&self, code: &[u8]) -> bool {
        code.len() == self.low.len()
            && self.high.len() == self.low.len()
            && code
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(b, (lo, hi))| lo <= b && b <= hi)
    }
}

/// A contiguous run of codes of one byte length mapped onto CIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CidRange {
    len: usize,
    low: u32,
    high: u32,
    cid: u32,
}

impl CidRange {
    fn lookup(&self, len: usize, code: u32) -> Option<u32> {
        (len == self.len && (self.low..=self.high).contains(&code))
            .then(|| self.cid + (code - self.low))
    }
}

/// A CMap read from an embedded stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedCMap {
    name: Option<String>,
    vertical: bool,
    codespace: Vec<CodespaceRange>,
    chars: FxHashMap<(usize, u32), u32>,
    ranges: Vec<CidRange>,
    notdef: Vec<CidRange>,
    /// Set by `usecmap` of a predefined Identity map.
    identity_parent: bool,
}

impl EmbeddedCMap {
    fn code_len(&self, data: &[u8]) -> usize {
        let max = data.len().min(4);
        if self.codespace.is_empty() {
            if self.identity_parent {
                return max.min(2);
            }
            // without codespace ranges, take the longest mapped prefix
            return (1..=max)
                .rev()
                .find(|&n| self.mapped(n, nunpack(&data[..n], 0) as u32).is_some())
                .unwrap_or(1);
        }
        if let Some(n) = (1..=max).find(|&n| self.codespace.iter().any(|r| r.matches(&data[..n]))) {
            return n;
        }
        // invalid code: consume as many bytes as the shortest range
        self.codespace
            .iter()
            .map(CodespaceRange::len)
            .min()
            .unwrap_or(1)
            .clamp(1, max.max(1))
    }

    fn mapped(&self, len: usize, code: u32) -> Option<u32> {
        self.chars
            .get(&(len, code))
            .copied()
            .or_else(|| self.ranges.iter().find_map(|r| r.lookup(len, code)))
    }

    fn cid(&self, len: usize, code: u32) -> u32 {
        self.mapped(len, code)
            .or_else(|| self.identity_parent.then_some(code))
            .or_else(|| self.notdef.iter().find_map(|r| r.lookup(len, code)))
            .unwrap_or(0)
    }
}

/// Code to CID map of a Type0 font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CMap {
    /// `Identity-H` / `Identity-V` (and `DLIdent-*`): two-byte codes equal
    /// to their CIDs.
    Identity { vertical: bool },
    /// `OneByteIdentityH` / `OneByteIdentityV`: each byte is its own CID.
    OneByteIdentity { vertical: bool },
    Embedded(Box<EmbeddedCMap>),
}

impl CMap {
    /// One of the predefined CMaps by name.
    pub fn predefined(name: &str) -> Result<Self> {
        match name {
            "Identity-H" | "DLIdent-H" => Ok(Self::Identity { vertical: false }),
            "Identity-V" | "DLIdent-V" => Ok(Self::Identity { vertical: true }),
            "OneByteIdentityH" => Ok(Self::OneByteIdentity { vertical: false }),
            "OneByteIdentityV" => Ok(Self::OneByteIdentity { vertical: true }),
            _ => Err(PdfError::CMapNotFound(name.to_string())),
        }
    }

    /// Parse an embedded CMap stream. Unreadable parts are skipped.
    pub fn parse(data: &[u8]) -> Self {
        let parsed = parse_cmap(data);
        let mut cmap = EmbeddedCMap {
            name: parsed.name,
            vertical: parsed.wmode == 1,
            codespace: parsed.codespace,
            ..Default::default()
        };
        for (code, cid) in parsed.cidchars {
            cmap.chars.insert((code.len(), nunpack(&code, 0) as u32), cid);
        }
        cmap.ranges = parsed.cidranges;
        cmap.notdef = parsed.notdef;
        if let Some(parent) = parsed.usecmap.as_deref() {
            match Self::predefined(parent) {
                Ok(Self::Identity { vertical }) => {
                    cmap.identity_parent = true;
                    cmap.vertical |= vertical;
                }
                _ => debug!(parent, "usecmap of unsupported parent ignored"),
            }
        }
        Self::Embedded(Box::new(cmap))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Identity { vertical: false } => Some("Identity-H"),
            Self::Identity { vertical: true } => Some("Identity-V"),
            Self::OneByteIdentity { vertical: false } => Some("OneByteIdentityH"),
            Self::OneByteIdentity { vertical: true } => Some("OneByteIdentityV"),
            Self::Embedded(cmap) => cmap.name.as_deref(),
        }
    }

    pub fn is_vertical(&self) -> bool {
        match self {
            Self::Identity { vertical } | Self::OneByteIdentity { vertical } => *vertical,
            Self::Embedded(cmap) => cmap.vertical,
        }
    }

    /// Split `data` into character codes, each paired with its CID.
    pub fn decode(&self, data: &[u8]) -> Vec<(u32, u32)> {
        let mut out = Vec::with_capacity(data.len() / 2 + 1);
        let mut pos = 0;
        while pos < data.len() {
            let rest = &data[pos..];
            match self {
                Self::Identity { .. } => {
                    // a trailing odd byte is padded as the high byte of a code
                    let code = match rest {
                        [hi, lo, ..] => u16::from_be_bytes([*hi, *lo]) as u32,
                        [hi] => (*hi as u32) << 8,
                        [] => break,
                    };
                    out.push((code, code));
                    pos += 2;
                }
                Self::OneByteIdentity { .. } => {
                    let code = rest[0] as u32;
                    out.push((code, code));
                    pos += 1;
                }
                Self::Embedded(cmap) => {
                    let len = cmap.code_len(rest);
                    let code = nunpack(&rest[..len], 0) as u32;
                    out.push((code, cmap.cid(len, code)));
                    pos += len;
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BfTarget {
    /// UTF-16BE of the first code; later codes increment its last bytes.
    Incrementing(Vec<u8>),
    /// One destination per code.
    Array(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BfRange {
    low: u32,
    high: u32,
    target: BfTarget,
}

impl BfRange {
    fn lookup(&self, code: u32) -> Option<String> {
        if !(self.low..=self.high).contains(&code) {
            return None;
        }
        let offset = code - self.low;
        match &self.target {
            BfTarget::Array(items) => items.get(offset as usize).cloned(),
            BfTarget::Incrementing(start) => {
                let split = start.len().saturating_sub(4);
                let (prefix, var) = start.split_at(split);
                let next = (nunpack(var, 0) as u32).wrapping_add(offset).to_be_bytes();
                let mut bytes = prefix.to_vec();
                bytes.extend_from_slice(&next[4 - var.len()..]);
                Some(utf16be_text(&bytes))
            }
        }
    }
}

/// Character code to Unicode map read from a `/ToUnicode` stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToUnicodeMap {
    chars: FxHashMap<u32, String>,
    ranges: Vec<BfRange>,
    /// Unmapped codes are taken as Unicode scalar values.
    identity: bool,
}

impl ToUnicodeMap {
    pub fn parse(data: &[u8]) -> Self {
        let parsed = parse_cmap(data);
        let mut map = Self {
            chars: FxHashMap::default(),
            ranges: parsed.bfranges,
            identity: false,
        };
        for (code, text) in parsed.bfchars {
            map.add_char(code, text);
        }
        map
    }

    fn add_char(&mut self, code: u32, text: String) {
        // some fonts map one glyph to both space and nbsp; keep the space
        if text == "\u{a0}" && self.chars.get(&code).is_some_and(|t| t == " ") {
            return;
        }
        self.chars.insert(code, text);
    }

    /// A map reading every code as its own code point, for a `/ToUnicode`
    /// given as a name such as `/Identity-H`.
    pub fn identity() -> Self {
        Self {
            identity: true,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.identity && self.chars.is_empty() && self.ranges.is_empty()
    }

    pub fn get(&self, code: u32) -> Option<String> {
        if let Some(text) = self.chars.get(&code) {
            return Some(text.clone());
        }
        self.ranges
            .iter()
            .find_map(|r| r.lookup(code))
            .or_else(|| {
                self.identity
                    .then_some(code)
                    .and_then(char::from_u32)
                    .map(String::from)
            })
    }
}

fn utf16be_text(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|c| match c {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [b] => *b as u16,
            _ => 0,
        })
        .collect();
    String::from_utf16_lossy(&units)
}

/// Destination of a bfchar entry: UTF-16BE text or a glyph name.
fn bf_text(token: &Token) -> Option<String> {
    match token {
        Token::HexString(b) | Token::String(b) => Some(utf16be_text(b)),
        Token::Name(n) => name2unicode(n).ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Token(Token),
    Array(Vec<Token>),
}

impl Operand {
    fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Token(Token::HexString(b) | Token::String(b)) => Some(b),
            _ => None,
        }
    }

    fn int(&self) -> Option<u32> {
        match self {
            Self::Token(Token::Int(i)) => u32::try_from(*i).ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct ParsedCMap {
    name: Option<String>,
    wmode: i64,
    usecmap: Option<String>,
    codespace: Vec<CodespaceRange>,
    cidchars: Vec<(Vec<u8>, u32)>,
    cidranges: Vec<CidRange>,
    notdef: Vec<CidRange>,
    bfchars: Vec<(u32, String)>,
    bfranges: Vec<BfRange>,
}

fn cid_ranges(operands: &[Operand]) -> Vec<CidRange> {
    operands
        .chunks_exact(3)
        .filter_map(|t| {
            let (lo, hi) = (t[0].bytes()?, t[1].bytes()?);
            let low = nunpack(lo, 0) as u32;
            let high = nunpack(hi, 0) as u32;
            (low <= high).then_some(CidRange {
                len: lo.len(),
                low,
                high,
                cid: t[2].int()?,
            })
        })
        .collect()
}

fn cid_chars(operands: &[Operand]) -> impl Iterator<Item = (Vec<u8>, u32)> + '_ {
    operands
        .chunks_exact(2)
        .filter_map(|p| Some((p[0].bytes()?.to_vec(), p[1].int()?)))
}

fn parse_cmap(data: &[u8]) -> ParsedCMap {
    let mut out = ParsedCMap::default();
    let mut operands: Vec<Operand> = Vec::new();
    let mut array: Option<Vec<Token>> = None;

    for item in Lexer::new(data) {
        // malformed tokens are skipped
        let Ok((_, token)) = item else { continue };
        let kw = match token {
            Token::Keyword(kw) => kw,
            other => {
                match array.as_mut() {
                    Some(items) => items.push(other),
                    None => operands.push(Operand::Token(other)),
                }
                continue;
            }
        };
        match kw {
            Keyword::ArrayStart => array = Some(Vec::new()),
            Keyword::ArrayEnd => {
                if let Some(items) = array.take() {
                    operands.push(Operand::Array(items));
                }
            }
            Keyword::Def => {
                if let [.., Operand::Token(Token::Name(key)), value] = operands.as_slice() {
                    match (key.as_str(), value) {
                        ("CMapName", Operand::Token(Token::Name(n))) => out.name = Some(n.clone()),
                        ("WMode", Operand::Token(Token::Int(w))) => out.wmode = *w,
                        _ => {}
                    }
                }
                operands.clear();
            }
            Keyword::UseCMap => {
                if let Some(Operand::Token(Token::Name(n))) = operands.last() {
                    out.usecmap = Some(n.clone());
                }
                operands.clear();
            }
            Keyword::EndCodeSpaceRange => {
                out.codespace.extend(operands.chunks_exact(2).filter_map(|p| {
                    let (lo, hi) = (p[0].bytes()?, p[1].bytes()?);
                    Some(CodespaceRange::new(lo.to_vec(), hi.to_vec()))
                }));
                operands.clear();
            }
            Keyword::EndCidRange => {
                out.cidranges.extend(cid_ranges(&operands));
                operands.clear();
            }
            Keyword::EndCidChar => {
                out.cidchars.extend(cid_chars(&operands));
                operands.clear();
            }
            Keyword::EndNotDefRange => {
                out.notdef.extend(cid_ranges(&operands));
                operands.clear();
            }
            Keyword::EndNotDefChar => {
                out.notdef.extend(cid_chars(&operands).map(|(code, cid)| {
                    let value = nunpack(&code, 0) as u32;
                    CidRange {
                        len: code.len(),
                        low: value,
                        high: value,
                        cid,
                    }
                }));
                operands.clear();
            }
            Keyword::EndBfChar => {
                for pair in operands.chunks_exact(2) {
                    let (Some(code), Operand::Token(dest)) = (pair[0].bytes(), &pair[1]) else {
                        continue;
                    };
                    if let Some(text) = bf_text(dest) {
                        out.bfchars.push((nunpack(code, 0) as u32, text));
                    }
                }
                operands.clear();
            }
            Keyword::EndBfRange => {
                for triple in operands.chunks_exact(3) {
                    let (Some(lo), Some(hi)) = (triple[0].bytes(), triple[1].bytes()) else {
                        continue;
                    };
                    let (low, high) = (nunpack(lo, 0) as u32, nunpack(hi, 0) as u32);
                    if low > high {
                        continue;
                    }
                    let target = match &triple[2] {
                        Operand::Array(items) => BfTarget::Array(
                            items.iter().map(|t| bf_text(t).unwrap_or_default()).collect(),
                        ),
                        Operand::Token(Token::HexString(b) | Token::String(b)) => {
                            BfTarget::Incrementing(b.clone())
                        }
                        Operand::Token(_) => continue,
                    };
                    out.bfranges.push(BfRange { low, high, target });
                }
                operands.clear();
            }
            Keyword::BeginCodeSpaceRange
            | Keyword::BeginCidRange
            | Keyword::BeginCidChar
            | Keyword::BeginNotDefRange
            | Keyword::BeginNotDefChar
            | Keyword::BeginBfChar
            | Keyword::BeginBfRange
            | Keyword::BeginCMap
            | Keyword::EndCMap => operands.clear(),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_BYTE: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CMapName /Test-H def
/WMode 0 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 begincidrange
<0020> <007E> 1
<8140> <817E> 633
endcidrange
1 begincidchar
<9000> 5000
endcidchar
1 beginnotdefrange
<0000> <001F> 999
endnotdefrange
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

    #[test]
    fn identity_pairs_bytes() {
        let cmap = CMap::predefined("Identity-H").unwrap();
        assert_eq!(cmap.decode(&[0x00, 0x41, 0x01, 0x02]), [(0x41, 0x41), (0x102, 0x102)]);
        assert!(!cmap.is_vertical());
        assert!(CMap::predefined("Identity-V").unwrap().is_vertical());
        assert!(matches!(CMap::predefined("UniJIS-UCS2-H"), Err(PdfError::CMapNotFound(_))));
    }

    #[test]
    fn dlident_and_one_byte_identity() {
        let dl = CMap::predefined("DLIdent-V").unwrap();
        assert!(dl.is_vertical());
        assert_eq!(dl.decode(&[0x30, 0x42]), [(0x3042, 0x3042)]);

        let one = CMap::predefined("OneByteIdentityH").unwrap();
        assert!(!one.is_vertical());
        assert_eq!(one.name(), Some("OneByteIdentityH"));
        assert_eq!(one.decode(b"AB"), [(0x41, 0x41), (0x42, 0x42)]);
        assert!(CMap::predefined("OneByteIdentityV").unwrap().is_vertical());
    }

    #[test]
    fn embedded_ranges_chars_and_notdef() {
        let cmap = CMap::parse(TWO_BYTE);
        assert_eq!(cmap.name(), Some("Test-H"));
        let cids: Vec<u32> = cmap
            .decode(&[0x00, 0x20, 0x00, 0x21, 0x81, 0x41, 0x90, 0x00, 0x00, 0x05, 0xA0, 0x00])
            .into_iter()
            .map(|(_, cid)| cid)
            .collect();
        assert_eq!(cids, [1, 2, 634, 5000, 999, 0]);
    }

    #[test]
    fn mixed_width_codespace() {
        let data = b"begincmap
2 begincodespacerange
<00> <80>
<8140> <9FFC>
endcodespacerange
1 begincidrange
<00> <80> 0
endcidrange
1 begincidrange
<8140> <817E> 200
endcidrange
/WMode 1 def
endcmap";
        let cmap = CMap::parse(data);
        assert!(cmap.is_vertical());
        assert_eq!(cmap.decode(&[0x41, 0x81, 0x42, 0x05]), [(0x41, 0x41), (0x8142, 202), (0x05, 5)]);
    }

    #[test]
    fn usecmap_identity_parent() {
        let cmap = CMap::parse(b"/Identity-V usecmap\nbegincmap\nendcmap");
        assert!(cmap.is_vertical());
        assert_eq!(cmap.decode(&[0x12, 0x34]), [(0x1234, 0x1234)]);
    }

    #[test]
    fn tounicode_forms() {
        let data = b"/CIDInit /ProcSet findresource begin
begincmap
1 begincodespacerange <0000> <FFFF> endcodespacerange
4 beginbfchar
<0041> <0041>
<0003> <0020>
<0003> <00A0>
<0010> <D83DDE00>
endbfchar
1 beginbfchar
<0011> <006600660069>
endbfchar
2 beginbfrange
<0050> <0052> <0061>
<0060> <0062> [<0058> <0059> <005A>]
endbfrange
endcmap";
        let map = ToUnicodeMap::parse(data);
        assert_eq!(map.get(0x41).as_deref(), Some("A"));
        assert_eq!(map.get(0x03).as_deref(), Some(" "));
        assert_eq!(map.get(0x10).as_deref(), Some("\u{1F600}"));
        assert_eq!(map.get(0x11).as_deref(), Some("ffi"));
        assert_eq!(map.get(0x51).as_deref(), Some("b"));
        assert_eq!(map.get(0x52).as_deref(), Some("c"));
        assert_eq!(map.get(0x62).as_deref(), Some("Z"));
        assert_eq!(map.get(0x99), None);
    }

    #[test]
    fn identity_tounicode_reads_codes_as_code_points() {
        let map = ToUnicodeMap::identity();
        assert!(!map.is_empty());
        assert_eq!(map.get(0x41).as_deref(), Some("A"));
        assert_eq!(map.get(0x3042).as_deref(), Some("\u{3042}"));
        // lone surrogates have no scalar value
        assert_eq!(map.get(0xD800), None);
    }

    #[test]
    fn bfchar_glyph_name_destination() {
        let map = ToUnicodeMap::parse(b"1 beginbfchar <01> /fi endbfchar");
        assert_eq!(map.get(1).as_deref(), Some("\u{FB01}"));
    }
}
