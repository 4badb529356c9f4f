//! The PDF value model.
//!
//! Values form a closed sum type. Indirect links stay as [`PDFObjRef`] keys
//! and are followed only through the owning document, so the model never
//! holds cycles.

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;

use crate::error::{PdfError, Result};

/// Dictionary payload shared by dictionaries and stream headers.
pub type PDFDict = HashMap<String, PDFObject>;

#[derive(Debug, Clone, PartialEq)]
pub enum PDFObject {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    /// Name without the leading slash, `#xx` escapes already decoded
    Name(String),
    /// Raw string bytes; text decoding is the caller's business
    String(Vec<u8>),
    Array(Vec<Self>),
    Dict(PDFDict),
    Stream(Box<PDFStream>),
    Ref(PDFObjRef),
}

/// Borrowing accessors: `Ok` for the matching variant, `TypeError` naming
/// both sides otherwise.
macro_rules! accessor {
    ($(#[$doc:meta])* $fn:ident, $variant:ident, $out:ty, $expected:literal) => {
        $(#[$doc])*
        pub fn $fn(&self) -> Result<$out> {
            match self {
                Self::$variant(v) => Ok(v),
                other => Err(other.mismatch($expected)),
            }
        }
    };
}

impl PDFObject {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    accessor!(as_name, Name, &str, "name");
    accessor!(
        /// Raw bytes of a string object.
        as_string, String, &[u8], "string"
    );
    accessor!(as_array, Array, &[Self], "array");
    accessor!(as_dict, Dict, &PDFDict, "dict");
    accessor!(as_stream, Stream, &PDFStream, "stream");
    accessor!(
        /// The reference itself, unresolved.
        as_objref, Ref, &PDFObjRef, "ref"
    );

    /// Integer value. Reals with no fractional part are accepted, since
    /// producers write `/Count 3.0` often enough.
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Self::Int(n) => Ok(*n),
            Self::Real(n) if n.fract() == 0.0 => Ok(*n as i64),
            other => Err(other.mismatch("int")),
        }
    }

    pub fn as_num(&self) -> Result<f64> {
        match self {
            Self::Int(n) => Ok(*n as f64),
            Self::Real(n) => Ok(*n),
            other => Err(other.mismatch("number")),
        }
    }

    /// Dictionary view of a dict or of a stream header.
    pub fn as_dict_like(&self) -> Result<&PDFDict> {
        match self {
            Self::Dict(d) => Ok(d),
            Self::Stream(s) => Ok(&s.attrs),
            other => Err(other.mismatch("dict")),
        }
    }

    /// Key lookup on a dict or stream header; every other variant has no keys.
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_dict_like().ok()?.get(key)
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::Name(_) => "name",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
            Self::Stream(_) => "stream",
            Self::Ref(_) => "ref",
        }
    }

    fn mismatch(&self, expected: &'static str) -> PdfError {
        PdfError::TypeError {
            expected,
            got: self.type_name(),
        }
    }
}

impl From<PDFObjRef> for PDFObject {
    fn from(r: PDFObjRef) -> Self {
        Self::Ref(r)
    }
}

impl From<PDFStream> for PDFObject {
    fn from(s: PDFStream) -> Self {
        Self::Stream(Box::new(s))
    }
}

/// Close to PDF syntax, with dictionary keys sorted so output is stable.
impl fmt::Display for PDFObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Real(n) => write!(f, "{n}"),
            Self::Name(n) => write!(f, "/{n}"),
            Self::String(s) => write!(f, "({})", String::from_utf8_lossy(s)),
            Self::Array(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(" "))
            }
            Self::Dict(d) => fmt_dict(f, d),
            Self::Stream(s) => {
                fmt_dict(f, &s.attrs)?;
                write!(f, " stream[{} bytes]", s.rawdata.len())
            }
            Self::Ref(r) => write!(f, "{} {} R", r.objid, r.genno),
        }
    }
}

fn fmt_dict(f: &mut fmt::Formatter<'_>, d: &PDFDict) -> fmt::Result {
    let mut entries: Vec<(&String, &PDFObject)> = d.iter().collect();
    entries.sort_by_key(|(k, _)| *k);
    f.write_str("<<")?;
    for (key, value) in entries {
        write!(f, " /{key} {value}")?;
    }
    f.write_str(" >>")
}

/// `objid genno R`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PDFObjRef {
    pub objid: u32,
    pub genno: u32,
}

impl PDFObjRef {
    pub const fn new(objid: u32, genno: u32) -> Self {
        Self { objid, genno }
    }
}

/// A stream header and its still-encoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PDFStream {
    pub attrs: PDFDict,
    rawdata: Bytes,
    /// Owning indirect object, once the parser knows it
    pub objid: Option<u32>,
    pub genno: Option<u32>,
}

impl PDFStream {
    pub fn new(attrs: PDFDict, rawdata: impl Into<Bytes>) -> Self {
        Self {
            attrs,
            rawdata: rawdata.into(),
            objid: None,
            genno: None,
        }
    }

    pub const fn set_objid(&mut self, objid: u32, genno: u32) {
        self.objid = Some(objid);
        self.genno = Some(genno);
    }

    pub fn get_rawdata(&self) -> &[u8] {
        &self.rawdata
    }

    /// Payload as a cheap clone of the underlying buffer.
    pub fn rawdata_bytes(&self) -> Bytes {
        self.rawdata.clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&PDFObject> {
        self.attrs.get(key)
    }

    /// `/Type`, when it is a name.
    pub fn type_name(&self) -> Option<&str> {
        self.get("Type")?.as_name().ok()
    }
}

/// Integer value of an optional entry, `default` when absent or mistyped.
pub fn int_or(obj: Option<&PDFObject>, default: i64) -> i64 {
    obj.and_then(|o| o.as_int().ok()).unwrap_or(default)
}

pub fn num_or(obj: Option<&PDFObject>, default: f64) -> f64 {
    obj.and_then(|o| o.as_num().ok()).unwrap_or(default)
}
