//! PDF Document - main entry point for PDF parsing.
//!
//! Handles:
//! - xref loading across revisions, with brute-force recovery
//! - lazy object resolution through a shared cache
//! - object streams
//! - trailer, catalog, Info and XMP metadata

use std::cell::RefCell;
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use bytes::Bytes;
use memmap2::Mmap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use super::objstm::ObjectStream;
use super::xref::{
    XRefLocation, XRefTable, find_startxref, load_xref_chain, rebuild_xref, scan_object_headers,
    scan_object_streams,
};
use crate::codec::{Decoded, decode, filter_chain};
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObjRef, PDFObject, PDFStream};
use crate::parser::{LengthResolver, PDFParser};
use crate::utils::{decode_text, find_bytes};

pub const DEFAULT_MAX_REF_DEPTH: usize = 100;

/// Document-level parsing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Fail instead of recovering from broken structure.
    pub strict: bool,
    /// Longest `Ref -> Ref` chain `resolve_deep` follows.
    pub max_ref_depth: usize,
    /// Rebuild the xref by scanning when it cannot be loaded.
    pub with_fallback: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_ref_depth: DEFAULT_MAX_REF_DEPTH,
            with_fallback: true,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub const fn max_ref_depth(mut self, depth: usize) -> Self {
        self.max_ref_depth = depth;
        self
    }

    pub const fn with_fallback(mut self, fallback: bool) -> Self {
        self.with_fallback = fallback;
        self
    }
}

thread_local! {
    /// Objects being parsed on this thread, for cycle detection.
    static RESOLVING: RefCell<FxHashSet<u32>> = RefCell::new(FxHashSet::default());
}

/// Removes an objid from the in-progress set when dropped.
struct ResolvingGuard(u32);

impl ResolvingGuard {
    fn enter(objid: u32) -> Option<Self> {
        let fresh = RESOLVING.with(|set| set.borrow_mut().insert(objid));
        fresh.then(|| Self(objid))
    }
}

impl Drop for ResolvingGuard {
    fn drop(&mut self) {
        RESOLVING.with(|set| {
            set.borrow_mut().remove(&self.0);
        });
    }
}

/// PDF Document - provides access to PDF objects and metadata.
/// Owns its data via Bytes for thread-safe sharing.
pub struct PDFDocument {
    data: Bytes,
    options: ParseOptions,
    xref: XRefTable,
    trailer: PDFDict,
    catalog: PDFDict,
    cache: Mutex<FxHashMap<u32, Arc<PDFObject>>>,
    objstms: Mutex<FxHashMap<u32, Arc<ObjectStream>>>,
    scan_index: OnceLock<FxHashMap<u32, (usize, u32)>>,
    /// Objects found inside scanned object streams: `(stream objid, index)`
    scan_objstms: OnceLock<FxHashMap<u32, (u32, usize)>>,
}

impl std::fmt::Debug for PDFDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PDFDocument")
            .field("len", &self.data.len())
            .field("revisions", &self.xref.revisions())
            .field("fallback", &self.xref.is_fallback())
            .finish_non_exhaustive()
    }
}

impl PDFDocument {
    /// Create a new PDFDocument from raw PDF data with default options.
    pub fn new<D: AsRef<[u8]>>(data: D) -> Result<Self> {
        Self::with_options(data, ParseOptions::default())
    }

    pub fn with_options<D: AsRef<[u8]>>(data: D, options: ParseOptions) -> Result<Self> {
        Self::from_bytes(Bytes::copy_from_slice(data.as_ref()), options)
    }

    /// Create a new PDFDocument from shared bytes (zero-copy).
    pub fn from_bytes(data: Bytes, options: ParseOptions) -> Result<Self> {
        let mut doc = Self {
            data,
            options,
            xref: XRefTable::default(),
            trailer: PDFDict::new(),
            catalog: PDFDict::new(),
            cache: Mutex::new(FxHashMap::default()),
            objstms: Mutex::new(FxHashMap::default()),
            scan_index: OnceLock::new(),
            scan_objstms: OnceLock::new(),
        };
        doc.load()?;
        Ok(doc)
    }

    /// Create a new PDFDocument from a memory-mapped PDF.
    pub fn from_mmap(mmap: Mmap, options: ParseOptions) -> Result<Self> {
        Self::from_bytes(Bytes::from_owner(mmap), options)
    }

    /// Memory-map the file at `path`.
    pub fn open(path: impl AsRef<Path>, options: ParseOptions) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the map is read-only; the file is not expected to change while open.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_mmap(mmap, options)
    }

    fn load(&mut self) -> Result<()> {
        if self.data.is_empty() {
            return Err(PdfError::NotPdf);
        }
        let head = &self.data[..self.data.len().min(1024)];
        let has_header = find_bytes(head, b"%PDF-", 0).is_some();

        let loaded = find_startxref(&self.data).and_then(|pos| load_xref_chain(&self.data, pos));
        self.xref = match loaded {
            Ok(table) if table.trailer().contains_key("Root") => table,
            Ok(_) => self.recover(has_header, PdfError::TrailerNotFound)?,
            Err(e) => self.recover(has_header, e)?,
        };
        self.trailer = self.xref.trailer();

        match self.load_catalog() {
            Ok(catalog) => self.catalog = catalog,
            Err(e) if !self.xref.is_fallback() && !self.options.strict && self.options.with_fallback => {
                // the xref loaded but points at garbage; start over from a scan
                warn!(error = %e, "catalog unreadable through xref, rescanning file");
                self.xref = self.recover(has_header, e)?;
                self.trailer = self.xref.trailer();
                self.cache_lock().clear();
                self.catalog = self.load_catalog().unwrap_or_else(|e| {
                    warn!(error = %e, "no usable catalog");
                    PDFDict::new()
                });
            }
            Err(e) if self.options.strict => return Err(e),
            Err(e) => {
                warn!(error = %e, "no usable catalog");
            }
        }
        debug!(
            revisions = self.xref.revisions(),
            fallback = self.xref.is_fallback(),
            "document loaded"
        );
        Ok(())
    }

    fn recover(&self, has_header: bool, cause: PdfError) -> Result<XRefTable> {
        if self.options.strict || !self.options.with_fallback {
            return Err(if has_header { cause } else { PdfError::NotPdf });
        }
        warn!(error = %cause, "xref unusable, falling back to object scan");
        match rebuild_xref(&self.data) {
            Err(PdfError::NotPdf) if has_header => Err(cause),
            other => other,
        }
    }

    fn load_catalog(&self) -> Result<PDFDict> {
        let root = self.trailer.get("Root").ok_or(PdfError::TrailerNotFound)?;
        let root = self.resolve_deep(root)?;
        match root.as_ref() {
            PDFObject::Dict(d) => Ok(d.clone()),
            PDFObject::Null => Err(match self.trailer.get("Root") {
                Some(PDFObject::Ref(r)) => PdfError::UnresolvedReference {
                    objid: r.objid,
                    genno: r.genno,
                },
                _ => PdfError::TrailerNotFound,
            }),
            other => Err(PdfError::TypeError {
                expected: "catalog dict",
                got: other.type_name(),
            }),
        }
    }

    fn cache_lock(&self) -> std::sync::MutexGuard<'_, FxHashMap<u32, Arc<PDFObject>>> {
        // a poisoned cache still holds fully built objects
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the raw PDF bytes.
    pub const fn bytes(&self) -> &Bytes {
        &self.data
    }

    pub const fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub const fn xref(&self) -> &XRefTable {
        &self.xref
    }

    /// Merged trailer dictionary.
    pub const fn trailer(&self) -> &PDFDict {
        &self.trailer
    }

    /// Get document catalog.
    pub const fn catalog(&self) -> &PDFDict {
        &self.catalog
    }

    /// Resolve `objid genno R`. Free, missing and unreadable objects are Null.
    pub fn resolve(&self, objid: u32, genno: u32) -> Result<Arc<PDFObject>> {
        if let Some(entry) = self.xref.get(objid)
            && !entry.is_free()
            && entry.genno != genno
        {
            debug!(objid, genno, xref_genno = entry.genno, "generation mismatch");
        }
        self.getobj_shared(objid)
    }

    /// Like [`resolve`](Self::resolve) but the object has to exist.
    pub fn require(&self, r: &PDFObjRef) -> Result<Arc<PDFObject>> {
        let obj = self.resolve(r.objid, r.genno)?;
        if obj.is_null() {
            return Err(PdfError::UnresolvedReference {
                objid: r.objid,
                genno: r.genno,
            });
        }
        Ok(obj)
    }

    /// Get an object by number without cloning the cached object.
    pub fn getobj_shared(&self, objid: u32) -> Result<Arc<PDFObject>> {
        if let Some(obj) = self.cache_lock().get(&objid) {
            return Ok(Arc::clone(obj));
        }
        let Some(_guard) = ResolvingGuard::enter(objid) else {
            return Err(PdfError::MalformedStructure(format!(
                "circular reference to object {objid}"
            )));
        };

        // the cache lock is not held while parsing: parsing may resolve /Length
        let obj = match self.load_object(objid) {
            Ok(obj) => obj,
            Err(e) if self.options.strict => return Err(e),
            Err(e) => {
                warn!(objid, error = %e, "unreadable object resolves to null");
                PDFObject::Null
            }
        };
        let mut cache = self.cache_lock();
        Ok(Arc::clone(cache.entry(objid).or_insert_with(|| Arc::new(obj))))
    }

    fn load_object(&self, objid: u32) -> Result<PDFObject> {
        match self.xref.get(objid).map(|e| e.location) {
            Some(XRefLocation::Free) => Ok(PDFObject::Null),
            Some(XRefLocation::Offset(offset)) => match self.parse_at(offset, objid) {
                Ok(obj) => Ok(obj),
                Err(e) if !self.xref.is_fallback() && self.options.with_fallback => {
                    debug!(objid, offset, error = %e, "bad xref offset, trying object scan");
                    self.load_scanned(objid).map(|o| o.unwrap_or(PDFObject::Null))
                }
                Err(e) => Err(e),
            },
            Some(XRefLocation::Compressed {
                stream_objid,
                index,
            }) => self.load_compressed(objid, stream_objid, index),
            None if self.options.with_fallback => {
                Ok(self.load_scanned(objid)?.unwrap_or(PDFObject::Null))
            }
            None => Ok(PDFObject::Null),
        }
    }

    /// Parse the indirect object at `offset`; it has to be `objid`.
    fn parse_at(&self, offset: usize, objid: u32) -> Result<PDFObject> {
        if offset >= self.data.len() {
            return Err(PdfError::MalformedStructure(format!(
                "object {objid} offset {offset} is past end of file"
            )));
        }
        let mut parser = PDFParser::new_shared(&self.data).with_resolver(self);
        parser.set_pos(offset);
        let (found, _, obj) = parser.parse_indirect_object()?;
        if found != objid {
            return Err(PdfError::MalformedStructure(format!(
                "expected object {objid} at {offset}, found {found}"
            )));
        }
        Ok(obj)
    }

    fn load_compressed(&self, objid: u32, stream_objid: u32, index: usize) -> Result<PDFObject> {
        let stm = self.object_stream(stream_objid)?;
        // the xref index is a hint; trust the header when they disagree
        match stm.get(index) {
            Ok((found, obj)) if found == objid => Ok(obj),
            _ => match stm.find(objid) {
                Some(i) => stm.get(i).map(|(_, obj)| obj),
                None => Ok(PDFObject::Null),
            },
        }
    }

    /// Decoded object stream `objid`, memoized.
    pub fn object_stream(&self, objid: u32) -> Result<Arc<ObjectStream>> {
        if let Some(stm) = self
            .objstms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&objid)
        {
            return Ok(Arc::clone(stm));
        }
        if let Some(XRefLocation::Compressed { .. }) = self.xref.get(objid).map(|e| e.location) {
            return Err(PdfError::MalformedStructure(format!(
                "object stream {objid} is itself inside an object stream"
            )));
        }
        let obj = self.getobj_shared(objid)?;
        let stream = obj.as_stream()?;
        let decoded = self.decode_stream(stream)?;
        let stm = Arc::new(ObjectStream::parse(objid, stream, decoded.data)?);
        let mut objstms = self.objstms.lock().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(objstms.entry(objid).or_insert(stm)))
    }

    /// Index of every `n g obj` header in the buffer, built on first use.
    fn scan_index(&self) -> &FxHashMap<u32, (usize, u32)> {
        self.scan_index.get_or_init(|| {
            let index = scan_object_headers(&self.data);
            debug!(objects = index.len(), "built sequential object index");
            index
        })
    }

    fn load_scanned(&self, objid: u32) -> Result<Option<PDFObject>> {
        if let Some(&(offset, _)) = self.scan_index().get(&objid) {
            return self.parse_at(offset, objid).map(Some);
        }
        let packed = self
            .scan_objstms
            .get_or_init(|| scan_object_streams(&self.data, self.scan_index()));
        match packed.get(&objid) {
            Some(&(stream_objid, index)) if stream_objid != objid => {
                self.load_compressed(objid, stream_objid, index).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Follow `Ref -> Ref` chains until a direct object is reached.
    ///
    /// Fails with `MalformedStructure` after `max_ref_depth` hops.
    pub fn resolve_deep(&self, obj: &PDFObject) -> Result<Arc<PDFObject>> {
        let &PDFObject::Ref(mut r) = obj else {
            return Ok(Arc::new(obj.clone()));
        };
        for _ in 0..self.options.max_ref_depth {
            let target = self.resolve(r.objid, r.genno)?;
            match target.as_ref() {
                PDFObject::Ref(next) => r = *next,
                _ => return Ok(target),
            }
        }
        Err(PdfError::MalformedStructure(format!(
            "reference chain from {} {} R exceeds {} hops",
            r.objid, r.genno, self.options.max_ref_depth
        )))
    }

    /// `dict[key]` with references followed; `None` when missing or null.
    pub fn get_resolved(&self, dict: &PDFDict, key: &str) -> Option<Arc<PDFObject>> {
        let value = dict.get(key)?;
        match self.resolve_deep(value) {
            Ok(obj) if !obj.is_null() => Some(obj),
            Ok(_) => None,
            Err(e) => {
                debug!(key, error = %e, "dictionary value did not resolve");
                None
            }
        }
    }

    /// Replace references in `obj` with their targets, recursively.
    ///
    /// A reference back into the current path stays a reference. With
    /// `lazy`, stream dictionaries are returned untouched.
    pub fn build(&self, obj: &PDFObject, lazy: bool) -> Result<PDFObject> {
        let mut path = Vec::new();
        self.build_inner(obj, lazy, &mut path, 0)
    }

    fn build_inner(&self, obj: &PDFObject, lazy: bool, path: &mut Vec<u32>, depth: usize) -> Result<PDFObject> {
        if depth > self.options.max_ref_depth {
            return Err(PdfError::MalformedStructure("object tree too deep".into()));
        }
        Ok(match obj {
            PDFObject::Ref(r) => {
                if path.contains(&r.objid) {
                    return Ok(obj.clone());
                }
                let target = self.resolve(r.objid, r.genno)?;
                path.push(r.objid);
                let built = self.build_inner(&target, lazy, path, depth + 1);
                path.pop();
                built?
            }
            PDFObject::Array(items) => PDFObject::Array(
                items
                    .iter()
                    .map(|item| self.build_inner(item, lazy, path, depth + 1))
                    .collect::<Result<_>>()?,
            ),
            PDFObject::Dict(d) => PDFObject::Dict(self.build_dict(d, lazy, path, depth)?),
            PDFObject::Stream(s) if !lazy => {
                let mut s = s.as_ref().clone();
                s.attrs = self.build_dict(&s.attrs, lazy, path, depth)?;
                PDFObject::Stream(Box::new(s))
            }
            other => other.clone(),
        })
    }

    fn build_dict(&self, d: &PDFDict, lazy: bool, path: &mut Vec<u32>, depth: usize) -> Result<PDFDict> {
        d.iter()
            .map(|(k, v)| Ok((k.clone(), self.build_inner(v, lazy, path, depth + 1)?)))
            .collect()
    }

    /// Run a stream through its `/Filter` chain.
    ///
    /// Stops early at image codecs; check [`Decoded::encoded_with`].
    pub fn decode_stream(&self, stream: &PDFStream) -> Result<Decoded> {
        let filter = self.get_resolved(&stream.attrs, "Filter");
        let parms = self
            .get_resolved(&stream.attrs, "DecodeParms")
            .or_else(|| self.get_resolved(&stream.attrs, "DP"));
        let filter = filter.map(|f| self.resolve_items(&f));
        let parms = parms.map(|p| self.resolve_items(&p));
        let chain = filter_chain(filter.as_ref(), parms.as_ref()).inspect_err(|e| {
            warn!(objid = ?stream.objid, error = %e, "stream filter not supported");
        })?;
        decode(stream.rawdata_bytes(), &chain)
    }

    /// Array elements with references followed one level.
    fn resolve_items(&self, obj: &PDFObject) -> PDFObject {
        match obj {
            PDFObject::Array(items) => PDFObject::Array(
                items
                    .iter()
                    .map(|i| {
                        self.resolve_deep(i)
                            .map(|o| o.as_ref().clone())
                            .unwrap_or(PDFObject::Null)
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// The Info dictionary, with references followed.
    pub fn info(&self) -> Option<PDFDict> {
        let info = self.trailer.get("Info")?;
        match self.build(info, true) {
            Ok(PDFObject::Dict(d)) => Some(d),
            _ => None,
        }
    }

    /// Info entries that are text strings, decoded.
    pub fn info_strings(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .info()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(k, v)| match v {
                PDFObject::String(s) => Some((k, decode_text_string(&s))),
                PDFObject::Name(n) => Some((k, n)),
                _ => None,
            })
            .collect();
        out.sort();
        out
    }

    /// The XMP packet referenced by `/Metadata` in the catalog.
    pub fn metadata(&self) -> Option<Bytes> {
        let obj = self.get_resolved(&self.catalog, "Metadata")?;
        let stream = obj.as_stream().ok()?;
        match self.decode_stream(stream) {
            Ok(Decoded {
                data,
                encoded_with: None,
            }) => Some(data),
            _ => None,
        }
    }
}

impl LengthResolver for PDFDocument {
    fn resolve_length(&self, r: &PDFObjRef) -> Option<i64> {
        self.resolve(r.objid, r.genno).ok()?.as_int().ok()
    }
}

/// Text string to `String`: UTF-16BE with a BOM, otherwise PDFDocEncoding.
pub fn decode_text_string(s: &[u8]) -> String {
    decode_text(s)
}
