//! Name trees and the `/EmbeddedFiles` tree.

use bytes::Bytes;
use rustc_hash::FxHashSet;
use tracing::warn;

use super::catalog::PDFDocument;
use crate::model::objects::{PDFDict, PDFObject};
use crate::utils::decode_text;

/// A file attached through `/Names /EmbeddedFiles`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedFile {
    /// Key in the name tree
    pub name: String,
    /// `/UF`, else `/F`, else the tree key
    pub filename: String,
    pub description: Option<String>,
    pub mime_type: Option<String>,
    pub data: Bytes,
}

impl PDFDocument {
    /// All `(key, value)` leaves of the name tree at `/Names /<tree>`,
    /// with values resolved. Keys are raw string bytes.
    pub fn name_tree(&self, tree: &str) -> Vec<(Vec<u8>, PDFObject)> {
        let mut out = Vec::new();
        let Some(names) = self.get_resolved(self.catalog(), "Names") else {
            return out;
        };
        let Some(root) = names.as_dict().ok().and_then(|d| self.get_resolved(d, tree)) else {
            return out;
        };
        let mut seen = FxHashSet::default();
        self.walk_name_tree(&root, &mut out, &mut seen, 0);
        out
    }

    fn walk_name_tree(
        &self,
        node: &PDFObject,
        out: &mut Vec<(Vec<u8>, PDFObject)>,
        seen: &mut FxHashSet<u32>,
        depth: usize,
    ) {
        let Ok(dict) = node.as_dict() else { return };
        if depth > self.options().max_ref_depth {
            return;
        }
        if let Some(names) = self.get_resolved(dict, "Names")
            && let Ok(items) = names.as_array()
        {
            for pair in items.chunks_exact(2) {
                let key = match self.resolve_deep(&pair[0]) {
                    Ok(k) => match k.as_string() {
                        Ok(s) => s.to_vec(),
                        Err(_) => continue,
                    },
                    Err(_) => continue,
                };
                if let Ok(value) = self.resolve_deep(&pair[1]) {
                    out.push((key, value.as_ref().clone()));
                }
            }
        }
        if let Some(kids) = self.get_resolved(dict, "Kids")
            && let Ok(kids) = kids.as_array()
        {
            for kid in kids {
                if let PDFObject::Ref(r) = kid
                    && !seen.insert(r.objid)
                {
                    continue;
                }
                if let Ok(kid) = self.resolve_deep(kid) {
                    self.walk_name_tree(&kid, out, seen, depth + 1);
                }
            }
        }
    }

    /// Decoded attachments, in name tree order. Unreadable ones are skipped.
    pub fn embedded_files(&self) -> Vec<EmbeddedFile> {
        self.name_tree("EmbeddedFiles")
            .into_iter()
            .filter_map(|(key, spec)| {
                let name = decode_text(&key);
                let spec = spec.as_dict().ok()?;
                let file = self.embedded_file(&name, spec);
                if file.is_none() {
                    warn!(name = %name, "embedded file has no readable stream");
                }
                file
            })
            .collect()
    }

    fn embedded_file(&self, name: &str, spec: &PDFDict) -> Option<EmbeddedFile> {
        let text = |dict: &PDFDict, key: &str| {
            self.get_resolved(dict, key)
                .and_then(|v| v.as_string().ok().map(decode_text))
        };
        let ef = self.get_resolved(spec, "EF")?;
        let ef = ef.as_dict().ok()?;
        let stream = self
            .get_resolved(ef, "UF")
            .or_else(|| self.get_resolved(ef, "F"))?;
        let stream = stream.as_stream().ok()?;
        let decoded = self.decode_stream(stream).ok()?;
        Some(EmbeddedFile {
            name: name.to_string(),
            filename: text(spec, "UF")
                .or_else(|| text(spec, "F"))
                .unwrap_or_else(|| name.to_string()),
            description: text(spec, "Desc"),
            mime_type: stream
                .get("Subtype")
                .and_then(|s| s.as_name().ok())
                .map(str::to_string),
            data: decoded.data,
        })
    }
}
