//! Interactive form fields (`/AcroForm`).

use rustc_hash::FxHashSet;

use super::catalog::PDFDocument;
use crate::model::objects::{PDFDict, PDFObject};
use crate::utils::decode_text;

/// A terminal form field.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    /// Fully qualified name: the `/T` values of the field and its
    /// ancestors joined with `.`
    pub name: String,
    /// `/FT`, possibly inherited
    pub field_type: Option<String>,
    /// `/V` with references followed
    pub value: Option<PDFObject>,
}

impl FormField {
    /// The value as display text: strings decoded, names as is, arrays of
    /// options joined with `, `.
    pub fn value_text(&self) -> Option<String> {
        fn text(v: &PDFObject) -> Option<String> {
            match v {
                PDFObject::String(s) => Some(decode_text(s)),
                PDFObject::Name(n) => Some(n.clone()),
                PDFObject::Int(i) => Some(i.to_string()),
                PDFObject::Real(r) => Some(r.to_string()),
                PDFObject::Bool(b) => Some(b.to_string()),
                PDFObject::Array(items) => {
                    Some(items.iter().filter_map(text).collect::<Vec<_>>().join(", "))
                }
                _ => None,
            }
        }
        self.value.as_ref().and_then(text)
    }
}

impl PDFDocument {
    /// Terminal fields of the AcroForm tree, in tree order.
    pub fn form_fields(&self) -> Vec<FormField> {
        let mut out = Vec::new();
        let Some(form) = self.get_resolved(self.catalog(), "AcroForm") else {
            return out;
        };
        let Some(fields) = form.as_dict().ok().and_then(|f| self.get_resolved(f, "Fields")) else {
            return out;
        };
        let Ok(fields) = fields.as_array() else {
            return out;
        };
        let mut seen = FxHashSet::default();
        for field in fields {
            self.walk_field(field, "", None, &mut out, &mut seen, 0);
        }
        out
    }

    fn walk_field(
        &self,
        node: &PDFObject,
        parent_name: &str,
        parent_type: Option<&str>,
        out: &mut Vec<FormField>,
        seen: &mut FxHashSet<u32>,
        depth: usize,
    ) {
        if let PDFObject::Ref(r) = node
            && !seen.insert(r.objid)
        {
            return;
        }
        if depth > self.options().max_ref_depth {
            return;
        }
        let Ok(obj) = self.resolve_deep(node) else { return };
        let Ok(dict) = obj.as_dict() else { return };

        let partial = self
            .get_resolved(dict, "T")
            .and_then(|t| t.as_string().ok().map(decode_text));
        let name = match (&partial, parent_name.is_empty()) {
            (Some(t), true) => t.clone(),
            (Some(t), false) => format!("{parent_name}.{t}"),
            (None, _) => parent_name.to_string(),
        };
        let ftype = self
            .get_resolved(dict, "FT")
            .and_then(|t| t.as_name().ok().map(str::to_string))
            .or_else(|| parent_type.map(str::to_string));

        let kids: Vec<PDFObject> = self
            .get_resolved(dict, "Kids")
            .and_then(|k| k.as_array().ok().map(<[PDFObject]>::to_vec))
            .unwrap_or_default();
        // kids without /T are widget annotations of this same field
        let field_kids: Vec<&PDFObject> = kids.iter().filter(|k| self.has_partial_name(k)).collect();

        if field_kids.is_empty() {
            if partial.is_some() || !name.is_empty() {
                out.push(FormField {
                    name,
                    field_type: ftype,
                    value: self.field_value(dict),
                });
            }
            return;
        }
        for kid in field_kids {
            self.walk_field(kid, &name, ftype.as_deref(), out, seen, depth + 1);
        }
    }

    fn has_partial_name(&self, node: &PDFObject) -> bool {
        self.resolve_deep(node)
            .ok()
            .and_then(|o| o.as_dict().ok().map(|d| d.contains_key("T")))
            .unwrap_or(false)
    }

    fn field_value(&self, dict: &PDFDict) -> Option<PDFObject> {
        let v = dict.get("V")?;
        self.build(v, true).ok().filter(|v| !v.is_null())
    }
}
