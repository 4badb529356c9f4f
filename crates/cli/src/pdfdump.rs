//! pdfdump - Dump PDF internal structure as JSON
//!
//! Prints the trailer, selected objects or all objects, lists pages, and
//! extracts embedded files.

mod common;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, ArgGroup, Parser};
use folio_core::document::decode_text_string;
use folio_core::{PDFDocument, PDFObject, ParseOptions};
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::common::{init_logging, open_output, zero_based};

/// How stream payloads are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamCodec {
    /// Dictionary and length only
    None,
    /// Decoded data as text
    Text,
    /// Decoded data as hex
    Hex,
}

fn string_json(s: &[u8]) -> Value {
    match std::str::from_utf8(s) {
        Ok(text) if !text.chars().any(|c| c.is_control() && !c.is_whitespace()) => json!(text),
        _ if s.starts_with(b"\xfe\xff") => json!(decode_text_string(s)),
        _ => json!({ "hex": s.iter().map(|b| format!("{b:02x}")).collect::<String>() }),
    }
}

/// A PDF object as JSON. Names are written as `/Name`, references as
/// `{"ref": [objid, genno]}`.
fn object_json(doc: &PDFDocument, obj: &PDFObject, codec: StreamCodec) -> Value {
    match obj {
        PDFObject::Null => Value::Null,
        PDFObject::Bool(b) => json!(b),
        PDFObject::Int(n) => json!(n),
        PDFObject::Real(n) => json!(n),
        PDFObject::Name(name) => json!(format!("/{name}")),
        PDFObject::String(s) => string_json(s),
        PDFObject::Array(arr) => Value::Array(arr.iter().map(|v| object_json(doc, v, codec)).collect()),
        PDFObject::Dict(dict) => dict_json(doc, dict, codec),
        PDFObject::Stream(stream) => {
            let mut out = Map::new();
            out.insert("dict".into(), dict_json(doc, &stream.attrs, codec));
            out.insert("length".into(), json!(stream.get_rawdata().len()));
            if codec != StreamCodec::None {
                match doc.decode_stream(stream) {
                    Ok(decoded) => {
                        let data = match codec {
                            StreamCodec::Hex => json!(decoded.data.iter().map(|b| format!("{b:02x}")).collect::<String>()),
                            _ => json!(String::from_utf8_lossy(&decoded.data)),
                        };
                        out.insert("data".into(), data);
                        if let Some(filter) = decoded.encoded_with {
                            out.insert("encoded_with".into(), json!(filter.name()));
                        }
                    }
                    Err(e) => {
                        out.insert("error".into(), json!(e.to_string()));
                    }
                }
            }
            Value::Object(out)
        }
        PDFObject::Ref(r) => json!({ "ref": [r.objid, r.genno] }),
    }
}

fn dict_json(doc: &PDFDocument, dict: &folio_core::PDFDict, codec: StreamCodec) -> Value {
    let mut keys: Vec<&String> = dict.keys().collect();
    keys.sort();
    Value::Object(
        keys.into_iter()
            .map(|k| (k.clone(), object_json(doc, &dict[k], codec)))
            .collect(),
    )
}

fn dump_trailer(doc: &PDFDocument) -> Value {
    json!({
        "trailer": object_json(doc, &PDFObject::Dict(doc.trailer().clone()), StreamCodec::None),
        "revisions": doc.xref().revisions(),
        "fallback": doc.xref().is_fallback(),
    })
}

fn dump_objects(doc: &PDFDocument, objids: &[u32], codec: StreamCodec) -> Value {
    let mut out = Map::new();
    for &objid in objids {
        match doc.getobj_shared(objid) {
            Ok(obj) => {
                out.insert(objid.to_string(), object_json(doc, &obj, codec));
            }
            Err(e) => warn!(objid, error = %e, "object not dumped"),
        }
    }
    Value::Object(out)
}

fn list_pages(doc: &PDFDocument, selected: Option<&[usize]>) -> Value {
    let labels = doc.page_labels().ok();
    let pages = doc
        .pages()
        .filter(|p| selected.is_none_or(|s| s.contains(&p.index)))
        .map(|page| {
            let (x0, y0, x1, y1) = page.mediabox(doc);
            json!({
                "page": page.index + 1,
                "objid": page.pageid,
                "label": labels.as_ref().map(|l| l.label(page.index)),
                "mediabox": [x0, y0, x1, y1],
                "rotate": page.rotate(doc),
                "annotations": page.annotations(doc).iter().map(|a| json!({
                    "subtype": a.subtype,
                    "contents": a.contents,
                    "uri": a.uri,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();
    Value::Array(pages)
}

fn dump_info(doc: &PDFDocument) -> Value {
    let info: Map<String, Value> = doc
        .info_strings()
        .into_iter()
        .map(|(k, v)| (k, json!(v)))
        .collect();
    let fields: Vec<Value> = doc
        .form_fields()
        .iter()
        .map(|f| json!({ "name": f.name, "type": f.field_type, "value": f.value_text() }))
        .collect();
    json!({
        "info": info,
        "pages": doc.page_count(),
        "has_metadata": doc.metadata().is_some(),
        "form_fields": fields,
    })
}

/// Extract embedded files into `dir`. Existing files are not overwritten.
fn extract_embedded(doc: &PDFDocument, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    for file in doc.embedded_files() {
        let basename = Path::new(&file.filename)
            .file_name()
            .map_or_else(|| file.name.clone(), |s| s.to_string_lossy().to_string());
        let path = dir.join(basename);
        if path.exists() {
            warn!(path = %path.display(), "file exists, not extracted");
            continue;
        }
        eprintln!("extracting: {}", path.display());
        std::fs::write(&path, &file.data).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

/// Dump PDF internal structure as JSON.
#[derive(Parser, Debug)]
#[command(name = "pdfdump")]
#[command(author, version, about = "Dump PDF internal structure as JSON", long_about = None)]
#[command(group(
    ArgGroup::new("procedure")
        .args(["all", "objects", "pages", "info", "extract_embedded"])
))]
#[command(group(
    ArgGroup::new("stream_codec")
        .args(["text_stream", "hex_stream"])
))]
struct Args {
    /// One or more paths to PDF files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Fail on broken structure instead of recovering
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Comma-separated list of object IDs to dump
    #[arg(short = 'i', long = "objects", value_delimiter = ',')]
    objects: Option<Vec<u32>>,

    /// Dump all objects
    #[arg(short = 'a', long, action = ArgAction::SetTrue)]
    all: bool,

    /// List pages
    #[arg(long, action = ArgAction::SetTrue)]
    pages: bool,

    /// Restrict --pages to these page numbers (1-indexed)
    #[arg(long = "page-numbers", value_delimiter = ',')]
    page_numbers: Option<Vec<usize>>,

    /// Show Info metadata and form fields
    #[arg(long, action = ArgAction::SetTrue)]
    info: bool,

    /// Extract embedded files to the specified directory
    #[arg(short = 'E', long = "extract-embedded")]
    extract_embedded: Option<PathBuf>,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Include decoded stream data as text
    #[arg(short = 't', long = "text-stream", action = ArgAction::SetTrue)]
    text_stream: bool,

    /// Include decoded stream data as hex
    #[arg(short = 'x', long = "hex-stream", action = ArgAction::SetTrue)]
    hex_stream: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let codec = if args.text_stream {
        StreamCodec::Text
    } else if args.hex_stream {
        StreamCodec::Hex
    } else {
        StreamCodec::None
    };

    let mut output = open_output(&args.outfile)?;
    for path in &args.files {
        if !path.exists() {
            bail!("file not found: {}", path.display());
        }
        let doc = PDFDocument::open(path, ParseOptions::new().strict(args.strict))
            .with_context(|| format!("failed to open {}", path.display()))?;

        let value = if let Some(dir) = &args.extract_embedded {
            extract_embedded(&doc, dir)?;
            continue;
        } else if args.all {
            dump_objects(&doc, &doc.xref().objids(), codec)
        } else if let Some(objids) = &args.objects {
            dump_objects(&doc, objids, codec)
        } else if args.pages {
            list_pages(&doc, zero_based(args.page_numbers.as_deref()).as_deref())
        } else if args.info {
            dump_info(&doc)
        } else {
            dump_trailer(&doc)
        };
        serde_json::to_writer_pretty(&mut output, &value)?;
        writeln!(output)?;
    }
    output.flush()?;
    Ok(())
}
