//! Page content interpreter.
//!
//! Executes content streams against an operand stack and a graphics state
//! stack, reporting text and images to a [`PDFDevice`]. Form XObjects are
//! interpreted recursively up to a depth limit.

use std::sync::Arc;

use bytes::Bytes;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::content::{ContentParser, ContentToken};
use super::device::{ImageInfo, PDFDevice, TextRun};
use crate::codec::Filter;
use crate::document::{PDFDocument, PDFPage};
use crate::font::{PDFFont, REPLACEMENT};
use crate::model::objects::{PDFDict, PDFObject, PDFStream, int_or};
use crate::model::state::PDFGraphicState;
use crate::parser::Keyword;
use crate::utils::{MATRIX_IDENTITY, Matrix, Rect, matrix_from_slice, mult_matrix, translate_matrix};

/// Default limit on nested form XObjects.
pub const DEFAULT_MAX_FORM_DEPTH: usize = 32;

enum FontKey {
    Object(u32),
    Inline(String),
}

/// PDF Page Interpreter - executes content stream operators.
pub struct PDFPageInterpreter<'a, D: PDFDevice> {
    doc: &'a PDFDocument,
    device: &'a mut D,
    max_form_depth: usize,
    page_index: usize,
    gstack: Vec<PDFGraphicState>,
    state: PDFGraphicState,
    resources: PDFDict,
    /// Fonts built so far, by font dictionary object number
    fonts: FxHashMap<u32, Arc<PDFFont>>,
    /// Object numbers of the forms being executed, outermost first
    form_stack: Vec<u32>,
    depth: usize,
    inline_images: usize,
}

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> PDFPageInterpreter<'a, D> {
    pub fn new(doc: &'a PDFDocument, device: &'a mut D) -> Self {
        Self {
            doc,
            device,
            max_form_depth: DEFAULT_MAX_FORM_DEPTH,
            page_index: 0,
            gstack: Vec::new(),
            state: PDFGraphicState::default(),
            resources: PDFDict::new(),
            fonts: FxHashMap::default(),
            form_stack: Vec::new(),
            depth: 0,
            inline_images: 0,
        }
    }

    pub fn with_max_form_depth(mut self, depth: usize) -> Self {
        self.max_form_depth = depth;
        self
    }

    pub fn ctm(&self) -> Matrix {
        self.state.ctm
    }

    pub fn graphicstate(&self) -> &PDFGraphicState {
        &self.state
    }

    /// Interpret one page.
    pub fn process_page(&mut self, page: &PDFPage) {
        let (x0, y0, x1, y1) = page.mediabox(self.doc);
        let ctm = match page.rotate(self.doc) {
            90 => (0.0, -1.0, 1.0, 0.0, -y0, x1),
            180 => (-1.0, 0.0, 0.0, -1.0, x1, y1),
            270 => (0.0, 1.0, -1.0, 0.0, y1, -x0),
            _ => (1.0, 0.0, 0.0, 1.0, -x0, -y0),
        };
        self.page_index = page.index;
        self.device.begin_page(page.index, (x0, y0, x1, y1), ctm);
        let resources = page.resources(self.doc);
        let content = page.content_data(self.doc);
        self.render_contents(resources, &content, ctm);
        self.device.end_page(page.index);
    }

    /// Execute `content` with fresh state.
    pub fn render_contents(&mut self, resources: PDFDict, content: &Bytes, ctm: Matrix) {
        self.gstack.clear();
        self.state = PDFGraphicState::new(ctm);
        self.resources = resources;
        self.execute(content);
    }

    /// Run the operators of `content` against the current state.
    pub fn execute(&mut self, content: &Bytes) {
        let mut args: Vec<PDFObject> = Vec::new();
        for token in ContentParser::new(content) {
            match token {
                ContentToken::Operand(obj) => args.push(obj),
                ContentToken::Operator(op) => {
                    self.dispatch_operator(&op, &mut args);
                    args.clear();
                }
                ContentToken::InlineImage { dict, data } => {
                    let name = format!("inline{}", self.inline_images);
                    self.inline_images += 1;
                    let stream = PDFStream::new(dict, data);
                    self.render_image(&name, &stream);
                    args.clear();
                }
            }
        }
    }

    fn dispatch_operator(&mut self, op: &Keyword, args: &mut Vec<PDFObject>) {
        match op {
            Keyword::Qq => self.do_q(),
            Keyword::Q => self.do_Q(),
            Keyword::Cm => {
                if let Some(m) = pop_matrix(args) {
                    self.do_cm(m);
                }
            }
            Keyword::BT => self.state.text.reset(),
            Keyword::ET => {}
            Keyword::Tc => {
                if let Some(v) = pop_number(args) {
                    self.state.text.charspace = v;
                }
            }
            Keyword::Tw => {
                if let Some(v) = pop_number(args) {
                    self.state.text.wordspace = v;
                }
            }
            Keyword::Tz => {
                if let Some(v) = pop_number(args) {
                    self.state.text.scaling = v;
                }
            }
            Keyword::TL => {
                if let Some(v) = pop_number(args) {
                    self.state.text.leading = -v;
                }
            }
            Keyword::Tr => {
                if let Some(v) = pop_number(args) {
                    self.state.text.render = v as i32;
                }
            }
            Keyword::Ts => {
                if let Some(v) = pop_number(args) {
                    self.state.text.rise = v;
                }
            }
            Keyword::Tf => {
                if args.len() >= 2 {
                    let size = pop_number(args).unwrap_or(0.0);
                    let name = pop_name(args).unwrap_or_default();
                    self.do_Tf(&name, size);
                }
            }
            Keyword::Td => {
                if let Some((tx, ty)) = pop_point(args) {
                    self.do_Td(tx, ty);
                }
            }
            Keyword::TD => {
                if let Some((tx, ty)) = pop_point(args) {
                    self.state.text.leading = ty;
                    self.do_Td(tx, ty);
                }
            }
            Keyword::Tm => {
                if let Some(m) = pop_matrix(args) {
                    self.state.text.matrix = m;
                    self.state.text.linematrix = (0.0, 0.0);
                }
            }
            Keyword::TStar => self.do_T_star(),
            Keyword::Tj => {
                if let Some(s) = pop_string(args) {
                    self.show_text(&[PDFObject::String(s)]);
                }
            }
            Keyword::TJ => {
                if let Some(PDFObject::Array(seq)) = args.pop() {
                    self.show_text(&seq);
                }
            }
            Keyword::Quote => {
                if let Some(s) = pop_string(args) {
                    self.do_T_star();
                    self.show_text(&[PDFObject::String(s)]);
                }
            }
            Keyword::DoubleQuote => {
                if args.len() >= 3 {
                    let s = pop_string(args).unwrap_or_default();
                    let ac = pop_number(args).unwrap_or(0.0);
                    let aw = pop_number(args).unwrap_or(0.0);
                    self.state.text.wordspace = aw;
                    self.state.text.charspace = ac;
                    self.do_T_star();
                    self.show_text(&[PDFObject::String(s)]);
                }
            }
            Keyword::Do => {
                if let Some(name) = pop_name(args) {
                    self.do_Do(&name);
                }
            }
            // everything else paints nothing we report
            _ => {}
        }
    }

    fn do_q(&mut self) {
        self.gstack.push(self.state.clone());
    }

    fn do_Q(&mut self) {
        // an unbalanced Q leaves the state as is
        if let Some(state) = self.gstack.pop() {
            self.state = state;
        }
    }

    fn do_cm(&mut self, m: Matrix) {
        self.state.ctm = mult_matrix(m, self.state.ctm);
    }

    fn do_Td(&mut self, tx: f64, ty: f64) {
        let text = &mut self.state.text;
        text.matrix = translate_matrix(text.matrix, (tx, ty));
        text.linematrix = (0.0, 0.0);
    }

    fn do_T_star(&mut self) {
        let leading = self.state.text.leading;
        self.do_Td(0.0, leading);
    }

    fn do_Tf(&mut self, name: &str, size: f64) {
        self.state.text.fontsize = size;
        self.state.text.fontname = Some(name.to_string());
        match self.font(name) {
            Some(font) => self.state.text.font = Some(font),
            // the previous font stays selected
            None => debug!(font = name, page = self.page_index, "font resource not found"),
        }
    }

    fn font(&mut self, name: &str) -> Option<Arc<PDFFont>> {
        let fonts = self.doc.get_resolved(&self.resources, "Font")?;
        let raw = fonts.as_dict().ok()?.get(name)?.clone();
        let key = match &raw {
            PDFObject::Ref(r) => FontKey::Object(r.objid),
            _ => FontKey::Inline(name.to_string()),
        };
        if let FontKey::Object(objid) = key
            && let Some(font) = self.fonts.get(&objid)
        {
            return Some(Arc::clone(font));
        }
        let spec = self.doc.resolve_deep(&raw).ok()?;
        let spec = spec.as_dict().ok()?;
        let font = Arc::new(PDFFont::from_dict(self.doc, spec));
        if let FontKey::Object(objid) = key {
            self.fonts.insert(objid, Arc::clone(&font));
        }
        Some(font)
    }

    /// Show a `TJ`-style sequence of strings and adjustments as one run.
    fn show_text(&mut self, seq: &[PDFObject]) {
        let Some(font) = self.state.text.font.clone() else {
            debug!(page = self.page_index, "text shown without a font");
            return;
        };
        let ts = &self.state.text;
        let (fontsize, scaling) = (ts.fontsize, ts.scaling / 100.0);
        let (charspace, wordspace) = (ts.charspace, ts.wordspace);
        let start = self.rendering_matrix();
        let vertical = font.is_vertical();

        let mut text = String::new();
        let mut advance = 0.0;
        for item in seq {
            match item {
                PDFObject::String(bytes) => {
                    for (code, cid) in font.codes(bytes) {
                        match font.to_unichr(code) {
                            Some(s) => text.push_str(&s),
                            None => text.push(REPLACEMENT),
                        }
                        let mut step = font.char_width(cid) * fontsize + charspace;
                        if code == 32 && !font.is_multibyte() {
                            step += wordspace;
                        }
                        advance += if vertical { step } else { step * scaling };
                    }
                }
                other => {
                    if let Ok(n) = other.as_num() {
                        let step = n / 1000.0 * fontsize;
                        advance -= if vertical { step } else { step * scaling };
                    }
                }
            }
        }

        let line = &mut self.state.text.linematrix;
        if vertical {
            line.1 -= advance;
        } else {
            line.0 += advance;
        }
        let end = self.rendering_matrix();
        let width = (end.4 - start.4).hypot(end.5 - start.5);

        self.device.render_text(TextRun {
            page_index: self.page_index,
            text,
            matrix: start,
            font: font
                .basefont
                .clone()
                .or_else(|| self.state.text.fontname.clone()),
            size: fontsize,
            width,
        });
    }

    /// Text rendering matrix: font size, scaling and rise on top of Tm × CTM,
    /// at the current position along the line.
    fn rendering_matrix(&self) -> Matrix {
        let ts = &self.state.text;
        let tm = translate_matrix(ts.matrix, ts.linematrix);
        let scale = (
            ts.fontsize * ts.scaling / 100.0,
            0.0,
            0.0,
            ts.fontsize,
            0.0,
            ts.rise,
        );
        mult_matrix(scale, mult_matrix(tm, self.state.ctm))
    }

    fn do_Do(&mut self, name: &str) {
        let Some(xobjects) = self.doc.get_resolved(&self.resources, "XObject") else {
            warn!(xobject = name, "no XObject resources");
            return;
        };
        let Some(raw) = xobjects.as_dict().ok().and_then(|d| d.get(name)).cloned() else {
            warn!(xobject = name, "XObject not found");
            return;
        };
        let objid = match &raw {
            PDFObject::Ref(r) => Some(r.objid),
            _ => None,
        };
        let Ok(obj) = self.doc.resolve_deep(&raw) else {
            warn!(xobject = name, "XObject did not resolve");
            return;
        };
        let Ok(stream) = obj.as_stream() else {
            warn!(xobject = name, "XObject is not a stream");
            return;
        };
        let subtype = stream.get("Subtype").and_then(|s| s.as_name().ok());
        debug!(xobject = name, subtype, depth = self.depth, "Do");
        match subtype {
            Some("Form") => self.render_form(name, objid, stream),
            Some("Image") => self.render_image(name, stream),
            _ => debug!(xobject = name, "ignoring XObject subtype"),
        }
    }

    fn render_form(&mut self, name: &str, objid: Option<u32>, stream: &PDFStream) {
        if let Some(id) = objid
            && self.form_stack.contains(&id)
        {
            warn!(xobject = name, objid = id, "recursive form skipped");
            return;
        }
        if self.depth >= self.max_form_depth {
            warn!(xobject = name, limit = self.max_form_depth, "form nesting too deep, skipped");
            return;
        }
        let content = match self.doc.decode_stream(stream) {
            Ok(decoded) => decoded.data,
            Err(e) => {
                warn!(xobject = name, error = %e, "form content unreadable");
                return;
            }
        };
        let matrix = self
            .doc
            .get_resolved(&stream.attrs, "Matrix")
            .and_then(|m| number_list(&m).and_then(|v| matrix_from_slice(&v)))
            .unwrap_or(MATRIX_IDENTITY);
        let bbox: Rect = self
            .doc
            .get_resolved(&stream.attrs, "BBox")
            .and_then(|b| number_list(&b))
            .filter(|v| v.len() == 4)
            .map_or((0.0, 0.0, 0.0, 0.0), |v| (v[0], v[1], v[2], v[3]));
        // forms without resources use their parent's
        let resources = self
            .doc
            .get_resolved(&stream.attrs, "Resources")
            .and_then(|r| r.as_dict().ok().cloned())
            .unwrap_or_else(|| self.resources.clone());

        let saved_resources = std::mem::replace(&mut self.resources, resources);
        let saved_gstack = std::mem::take(&mut self.gstack);
        let saved_state = self.state.clone();
        self.state.ctm = mult_matrix(matrix, self.state.ctm);
        self.form_stack.extend(objid);
        self.depth += 1;

        self.device.begin_figure(name, bbox, self.state.ctm);
        self.execute(&content);
        self.device.end_figure(name);

        self.depth -= 1;
        if objid.is_some() {
            self.form_stack.pop();
        }
        self.state = saved_state;
        self.gstack = saved_gstack;
        self.resources = saved_resources;
    }

    fn render_image(&mut self, name: &str, stream: &PDFStream) {
        let attr = |key: &str| stream.get(key).and_then(|v| self.doc.resolve_deep(v).ok());
        let color_space = attr("ColorSpace").and_then(|cs| match &*cs {
            PDFObject::Name(n) => Some(n.clone()),
            PDFObject::Array(items) => items.first().and_then(|f| f.as_name().ok()).map(str::to_string),
            _ => None,
        });
        let image_mask = attr("ImageMask").is_some_and(|m| matches!(*m, PDFObject::Bool(true)));
        let (data, filter) = match self.doc.decode_stream(stream) {
            Ok(decoded) => (decoded.data, decoded.encoded_with.map(|f| f.name().to_string())),
            Err(e) => {
                warn!(image = name, error = %e, "image data left encoded");
                let first = attr("Filter").and_then(|f| match &*f {
                    PDFObject::Name(n) => Some(n.clone()),
                    PDFObject::Array(items) => {
                        items.first().and_then(|f| f.as_name().ok()).map(str::to_string)
                    }
                    _ => None,
                });
                let first = first.map(|n| Filter::from_name(&n).map_or(n, |f| f.name().to_string()));
                (stream.rawdata_bytes(), first)
            }
        };
        self.device.render_image(ImageInfo {
            page_index: self.page_index,
            name: name.to_string(),
            width: int_or(attr("Width").as_deref(), 0),
            height: int_or(attr("Height").as_deref(), 0),
            color_space,
            bits_per_component: int_or(attr("BitsPerComponent").as_deref(), if image_mask { 1 } else { 8 }),
            image_mask,
            data,
            filter,
            ctm: self.state.ctm,
        });
    }
}

fn number_list(obj: &PDFObject) -> Option<Vec<f64>> {
    obj.as_array()
        .ok()
        .map(|items| items.iter().filter_map(|v| v.as_num().ok()).collect())
}

fn pop_number(args: &mut Vec<PDFObject>) -> Option<f64> {
    args.pop().and_then(|v| v.as_num().ok())
}

fn pop_name(args: &mut Vec<PDFObject>) -> Option<String> {
    match args.pop()? {
        PDFObject::Name(n) => Some(n),
        _ => None,
    }
}

fn pop_string(args: &mut Vec<PDFObject>) -> Option<Vec<u8>> {
    match args.pop()? {
        PDFObject::String(s) => Some(s),
        _ => None,
    }
}

fn pop_point(args: &mut Vec<PDFObject>) -> Option<(f64, f64)> {
    let y = pop_number(args)?;
    let x = pop_number(args)?;
    Some((x, y))
}

fn pop_matrix(args: &mut Vec<PDFObject>) -> Option<Matrix> {
    if args.len() < 6 {
        return None;
    }
    let values: Vec<f64> = args
        .split_off(args.len() - 6)
        .iter()
        .filter_map(|v| v.as_num().ok())
        .collect();
    matrix_from_slice(&values)
}
