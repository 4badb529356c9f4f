//! pdftext - Extract text and images from PDF files
//!
//! Writes the text of each page as plain text (pages separated by form
//! feeds) or as JSON, and optionally dumps the images it meets.

mod common;
mod images;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use folio_core::api::{ExtractOptions, extract_images, extract_pages_text, extract_text_runs};
use folio_core::{PDFDocument, ParseOptions, TextRun};
use serde::Serialize;
use tracing::info;

use crate::common::{init_logging, open_output, zero_based};
use crate::images::ImageWriter;

/// Output type for the extracted content.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputType {
    /// Plain text output (default)
    #[default]
    Text,
    /// One JSON document per input file
    Json,
}

/// Extract text and images from PDF files.
#[derive(Parser, Debug)]
#[command(name = "pdftext")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more paths to PDF files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Page numbers to extract (1-indexed), e.g. --page-numbers 1,3
    #[arg(long = "page-numbers", value_delimiter = ',')]
    page_numbers: Option<Vec<usize>>,

    /// The maximum number of pages to extract (0 = no limit)
    #[arg(short = 'm', long, default_value_t = 0)]
    maxpages: usize,

    /// Nesting limit for form XObjects
    #[arg(long = "max-form-depth", default_value_t = folio_core::interp::DEFAULT_MAX_FORM_DEPTH)]
    max_form_depth: usize,

    /// Fail on broken structure instead of recovering
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Worker threads for page interpretation
    #[arg(short = 'j', long, default_value_t = 1)]
    threads: usize,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Type of output to generate
    #[arg(short = 't', long = "output-type", value_enum, default_value = "text")]
    output_type: OutputType,

    /// Include positioned text runs in JSON output
    #[arg(long, action = ArgAction::SetTrue)]
    runs: bool,

    /// Directory to extract images to (if not given, images are not extracted)
    #[arg(short = 'O', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Skip images whose data could not be decoded (JPEG, JPEG 2000, fax, JBIG2)
    #[arg(long = "no-raw-images", action = ArgAction::SetTrue)]
    no_raw_images: bool,
}

#[derive(Serialize)]
struct FileJson<'a> {
    file: String,
    pages: Vec<PageJson<'a>>,
}

#[derive(Serialize)]
struct PageJson<'a> {
    /// 1-indexed
    page: usize,
    label: Option<String>,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    runs: Option<Vec<RunJson<'a>>>,
}

#[derive(Serialize)]
struct RunJson<'a> {
    text: &'a str,
    x: f64,
    y: f64,
    size: f64,
    width: f64,
    font: Option<&'a str>,
}

impl<'a> From<&'a TextRun> for RunJson<'a> {
    fn from(run: &'a TextRun) -> Self {
        let (x, y) = run.origin();
        Self {
            text: &run.text,
            x,
            y,
            size: run.scaled_size(),
            width: run.width,
            font: run.font.as_deref(),
        }
    }
}

fn extract_options(args: &Args) -> ExtractOptions {
    let mut options = ExtractOptions::new()
        .maxpages(args.maxpages)
        .max_form_depth(args.max_form_depth)
        .include_raw_images(!args.no_raw_images)
        .threads(args.threads);
    if let Some(pages) = zero_based(args.page_numbers.as_deref()) {
        options = options.page_numbers(pages);
    }
    options
}

/// Process a single PDF file.
fn process_file<W: Write + ?Sized>(path: &Path, writer: &mut W, args: &Args) -> Result<()> {
    let doc = PDFDocument::open(path, ParseOptions::new().strict(args.strict))
        .with_context(|| format!("failed to open {}", path.display()))?;
    let options = extract_options(args);
    let pages = extract_pages_text(&doc, &options)?;

    match args.output_type {
        OutputType::Text => {
            for (_, text) in &pages {
                writer.write_all(text.as_bytes())?;
            }
        }
        OutputType::Json => {
            let labels = doc.page_labels().ok();
            let runs = if args.runs {
                extract_text_runs(&doc, &options)?
            } else {
                Vec::new()
            };
            let file = FileJson {
                file: path.display().to_string(),
                pages: pages
                    .into_iter()
                    .map(|(index, text)| PageJson {
                        page: index + 1,
                        label: labels.as_ref().map(|l| l.label(index)),
                        text,
                        runs: args.runs.then(|| {
                            runs.iter()
                                .filter(|r| r.page_index == index)
                                .map(RunJson::from)
                                .collect()
                        }),
                    })
                    .collect(),
            };
            serde_json::to_writer_pretty(&mut *writer, &file)?;
            writeln!(writer)?;
        }
    }

    if let Some(dir) = &args.output_dir {
        let mut image_writer = ImageWriter::new(dir)?;
        for image in extract_images(&doc, &options)? {
            let name = image_writer.export(&image)?;
            info!(image = %image.name, file = %name, "image written");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let mut output = open_output(&args.outfile)?;
    for path in &args.files {
        process_file(path, &mut *output, &args)
            .with_context(|| format!("error processing {}", path.display()))?;
    }
    output.flush()?;
    Ok(())
}
