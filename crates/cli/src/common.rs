//! Pieces shared by the command line tools.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Log to stderr at `warn`, or `debug` with `-d`. `RUST_LOG` wins over both.
pub fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Output file, or stdout for `-`.
pub fn open_output(outfile: &str) -> Result<Box<dyn Write>> {
    if outfile == "-" {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let file = File::create(outfile).with_context(|| format!("failed to create output file {outfile}"))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// 1-indexed page numbers from the command line to zero-based indices.
pub fn zero_based(pages: Option<&[usize]>) -> Option<Vec<usize>> {
    pages
        .map(|nums| {
            nums.iter()
                .filter(|&&n| n > 0)
                .map(|n| n - 1)
                .collect::<Vec<_>>()
        })
        .filter(|nums| !nums.is_empty())
}
