//! Writes extracted images to a directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use folio_core::ImageInfo;

/// Image writer for exporting PDF images to files.
pub struct ImageWriter {
    outdir: PathBuf,
    seq: usize,
}

impl ImageWriter {
    pub fn new(outdir: impl AsRef<Path>) -> Result<Self> {
        let outdir = outdir.as_ref().to_path_buf();
        fs::create_dir_all(&outdir)
            .with_context(|| format!("failed to create {}", outdir.display()))?;
        Ok(Self { outdir, seq: 0 })
    }

    fn next_path(&mut self, image: &ImageInfo, ext: &str) -> PathBuf {
        let base = image
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect::<String>();
        let base = if base.is_empty() { "image".to_string() } else { base };
        self.seq += 1;
        self.outdir
            .join(format!("p{}_{}_{}{}", image.page_index + 1, base, self.seq, ext))
    }

    /// Write one image and return the file name used.
    ///
    /// Still-encoded payloads keep their native format. Decoded 8-bit gray
    /// and RGB images become PGM/PPM; anything else is written as `.bin`.
    pub fn export(&mut self, image: &ImageInfo) -> Result<String> {
        let (ext, header) = match image.filter.as_deref() {
            Some("DCTDecode") => (".jpg", None),
            Some("JPXDecode") => (".jp2", None),
            Some("JBIG2Decode") => (".jb2", None),
            Some("CCITTFaxDecode") => (".ccitt", None),
            Some(_) => (".bin", None),
            None => pnm_header(image).map_or((".bin", None), |(ext, h)| (ext, Some(h))),
        };
        let path = self.next_path(image, ext);
        let mut data = header.map(String::into_bytes).unwrap_or_default();
        data.extend_from_slice(&image.data);
        fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string())
    }
}

fn pnm_header(image: &ImageInfo) -> Option<(&'static str, String)> {
    if image.bits_per_component != 8 || image.width <= 0 || image.height <= 0 {
        return None;
    }
    let (magic, ext, channels) = match image.color_space.as_deref() {
        Some("DeviceGray" | "CalGray") => ("P5", ".pgm", 1),
        Some("DeviceRGB" | "CalRGB") => ("P6", ".ppm", 3),
        _ => return None,
    };
    let expected = (image.width * image.height * channels) as usize;
    (image.data.len() >= expected)
        .then(|| (ext, format!("{magic}\n{} {}\n255\n", image.width, image.height)))
}
