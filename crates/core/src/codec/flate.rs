//! FlateDecode (zlib) decompression.

use std::io::Read;

use flate2::read::ZlibDecoder;
use flate2::{Decompress, FlushDecompress, Status};
use tracing::warn;

use crate::error::{PdfError, Result};

/// Inflate zlib data.
///
/// Corrupted streams (bad checksum, truncated data, missing header) decode
/// to whatever the inflater produced before failing.
pub fn flatedecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2);
    match ZlibDecoder::new(data).read_to_end(&mut out) {
        Ok(_) => Ok(out),
        Err(err) => {
            let partial = decompress_corrupted(data, true);
            let partial = if partial.is_empty() {
                decompress_corrupted(data, false)
            } else {
                partial
            };
            if partial.is_empty() && !data.is_empty() {
                return Err(PdfError::DecodeError(format!("FlateDecode: {err}")));
            }
            warn!(%err, recovered = partial.len(), "corrupt FlateDecode stream");
            Ok(partial)
        }
    }
}

/// Byte-at-a-time inflate that keeps all output produced before an error.
fn decompress_corrupted(data: &[u8], zlib_header: bool) -> Vec<u8> {
    let mut decoder = Decompress::new(zlib_header);
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut buf = [0u8; 4096];
    let mut i = 0usize;
    while i < data.len() {
        let before_out = decoder.total_out();
        let before_in = decoder.total_in();
        let res = decoder.decompress(&data[i..i + 1], &mut buf, FlushDecompress::None);
        let produced = (decoder.total_out() - before_out) as usize;
        out.extend_from_slice(&buf[..produced]);
        let consumed = (decoder.total_in() - before_in) as usize;
        i += consumed.max(1);
        match res {
            Ok(Status::StreamEnd) | Err(_) => break,
            Ok(_) => {}
        }
    }
    // drain anything still buffered inside the inflater
    loop {
        let before_out = decoder.total_out();
        match decoder.decompress(&[], &mut buf, FlushDecompress::Finish) {
            Ok(_) => {}
            Err(_) => break,
        }
        let produced = (decoder.total_out() - before_out) as usize;
        if produced == 0 {
            break;
        }
        out.extend_from_slice(&buf[..produced]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn inflates_known_plaintext() {
        let text = b"BT /F1 12 Tf 72 712 Td (Hello) Tj ET".repeat(20);
        assert_eq!(flatedecode(&deflate(&text)).unwrap(), text);
    }

    #[test]
    fn truncated_stream_returns_prefix() {
        let text: Vec<u8> = (0..4000u32).flat_map(|i| i.to_string().into_bytes()).collect();
        let packed = deflate(&text);
        let cut = &packed[..packed.len() - 8];
        let out = flatedecode(cut).unwrap();
        assert!(!out.is_empty());
        assert!(text.starts_with(&out));
    }
}
