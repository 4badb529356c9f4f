//! RunLength stream decoder.

use crate::error::Result;

/// Decode RunLength-encoded data.
///
/// - Length byte 0-127: copy the next (length + 1) bytes
/// - Length byte 128: end of data
/// - Length byte 129-255: repeat the next byte (257 - length) times
///
/// Truncated input stops decoding without an error; a short literal run
/// keeps whatever bytes are present.
pub fn rldecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while let Some(&length) = data.get(i) {
        i += 1;
        match length {
            128 => break,
            0..=127 => {
                let end = (i + length as usize + 1).min(data.len());
                out.extend_from_slice(&data[i..end]);
                i = end;
            }
            129..=255 => {
                let Some(&byte) = data.get(i) else { break };
                i += 1;
                out.extend(std::iter::repeat_n(byte, 257 - length as usize));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_and_repeat_runs() {
        let data = b"\x05123456\xfa7\x04abcde\x80junk";
        assert_eq!(rldecode(data).unwrap(), b"1234567777777abcde");
    }

    #[test]
    fn truncated_runs_stop_cleanly() {
        assert_eq!(rldecode(b"\x04ab").unwrap(), b"ab");
        assert_eq!(rldecode(b"\x01ab\xfe").unwrap(), b"ab");
    }
}
