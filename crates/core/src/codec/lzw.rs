//! LZW stream decoder using the weezl crate.

use crate::error::Result;
use tracing::debug;
use weezl::{BitOrder, decode::Decoder};

/// Decode LZW-encoded data with the PDF default `/EarlyChange 1`.
pub fn lzwdecode(data: &[u8]) -> Result<Vec<u8>> {
    lzwdecode_with_earlychange(data, 1)
}

/// Decode LZW-encoded data (MSB first, 8-bit alphabet).
///
/// `/EarlyChange 1` widens codes one entry early, which is the behaviour
/// weezl calls the TIFF size switch. Corrupt input yields the bytes decoded
/// before the error.
pub fn lzwdecode_with_earlychange(data: &[u8], early_change: i64) -> Result<Vec<u8>> {
    let mut decoder = if early_change != 0 {
        Decoder::with_tiff_size_switch(BitOrder::Msb, 8)
    } else {
        Decoder::new(BitOrder::Msb, 8)
    };
    let mut output = Vec::new();
    let outcome = decoder.into_vec(&mut output).decode(data);
    if let Err(err) = outcome.status {
        debug!(%err, decoded = output.len(), "LZW data truncated");
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_reference_sample() {
        let input = b"\x80\x0b\x60\x50\x22\x0c\x0c\x85\x01";
        assert_eq!(lzwdecode(input).unwrap(), b"\x2d\x2d\x2d\x2d\x2d\x41\x2d\x2d\x2d\x42");
    }

    #[test]
    fn early_change_zero_widens_late() {
        // enough distinct pairs to push the table past 512 entries
        let mut state = 7u32;
        let data: Vec<u8> = (0..4000)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
                (state >> 16) as u8
            })
            .collect();
        let encoded = weezl::encode::Encoder::new(BitOrder::Msb, 8)
            .encode(&data)
            .unwrap();
        assert_eq!(lzwdecode_with_earlychange(&encoded, 0).unwrap(), data);
        assert_ne!(lzwdecode_with_earlychange(&encoded, 1).unwrap(), data);
    }

    #[test]
    fn garbage_yields_partial_output() {
        assert!(lzwdecode(b"\xff\xff\xff").is_ok());
    }
}
