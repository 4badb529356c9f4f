//! ASCII85 and ASCIIHex stream decoders.

use crate::error::Result;

/// Decode ASCII85-encoded data (PDF variant).
///
/// Handles `z` groups, the optional `<~` prefix, the `~>` end marker,
/// embedded whitespace and a missing end marker. A final partial group is
/// padded with `u` as the format requires.
pub fn ascii85decode(data: &[u8]) -> Result<Vec<u8>> {
    let data = data.strip_prefix(b"<~").unwrap_or(data);
    let data = match data.iter().position(|&b| b == b'~') {
        Some(pos) => &data[..pos],
        None => data,
    };

    let mut out = Vec::with_capacity(data.len() * 4 / 5);
    let mut group = [0u8; 5];
    let mut n = 0;
    for &b in data {
        match b {
            b'z' if n == 0 => out.extend_from_slice(&[0, 0, 0, 0]),
            b'!'..=b'u' => {
                group[n] = b - b'!';
                n += 1;
                if n == 5 {
                    out.extend_from_slice(&group_value(&group).to_be_bytes());
                    n = 0;
                }
            }
            // whitespace and junk are skipped
            _ => {}
        }
    }
    if n > 1 {
        for slot in group.iter_mut().skip(n) {
            *slot = b'u' - b'!';
        }
        out.extend_from_slice(&group_value(&group).to_be_bytes()[..n - 1]);
    }
    Ok(out)
}

fn group_value(group: &[u8; 5]) -> u32 {
    group
        .iter()
        .fold(0u32, |acc, &d| acc.wrapping_mul(85).wrapping_add(d as u32))
}

/// Decode ASCIIHex-encoded data. Stops at `>`; an odd final digit is
/// treated as if followed by 0.
pub fn asciihexdecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut high: Option<u8> = None;
    for &b in data {
        let nibble = match b {
            b'>' => break,
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => continue,
        };
        match high.take() {
            Some(h) => out.push((h << 4) | nibble),
            None => high = Some(nibble),
        }
    }
    if let Some(h) = high {
        out.push(h << 4);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii85_known_vectors() {
        assert_eq!(ascii85decode(b"9jqo^BlbD-BleB1DJ+*+F(f,q").unwrap(), b"Man is distinguished");
        assert_eq!(ascii85decode(b"E,9)oF*2M7/c~>").unwrap(), b"pleasure.");
        assert_eq!(ascii85decode(b"<~z~>").unwrap(), vec![0u8; 4]);
    }

    #[test]
    fn ascii85_ignores_whitespace_and_missing_eod() {
        assert_eq!(ascii85decode(b"E,9)o\nF*2M7/c").unwrap(), b"pleasure.");
    }

    #[test]
    fn asciihex_vectors() {
        assert_eq!(asciihexdecode(b"61 62 2e6364   65").unwrap(), b"ab.cde");
        assert_eq!(asciihexdecode(b"61 62 2e6364   657>").unwrap(), b"ab.cdep");
        assert_eq!(asciihexdecode(b"7>").unwrap(), b"p");
    }
}
