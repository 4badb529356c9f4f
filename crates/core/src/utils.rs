//! Geometry and byte helpers shared by the parser, document and interpreter.

/// A 2D point (x, y).
pub type Point = (f64, f64);

/// A rectangle (x0, y0, x1, y1).
pub type Rect = (f64, f64, f64, f64);

/// A 6-element affine transformation matrix (a, b, c, d, e, f).
/// Transforms point (x, y) to (ax + cy + e, bx + dy + f).
pub type Matrix = (f64, f64, f64, f64, f64, f64);

/// Identity transformation matrix.
pub const MATRIX_IDENTITY: Matrix = (1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

/// Multiplies two matrices: result = m1 * m0.
/// This applies m1 first, then m0.
pub fn mult_matrix(m1: Matrix, m0: Matrix) -> Matrix {
    let (a1, b1, c1, d1, e1, f1) = m1;
    let (a0, b0, c0, d0, e0, f0) = m0;
    (
        a0 * a1 + c0 * b1,
        b0 * a1 + d0 * b1,
        a0 * c1 + c0 * d1,
        b0 * c1 + d0 * d1,
        a0 * e1 + c0 * f1 + e0,
        b0 * e1 + d0 * f1 + f0,
    )
}

/// Moves the origin of `m` to `v`, expressed in the matrix's own space.
pub fn translate_matrix(m: Matrix, v: Point) -> Matrix {
    let (a, b, c, d, e, f) = m;
    let (x, y) = v;
    (a, b, c, d, x * a + y * c + e, x * b + y * d + f)
}

/// Applies a matrix to a point.
pub fn apply_matrix_pt(m: Matrix, v: Point) -> Point {
    let (a, b, c, d, e, f) = m;
    let (x, y) = v;
    (a * x + c * y + e, b * x + d * y + f)
}

/// Reads a matrix out of a six-number PDF array.
pub fn matrix_from_slice(values: &[f64]) -> Option<Matrix> {
    match values {
        [a, b, c, d, e, f] => Some((*a, *b, *c, *d, *e, *f)),
        _ => None,
    }
}

/// Normalizes a rectangle so that x0 <= x1 and y0 <= y1.
pub fn normalize_rect(r: Rect) -> Rect {
    let (x0, y0, x1, y1) = r;
    (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
}

/// Unpacks a big-endian unsigned integer of up to eight bytes.
pub fn nunpack(s: &[u8], default: u64) -> u64 {
    if s.is_empty() {
        return default;
    }
    s.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// PDFDocEncoding, byte to Unicode code point. Zero marks undefined bytes.
const PDF_DOC_ENCODING: [u16; 256] = [
    0x0000, 0x0001, 0x0002, 0x0003, 0x0004, 0x0005, 0x0006, 0x0007, 0x0008, 0x0009, 0x000A, 0x000B,
    0x000C, 0x000D, 0x000E, 0x000F, 0x0010, 0x0011, 0x0012, 0x0013, 0x0014, 0x0015, 0x0016, 0x0017,
    0x02D8, 0x02C7, 0x02C6, 0x02D9, 0x02DD, 0x02DB, 0x02DA, 0x02DC, 0x0020, 0x0021, 0x0022, 0x0023,
    0x0024, 0x0025, 0x0026, 0x0027, 0x0028, 0x0029, 0x002A, 0x002B, 0x002C, 0x002D, 0x002E, 0x002F,
    0x0030, 0x0031, 0x0032, 0x0033, 0x0034, 0x0035, 0x0036, 0x0037, 0x0038, 0x0039, 0x003A, 0x003B,
    0x003C, 0x003D, 0x003E, 0x003F, 0x0040, 0x0041, 0x0042, 0x0043, 0x0044, 0x0045, 0x0046, 0x0047,
    0x0048, 0x0049, 0x004A, 0x004B, 0x004C, 0x004D, 0x004E, 0x004F, 0x0050, 0x0051, 0x0052, 0x0053,
    0x0054, 0x0055, 0x0056, 0x0057, 0x0058, 0x0059, 0x005A, 0x005B, 0x005C, 0x005D, 0x005E, 0x005F,
    0x0060, 0x0061, 0x0062, 0x0063, 0x0064, 0x0065, 0x0066, 0x0067, 0x0068, 0x0069, 0x006A, 0x006B,
    0x006C, 0x006D, 0x006E, 0x006F, 0x0070, 0x0071, 0x0072, 0x0073, 0x0074, 0x0075, 0x0076, 0x0077,
    0x0078, 0x0079, 0x007A, 0x007B, 0x007C, 0x007D, 0x007E, 0x0000, 0x2022, 0x2020, 0x2021, 0x2026,
    0x2014, 0x2013, 0x0192, 0x2044, 0x2039, 0x203A, 0x2212, 0x2030, 0x201E, 0x201C, 0x201D, 0x2018,
    0x2019, 0x201A, 0x2122, 0xFB01, 0xFB02, 0x0141, 0x0152, 0x0160, 0x0178, 0x017D, 0x0131, 0x0142,
    0x0153, 0x0161, 0x017E, 0x0000, 0x20AC, 0x00A1, 0x00A2, 0x00A3, 0x00A4, 0x00A5, 0x00A6, 0x00A7,
    0x00A8, 0x00A9, 0x00AA, 0x00AB, 0x00AC, 0x0000, 0x00AE, 0x00AF, 0x00B0, 0x00B1, 0x00B2, 0x00B3,
    0x00B4, 0x00B5, 0x00B6, 0x00B7, 0x00B8, 0x00B9, 0x00BA, 0x00BB, 0x00BC, 0x00BD, 0x00BE, 0x00BF,
    0x00C0, 0x00C1, 0x00C2, 0x00C3, 0x00C4, 0x00C5, 0x00C6, 0x00C7, 0x00C8, 0x00C9, 0x00CA, 0x00CB,
    0x00CC, 0x00CD, 0x00CE, 0x00CF, 0x00D0, 0x00D1, 0x00D2, 0x00D3, 0x00D4, 0x00D5, 0x00D6, 0x00D7,
    0x00D8, 0x00D9, 0x00DA, 0x00DB, 0x00DC, 0x00DD, 0x00DE, 0x00DF, 0x00E0, 0x00E1, 0x00E2, 0x00E3,
    0x00E4, 0x00E5, 0x00E6, 0x00E7, 0x00E8, 0x00E9, 0x00EA, 0x00EB, 0x00EC, 0x00ED, 0x00EE, 0x00EF,
    0x00F0, 0x00F1, 0x00F2, 0x00F3, 0x00F4, 0x00F5, 0x00F6, 0x00F7, 0x00F8, 0x00F9, 0x00FA, 0x00FB,
    0x00FC, 0x00FD, 0x00FE, 0x00FF,
];

/// Decodes a PDF text string (Info values, field names, labels).
///
/// Strings with a UTF-16BE byte order mark are decoded as UTF-16, with
/// UTF-8 BOM strings decoded as UTF-8. Everything else is PDFDocEncoding.
pub fn decode_text(s: &[u8]) -> String {
    if let Some(rest) = s.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = s.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    s.iter().filter_map(|&c| pdfdoc_char(c)).collect()
}

/// PDFDocEncoding lookup of a single byte.
pub fn pdfdoc_char(c: u8) -> Option<char> {
    match PDF_DOC_ENCODING[c as usize] {
        0 if c != 0 => None,
        cp => char::from_u32(cp as u32),
    }
}

/// Formats a number as lowercase Roman numerals. Returns the decimal
/// form for values outside 1..4000.
pub fn format_int_roman(value: u32) -> String {
    if value == 0 || value >= 4000 {
        return value.to_string();
    }
    const TABLE: [(u32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    let mut value = value;
    for (n, s) in TABLE {
        while value >= n {
            out.push_str(s);
            value -= n;
        }
    }
    out
}

/// Formats a number as lowercase letters: a..z, aa..zz, and so on.
pub fn format_int_alpha(value: u32) -> String {
    if value == 0 {
        return String::new();
    }
    let letter = (b'a' + ((value - 1) % 26) as u8) as char;
    let repeat = ((value - 1) / 26 + 1) as usize;
    std::iter::repeat_n(letter, repeat).collect()
}

/// Finds the first occurrence of `needle` in `haystack` at or after `from`.
pub fn find_bytes(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Finds the last occurrence of `needle` in `haystack`.
pub fn rfind_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mult_matrix_applies_left_first() {
        let scale = (2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let shift = (1.0, 0.0, 0.0, 1.0, 10.0, 5.0);
        let m = mult_matrix(scale, shift);
        assert_eq!(apply_matrix_pt(m, (1.0, 1.0)), (12.0, 7.0));
        let m = mult_matrix(shift, scale);
        assert_eq!(apply_matrix_pt(m, (1.0, 1.0)), (22.0, 12.0));
    }

    #[test]
    fn translate_in_own_space() {
        let m = translate_matrix((2.0, 0.0, 0.0, 2.0, 1.0, 1.0), (3.0, 4.0));
        assert_eq!(m, (2.0, 0.0, 0.0, 2.0, 7.0, 9.0));
    }

    #[test]
    fn decode_text_handles_bom_and_doc_encoding() {
        assert_eq!(decode_text(b"\xfe\xff\x00H\x00i"), "Hi");
        assert_eq!(decode_text(b"caf\xe9"), "caf\u{e9}");
        assert_eq!(decode_text(b"\x93quote\x94"), "\u{201c}quote\u{201d}");
        assert_eq!(decode_text(b"\xef\xbb\xbfok"), "ok");
    }

    #[test]
    fn label_numbering() {
        assert_eq!(format_int_roman(1994), "mcmxciv");
        assert_eq!(format_int_roman(4), "iv");
        assert_eq!(format_int_alpha(1), "a");
        assert_eq!(format_int_alpha(26), "z");
        assert_eq!(format_int_alpha(28), "bb");
    }

    #[test]
    fn byte_search() {
        assert_eq!(find_bytes(b"abc endstream x", b"endstream", 0), Some(4));
        assert_eq!(find_bytes(b"abc", b"endstream", 0), None);
        assert_eq!(rfind_bytes(b"startxref 1 startxref 2", b"startxref"), Some(12));
        assert_eq!(nunpack(b"\x01\x00", 0), 256);
        assert_eq!(nunpack(b"", 7), 7);
    }
}
