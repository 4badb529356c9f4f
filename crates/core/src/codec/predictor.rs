//! Predictor post-processing for FlateDecode and LZWDecode.

use tracing::warn;

/// Row layout parameters from `/DecodeParms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictorParams {
    pub predictor: i64,
    pub colors: usize,
    pub bits_per_component: usize,
    pub columns: usize,
}

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
        }
    }
}

impl PredictorParams {
    /// Bytes per row, `None` when the parameters overflow.
    fn row_bytes(&self) -> Option<usize> {
        let bits = self
            .colors
            .checked_mul(self.columns)?
            .checked_mul(self.bits_per_component)?;
        Some(bits.div_ceil(8))
    }

    fn pixel_bytes(&self) -> usize {
        self.colors
            .saturating_mul(self.bits_per_component)
            .div_ceil(8)
            .max(1)
    }

    /// Row size usable against `len` bytes of input. A row longer than the
    /// whole input cannot be real and is refused.
    fn checked_row(&self, len: usize) -> Option<usize> {
        match self.row_bytes() {
            Some(0) => None,
            Some(n) if n <= len => Some(n),
            _ => {
                warn!(
                    colors = self.colors,
                    columns = self.columns,
                    bits = self.bits_per_component,
                    "predictor row does not fit the data, left as is"
                );
                None
            }
        }
    }
}

/// Undo the predictor described by `params`. Predictor 1 is a no-op.
pub fn apply_predictor(data: Vec<u8>, params: &PredictorParams) -> Vec<u8> {
    match params.predictor {
        2 => tiff_predictor(data, params),
        10..=15 => png_predictor(&data, params),
        1 => data,
        other => {
            warn!(predictor = other, "unknown predictor, data left as is");
            data
        }
    }
}

/// PNG predictors: every row starts with its own filter-type byte.
fn png_predictor(data: &[u8], params: &PredictorParams) -> Vec<u8> {
    let Some(row_bytes) = params.checked_row(data.len()) else {
        return data.to_vec();
    };
    let bpp = params.pixel_bytes();
    let mut out = Vec::with_capacity(data.len());
    let mut prev = vec![0u8; row_bytes];
    let mut cur = vec![0u8; row_bytes];

    for row in data.chunks(row_bytes + 1) {
        let filter_type = row[0];
        let row = &row[1..];
        let n = row.len();
        match filter_type {
            // Sub
            1 => {
                for i in 0..n {
                    let left = if i >= bpp { cur[i - bpp] } else { 0 };
                    cur[i] = row[i].wrapping_add(left);
                }
            }
            // Up
            2 => {
                for i in 0..n {
                    cur[i] = row[i].wrapping_add(prev[i]);
                }
            }
            // Average
            3 => {
                for i in 0..n {
                    let left = if i >= bpp { cur[i - bpp] as u16 } else { 0 };
                    cur[i] = row[i].wrapping_add(((left + prev[i] as u16) / 2) as u8);
                }
            }
            // Paeth
            4 => {
                for i in 0..n {
                    let left = if i >= bpp { cur[i - bpp] } else { 0 };
                    let upper_left = if i >= bpp { prev[i - bpp] } else { 0 };
                    cur[i] = row[i].wrapping_add(paeth_predictor(left, prev[i], upper_left));
                }
            }
            // None, or an unknown type
            _ => cur[..n].copy_from_slice(row),
        }
        out.extend_from_slice(&cur[..n]);
        std::mem::swap(&mut prev, &mut cur);
    }
    out
}

const fn paeth_predictor(left: u8, above: u8, upper_left: u8) -> u8 {
    let a = left as i16;
    let b = above as i16;
    let c = upper_left as i16;
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();
    if pa <= pb && pa <= pc {
        left
    } else if pb <= pc {
        above
    } else {
        upper_left
    }
}

/// TIFF predictor 2: each component is a delta from the one to its left.
fn tiff_predictor(mut data: Vec<u8>, params: &PredictorParams) -> Vec<u8> {
    let Some(row_bytes) = params.checked_row(data.len()) else {
        return data;
    };
    match params.bits_per_component {
        8 => {
            let colors = params.colors;
            for row in data.chunks_mut(row_bytes) {
                for i in colors..row.len() {
                    row[i] = row[i].wrapping_add(row[i - colors]);
                }
            }
        }
        16 => {
            let step = params.colors * 2;
            for row in data.chunks_mut(row_bytes) {
                let mut i = step;
                while i + 1 < row.len() {
                    let left = u16::from_be_bytes([row[i - step], row[i - step + 1]]);
                    let cur = u16::from_be_bytes([row[i], row[i + 1]]);
                    let [hi, lo] = cur.wrapping_add(left).to_be_bytes();
                    row[i] = hi;
                    row[i + 1] = lo;
                    i += 2;
                }
            }
        }
        bits => warn!(bits, "TIFF predictor for this depth is not supported"),
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(predictor: i64, colors: usize, columns: usize) -> PredictorParams {
        PredictorParams {
            predictor,
            colors,
            bits_per_component: 8,
            columns,
        }
    }

    #[test]
    fn png_up_rows_accumulate() {
        // xref-stream style rows: 1 filter byte + 4 data bytes
        let data = vec![2, 1, 0, 16, 0, 2, 0, 1, 0, 5];
        let out = apply_predictor(data, &params(12, 1, 4));
        assert_eq!(out, vec![1, 0, 16, 0, 1, 1, 16, 5]);
    }

    #[test]
    fn png_sub_average_paeth() {
        let p = params(15, 1, 3);
        assert_eq!(apply_predictor(vec![1, 10, 5, 5], &p), vec![10, 15, 20]);
        let out = apply_predictor(vec![0, 10, 20, 30, 3, 1, 1, 1], &p);
        assert_eq!(out, vec![10, 20, 30, 6, 14, 23]);
        let out = apply_predictor(vec![0, 10, 20, 30, 4, 0, 0, 0], &p);
        assert_eq!(out, vec![10, 20, 30, 10, 20, 30]);
    }

    #[test]
    fn tiff_horizontal_differencing() {
        let out = apply_predictor(vec![10, 1, 1, 1, 5, 5], &params(2, 1, 3));
        assert_eq!(out, vec![10, 11, 12, 1, 6, 11]);
        let out = apply_predictor(vec![1, 2, 3, 1, 1, 1], &params(2, 3, 2));
        assert_eq!(out, vec![1, 2, 3, 2, 3, 4]);
    }

    #[test]
    fn oversized_rows_leave_data_alone() {
        let overflowing = params(12, 1 << 40, 1 << 40);
        assert_eq!(apply_predictor(vec![2, 1, 2], &overflowing), vec![2, 1, 2]);
        let huge = params(12, 1, 1 << 45);
        assert_eq!(apply_predictor(vec![2, 1, 2], &huge), vec![2, 1, 2]);
        assert_eq!(apply_predictor(vec![5, 6], &params(2, 1 << 40, 1 << 40)), vec![5, 6]);
    }

    #[test]
    fn predictor_one_is_identity() {
        assert_eq!(apply_predictor(vec![9, 8, 7], &params(1, 1, 3)), vec![9, 8, 7]);
    }
}
