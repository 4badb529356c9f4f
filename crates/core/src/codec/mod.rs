//! Stream decoders.
//!
//! - `filters`: filter chain construction and the decode pipeline
//! - `flate`: zlib inflate with corrupt-stream recovery
//! - `lzw`: LZW decompression
//! - `ascii85`: ASCII85 and ASCIIHex
//! - `runlength`: RunLength
//! - `predictor`: PNG and TIFF predictors

pub mod ascii85;
pub mod filters;
pub mod flate;
pub mod lzw;
pub mod predictor;
pub mod runlength;

pub use ascii85::{ascii85decode, asciihexdecode};
pub use filters::{DecodeParams, Decoded, Filter, FilterStep, decode, filter_chain};
pub use flate::flatedecode;
pub use lzw::{lzwdecode, lzwdecode_with_earlychange};
pub use predictor::{PredictorParams, apply_predictor};
pub use runlength::rldecode;
