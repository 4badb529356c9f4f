//! Stream filter pipeline.
//!
//! A stream's `/Filter` chain is resolved into [`FilterStep`]s by the
//! document, then [`decode`] runs them in order. Image codecs that the
//! core does not decompress stop the chain: the remaining payload is
//! returned still encoded, tagged with the filter name.

use bytes::Bytes;

use super::ascii85::{ascii85decode, asciihexdecode};
use super::flate::flatedecode;
use super::lzw::lzwdecode_with_earlychange;
use super::predictor::{PredictorParams, apply_predictor};
use super::runlength::rldecode;
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject, int_or};

/// Filter names this engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Flate,
    Lzw,
    AsciiHex,
    Ascii85,
    RunLength,
    Dct,
    Jpx,
    CcittFax,
    Jbig2,
    Crypt,
}

impl Filter {
    /// Looks up a filter by its full or abbreviated name.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name {
            "FlateDecode" | "Fl" => Self::Flate,
            "LZWDecode" | "LZW" => Self::Lzw,
            "ASCIIHexDecode" | "AHx" => Self::AsciiHex,
            "ASCII85Decode" | "A85" => Self::Ascii85,
            "RunLengthDecode" | "RL" => Self::RunLength,
            "DCTDecode" | "DCT" => Self::Dct,
            "JPXDecode" => Self::Jpx,
            "CCITTFaxDecode" | "CCF" => Self::CcittFax,
            "JBIG2Decode" => Self::Jbig2,
            "Crypt" => Self::Crypt,
            other => return Err(PdfError::UnsupportedFilter(other.to_string())),
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Flate => "FlateDecode",
            Self::Lzw => "LZWDecode",
            Self::AsciiHex => "ASCIIHexDecode",
            Self::Ascii85 => "ASCII85Decode",
            Self::RunLength => "RunLengthDecode",
            Self::Dct => "DCTDecode",
            Self::Jpx => "JPXDecode",
            Self::CcittFax => "CCITTFaxDecode",
            Self::Jbig2 => "JBIG2Decode",
            Self::Crypt => "Crypt",
        }
    }

    /// Image codecs whose payload is handed to the caller undecoded.
    pub const fn is_passthrough(self) -> bool {
        matches!(self, Self::Dct | Self::Jpx | Self::CcittFax | Self::Jbig2)
    }
}

/// Parameters taken from the matching `/DecodeParms` entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodeParams {
    pub predictor: PredictorParams,
    pub early_change: i64,
    /// `/Name` of a Crypt filter
    pub crypt_name: Option<String>,
    /// The raw dictionary, kept for pass-through image codecs
    pub raw: Option<PDFDict>,
}

impl DecodeParams {
    pub fn from_dict(dict: Option<&PDFDict>) -> Self {
        let Some(d) = dict else {
            return Self {
                early_change: 1,
                ..Self::default()
            };
        };
        let defaults = PredictorParams::default();
        Self {
            predictor: PredictorParams {
                predictor: int_or(d.get("Predictor"), defaults.predictor),
                colors: int_or(d.get("Colors"), 1).max(1) as usize,
                bits_per_component: int_or(d.get("BitsPerComponent"), 8).max(1) as usize,
                columns: int_or(d.get("Columns"), 1).max(1) as usize,
            },
            early_change: int_or(d.get("EarlyChange"), 1),
            crypt_name: d
                .get("Name")
                .and_then(|n| n.as_name().ok())
                .map(str::to_string),
            raw: Some(d.clone()),
        }
    }
}

/// One stage of a filter chain.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStep {
    pub filter: Filter,
    pub params: DecodeParams,
}

/// Output of [`decode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub data: Bytes,
    /// Set when the chain stopped at a pass-through image codec; `data` is
    /// then still encoded with this filter.
    pub encoded_with: Option<Filter>,
}

/// Builds the filter chain from already-resolved `/Filter` and
/// `/DecodeParms` values.
///
/// Fails with `UnsupportedFilter` on the first unknown name.
pub fn filter_chain(filter: Option<&PDFObject>, parms: Option<&PDFObject>) -> Result<Vec<FilterStep>> {
    let names: Vec<&str> = match filter {
        None | Some(PDFObject::Null) => Vec::new(),
        Some(PDFObject::Name(n)) => vec![n.as_str()],
        Some(PDFObject::Array(items)) => items.iter().filter_map(|i| i.as_name().ok()).collect(),
        Some(other) => {
            return Err(PdfError::MalformedStructure(format!(
                "/Filter must be a name or array, got {}",
                other.type_name()
            )));
        }
    };
    let parms: Vec<Option<&PDFDict>> = match parms {
        Some(PDFObject::Dict(d)) => vec![Some(d)],
        Some(PDFObject::Array(items)) => items.iter().map(|i| i.as_dict().ok()).collect(),
        _ => Vec::new(),
    };
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            Ok(FilterStep {
                filter: Filter::from_name(name)?,
                params: DecodeParams::from_dict(parms.get(i).copied().flatten()),
            })
        })
        .collect()
}

/// Runs `raw` through `chain`. Pure and deterministic.
pub fn decode(raw: Bytes, chain: &[FilterStep]) -> Result<Decoded> {
    let mut data = raw;
    for step in chain {
        if step.filter.is_passthrough() {
            return Ok(Decoded {
                data,
                encoded_with: Some(step.filter),
            });
        }
        data = Bytes::from(decode_step(&data, step)?);
    }
    Ok(Decoded {
        data,
        encoded_with: None,
    })
}

fn decode_step(data: &[u8], step: &FilterStep) -> Result<Vec<u8>> {
    let params = &step.params;
    match step.filter {
        Filter::Flate => Ok(apply_predictor(flatedecode(data)?, &params.predictor)),
        Filter::Lzw => Ok(apply_predictor(
            lzwdecode_with_earlychange(data, params.early_change)?,
            &params.predictor,
        )),
        Filter::AsciiHex => asciihexdecode(data),
        Filter::Ascii85 => ascii85decode(data),
        Filter::RunLength => rldecode(data),
        Filter::Crypt => match params.crypt_name.as_deref() {
            None | Some("Identity") => Ok(data.to_vec()),
            Some(other) => Err(PdfError::UnsupportedFilter(format!("Crypt/{other}"))),
        },
        Filter::Dct | Filter::Jpx | Filter::CcittFax | Filter::Jbig2 => Ok(data.to_vec()),
    }
}
