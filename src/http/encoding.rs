// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Content-encoding decoding for inspection copies
//!
//! Only ever applied to a duplicate body. Bytes relayed to the caller keep
//! whatever encoding the upstream chose.

use std::io::Read;

use flate2::read::{GzDecoder, ZlibDecoder};
use reqwest::header::HeaderMap;

use super::headers::CONTENT_ENCODING;
use crate::error::{Error, Result};

const BROTLI_BUFFER_SIZE: usize = 4096;

/// Decoded body, possibly cut at the requested limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBody {
    pub bytes: Vec<u8>,
    /// Decoding stopped at the limit with output left over
    pub truncated: bool,
}

/// Codings listed in `content-encoding`, in the order they were applied
///
/// Names are lowercased and `identity` entries dropped.
pub fn content_codings(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(CONTENT_ENCODING)
        .iter()
        .flat_map(|value| {
            let raw = String::from_utf8_lossy(value.as_bytes());
            raw.split(',')
                .map(|coding| coding.trim().to_ascii_lowercase())
                .collect::<Vec<_>>()
        })
        .filter(|coding| !coding.is_empty() && coding.as_str() != "identity")
        .collect()
}

/// Undo `codings` on `body`, producing at most `limit` bytes
///
/// Supports gzip, deflate (zlib framing) and br. Codings are removed in
/// reverse order of application.
pub fn decode_body(body: &[u8], codings: &[String], limit: usize) -> Result<DecodedBody> {
    let mut reader: Box<dyn Read + '_> = Box::new(body);
    for coding in codings.iter().rev() {
        reader = match coding.as_str() {
            "gzip" | "x-gzip" => Box::new(GzDecoder::new(reader)),
            "deflate" => Box::new(ZlibDecoder::new(reader)),
            "br" => Box::new(brotli_decompressor::Decompressor::new(
                reader,
                BROTLI_BUFFER_SIZE,
            )),
            other => {
                return Err(Error::Body(format!(
                    "unsupported content-encoding: {}",
                    other
                )))
            }
        };
    }

    let mut bytes = Vec::new();
    reader
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| Error::Body(format!("{} decoding failed: {}", codings.join(", "), e)))?;

    let truncated = bytes.len() > limit;
    bytes.truncate(limit);
    Ok(DecodedBody { bytes, truncated })
}
