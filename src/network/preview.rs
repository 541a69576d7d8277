// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Bounded body previews
//!
//! Text responses are cut to their first few lines and a character limit.
//! Everything else is summarized by its content type without touching the
//! body. Compressed text is decoded first, on the inspection copy only.

use crate::config::PreviewConfig;
use crate::error::{Error, Result};
use crate::http::{content_codings, decode_body, Response};

/// Content-type fragments treated as text
pub const TEXT_CONTENT_TYPES: &[&str] = &[
    "text/",
    "application/json",
    "application/xml",
    "application/javascript",
];

/// Appended when a preview is shorter than the body it came from
pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Check whether a content type gets a text preview
///
/// Plain substring match, case-sensitive as received.
pub fn is_text_eligible(content_type: &str) -> bool {
    TEXT_CONTENT_TYPES
        .iter()
        .any(|fragment| content_type.contains(fragment))
}

/// Cut `text` down to the configured line and character bounds
pub fn truncate_text(text: &str, config: &PreviewConfig) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let head = lines
        .iter()
        .take(config.max_lines)
        .copied()
        .collect::<Vec<_>>()
        .join("\n");

    let mut preview: String = head.chars().take(config.max_chars).collect();

    if text.chars().count() > config.max_chars || lines.len() > config.max_lines {
        preview.push_str(TRUNCATION_MARKER);
    }

    preview
}

/// Derive the preview for a response
///
/// `response` must be the inspection duplicate, never the copy handed back
/// to the caller. Read failures become a diagnostic string.
pub fn body_preview(response: &Response, content_type: &str, config: &PreviewConfig) -> String {
    if !is_text_eligible(content_type) {
        return format!("[Binary content: {}]", content_type);
    }

    match preview_text(response, config) {
        Ok(text) => truncate_text(&text, config),
        Err(e) => format!("[Error reading body: {}]", e),
    }
}

/// Read the body as text, undoing any content-encoding
fn preview_text(response: &Response, config: &PreviewConfig) -> Result<String> {
    let codings = content_codings(&response.headers);
    if codings.is_empty() {
        return response.text();
    }

    // Any output past this many bytes already exceeds the character bound.
    let limit = config.max_chars.saturating_mul(4).saturating_add(4);
    let decoded = decode_body(&response.body, &codings, limit)?;

    match String::from_utf8(decoded.bytes) {
        Ok(text) => Ok(text),
        // A cut at the limit may split the last character.
        Err(e) if decoded.truncated && e.utf8_error().error_len().is_none() => {
            let valid = e.utf8_error().valid_up_to();
            let mut bytes = e.into_bytes();
            bytes.truncate(valid);
            String::from_utf8(bytes).map_err(|e| Error::Body(e.to_string()))
        }
        Err(e) => Err(Error::Body(e.to_string())),
    }
}
