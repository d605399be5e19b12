//! Input bytes to text, honoring a byte order mark or the declared encoding.

use std::borrow::Cow;
use std::sync::OnceLock;

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;
use tracing::debug;

use crate::domain::error::{DomainError, DomainResult};

/// The XML declaration must be the first thing in the file.
const DECLARATION_SCAN: usize = 256;

fn declared_encoding_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*<\?xml[^>]*?\sencoding\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("static regex")
    })
}

/// Decode a document file.
///
/// A byte order mark wins over the declaration. Without either the input is
/// UTF-8. Bytes invalid in the chosen encoding are an error, never replaced.
pub fn decode_document(bytes: &[u8]) -> DomainResult<String> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes)?.unwrap_or(UTF_8), bytes),
    };
    debug!("decoding input as {}", encoding.name());

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(Cow::into_owned)
        .ok_or_else(|| DomainError::Undecodable {
            encoding: encoding.name().to_string(),
        })
}

fn declared_encoding(bytes: &[u8]) -> DomainResult<Option<&'static Encoding>> {
    let head = &bytes[..bytes.len().min(DECLARATION_SCAN)];
    let Some(caps) = declared_encoding_re().captures(head) else {
        return Ok(None);
    };
    let Some(label) = caps.get(1).or_else(|| caps.get(2)) else {
        return Ok(None);
    };

    // A readable declaration means an ASCII-compatible file, so a UTF-16
    // label without a BOM is read as UTF-8
    Encoding::for_label(label.as_bytes())
        .map(|e| Some(e.output_encoding()))
        .ok_or_else(|| {
            DomainError::UnknownEncoding(String::from_utf8_lossy(label.as_bytes()).into_owned())
        })
}
