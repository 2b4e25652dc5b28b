//! `data:` URI helpers for images passed around as text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

#[must_use]
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// MIME type of a `data:` URI, if it is one.
#[must_use]
pub fn mime_of(uri: &str) -> Option<&str> {
    let rest = uri.strip_prefix("data:")?;
    let end = rest.find([';', ','])?;
    Some(&rest[..end])
}

/// Decoded bytes of a base64 `data:` URI.
#[must_use]
pub fn decode(uri: &str) -> Option<Vec<u8>> {
    let (header, body) = uri.strip_prefix("data:")?.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(body).ok()
}
