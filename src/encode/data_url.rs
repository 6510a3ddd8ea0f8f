use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::foundation::error::{StudioError, StudioResult};

/// MIME type guessed from magic bytes; `application/octet-stream` when unknown.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}

/// Encode `bytes` as a `data:<mime>;base64,...` URL.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Decode a base64 data URL (any MIME type) or a bare base64 payload.
///
/// The `data:image/png`, `data:image/jpeg` and `data:image/jpg` prefixes used by the storefront
/// are all accepted.
pub fn from_data_url(s: &str) -> StudioResult<Vec<u8>> {
    let s = s.trim();
    let payload = match s.strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest
                .split_once(',')
                .ok_or_else(|| StudioError::serde("data url is missing ',' separator"))?;
            if !header.ends_with(";base64") {
                return Err(StudioError::serde("only base64 data urls are supported"));
            }
            body
        }
        None => s,
    };
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| StudioError::serde(format!("invalid base64 payload: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/data_url.rs"]
mod tests;
