//! Base64 shaping for upload bodies.
//!
//! The gateway expects the raw base64 text of the image, padded to a multiple of four
//! characters, with no `data:` URL prefix.

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Encode file content as padded standard base64.
pub fn encode_base64(bytes: &[u8]) -> String {
    pad_base64(STANDARD_NO_PAD.encode(bytes))
}

/// Convert a data URL (`data:<mime>;base64,<payload>`) into a padded base64 payload.
pub fn from_data_url(data_url: &str) -> String {
    pad_base64(strip_data_uri_prefix(data_url).to_string())
}

/// Remove a leading `data:` prefix, including an optional `<mime>;base64,` section.
///
/// Text without the prefix is returned unchanged.
pub fn strip_data_uri_prefix(text: &str) -> &str {
    let Some(rest) = text.strip_prefix(DATA_PREFIX) else {
        return text;
    };
    match rest.rfind(BASE64_MARKER) {
        Some(idx) => &rest[idx + BASE64_MARKER.len()..],
        None => rest,
    }
}

/// Pad with `=` until the length is a multiple of four.
pub fn pad_base64(mut encoded: String) -> String {
    let remainder = encoded.len() % 4;
    if remainder > 0 {
        encoded.extend(std::iter::repeat_n('=', 4 - remainder));
    }
    encoded
}
