use crate::utils::error::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Decodes a base64 transport payload into raw bytes.
///
/// Servers may wrap long payloads across lines, so ASCII whitespace is
/// stripped before decoding.
pub fn decode_payload(encoded: &str) -> Result<Vec<u8>> {
    let bytes = if encoded.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = encoded
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        STANDARD.decode(compact)?
    } else {
        STANDARD.decode(encoded)?
    };
    Ok(bytes)
}

pub fn encode_payload(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
