//! Text envelope for stroke payloads stored in image metadata.
//!
//! An envelope is [`MAGIC`] followed by the payload in standard base64, so
//! it survives any metadata slot that only accepts printable text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{DecodeError, DecodeResult};

/// Format tag and version, "PugNetPaint Strokes v1".
pub const MAGIC: &str = "PNPS1:";

/// Wraps `payload` in an envelope.
pub fn embed(payload: &[u8]) -> String {
    let mut text = String::with_capacity(MAGIC.len() + payload.len().div_ceil(3) * 4);
    text.push_str(MAGIC);
    STANDARD.encode_string(payload, &mut text);
    text
}

/// Whether `text` carries an envelope. Only the prefix is inspected.
pub fn detect(text: &str) -> bool {
    text.starts_with(MAGIC)
}

/// Recovers the payload from an envelope.
///
/// Returns `Ok(None)` when the tag is absent. Text after the tag that is not
/// valid base64 is a [`DecodeError::InvalidEnvelope`]. A bare tag yields an
/// empty payload.
pub fn extract(text: &str) -> DecodeResult<Option<Vec<u8>>> {
    let Some(encoded) = text.strip_prefix(MAGIC) else {
        return Ok(None);
    };

    // Some writers wrap long comments; whitespace is never part of the alphabet.
    let cleaned: Vec<u8> = encoded
        .bytes()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();

    STANDARD
        .decode(&cleaned)
        .map(Some)
        .map_err(|e| DecodeError::InvalidEnvelope(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_format() {
        assert_eq!(embed(b"hi"), "PNPS1:aGk=");
        assert_eq!(embed(&[]), MAGIC);
    }

    #[test]
    fn test_extract_roundtrip() {
        let payloads: [&[u8]; 4] = [&[], &[0], &[0xFF, 0x00, 0x7F], &[1, 2, 3, 4, 5, 6, 7]];
        for payload in payloads {
            assert_eq!(extract(&embed(payload)).unwrap().as_deref(), Some(payload));
        }
    }

    #[test]
    fn test_detect_requires_exact_prefix() {
        assert!(detect("PNPS1:"));
        assert!(detect("PNPS1:AAAA"));
        assert!(!detect(""));
        assert!(!detect("pnps1:AAAA"));
        assert!(!detect("PnPs1:AAAA"));
        assert!(!detect(" PNPS1:AAAA"));
        assert!(!detect("comment PNPS1:AAAA"));
        assert!(!detect("PNPS2:AAAA"));
        assert!(!detect("PNPS1"));
    }

    #[test]
    fn test_extract_without_tag_is_none() {
        assert_eq!(extract(""), Ok(None));
        assert_eq!(extract("Made with love"), Ok(None));
        assert_eq!(extract("pnps1:aGk="), Ok(None));
    }

    #[test]
    fn test_extract_bare_tag_is_empty_payload() {
        assert_eq!(extract("PNPS1:"), Ok(Some(Vec::new())));
    }

    #[test]
    fn test_extract_malformed_is_error() {
        assert!(matches!(
            extract("PNPS1:not base64!"),
            Err(DecodeError::InvalidEnvelope(_))
        ));
        assert!(matches!(
            extract("PNPS1:aGk"),
            Err(DecodeError::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn test_extract_ignores_wrapping() {
        assert_eq!(extract("PNPS1:aG\r\nk="), Ok(Some(b"hi".to_vec())));
    }
}
