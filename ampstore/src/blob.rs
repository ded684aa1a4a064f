//! Transport encoding of store entries
//!
//! A blob is `base64(JSON(entries))` with the standard padded alphabet. Only
//! entries travel; capacity is reapplied by whoever loads the blob.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::bounded_store::Entries;

/// Errors that can occur while decoding a blob
#[derive(Debug)]
pub enum DecodeError {
    /// Not valid base64
    Base64(base64::DecodeError),
    /// Decoded bytes are not UTF-8
    Utf8(std::string::FromUtf8Error),
    /// Not a JSON object of `{"v": ..., "t": ...}` entries
    Json(serde_json::Error),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base64(e) => write!(f, "Blob is not valid base64: {e}"),
            Self::Utf8(e) => write!(f, "Blob is not valid UTF-8: {e}"),
            Self::Json(e) => write!(f, "Blob does not hold store entries: {e}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Base64(e) => Some(e),
            Self::Utf8(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

/// Serialize entries into a blob
pub fn encode(entries: &Entries) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(entries)?;
    Ok(BASE64.encode(json))
}

/// Parse a blob back into entries, keeping the persisted key order
pub fn decode(blob: &str) -> Result<Entries, DecodeError> {
    let bytes = BASE64.decode(blob.trim()).map_err(DecodeError::Base64)?;
    let json = String::from_utf8(bytes).map_err(DecodeError::Utf8)?;
    serde_json::from_str(&json).map_err(DecodeError::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounded_store::Entry;
    use serde_json::json;

    #[test]
    fn test_encode_is_base64_of_json() {
        let mut entries = Entries::new();
        entries.insert(
            "key1".to_string(),
            Entry {
                value: json!("value1"),
                timestamp: 0,
            },
        );
        let blob = encode(&entries).unwrap();
        let raw = BASE64.decode(&blob).unwrap();
        assert_eq!(raw, br#"{"key1":{"v":"value1","t":0}}"#);
    }

    #[test]
    fn test_decode_keeps_order() {
        let blob = BASE64.encode(r#"{"b":{"v":1,"t":0},"a":{"v":2,"t":0}}"#);
        let entries = decode(&blob).unwrap();
        let keys: Vec<&String> = entries.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode("%%%"), Err(DecodeError::Base64(_))));
        let not_utf8 = BASE64.encode([0xff, 0xfe]);
        assert!(matches!(decode(&not_utf8), Err(DecodeError::Utf8(_))));
        let not_entries = BASE64.encode("[1,2,3]");
        assert!(matches!(decode(&not_entries), Err(DecodeError::Json(_))));
    }
}
