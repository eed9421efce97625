//! UTF-16 safe text form of a blob.
//!
//! A blob may contain lone surrogate code units, which cannot be carried by
//! UTF-8 text. The wrapped form is a JSON array where runs of ordinary code
//! units are JSON strings and every surrogate unit is a standalone number:
//!
//! ```text
//! [0x61, 0xD800, 0x62]  ->  ["a",55296,"b"]
//! ```

use serde_json::Value as Json;

use crate::error::CodecError;

const SURROGATES: std::ops::RangeInclusive<u16> = 0xD800..=0xDFFF;

/// Wraps a blob as UTF-8 safe JSON text.
pub fn wrap(units: &[u16]) -> String {
    let mut parts = Vec::new();
    let mut run: Vec<u16> = Vec::new();
    for &unit in units {
        if SURROGATES.contains(&unit) {
            if !run.is_empty() {
                parts.push(Json::String(String::from_utf16_lossy(&run)));
                run.clear();
            }
            parts.push(Json::from(unit));
        } else {
            run.push(unit);
        }
    }
    if !run.is_empty() {
        parts.push(Json::String(String::from_utf16_lossy(&run)));
    }
    Json::Array(parts).to_string()
}

/// Reverses [`wrap`].
pub fn unwrap(text: &str) -> Result<Vec<u16>, CodecError> {
    let parsed: Json = serde_json::from_str(text)
        .map_err(|e| CodecError::Transport(format!("invalid JSON: {e}")))?;
    let Json::Array(parts) = parsed else {
        return Err(CodecError::Transport("wrapped blob must be a JSON array".into()));
    };

    let mut units = Vec::new();
    for part in parts {
        match part {
            Json::String(s) => units.extend(s.encode_utf16()),
            Json::Number(n) => {
                let unit = n
                    .as_u64()
                    .and_then(|v| u16::try_from(v).ok())
                    .ok_or_else(|| CodecError::Transport(format!("invalid code unit: {n}")))?;
                units.push(unit);
            }
            other => {
                return Err(CodecError::Transport(format!(
                    "unexpected element in wrapped blob: {other}"
                )));
            }
        }
    }
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_value, encode_value};
    use crate::types::Value;

    #[test]
    fn surrogates_become_numbers() {
        let text = wrap(&[0x61, 0xD800, 0x62, 0xDC00, 0xDFFF]);
        assert_eq!(text, r#"["a",55296,"b",56320,57343]"#);
        assert_eq!(unwrap(&text).unwrap(), vec![0x61, 0xD800, 0x62, 0xDC00, 0xDFFF]);
    }

    #[test]
    fn empty_blob() {
        assert_eq!(wrap(&[]), "[]");
        assert!(unwrap("[]").unwrap().is_empty());
    }

    #[test]
    fn wrapped_value_round_trip() {
        let value = Value::Array(vec![Value::from("😀 emoji"), Value::from(40000), Value::Null]);
        let units = encode_value(&value).unwrap();
        let text = wrap(&units);
        assert_eq!(decode_value(&unwrap(&text).unwrap()).unwrap(), value);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(unwrap("{}"), Err(CodecError::Transport(_))));
        assert!(matches!(unwrap("[70000]"), Err(CodecError::Transport(_))));
        assert!(matches!(unwrap("[true]"), Err(CodecError::Transport(_))));
        assert!(matches!(unwrap("not json"), Err(CodecError::Transport(_))));
    }
}
