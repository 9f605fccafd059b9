//! Versioned payload encoding for stored sequences.
//!
//! Sequences are written as `{"version": N, "items": [...]}`. A bare JSON
//! array is the unversioned layout written by the browser edition and is read
//! as version 0.

use serde::de::{DeserializeOwned, Error as _};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Payload version written by this build.
pub const PAYLOAD_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a, T> {
    version: u32,
    items: &'a [T],
}

/// Encode a sequence into the current envelope.
///
/// # Errors
///
/// Returns an error if an item fails to serialize.
pub fn encode<T: Serialize>(items: &[T]) -> Result<String> {
    Ok(serde_json::to_string(&Envelope {
        version: PAYLOAD_VERSION,
        items,
    })?)
}

/// Decode a stored sequence, upgrading older payload versions.
///
/// # Errors
///
/// Returns [`Error::CorruptState`] for malformed payloads and
/// [`Error::UnsupportedPayloadVersion`] for payloads newer than this build.
pub fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<Vec<T>> {
    let corrupt = |source: serde_json::Error| Error::CorruptState {
        key: key.to_string(),
        source,
    };

    let value: Value = serde_json::from_str(raw).map_err(corrupt)?;
    let (version, items) = match value {
        Value::Array(_) => (0, value),
        Value::Object(mut map) => {
            let version = map
                .get("version")
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| corrupt(serde_json::Error::custom("missing payload version")))?;
            let items = map
                .remove("items")
                .ok_or_else(|| corrupt(serde_json::Error::custom("missing payload items")))?;
            (version, items)
        }
        _ => {
            return Err(corrupt(serde_json::Error::custom(
                "expected an array or a versioned envelope",
            )))
        }
    };

    if version > PAYLOAD_VERSION {
        return Err(Error::UnsupportedPayloadVersion {
            key: key.to_string(),
            version,
        });
    }

    let items = upgrade(version, items);
    serde_json::from_value(items).map_err(corrupt)
}

/// Apply payload migrations in order until the current version is reached.
fn upgrade(mut version: u32, mut items: Value) -> Value {
    while version < PAYLOAD_VERSION {
        items = match version {
            0 => upgrade_v0(items),
            _ => items,
        };
        version += 1;
    }
    items
}

/// Version 0 payloads may carry numeric record ids.
fn upgrade_v0(mut items: Value) -> Value {
    if let Value::Array(entries) = &mut items {
        for entry in entries {
            if let Some(id) = entry.get_mut("id") {
                if id.is_number() {
                    *id = Value::String(id.to_string());
                }
            }
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_writes_envelope() {
        let raw = encode(&["A".to_string(), "B".to_string()]).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], PAYLOAD_VERSION);
        assert_eq!(value["items"][1], "B");
    }

    #[test]
    fn test_decode_current_envelope() {
        let raw = encode(&["Yonif 405/SK".to_string()]).unwrap();
        let units: Vec<String> = decode("units", &raw).unwrap();
        assert_eq!(units, vec!["Yonif 405/SK".to_string()]);
    }

    #[test]
    fn test_decode_bare_array_as_v0() {
        let units: Vec<String> = decode("units", r#"["A","B"]"#).unwrap();
        assert_eq!(units, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_v0_numeric_ids_become_strings() {
        #[derive(serde::Deserialize)]
        struct Row {
            id: String,
        }
        let rows: Vec<Row> = decode("records", r#"[{"id": 1712345678901}]"#).unwrap();
        assert_eq!(rows[0].id, "1712345678901");
    }

    #[test]
    fn test_decode_malformed_is_corrupt() {
        let err = decode::<String>("units", "{not json").unwrap_err();
        assert!(matches!(err, Error::CorruptState { ref key, .. } if key == "units"));
    }

    #[test]
    fn test_decode_wrong_shape_is_corrupt() {
        assert!(decode::<String>("units", "42").unwrap_err().is_corrupt_state());
        assert!(decode::<String>("units", r#"{"items": []}"#)
            .unwrap_err()
            .is_corrupt_state());
        assert!(decode::<String>("units", r#"{"version": 1}"#)
            .unwrap_err()
            .is_corrupt_state());
        assert!(decode::<String>("units", "[1, 2]")
            .unwrap_err()
            .is_corrupt_state());
    }

    #[test]
    fn test_decode_future_version_rejected() {
        let err = decode::<String>("units", r#"{"version": 99, "items": []}"#).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedPayloadVersion { version: 99, .. }
        ));
    }
}
