//! Envelope Codec
//!
//! Maps `EntryUpdate` to and from the transport's JSON payloads. A missing
//! `entry` decodes to the placeholder sender. The text must be present and
//! not blank, the same rule the publisher applies before sending.

use crate::errors::{DecodeError, Result};
use crate::types::{EntryUpdate, DEFAULT_ENTRY};
use serde_json::Value;

const UPDATE_FIELD: &str = "update";
const ENTRY_FIELD: &str = "entry";

/// Encode an envelope as a JSON object carrying both fields
pub fn encode(envelope: &EntryUpdate) -> Value {
    let mut map = serde_json::Map::with_capacity(2);
    map.insert(UPDATE_FIELD.into(), Value::String(envelope.update().to_owned()));
    map.insert(ENTRY_FIELD.into(), Value::String(envelope.entry().to_owned()));
    Value::Object(map)
}

/// Decode an envelope from a JSON payload
pub fn decode(payload: &Value) -> core::result::Result<EntryUpdate, DecodeError> {
    let map = payload.as_object().ok_or(DecodeError::NotAnObject)?;

    let update = match map.get(UPDATE_FIELD) {
        None => return Err(DecodeError::MissingField { field: UPDATE_FIELD }),
        Some(Value::String(update)) => update,
        Some(_) => return Err(DecodeError::InvalidField { field: UPDATE_FIELD }),
    };
    if update.trim().is_empty() {
        return Err(DecodeError::EmptyUpdate);
    }

    let entry = match map.get(ENTRY_FIELD) {
        None => DEFAULT_ENTRY,
        Some(Value::String(entry)) => entry.as_str(),
        Some(_) => return Err(DecodeError::InvalidField { field: ENTRY_FIELD }),
    };

    Ok(EntryUpdate::with_entry(update.as_str(), entry))
}

/// Encode an envelope to JSON bytes
pub fn encode_to_vec(envelope: &EntryUpdate) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&encode(envelope))?)
}

/// Decode an envelope from JSON bytes
pub fn decode_slice(bytes: &[u8]) -> core::result::Result<EntryUpdate, DecodeError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed {
        reason: e.to_string(),
    })?;
    decode(&value)
}
