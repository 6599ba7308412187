//! Point identity and payload sanitization.

use std::hash::Hasher;
use tracing::warn;
use twox_hash::XxHash64;

use contextdb_core::types::PointPayload;
use contextdb_core::{Error, Result};

/// Deterministic u64 identity for one logical point.
///
/// The index backend only accepts numeric/UUID point ids, so the natural
/// string identity (document id + chunk index) is mapped through a stable
/// hash. Repeated upserts of the same logical point therefore overwrite
/// rather than duplicate.
pub fn point_id(document_id: &str, chunk_index: usize) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(document_id.as_bytes());
    hasher.write_u8(0);
    hasher.write_u64(chunk_index as u64);
    hasher.finish()
}

/// Converts a payload into the JSON object shipped to the index backend,
/// normalizing or dropping values the backend cannot store.
///
/// Malformed input never crashes the upsert: each offending field is
/// coerced (nested values are stringified, text is stripped of NUL bytes)
/// or dropped with a diagnostic, and serialization failures come back as
/// `Error::Index`.
pub fn sanitize_payload(payload: &PointPayload) -> Result<serde_json::Value> {
    let value = serde_json::to_value(payload)
        .map_err(|e| Error::Index(format!("failed to serialize payload: {e}")))?;
    let serde_json::Value::Object(fields) = value else {
        return Err(Error::Index("payload did not serialize to an object".to_string()));
    };

    let mut sanitized = serde_json::Map::with_capacity(fields.len());
    for (key, value) in fields {
        match sanitize_value(value) {
            Some(clean) => {
                sanitized.insert(key, clean);
            }
            None => {
                warn!(field = %key, "dropping payload field with unsupported value");
            }
        }
    }
    Ok(serde_json::Value::Object(sanitized))
}

fn sanitize_value(value: serde_json::Value) -> Option<serde_json::Value> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(_) => Some(value),
        serde_json::Value::Number(ref n) => {
            // serde_json numbers are always finite, but a float that came in
            // through `extra` may have been stringified upstream; keep the
            // check cheap and explicit.
            if n.as_f64().is_some() || n.as_i64().is_some() || n.as_u64().is_some() {
                Some(value)
            } else {
                None
            }
        }
        serde_json::Value::String(s) => {
            if s.contains('\u{0}') {
                Some(serde_json::Value::String(s.replace('\u{0}', "")))
            } else {
                Some(serde_json::Value::String(s))
            }
        }
        // unsupported composite kinds are stringified rather than rejected
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Some(serde_json::Value::String(value.to_string()))
        }
    }
}
