use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use serde_json::Value;
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

use crate::ProviderApiError;

/// `base64(sha1(part_1 || part_2 || ...))`. Both providers sign messages this way; they only differ in which fields
/// are concatenated.
pub fn sha1_base64(parts: &[&[u8]]) -> String {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part);
    }
    STANDARD.encode(hasher.finalize())
}

/// Compares a locally computed signature with the one a provider sent, in constant time. Empty signatures never match.
pub fn signatures_match(expected: &str, received: &str) -> bool {
    !received.is_empty() && bool::from(expected.as_bytes().ct_eq(received.as_bytes()))
}

/// Serializes the payload to JSON and base64-encodes it.
pub fn encode_json_payload<T: Serialize>(payload: &T) -> Result<String, ProviderApiError> {
    let json = serde_json::to_string(payload).map_err(|e| ProviderApiError::JsonError(e.to_string()))?;
    Ok(STANDARD.encode(json))
}

/// Reverses [`encode_json_payload`]. The result must be a JSON object.
pub fn decode_json_payload(data: &str) -> Result<Value, ProviderApiError> {
    let bytes = STANDARD.decode(data.trim()).map_err(|e| ProviderApiError::InvalidPayload(e.to_string()))?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|e| ProviderApiError::InvalidPayload(e.to_string()))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ProviderApiError::InvalidPayload("payload is not a JSON object".to_string()))
    }
}
