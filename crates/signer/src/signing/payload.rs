use serde_json::Value;

use crate::error::SignError;

/// Document to be signed, resolved to bytes once before signing.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentPayload {
    Text(String),
    Bytes(Vec<u8>),
    Structured(Value),
}

impl DocumentPayload {
    /// Maps a decoded JSON field onto a payload. `null` means no payload;
    /// a JSON string is signed as-is, anything else is canonicalized.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(DocumentPayload::Text(text)),
            other => Some(DocumentPayload::Structured(other)),
        }
    }

    /// Bytes that go into the payload segment of the token.
    ///
    /// Structured values are serialized as compact JSON with object keys in
    /// sorted order, so equal values always produce equal bytes.
    pub fn into_bytes(self) -> Result<Vec<u8>, SignError> {
        match self {
            DocumentPayload::Text(text) => Ok(text.into_bytes()),
            DocumentPayload::Bytes(bytes) => Ok(bytes),
            DocumentPayload::Structured(value) => {
                serde_json::to_vec(&value).map_err(SignError::JsonToStrConversion)
            }
        }
    }
}

impl From<String> for DocumentPayload {
    fn from(text: String) -> Self {
        DocumentPayload::Text(text)
    }
}

impl From<&str> for DocumentPayload {
    fn from(text: &str) -> Self {
        DocumentPayload::Text(text.to_string())
    }
}

impl From<Vec<u8>> for DocumentPayload {
    fn from(bytes: Vec<u8>) -> Self {
        DocumentPayload::Bytes(bytes)
    }
}

impl From<Value> for DocumentPayload {
    fn from(value: Value) -> Self {
        DocumentPayload::Structured(value)
    }
}
