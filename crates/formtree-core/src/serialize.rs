use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error as ThisError;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),
}

/// Serialize a value to the JSON wire form used for drafts and JSON
/// envelope parts.
pub fn serialize<T>(ty: &T) -> Result<String, SerializeError>
where
    T: Serialize,
{
    serde_json::to_string(ty).map_err(|e| SerializeError::Serialize(e.to_string()))
}

/// Deserialize a value produced by [`serialize`].
pub fn deserialize<T>(raw: &str) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(raw).map_err(|e| SerializeError::Deserialize(e.to_string()))
}

///
/// TESTS
///
