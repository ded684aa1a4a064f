//! Error type of store operations

use crate::blob::DecodeError;
use crate::io::BindingError;

/// Errors that can occur in store operations
///
/// `Load` and `Decode` are recovered inside the orchestrator (the store
/// degrades to empty) and only show up in logs. Callers of `set`/`remove`
/// see `Encode` and `Save`.
#[derive(Debug)]
pub enum StorageError {
    /// The binding failed to load the blob
    Load(BindingError),
    /// The loaded blob could not be decoded
    Decode(DecodeError),
    /// The store could not be serialized
    Encode(serde_json::Error),
    /// The binding failed to save the blob
    Save(BindingError),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(e) => write!(f, "Failed to load store: {e}"),
            Self::Decode(e) => write!(f, "Failed to decode store: {e}"),
            Self::Encode(e) => write!(f, "Failed to encode store: {e}"),
            Self::Save(e) => write!(f, "Failed to save store: {e}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) | Self::Save(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::Encode(e) => Some(e),
        }
    }
}
