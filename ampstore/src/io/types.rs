//! Persistence binding types and traits

use std::future::Future;

use super::remote::HostError;
use super::slots::SlotError;

/// Errors that can occur in binding operations
#[derive(Debug)]
pub enum BindingError {
    /// The durable slot store failed
    Slot(SlotError),
    /// The host channel rejected or failed the request
    Host(HostError),
}

impl std::fmt::Display for BindingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slot(e) => write!(f, "Local slot failure: {e}"),
            Self::Host(e) => write!(f, "Host channel failure: {e}"),
        }
    }
}

impl std::error::Error for BindingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Slot(e) => Some(e),
            Self::Host(e) => Some(e),
        }
    }
}

impl From<SlotError> for BindingError {
    fn from(e: SlotError) -> Self {
        Self::Slot(e)
    }
}

impl From<HostError> for BindingError {
    fn from(e: HostError) -> Self {
        Self::Host(e)
    }
}

/// Trait for durable persistence of store blobs
///
/// Each origin owns exactly one blob. Implementations never panic on backend
/// faults; every fault is reported through the returned future.
pub trait PersistenceBinding: Send + Sync {
    /// Load the blob for `origin`.
    ///
    /// Resolves to `None` if nothing was ever saved for this origin.
    fn load_blob(
        &self,
        origin: &str,
    ) -> impl Future<Output = Result<Option<String>, BindingError>> + Send;

    /// Replace the blob for `origin`.
    fn save_blob(
        &self,
        origin: &str,
        blob: &str,
    ) -> impl Future<Output = Result<(), BindingError>> + Send;
}
