//! Binding that keeps each origin's blob in a local durable slot

use super::slots::DurableSlots;
use super::types::{BindingError, PersistenceBinding};

/// Prefix of the slot key; the origin is appended to it
pub const SLOT_PREFIX: &str = "amp-store:";

/// Persists blobs into `DurableSlots` under `prefix + origin`
pub struct LocalBinding<S: DurableSlots> {
    slots: S,
    prefix: String,
}

impl<S: DurableSlots> LocalBinding<S> {
    #[must_use]
    pub fn new(slots: S) -> Self {
        Self::with_prefix(slots, SLOT_PREFIX)
    }

    #[must_use]
    pub fn with_prefix(slots: S, prefix: &str) -> Self {
        Self {
            slots,
            prefix: prefix.to_string(),
        }
    }

    #[must_use]
    pub fn slot_key(&self, origin: &str) -> String {
        format!("{}{origin}", self.prefix)
    }

    #[must_use]
    pub fn slots(&self) -> &S {
        &self.slots
    }
}

impl<S: DurableSlots> PersistenceBinding for LocalBinding<S> {
    async fn load_blob(&self, origin: &str) -> Result<Option<String>, BindingError> {
        let key = self.slot_key(origin);
        let blob = self.slots.get_item(&key)?;
        tracing::trace!(key = %key, found = blob.is_some(), "local.load_blob");
        Ok(blob)
    }

    async fn save_blob(&self, origin: &str, blob: &str) -> Result<(), BindingError> {
        let key = self.slot_key(origin);
        self.slots.set_item(&key, blob)?;
        tracing::trace!(key = %key, len = blob.len(), "local.save_blob");
        Ok(())
    }
}
