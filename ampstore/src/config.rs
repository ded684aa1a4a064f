use serde::Deserialize;

use crate::bounded_store::DEFAULT_CAPACITY;
use crate::io::SLOT_PREFIX;

/// Settings of a `StorageOrchestrator`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of keys kept per origin
    pub capacity: usize,
    /// Prefix of the durable slot key, read when building a `LocalBinding`
    /// or a `SlotHost`
    pub slot_prefix: String,
    /// Listen for reset broadcasts from other contexts
    pub cross_context_invalidation: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            slot_prefix: SLOT_PREFIX.to_string(),
            cross_context_invalidation: true,
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_slot_prefix(mut self, prefix: &str) -> Self {
        self.slot_prefix = prefix.to_string();
        self
    }

    #[must_use]
    pub fn with_cross_context_invalidation(mut self, enabled: bool) -> Self {
        self.cross_context_invalidation = enabled;
        self
    }
}
