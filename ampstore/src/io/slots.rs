//! Durable string slots, the local-storage primitive behind `LocalBinding`

use parking_lot::Mutex;
use std::collections::HashMap;

/// Errors that can occur in slot operations
#[derive(Debug)]
pub enum SlotError {
    /// The backing storage cannot be used at all
    Unavailable(String),
    /// Writing the value would exceed the storage quota
    QuotaExceeded { key: String, needed: usize, quota: usize },
    /// Any other backend failure
    Backend(String),
}

impl std::fmt::Display for SlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "Slot storage unavailable: {msg}"),
            Self::QuotaExceeded { key, needed, quota } => write!(
                f,
                "Quota exceeded writing slot '{key}': needs {needed} bytes, quota is {quota}"
            ),
            Self::Backend(msg) => write!(f, "Slot storage error: {msg}"),
        }
    }
}

impl std::error::Error for SlotError {}

/// Trait for synchronous string key/value storage
///
/// Mirrors the browser local-storage contract: reads return `None` for keys
/// never written, and any call may fail.
pub trait DurableSlots: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, SlotError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), SlotError>;

    fn remove_item(&self, key: &str) -> Result<(), SlotError>;
}

/// In-memory implementation of `DurableSlots`
///
/// Simple hash map based storage, useful for testing and single-process use.
/// An optional quota bounds the total bytes of keys and values.
pub struct MemSlots {
    slots: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemSlots {
    /// Create a new empty store without a quota
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            quota: None,
        }
    }

    /// Create a new empty store holding at most `quota` bytes
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

impl Default for MemSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl DurableSlots for MemSlots {
    fn get_item(&self, key: &str) -> Result<Option<String>, SlotError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let mut slots = self.slots.lock();

        if let Some(quota) = self.quota {
            let others: usize = slots
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(SlotError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), SlotError> {
        self.slots.lock().remove(key);
        Ok(())
    }
}
