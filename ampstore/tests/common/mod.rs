//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use ampstore::{
    BindingError, BroadcastChannel, BroadcastHub, BroadcastPort, Entries, ManualClock,
    PersistenceBinding, SlotError, StorageOrchestrator, StoreConfig,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;

pub const LOCATION: &str = "https://example.com/articles/1.html?utm=feed";
pub const ORIGIN: &str = "https://example.com";

/// Scriptable binding that records every call
pub struct FakeBinding {
    load_result: Mutex<Result<Option<String>, String>>,
    fail_saves: AtomicBool,
    gate: Option<Arc<Notify>>,
    pub loads: AtomicUsize,
    pub saves: Mutex<Vec<(String, String)>>,
}

impl FakeBinding {
    pub fn returning(blob: Option<String>) -> Self {
        Self {
            load_result: Mutex::new(Ok(blob)),
            fail_saves: AtomicBool::new(false),
            gate: None,
            loads: AtomicUsize::new(0),
            saves: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::returning(None)
    }

    pub fn failing_load() -> Self {
        let binding = Self::empty();
        *binding.load_result.lock() = Err("storage disabled".to_string());
        binding
    }

    /// Loads wait until `gate` is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn set_load_result(&self, blob: Option<String>) {
        *self.load_result.lock() = Ok(blob);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().len()
    }

    pub fn last_saved(&self) -> Option<(String, String)> {
        self.saves.lock().last().cloned()
    }
}

impl PersistenceBinding for FakeBinding {
    async fn load_blob(&self, _origin: &str) -> Result<Option<String>, BindingError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let result = self.load_result.lock().clone();
        result.map_err(|msg| BindingError::Slot(SlotError::Unavailable(msg)))
    }

    async fn save_blob(&self, origin: &str, blob: &str) -> Result<(), BindingError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(BindingError::Slot(SlotError::QuotaExceeded {
                key: origin.to_string(),
                needed: blob.len(),
                quota: 0,
            }));
        }
        self.saves
            .lock()
            .push((origin.to_string(), blob.to_string()));
        Ok(())
    }
}

pub type TestOrchestrator = StorageOrchestrator<FakeBinding, BroadcastPort>;

pub fn orchestrator(binding: FakeBinding, hub: &BroadcastHub) -> TestOrchestrator {
    orchestrator_with(binding, hub, StoreConfig::default())
}

pub fn orchestrator_with(
    binding: FakeBinding,
    hub: &BroadcastHub,
    config: StoreConfig,
) -> TestOrchestrator {
    StorageOrchestrator::new(LOCATION, binding, hub.port("test"), config)
        .unwrap()
        .with_clock(Arc::new(ManualClock::new(0)))
}

/// Port that records everything broadcast by the other ports
pub fn recorder(hub: &BroadcastHub) -> (BroadcastPort, Arc<Mutex<Vec<Value>>>) {
    let port = hub.port("recorder");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    port.on_broadcast(Arc::new(move |message: &Value| {
        sink.lock().push(message.clone());
    }));
    (port, seen)
}

pub fn blob_of(json: &str) -> String {
    BASE64.encode(json)
}

pub fn decode_blob(blob: &str) -> Entries {
    ampstore::blob::decode(blob).unwrap()
}
