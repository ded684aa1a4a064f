//! Broadcast channel between execution contexts
//!
//! Every context that shares a storage origin holds a port on the same hub.
//! A message broadcast through one port is delivered to the handlers of all
//! *other* ports; the sender does not hear itself.
//!
//! # Delivery
//!
//! Delivery is synchronous: `broadcast` returns after every handler ran.
//! Handlers are collected under the hub lock and called after the lock is
//! released, so a handler may itself broadcast or (re)register without
//! deadlocking. A handler must not block.
//!
//! # Messages
//!
//! Messages are JSON values. The store only speaks one kind:
//!
//! ```text
//! {"type": "amp-storage-reset", "origin": "https://example.com"}
//! ```
//!
//! Other message types can travel over the same hub; handlers ignore what
//! they do not understand.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Type tag of the reset message on the wire
pub const RESET_MESSAGE_TYPE: &str = "amp-storage-reset";

/// Messages understood by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreMessage {
    /// The store of `origin` changed; cached copies must be reloaded
    #[serde(rename = "amp-storage-reset")]
    Reset { origin: String },
}

impl StoreMessage {
    #[must_use]
    pub fn reset(origin: &str) -> Self {
        Self::Reset {
            origin: origin.to_string(),
        }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Reset { origin } => serde_json::json!({
                "type": RESET_MESSAGE_TYPE,
                "origin": origin,
            }),
        }
    }

    /// Parse a broadcast value; `None` for anything that is not a store message
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}

/// Errors that can occur when broadcasting
#[derive(Debug)]
pub enum ChannelError {
    /// The hub was closed
    Closed,
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "Broadcast channel is closed"),
        }
    }
}

impl std::error::Error for ChannelError {}

/// Callback receiving broadcast messages
pub type BroadcastHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Publish/subscribe primitive between cooperating contexts
pub trait BroadcastChannel: Send + Sync {
    /// Send `message` to the other contexts
    fn broadcast(&self, message: &Value) -> Result<(), ChannelError>;

    /// Register the handler of this context, replacing any previous one
    fn on_broadcast(&self, handler: BroadcastHandler);
}

// ============================================================================
// Hub
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PortId(u64);

struct Registration {
    handler: BroadcastHandler,
    debug_hint: String,
}

struct HubState {
    next_port: u64,
    handlers: HashMap<PortId, Registration>,
    closed: bool,
}

/// Thread-safe in-process broadcast hub
#[derive(Clone)]
pub struct BroadcastHub {
    inner: Arc<Mutex<HubState>>,
}

impl BroadcastHub {
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubState {
                next_port: 1,
                handlers: HashMap::new(),
                closed: false,
            })),
        }
    }

    /// Open a port for one context
    #[must_use]
    pub fn port(&self, debug_hint: &str) -> BroadcastPort {
        let mut state = self.inner.lock();
        let id = PortId(state.next_port);
        state.next_port += 1;
        drop(state);

        BroadcastPort {
            id,
            hub: self.clone(),
            debug_hint: debug_hint.to_string(),
        }
    }

    /// Close the hub: handlers are dropped and further broadcasts fail
    pub fn close(&self) {
        let mut state = self.inner.lock();
        state.closed = true;
        let handlers = std::mem::take(&mut state.handlers);
        drop(state);
        log::debug!("hub.close: dropped {} handler(s)", handlers.len());
    }

    /// Number of ports with a registered handler
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.inner.lock().handlers.len()
    }

    fn deliver(&self, from: PortId, message: &Value) -> Result<usize, ChannelError> {
        let state = self.inner.lock();
        if state.closed {
            return Err(ChannelError::Closed);
        }
        let targets: Vec<(BroadcastHandler, String)> = state
            .handlers
            .iter()
            .filter(|(id, _)| **id != from)
            .map(|(_, reg)| (Arc::clone(&reg.handler), reg.debug_hint.clone()))
            .collect();
        drop(state);

        log::debug!(
            "hub.broadcast: from port {:?}, receivers: {}",
            from,
            targets.len()
        );
        for (handler, debug_hint) in &targets {
            log::trace!("hub.broadcast: delivering to '{debug_hint}'");
            handler(message);
        }
        Ok(targets.len())
    }
}

/// One context's end of a `BroadcastHub`
///
/// Dropping the port unregisters its handler.
pub struct BroadcastPort {
    id: PortId,
    hub: BroadcastHub,
    debug_hint: String,
}

impl BroadcastPort {
    /// Broadcast and report how many handlers received the message
    pub fn broadcast_counted(&self, message: &Value) -> Result<usize, ChannelError> {
        self.hub.deliver(self.id, message)
    }
}

impl BroadcastChannel for BroadcastPort {
    fn broadcast(&self, message: &Value) -> Result<(), ChannelError> {
        self.broadcast_counted(message).map(|_| ())
    }

    fn on_broadcast(&self, handler: BroadcastHandler) {
        let mut state = self.hub.inner.lock();
        if state.closed {
            log::warn!("port.on_broadcast: hub closed, ignoring handler of '{}'", self.debug_hint);
            return;
        }
        let registration = Registration {
            handler,
            debug_hint: self.debug_hint.clone(),
        };
        if state.handlers.insert(self.id, registration).is_some() {
            log::warn!(
                "port.on_broadcast: replaced existing handler of '{}'",
                self.debug_hint
            );
        }
    }
}

impl Drop for BroadcastPort {
    fn drop(&mut self) {
        let removed = self.hub.inner.lock().handlers.remove(&self.id);
        // Run the handler's destructor outside the lock
        drop(removed);
    }
}

impl std::fmt::Debug for BroadcastPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastPort")
            .field("id", &self.id)
            .field("debug_hint", &self.debug_hint)
            .finish_non_exhaustive()
    }
}
