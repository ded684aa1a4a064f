//! Binding that delegates persistence to the hosting side over a message channel
//!
//! Protocol:
//!
//! - `loadStore` with `{"origin": ...}`, response `{"blob": ...}` (`blob` may be missing)
//! - `saveStore` with `{"origin": ..., "blob": ...}`, response ignored
//!
//! Both requests require an acknowledgment.

use std::future::Future;

use serde_json::{json, Value};

use super::slots::DurableSlots;
use super::types::{BindingError, PersistenceBinding};
use super::LocalBinding;

pub const LOAD_STORE: &str = "loadStore";
pub const SAVE_STORE: &str = "saveStore";

/// Errors reported by a host channel
#[derive(Debug)]
pub enum HostError {
    /// The host answered the request with a rejection
    Rejected { name: String, reason: String },
    /// The host does not understand the message
    UnknownMessage(String),
    /// The request payload is missing a required field
    BadPayload { name: String, field: &'static str },
    /// The channel itself is gone
    Disconnected,
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected { name, reason } => write!(f, "Host rejected '{name}': {reason}"),
            Self::UnknownMessage(name) => write!(f, "Host does not handle message '{name}'"),
            Self::BadPayload { name, field } => {
                write!(f, "Message '{name}' lacks string field '{field}'")
            }
            Self::Disconnected => write!(f, "Host channel disconnected"),
        }
    }
}

impl std::error::Error for HostError {}

/// Request/response channel to the hosting side
pub trait HostChannel: Send + Sync {
    /// Send a named message.
    ///
    /// With `require_ack` the future resolves only after the host answered,
    /// with the response body if there is one.
    fn send_message(
        &self,
        name: &str,
        payload: Value,
        require_ack: bool,
    ) -> impl Future<Output = Result<Option<Value>, HostError>> + Send;
}

/// Persists blobs through a `HostChannel`
pub struct RemoteBinding<H: HostChannel> {
    channel: H,
}

impl<H: HostChannel> RemoteBinding<H> {
    #[must_use]
    pub fn new(channel: H) -> Self {
        Self { channel }
    }

    #[must_use]
    pub fn channel(&self) -> &H {
        &self.channel
    }
}

impl<H: HostChannel> PersistenceBinding for RemoteBinding<H> {
    async fn load_blob(&self, origin: &str) -> Result<Option<String>, BindingError> {
        let response = self
            .channel
            .send_message(LOAD_STORE, json!({ "origin": origin }), true)
            .await?;

        // A non-string blob is treated like a missing one
        let blob = response
            .as_ref()
            .and_then(|body| body.get("blob"))
            .and_then(Value::as_str)
            .map(str::to_string);
        tracing::trace!(origin, found = blob.is_some(), "remote.load_blob");
        Ok(blob)
    }

    async fn save_blob(&self, origin: &str, blob: &str) -> Result<(), BindingError> {
        self.channel
            .send_message(SAVE_STORE, json!({ "origin": origin, "blob": blob }), true)
            .await?;
        tracing::trace!(origin, len = blob.len(), "remote.save_blob");
        Ok(())
    }
}

/// Host side of the protocol, serving requests from `DurableSlots`
///
/// Lets a `RemoteBinding` run against a local store, e.g. when the host and
/// the embedded document live in the same process.
pub struct SlotHost<S: DurableSlots> {
    local: LocalBinding<S>,
}

impl<S: DurableSlots> SlotHost<S> {
    #[must_use]
    pub fn new(slots: S) -> Self {
        Self {
            local: LocalBinding::new(slots),
        }
    }

    /// Serve slots named `prefix + origin`
    #[must_use]
    pub fn with_prefix(slots: S, prefix: &str) -> Self {
        Self {
            local: LocalBinding::with_prefix(slots, prefix),
        }
    }

    #[must_use]
    pub fn slot_key(&self, origin: &str) -> String {
        self.local.slot_key(origin)
    }

    #[must_use]
    pub fn slots(&self) -> &S {
        self.local.slots()
    }

    fn field<'a>(
        name: &str,
        payload: &'a Value,
        field: &'static str,
    ) -> Result<&'a str, HostError> {
        payload
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| HostError::BadPayload {
                name: name.to_string(),
                field,
            })
    }

    fn rejected(name: &str, e: &BindingError) -> HostError {
        HostError::Rejected {
            name: name.to_string(),
            reason: e.to_string(),
        }
    }
}

impl<S: DurableSlots> HostChannel for SlotHost<S> {
    async fn send_message(
        &self,
        name: &str,
        payload: Value,
        _require_ack: bool,
    ) -> Result<Option<Value>, HostError> {
        match name {
            LOAD_STORE => {
                let origin = Self::field(name, &payload, "origin")?;
                let blob = self
                    .local
                    .load_blob(origin)
                    .await
                    .map_err(|e| Self::rejected(name, &e))?;
                Ok(Some(match blob {
                    Some(blob) => json!({ "blob": blob }),
                    None => json!({}),
                }))
            }
            SAVE_STORE => {
                let origin = Self::field(name, &payload, "origin")?;
                let blob = Self::field(name, &payload, "blob")?;
                self.local
                    .save_blob(origin, blob)
                    .await
                    .map_err(|e| Self::rejected(name, &e))?;
                Ok(None)
            }
            other => Err(HostError::UnknownMessage(other.to_string())),
        }
    }
}
