//! Storage orchestrator - per-origin store with lazy load and cross-context reset
//!
//! The orchestrator owns at most one store future at a time (an *epoch*):
//!
//! ```text
//!            first get/set/remove          load resolves
//!  Absent ───────────────────────► Loading ─────────────► Resolved
//!    ▲                                                       │
//!    └──────────── reset broadcast for our origin ◄──────────┘
//! ```
//!
//! Every call made during one epoch shares the same future, so the binding
//! sees at most one `load_blob` per epoch. Loading never fails: a rejected
//! load or an undecodable blob yields an empty store.
//!
//! Mutations are written through: each `set`/`remove` encodes the whole store,
//! saves it and then tells the other contexts to drop their cached copy.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::blob;
use crate::bounded_store::{BoundedStore, Entries};
use crate::broadcast::{BroadcastChannel, StoreMessage};
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::StorageError;
use crate::io::PersistenceBinding;
use crate::origin::{Origin, OriginError};

/// A loaded store, shared by all callers of one epoch
pub type SharedStore = Arc<Mutex<BoundedStore>>;

type StoreFuture = Shared<BoxFuture<'static, SharedStore>>;

/// Observable state of the cached store future
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing cached; the next access loads
    Absent,
    /// A load is in flight
    Loading,
    /// The store is loaded
    Resolved,
}

/// Per-origin key/value store over a persistence binding
pub struct StorageOrchestrator<B, C>
where
    B: PersistenceBinding + 'static,
    C: BroadcastChannel,
{
    origin: Origin,
    binding: Arc<B>,
    channel: C,
    config: StoreConfig,
    clock: Arc<dyn Clock>,
    cached: Arc<Mutex<Option<StoreFuture>>>,
}

impl<B, C> StorageOrchestrator<B, C>
where
    B: PersistenceBinding + 'static,
    C: BroadcastChannel,
{
    /// Create an orchestrator for the origin of `location`
    pub fn new(
        location: &str,
        binding: B,
        channel: C,
        config: StoreConfig,
    ) -> Result<Self, OriginError> {
        let origin = Origin::from_location(location)?;
        Ok(Self::with_origin(origin, binding, channel, config))
    }

    /// Create an orchestrator for an already derived origin
    ///
    /// Registers the reset listener when `config.cross_context_invalidation`
    /// is set.
    #[must_use]
    pub fn with_origin(origin: Origin, binding: B, channel: C, config: StoreConfig) -> Self {
        let cached: Arc<Mutex<Option<StoreFuture>>> = Arc::new(Mutex::new(None));

        if config.cross_context_invalidation {
            let cached = Arc::clone(&cached);
            let own_origin = origin.as_str().to_string();
            channel.on_broadcast(Arc::new(move |message: &Value| {
                match StoreMessage::from_value(message) {
                    Some(StoreMessage::Reset { origin }) if origin == own_origin => {
                        if cached.lock().take().is_some() {
                            debug!(origin = %own_origin, "orchestrator.reset: cache dropped");
                        }
                    }
                    _ => {}
                }
            }));
        } else {
            debug!(origin = %origin, "orchestrator: cross-context invalidation disabled");
        }

        Self {
            origin,
            binding: Arc::new(binding),
            channel,
            config,
            clock: Arc::new(SystemClock::new()),
            cached,
        }
    }

    /// Use `clock` for entry timestamps of stores loaded from now on
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    #[must_use]
    pub fn binding(&self) -> &B {
        &self.binding
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[must_use]
    pub fn cache_state(&self) -> CacheState {
        match self.cached.lock().as_ref() {
            None => CacheState::Absent,
            Some(future) if future.peek().is_some() => CacheState::Resolved,
            Some(_) => CacheState::Loading,
        }
    }

    /// Read a value; storage faults only ever make values look absent
    pub async fn get(&self, key: &str) -> Option<Value> {
        let store = self.store().await;
        let store = store.lock();
        store.get(key).cloned()
    }

    /// Store a value, persist the store and notify the other contexts
    ///
    /// On a save failure the error is returned but the in-memory store keeps
    /// the new value.
    pub async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.mutate(key, |store| store.set(key, value)).await
    }

    /// Delete a key, persist the store and notify the other contexts
    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.mutate(key, |store| {
            store.remove(key);
        })
        .await
    }

    /// The loaded store of the current epoch
    pub async fn store(&self) -> SharedStore {
        self.store_future().await
    }

    fn store_future(&self) -> StoreFuture {
        let mut cached = self.cached.lock();
        if let Some(future) = cached.as_ref() {
            return future.clone();
        }

        let future = load_store(
            Arc::clone(&self.binding),
            self.origin.as_str().to_string(),
            self.config.capacity,
            Arc::clone(&self.clock),
        )
        .boxed()
        .shared();
        *cached = Some(future.clone());
        future
    }

    async fn mutate<F>(&self, key: &str, apply: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BoundedStore),
    {
        let store = self.store().await;
        let blob = {
            let mut store = store.lock();
            apply(&mut *store);
            blob::encode(store.entries()).map_err(StorageError::Encode)?
        };

        self.binding
            .save_blob(self.origin.as_str(), &blob)
            .await
            .map_err(|e| {
                warn!(origin = %self.origin, key, error = %e, "orchestrator.save failed");
                StorageError::Save(e)
            })?;
        debug!(origin = %self.origin, key, len = blob.len(), "orchestrator.save");

        let message = StoreMessage::reset(self.origin.as_str()).to_value();
        if let Err(e) = self.channel.broadcast(&message) {
            warn!(origin = %self.origin, error = %e, "orchestrator.broadcast failed");
        }
        Ok(())
    }
}

async fn load_store(
    binding: Arc<impl PersistenceBinding>,
    origin: String,
    capacity: usize,
    clock: Arc<dyn Clock>,
) -> SharedStore {
    let store = match read_entries(binding.as_ref(), &origin).await {
        Ok(Some(entries)) => {
            debug!(origin = %origin, entries = entries.len(), "orchestrator.load");
            BoundedStore::new(entries, Some(capacity), clock)
        }
        Ok(None) => {
            debug!(origin = %origin, "orchestrator.load: no saved store");
            BoundedStore::empty(Some(capacity), clock)
        }
        Err(e) => {
            warn!(origin = %origin, error = %e, "orchestrator.load: using empty store");
            BoundedStore::empty(Some(capacity), clock)
        }
    };
    Arc::new(Mutex::new(store))
}

async fn read_entries(
    binding: &impl PersistenceBinding,
    origin: &str,
) -> Result<Option<Entries>, StorageError> {
    let Some(raw) = binding
        .load_blob(origin)
        .await
        .map_err(StorageError::Load)?
    else {
        return Ok(None);
    };
    blob::decode(&raw).map(Some).map_err(StorageError::Decode)
}
