pub mod blob;
pub mod bounded_store;
pub mod broadcast;
pub mod clock;
pub mod config;
pub mod error;
pub mod io;
pub mod orchestrator;
pub mod origin;

// Re-export store types for convenience
pub use bounded_store::{BoundedStore, Entries, Entry, DEFAULT_CAPACITY};

// Re-export binding types for convenience
pub use io::{
    BindingError, DurableSlots, HostChannel, HostError, LocalBinding, MemSlots,
    PersistenceBinding, RemoteBinding, SlotError, SlotHost,
};

// Re-export broadcast types for convenience
pub use broadcast::{
    BroadcastChannel, BroadcastHandler, BroadcastHub, BroadcastPort, ChannelError, StoreMessage,
};

// Re-export orchestrator types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use error::StorageError;
pub use orchestrator::{CacheState, SharedStore, StorageOrchestrator};
pub use origin::{Origin, OriginError};
