//! Persistence layer for the store
//!
//! Contains the binding abstraction and its implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  StorageOrchestrator                │
//! │  - cached store future per origin   │
//! │  - blob encode/decode               │
//! └─────────────────────────────────────┘
//!          ▲
//!          │ load_blob / save_blob
//!          ▼
//! ┌─────────────────────────────────────┐
//! │  PersistenceBinding                 │
//! │  - one blob per origin              │
//! └─────────────────────────────────────┘
//!      ▲                     ▲
//!      │                     │
//!  LocalBinding         RemoteBinding
//!      │                     │
//!  DurableSlots         HostChannel ──► SlotHost
//!  (MemSlots,           ("loadStore",     │
//!   SqliteSlots)         "saveStore")   DurableSlots
//! ```

pub mod local;
pub mod remote;
pub mod slots;
pub mod types;

pub use local::{LocalBinding, SLOT_PREFIX};
pub use remote::{HostChannel, HostError, RemoteBinding, SlotHost, LOAD_STORE, SAVE_STORE};
pub use slots::{DurableSlots, MemSlots, SlotError};
pub use types::{BindingError, PersistenceBinding};
