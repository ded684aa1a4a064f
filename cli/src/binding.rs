//! Persistence binding selected on the command line

use ampstore::{
    BindingError, DurableSlots, LocalBinding, PersistenceBinding, RemoteBinding, SlotHost,
    StoreConfig,
};

/// Either direct slot access or the host message protocol, over the same slots
pub enum CliBinding<S: DurableSlots> {
    Local(LocalBinding<S>),
    ViaHost(RemoteBinding<SlotHost<S>>),
}

impl<S: DurableSlots> CliBinding<S> {
    /// Both modes name slots with `config.slot_prefix`
    #[must_use]
    pub fn new(slots: S, config: &StoreConfig, via_host: bool) -> Self {
        if via_host {
            Self::ViaHost(RemoteBinding::new(SlotHost::with_prefix(
                slots,
                &config.slot_prefix,
            )))
        } else {
            Self::Local(LocalBinding::with_prefix(slots, &config.slot_prefix))
        }
    }

    #[must_use]
    pub fn slots(&self) -> &S {
        match self {
            Self::Local(binding) => binding.slots(),
            Self::ViaHost(binding) => binding.channel().slots(),
        }
    }
}

impl<S: DurableSlots> PersistenceBinding for CliBinding<S> {
    async fn load_blob(&self, origin: &str) -> Result<Option<String>, BindingError> {
        match self {
            Self::Local(binding) => binding.load_blob(origin).await,
            Self::ViaHost(binding) => binding.load_blob(origin).await,
        }
    }

    async fn save_blob(&self, origin: &str, blob: &str) -> Result<(), BindingError> {
        match self {
            Self::Local(binding) => binding.save_blob(origin, blob).await,
            Self::ViaHost(binding) => binding.save_blob(origin, blob).await,
        }
    }
}
