//! Store commands run by the `ampstore` binary

use std::io::Write;

use ampstore::{blob, BroadcastChannel, PersistenceBinding, StorageError, StorageOrchestrator};
use serde_json::Value;

/// One store operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Get { key: String },
    Set { key: String, value: String },
    Remove { key: String },
    Dump,
}

/// Errors that can occur running a command
#[derive(Debug)]
pub enum CommandError {
    /// The value argument is not JSON
    BadValue(serde_json::Error),
    /// The store rejected the operation
    Storage(StorageError),
    /// Writing the result failed
    Output(std::io::Error),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadValue(e) => write!(f, "Value is not valid JSON: {e}"),
            Self::Storage(e) => write!(f, "{e}"),
            Self::Output(e) => write!(f, "Failed to write output: {e}"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<StorageError> for CommandError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        Self::Output(e)
    }
}

/// Parse a command-line value: JSON if it parses, a bare string otherwise
///
/// `--json` forces strict parsing.
pub fn parse_value(raw: &str, strict: bool) -> Result<Value, CommandError> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(_) if !strict => Ok(Value::String(raw.to_string())),
        Err(e) => Err(CommandError::BadValue(e)),
    }
}

impl Command {
    /// Run against `store`, printing results to `out`
    ///
    /// # Errors
    ///
    /// Fails on a rejected save, a bad value or an output error. Reads never
    /// fail because of storage faults.
    pub async fn run<B, C>(
        &self,
        store: &StorageOrchestrator<B, C>,
        strict_json: bool,
        out: &mut impl Write,
    ) -> Result<(), CommandError>
    where
        B: PersistenceBinding + 'static,
        C: BroadcastChannel,
    {
        match self {
            Self::Get { key } => match store.get(key).await {
                Some(value) => writeln!(out, "{value}")?,
                None => tracing::info!(key = %key, "no value"),
            },
            Self::Set { key, value } => {
                let value = parse_value(value, strict_json)?;
                store.set(key, value).await?;
            }
            Self::Remove { key } => store.remove(key).await?,
            Self::Dump => {
                let shared = store.store().await;
                let entries = shared.lock().entries().clone();
                for (key, entry) in &entries {
                    writeln!(out, "{key}\t{}\t{}", entry.timestamp, entry.value)?;
                }
                tracing::debug!(
                    entries = entries.len(),
                    blob_len = blob::encode(&entries).map_or(0, |b| b.len()),
                    "dump"
                );
            }
        }
        Ok(())
    }
}
