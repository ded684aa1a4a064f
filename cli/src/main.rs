use std::path::PathBuf;
use std::process::ExitCode;

use ampstore::io::SLOT_PREFIX;
use ampstore::{BroadcastHub, StorageOrchestrator, StoreConfig, DEFAULT_CAPACITY};
use clap::{Parser, Subcommand};
use cli::{CliBinding, Command, SqliteSlots};
use tracing::{error, info};

/// Per-origin key/value store backed by a local SQLite file
#[derive(Debug, Parser)]
#[command(name = "ampstore", version)]
struct Args {
    /// SQLite database holding the durable slots
    #[arg(long, env = "AMPSTORE_DB", default_value = "ampstore.db")]
    db: PathBuf,

    /// Location of the document; only its origin is used
    #[arg(long, env = "AMPSTORE_LOCATION")]
    location: String,

    /// Maximum number of keys kept per origin
    #[arg(long, env = "AMPSTORE_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Prefix of the slot key, followed by the origin
    #[arg(long, env = "AMPSTORE_SLOT_PREFIX", default_value = SLOT_PREFIX)]
    slot_prefix: String,

    /// Go through the host message protocol instead of the slot directly
    #[arg(long)]
    via_host: bool,

    /// Require `set` values to be valid JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Print the value of a key
    Get { key: String },
    /// Store a value (JSON, or a bare string)
    Set { key: String, value: String },
    /// Delete a key
    Remove { key: String },
    /// Print all entries of the origin
    Dump,
}

impl From<Action> for Command {
    fn from(action: Action) -> Self {
        match action {
            Action::Get { key } => Command::Get { key },
            Action::Set { key, value } => Command::Set { key, value },
            Action::Remove { key } => Command::Remove { key },
            Action::Dump => Command::Dump,
        }
    }
}

async fn run(
    binding: CliBinding<SqliteSlots>,
    location: &str,
    config: StoreConfig,
    command: &Command,
    strict_json: bool,
) -> Result<(), String> {
    // A single process is a single context; nobody else listens on the hub
    let hub = BroadcastHub::new();
    let store = StorageOrchestrator::new(location, binding, hub.port("cli"), config)
        .map_err(|e| e.to_string())?;
    info!(origin = %store.origin(), ?command, "running");

    let mut stdout = std::io::stdout().lock();
    command
        .run(&store, strict_json, &mut stdout)
        .await
        .map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = StoreConfig::default()
        .with_capacity(args.capacity)
        .with_slot_prefix(&args.slot_prefix)
        .with_cross_context_invalidation(false);

    let slots = match SqliteSlots::open(&args.db) {
        Ok(slots) => slots,
        Err(e) => {
            error!("Failed to open {}: {e}", args.db.display());
            return ExitCode::FAILURE;
        }
    };

    let command = Command::from(args.command);
    let binding = CliBinding::new(slots, &config, args.via_host);
    match run(binding, &args.location, config, &command, args.json).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
