pub mod binding;
pub mod commands;
pub mod sqlite_slots;

pub use binding::CliBinding;
pub use commands::{Command, CommandError};
pub use sqlite_slots::SqliteSlots;
