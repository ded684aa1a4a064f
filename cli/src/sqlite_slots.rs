//! SQLite-backed implementation of `DurableSlots`
//!
//! Stores each slot as a row of a single table, providing persistence across
//! program runs. The connection is shared behind a mutex since a
//! `rusqlite::Connection` cannot be used from two threads at once.

use ampstore::{DurableSlots, SlotError};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-backed durable slot storage
pub struct SqliteSlots {
    conn: Mutex<Connection>,
}

impl SqliteSlots {
    /// Open (or create) the database at the given path
    ///
    /// Creates the table if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if database cannot be opened or table creation fails.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, rusqlite::Error> {
        Self::init(Connection::open(db_path)?)
    }

    /// Database living only as long as this value
    ///
    /// # Errors
    ///
    /// Returns error if table creation fails.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn backend(e: &rusqlite::Error) -> SlotError {
    SlotError::Backend(e.to_string())
}

impl DurableSlots for SqliteSlots {
    fn get_item(&self, key: &str) -> Result<Option<String>, SlotError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT value FROM slots WHERE key = ?",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| backend(&e))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO slots (key, value) VALUES (?, ?)",
            params![key, value],
        )
        .map_err(|e| backend(&e))?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), SlotError> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM slots WHERE key = ?", params![key])
            .map_err(|e| backend(&e))?;
        Ok(())
    }
}
