//! SQLite connection and schema for the memory store.

use parking_lot::{Mutex, MutexGuard};
use rusqlite::{Connection, Result as SqliteResult};

pub type DbConn<'a> = MutexGuard<'a, Connection>;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database at `path`. `":memory:"` opens a private in-memory database.
    pub fn new(path: &str) -> SqliteResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_tables()?;
        Ok(db)
    }

    pub(crate) fn conn(&self) -> DbConn<'_> {
        self.conn.lock()
    }

    fn init_tables(&self) -> SqliteResult<()> {
        let conn = self.conn();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_memories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                category TEXT NOT NULL,
                content TEXT NOT NULL,
                metadata TEXT NOT NULL DEFAULT '{}',
                timestamp TEXT NOT NULL,
                schema_version INTEGER NOT NULL DEFAULT 1
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_memories_user_time
             ON user_memories(user_id, timestamp DESC)",
            [],
        )?;

        // Reserved for user-defined memory schemas; nothing reads or writes it yet.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_schemas (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                schema_name TEXT NOT NULL,
                schema_definition TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS chat_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                message TEXT NOT NULL,
                response TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_chat_history_user_time
             ON chat_history(user_id, timestamp DESC)",
            [],
        )?;

        Ok(())
    }
}

/// Timestamp format used for every stored row. Fixed-width RFC 3339 in UTC,
/// so lexical order in SQLite matches chronological order.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
