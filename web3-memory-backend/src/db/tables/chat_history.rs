//! Conversation history - one row per processed message, used as classifier context.

use crate::db::Database;
use crate::db::sqlite::now_timestamp;
use rusqlite::Result as SqliteResult;
use web3_memory_types::ChatTurn;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

impl Database {
    /// Append one (message, response) turn for a user
    pub fn store_chat_history(
        &self,
        user_id: &str,
        message: &str,
        response: &str,
    ) -> SqliteResult<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO chat_history (user_id, message, response, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![user_id, message, response, now_timestamp()],
        )?;
        Ok(())
    }

    /// Up to `limit` most recent turns for a user, newest first.
    /// Callers building model context reverse this into chronological order.
    pub fn get_chat_history(&self, user_id: &str, limit: usize) -> SqliteResult<Vec<ChatTurn>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, message, response, timestamp
             FROM chat_history
             WHERE user_id = ?1
             ORDER BY timestamp DESC, id DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(rusqlite::params![user_id, limit as i64], |row| {
            Ok(ChatTurn {
                id: row.get(0)?,
                user_id: row.get(1)?,
                message: row.get(2)?,
                response: row.get(3)?,
                timestamp: row.get(4)?,
            })
        })?;

        let turns = rows.collect::<SqliteResult<Vec<_>>>()?;
        Ok(turns)
    }
}
