//! User memories - facts the bot was asked to remember, scoped per user id.

use crate::db::Database;
use crate::db::sqlite::now_timestamp;
use rusqlite::{Result as SqliteResult, Row, ToSql};
use serde_json::Value;
use web3_memory_types::MemoryRecord;

/// Maximum number of memories returned by a recall
pub const RECALL_LIMIT: usize = 10;

const SCHEMA_VERSION: i64 = 1;

impl Database {
    /// Save a new memory. Metadata is stored as JSON text, `{}` if it can't be serialized.
    pub fn store_memory(
        &self,
        user_id: &str,
        category: &str,
        content: &str,
        metadata: &Value,
    ) -> SqliteResult<MemoryRecord> {
        let metadata_text = serde_json::to_string(metadata).unwrap_or_else(|e| {
            log::warn!("[MEMORY] Could not serialize metadata for {}: {}", user_id, e);
            "{}".to_string()
        });
        let timestamp = now_timestamp();

        let conn = self.conn();
        conn.execute(
            "INSERT INTO user_memories (user_id, category, content, metadata, timestamp, schema_version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![user_id, category, content, metadata_text, timestamp, SCHEMA_VERSION],
        )?;

        Ok(MemoryRecord {
            id: conn.last_insert_rowid(),
            user_id: user_id.to_string(),
            category: category.to_string(),
            content: content.to_string(),
            metadata: parse_metadata(&metadata_text),
            timestamp,
            schema_version: SCHEMA_VERSION,
        })
    }

    /// Most recent memories for a user, newest first, at most [`RECALL_LIMIT`].
    ///
    /// `category` must match exactly. `search_query` matches when it is a
    /// case-sensitive substring of the content or the category. When both are
    /// given a record has to satisfy both. Empty strings are treated as absent.
    pub fn recall_memories(
        &self,
        user_id: &str,
        search_query: Option<&str>,
        category: Option<&str>,
    ) -> SqliteResult<Vec<MemoryRecord>> {
        let mut sql = String::from(
            "SELECT id, user_id, category, content, metadata, timestamp, schema_version
             FROM user_memories
             WHERE user_id = ?1",
        );
        let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.to_string())];

        if let Some(category) = category.filter(|c| !c.is_empty()) {
            params.push(Box::new(category.to_string()));
            sql.push_str(&format!(" AND category = ?{}", params.len()));
        }

        if let Some(query) = search_query.filter(|q| !q.is_empty()) {
            params.push(Box::new(query.to_string()));
            let idx = params.len();
            // instr() is case-sensitive, unlike LIKE
            sql.push_str(&format!(
                " AND (instr(content, ?{idx}) > 0 OR instr(category, ?{idx}) > 0)"
            ));
        }

        sql.push_str(&format!(" ORDER BY timestamp DESC, id DESC LIMIT {}", RECALL_LIMIT));

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), row_to_memory)?;
        let memories = rows.collect::<SqliteResult<Vec<_>>>()?;
        Ok(memories)
    }
}

fn row_to_memory(row: &Row) -> SqliteResult<MemoryRecord> {
    let metadata: String = row.get(4)?;
    Ok(MemoryRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        content: row.get(3)?,
        metadata: parse_metadata(&metadata),
        timestamp: row.get(5)?,
        schema_version: row.get(6)?,
    })
}

fn parse_metadata(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::Object(Default::default()))
}
