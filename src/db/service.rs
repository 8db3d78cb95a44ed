use crate::chat::models::Turn;
use crate::db::models::ChatRecord;
use duckdb::{params, types::Type, Connection, Error as DbError, Result as DbResult, Row};
use uuid::Uuid;

pub struct DbService;

impl DbService {
    fn row_to_record(row: &Row) -> DbResult<ChatRecord> {
        let chat_str: String = row.get(2)?;
        let chat: Vec<Turn> = serde_json::from_str(&chat_str)
            .map_err(|e| DbError::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

        Ok(ChatRecord {
            model: row.get::<_, String>(0)?,
            timestamp: row.get::<_, String>(1)?,
            chat,
        })
    }

    /// Stores `record` under a fresh key and returns the key.
    pub fn insert_chat(conn: &Connection, record: &ChatRecord) -> DbResult<String> {
        let key = Uuid::new_v4().to_string();
        let chat_str = serde_json::to_string(&record.chat)
            .map_err(|e| DbError::ToSqlConversionFailure(Box::new(e)))?;

        conn.execute(
            "INSERT INTO chats (chat_key, model, saved_at, chat) VALUES (?, ?, ?, ?)",
            params![key, record.model, record.timestamp, chat_str],
        )?;

        Ok(key)
    }

    /// Most recently inserted record. Ids come from a sequence, so they follow insertion order.
    pub fn latest_chat(conn: &Connection) -> DbResult<Option<ChatRecord>> {
        let mut stmt = conn.prepare(
            "SELECT model, saved_at, chat FROM chats ORDER BY id DESC LIMIT 1",
        )?;
        let mut rows = stmt.query_map([], Self::row_to_record)?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn count_chats(conn: &Connection) -> DbResult<usize> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chats", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
