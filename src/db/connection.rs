use crate::config::DatabaseConfig;
use duckdb::{Connection, Result as DbResult};
use std::sync::{Arc, Mutex};
use tracing::info;

pub type DbPool = Arc<Mutex<Connection>>;

const SCHEMA: &str = r#"
CREATE SEQUENCE IF NOT EXISTS seq_chats_id;

CREATE TABLE IF NOT EXISTS chats (
    id BIGINT PRIMARY KEY DEFAULT nextval('seq_chats_id'),
    chat_key VARCHAR NOT NULL UNIQUE,
    model VARCHAR NOT NULL,
    saved_at VARCHAR NOT NULL,
    chat VARCHAR NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

pub fn get_connection(config: &DatabaseConfig) -> DbResult<DbPool> {
    info!("Connecting to DuckDB at {}", config.path);
    let conn = if config.path == ":memory:" {
        Connection::open_in_memory()?
    } else {
        Connection::open(&config.path)?
    };

    init_schema(&conn)?;

    Ok(Arc::new(Mutex::new(conn)))
}

fn init_schema(conn: &Connection) -> DbResult<()> {
    info!("Initializing transcript schema");
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
