use crate::domain::error::DomainError;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS docs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source TEXT NOT NULL,
            text TEXT NOT NULL CHECK (length(trim(text, char(9, 10, 11, 12, 13, 32))) > 0)
        );

        CREATE INDEX IF NOT EXISTS idx_docs_source ON docs(source);
        "
    ).map_err(|e| DomainError::Storage(format!("Migration failed: {e}")))
}
