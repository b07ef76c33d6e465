use crate::domain::entities::document::Document;
use crate::domain::error::DomainError;
use crate::domain::ports::document_repository::*;
use crate::infrastructure::sqlite::migrations::run_migrations;
use rusqlite::{params, Connection, ErrorCode};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// SQLite-backed document store. Holds only the database path: every call
/// opens its own connection and drops it before returning, so readers always
/// see the latest committed writes.
pub struct SqliteDocumentRepo {
    db_path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteDocumentRepo {
    /// Creates the schema if needed and switches the database to WAL.
    pub fn open(db_path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, DomainError> {
        let db_path = db_path.as_ref().to_path_buf();
        if db_path.as_os_str() == ":memory:" {
            return Err(DomainError::Configuration(
                "in-memory databases are not supported; each store call opens its own connection".into(),
            ));
        }

        let repo = Self {
            db_path,
            busy_timeout,
        };
        let conn = repo.connect()?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| storage_error("WAL error", e))?;
        run_migrations(&conn)?;
        Ok(repo)
    }

    fn connect(&self) -> Result<Connection, DomainError> {
        let conn = Connection::open(&self.db_path).map_err(|e| storage_error("DB error", e))?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| storage_error("DB error", e))?;
        Ok(conn)
    }

    fn row_to_document(row: &rusqlite::Row) -> Result<Document, rusqlite::Error> {
        Ok(Document {
            id: row.get(0)?,
            source: row.get(1)?,
            text: row.get(2)?,
        })
    }
}

/// Lock contention that outlasts the busy timeout is reported as a timeout.
fn storage_error(context: &str, e: rusqlite::Error) -> DomainError {
    match e.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            DomainError::Timeout(format!("{context}: {e}"))
        }
        _ => DomainError::Storage(format!("{context}: {e}")),
    }
}

impl DocumentRepository for SqliteDocumentRepo {
    fn append(&self, source: &str, lines: &[String]) -> Result<usize, DomainError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("INSERT INTO docs (source, text) VALUES (?1, ?2)")
            .map_err(|e| storage_error("Failed to prepare insert", e))?;

        for (inserted, line) in lines.iter().enumerate() {
            stmt.execute(params![source, line]).map_err(|e| {
                storage_error(
                    &format!(
                        "Failed to add document after inserting {inserted} of {} lines",
                        lines.len()
                    ),
                    e,
                )
            })?;
        }
        Ok(lines.len())
    }

    fn recent(&self, limit: usize) -> Result<Vec<Document>, DomainError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT id, source, text FROM docs ORDER BY id DESC LIMIT ?1")
            .map_err(|e| storage_error("Failed to query documents", e))?;
        let docs = stmt
            .query_map(params![limit as i64], Self::row_to_document)
            .map_err(|e| storage_error("Failed to query documents", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| storage_error("Failed to read document", e))?;
        Ok(docs)
    }

    fn search(&self, text: &str, limit: usize) -> Result<Vec<Document>, DomainError> {
        let conn = self.connect()?;
        let escaped = text
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");
        let mut stmt = conn
            .prepare(
                "SELECT id, source, text FROM docs WHERE text LIKE ?1 ESCAPE '\\' ORDER BY id DESC LIMIT ?2",
            )
            .map_err(|e| storage_error("Failed to search documents", e))?;
        let docs = stmt
            .query_map(params![pattern, limit as i64], Self::row_to_document)
            .map_err(|e| storage_error("Failed to search documents", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| storage_error("Failed to read document", e))?;
        Ok(docs)
    }

    fn stats(&self) -> Result<DocumentStats, DomainError> {
        let conn = self.connect()?;
        let total: usize = conn
            .query_row("SELECT COUNT(*) FROM docs", [], |r| r.get(0))
            .map_err(|e| storage_error("Failed to count documents", e))?;

        let mut stmt = conn
            .prepare("SELECT source, COUNT(*) AS cnt FROM docs GROUP BY source ORDER BY cnt DESC, source ASC")
            .map_err(|e| storage_error("Failed to group documents", e))?;
        let by_source = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
            })
            .map_err(|e| storage_error("Failed to group documents", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| storage_error("Failed to read group", e))?;

        Ok(DocumentStats {
            total_documents: total,
            by_source,
        })
    }
}
