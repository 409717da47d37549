//! SQLite-backed metadata store for uploaded documents

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::models::DocumentRecord;

const TABLE: &str = "documents";

/// Handle to the `documents` table.
///
/// Opened once at startup and shared by cloning. Every operation takes the
/// connection guard for the duration of a single statement.
#[derive(Clone)]
pub struct DocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl DocumentStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::write_failure(parent.display().to_string(), e))?;
        }
        let conn = Connection::open(path)
            .map_err(|e| Error::read_failure(path.display().to_string(), e))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::read_failure(TABLE, e))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                upload_date TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS ix_documents_filename ON documents (filename);
            ",
        )
        .map_err(|e| Error::write_failure(TABLE, e))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::read_failure(TABLE, "connection lock poisoned"))
    }

    /// Insert a new record stamped with the current time.
    pub fn create_blocking(&self, filename: &str) -> Result<DocumentRecord> {
        let conn = self.lock()?;
        let upload_date = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        conn.execute(
            "INSERT INTO documents (filename, upload_date) VALUES (?1, ?2)",
            params![filename, upload_date],
        )
        .map_err(|e| Error::write_failure(TABLE, e))?;

        // Same guard, so no other insert can slip in between.
        let id = conn.last_insert_rowid();
        conn.query_row(
            "SELECT id, filename, upload_date FROM documents WHERE id = ?1",
            params![id],
            row_to_record,
        )
        .map_err(|e| Error::read_failure(TABLE, e))
    }

    pub fn get_by_id_blocking(&self, id: i64) -> Result<DocumentRecord> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, filename, upload_date FROM documents WHERE id = ?1",
            params![id],
            row_to_record,
        )
        .optional()
        .map_err(|e| Error::read_failure(TABLE, e))?
        .ok_or(Error::DocumentNotFound { id })
    }

    pub async fn create(&self, filename: &str) -> Result<DocumentRecord> {
        let store = self.clone();
        let filename = filename.to_string();
        tokio::task::spawn_blocking(move || store.create_blocking(&filename))
            .await
            .map_err(|e| Error::write_failure(TABLE, format!("task join error: {}", e)))?
    }

    pub async fn get_by_id(&self, id: i64) -> Result<DocumentRecord> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.get_by_id_blocking(id))
            .await
            .map_err(|e| Error::read_failure(TABLE, format!("task join error: {}", e)))?
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<DocumentRecord> {
    let raw: String = row.get(2)?;
    let upload_date = DateTime::parse_from_rfc3339(&raw)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(DocumentRecord {
        id: row.get(0)?,
        filename: row.get(1)?,
        upload_date,
    })
}
