//! SQLite-backed content store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection};

use super::{
    AudioRef, ContentError, ContentFilter, ContentItem, ContentStatus, ContentStore,
    ContentUpdate, NewContent,
};
use crate::db;

const SELECT_COLUMNS: &str =
    "SELECT id, script, ambient_track, status, final_audio, created_at, updated_at FROM content";

/// SQLite-backed content store.
pub struct SqliteContentStore {
    conn: Mutex<Connection>,
}

impl SqliteContentStore {
    /// Create a new SQLite content store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, ContentError> {
        let conn = db::open(path).map_err(|e| ContentError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite content store (useful for testing).
    pub fn in_memory() -> Result<Self, ContentError> {
        let conn = db::open_in_memory().map_err(|e| ContentError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), ContentError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS content (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                script TEXT NOT NULL,
                ambient_track TEXT,
                status TEXT NOT NULL,
                final_audio TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_content_status ON content(status);
            "#,
        )
        .map_err(|e| ContentError::Database(e.to_string()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, ContentError> {
        self.conn
            .lock()
            .map_err(|_| ContentError::Database("connection lock poisoned".to_string()))
    }

    fn build_where_clause(filter: &ContentFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params.push(Box::new(status.as_str()));
        }

        if filter.missing_final_audio {
            conditions.push("final_audio IS NULL");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_content(row: &rusqlite::Row) -> rusqlite::Result<ContentItem> {
        let id: String = row.get(0)?;
        let script: String = row.get(1)?;
        let ambient_track: Option<String> = row.get(2)?;
        let status_str: String = row.get(3)?;
        let final_audio: Option<String> = row.get(4)?;
        let created_at_str: String = row.get(5)?;
        let updated_at_str: String = row.get(6)?;

        let status = status_str.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                e.into(),
            )
        })?;

        Ok(ContentItem {
            id,
            script,
            ambient_track: ambient_track.and_then(|t| AudioRef::try_from(t).ok()),
            status,
            final_audio: final_audio.and_then(|a| AudioRef::try_from(a).ok()),
            created_at: db::parse_timestamp(&created_at_str),
            updated_at: db::parse_timestamp(&updated_at_str),
        })
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<ContentItem>, ContentError> {
        let result = conn.query_row(
            &format!("{} WHERE id = ?", SELECT_COLUMNS),
            params![id],
            Self::row_to_content,
        );

        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(ContentError::Database(e.to_string())),
        }
    }
}

impl ContentStore for SqliteContentStore {
    fn insert(&self, content: NewContent) -> Result<ContentItem, ContentError> {
        let conn = self.lock()?;

        let id = content
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let now = Utc::now();
        let status = ContentStatus::Pending;

        conn.execute(
            "INSERT INTO content (id, script, ambient_track, status, final_audio, created_at, updated_at) VALUES (?, ?, ?, ?, NULL, ?, ?)",
            params![
                id,
                content.script,
                content.ambient_track.as_ref().map(AudioRef::as_str),
                status.as_str(),
                db::format_timestamp(&now),
                db::format_timestamp(&now),
            ],
        )
        .map_err(|e| ContentError::Database(e.to_string()))?;

        Ok(ContentItem {
            id,
            script: content.script,
            ambient_track: content.ambient_track,
            status,
            final_audio: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<ContentItem>, ContentError> {
        let conn = self.lock()?;
        Self::fetch(&conn, id)
    }

    fn list(&self, filter: &ContentFilter) -> Result<Vec<ContentItem>, ContentError> {
        let conn = self.lock()?;

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!(
            "{} {} ORDER BY created_at ASC, seq ASC LIMIT ? OFFSET ?",
            SELECT_COLUMNS, where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| ContentError::Database(e.to_string()))?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));

        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_content)
            .map_err(|e| ContentError::Database(e.to_string()))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| ContentError::Database(e.to_string()))
    }

    fn update(&self, id: &str, update: ContentUpdate) -> Result<ContentItem, ContentError> {
        let conn = self.lock()?;

        let now = Utc::now();
        let status = update.status();
        let final_audio = update.final_audio().map(AudioRef::as_str);

        let changed = conn
            .execute(
                "UPDATE content SET status = ?, final_audio = ?, updated_at = ? WHERE id = ?",
                params![status.as_str(), final_audio, db::format_timestamp(&now), id],
            )
            .map_err(|e| ContentError::Database(e.to_string()))?;

        if changed == 0 {
            return Err(ContentError::NotFound(id.to_string()));
        }

        Self::fetch(&conn, id)?.ok_or_else(|| ContentError::NotFound(id.to_string()))
    }
}
