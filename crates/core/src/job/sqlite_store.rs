//! SQLite-backed job store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode};

use super::{CreateJobRequest, Job, JobError, JobFilter, JobStatus, JobStore, JobTransition};
use crate::db;

const SELECT_COLUMNS: &str = "SELECT id, content_id, status, error, attempts, next_attempt_at, created_at, updated_at FROM jobs";

/// SQLite-backed job store.
pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
    /// Create a new SQLite job store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, JobError> {
        let conn = db::open(path).map_err(|e| JobError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite job store (useful for testing).
    pub fn in_memory() -> Result<Self, JobError> {
        let conn = db::open_in_memory().map_err(|e| JobError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), JobError> {
        // The partial unique index enforces one active job per content item.
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                content_id TEXT NOT NULL,
                status TEXT NOT NULL,
                error TEXT,
                attempts INTEGER NOT NULL DEFAULT 0,
                next_attempt_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status, created_at);
            CREATE INDEX IF NOT EXISTS idx_jobs_content_id ON jobs(content_id);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_jobs_active_content
                ON jobs(content_id)
                WHERE status IN ('pending', 'processing', 'pending_retry');
            "#,
        )
        .map_err(|e| JobError::Database(e.to_string()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, JobError> {
        self.conn
            .lock()
            .map_err(|_| JobError::Database("connection lock poisoned".to_string()))
    }

    fn build_where_clause(filter: &JobFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params.push(Box::new(status.as_str()));
        }

        if let Some(ref content_id) = filter.content_id {
            conditions.push("content_id = ?");
            params.push(Box::new(content_id.clone()));
        }

        if let Some(ref due_at) = filter.due_at {
            conditions.push("next_attempt_at IS NOT NULL AND next_attempt_at <= ?");
            params.push(Box::new(db::format_timestamp(due_at)));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<Job> {
        let id: String = row.get(0)?;
        let content_id: String = row.get(1)?;
        let status_str: String = row.get(2)?;
        let error: Option<String> = row.get(3)?;
        let attempts: u32 = row.get(4)?;
        let next_attempt_at: Option<String> = row.get(5)?;
        let created_at_str: String = row.get(6)?;
        let updated_at_str: String = row.get(7)?;

        let status = status_str.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                e.into(),
            )
        })?;

        Ok(Job {
            id,
            content_id,
            status,
            error,
            attempts,
            next_attempt_at: next_attempt_at.as_deref().map(db::parse_timestamp),
            created_at: db::parse_timestamp(&created_at_str),
            updated_at: db::parse_timestamp(&updated_at_str),
        })
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<Job>, JobError> {
        let result = conn.query_row(
            &format!("{} WHERE id = ?", SELECT_COLUMNS),
            params![id],
            Self::row_to_job,
        );

        match result {
            Ok(job) => Ok(Some(job)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(JobError::Database(e.to_string())),
        }
    }

    fn is_unique_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
        )
    }
}

impl JobStore for SqliteJobStore {
    fn create(&self, request: CreateJobRequest) -> Result<Job, JobError> {
        let conn = self.lock()?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let status = JobStatus::Pending;

        conn.execute(
            "INSERT INTO jobs (id, content_id, status, error, attempts, next_attempt_at, created_at, updated_at) VALUES (?, ?, ?, NULL, 0, NULL, ?, ?)",
            params![
                id,
                request.content_id,
                status.as_str(),
                db::format_timestamp(&now),
                db::format_timestamp(&now),
            ],
        )
        .map_err(|e| {
            if Self::is_unique_violation(&e) {
                JobError::AlreadyActive {
                    content_id: request.content_id.clone(),
                }
            } else {
                JobError::Database(e.to_string())
            }
        })?;

        Ok(Job {
            id,
            content_id: request.content_id,
            status,
            error: None,
            attempts: 0,
            next_attempt_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Job>, JobError> {
        let conn = self.lock()?;
        Self::fetch(&conn, id)
    }

    fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, JobError> {
        let conn = self.lock()?;

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!(
            "{} {} ORDER BY created_at ASC, seq ASC LIMIT ? OFFSET ?",
            SELECT_COLUMNS, where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| JobError::Database(e.to_string()))?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));

        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_job)
            .map_err(|e| JobError::Database(e.to_string()))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| JobError::Database(e.to_string()))
    }

    fn count(&self, filter: &JobFilter) -> Result<i64, JobError> {
        let conn = self.lock()?;

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!("SELECT COUNT(*) FROM jobs {}", where_clause);

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(|e| JobError::Database(e.to_string()))
    }

    fn claim(&self, id: &str) -> Result<Option<Job>, JobError> {
        let conn = self.lock()?;

        let now = Utc::now();
        let changed = conn
            .execute(
                "UPDATE jobs SET status = ?, error = NULL, next_attempt_at = NULL, attempts = attempts + 1, updated_at = ? WHERE id = ? AND status IN (?, ?)",
                params![
                    JobStatus::Processing.as_str(),
                    db::format_timestamp(&now),
                    id,
                    JobStatus::Pending.as_str(),
                    JobStatus::PendingRetry.as_str(),
                ],
            )
            .map_err(|e| JobError::Database(e.to_string()))?;

        let job = Self::fetch(&conn, id)?.ok_or_else(|| JobError::NotFound(id.to_string()))?;

        if changed == 0 {
            return Ok(None);
        }

        Ok(Some(job))
    }

    fn transition(&self, id: &str, transition: JobTransition) -> Result<Job, JobError> {
        let conn = self.lock()?;

        let current = Self::fetch(&conn, id)?.ok_or_else(|| JobError::NotFound(id.to_string()))?;

        let target = transition.target();
        if !current.status.can_transition_to(target) {
            return Err(JobError::InvalidState {
                job_id: id.to_string(),
                current: current.status,
                requested: target,
            });
        }

        let (error, next_attempt_at) = match &transition {
            JobTransition::Complete => (None, None),
            JobTransition::Fail { error } => (Some(error.clone()), None),
            JobTransition::Retry {
                error,
                next_attempt_at,
            } => (Some(error.clone()), Some(db::format_timestamp(next_attempt_at))),
        };

        let now = Utc::now();
        let changed = conn
            .execute(
                "UPDATE jobs SET status = ?, error = ?, next_attempt_at = ?, updated_at = ? WHERE id = ? AND status = ?",
                params![
                    target.as_str(),
                    error,
                    next_attempt_at,
                    db::format_timestamp(&now),
                    id,
                    current.status.as_str(),
                ],
            )
            .map_err(|e| JobError::Database(e.to_string()))?;

        if changed == 0 {
            // Status moved underneath us between the read and the write.
            let latest = Self::fetch(&conn, id)?.ok_or_else(|| JobError::NotFound(id.to_string()))?;
            return Err(JobError::InvalidState {
                job_id: id.to_string(),
                current: latest.status,
                requested: target,
            });
        }

        Self::fetch(&conn, id)?.ok_or_else(|| JobError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_store() -> SqliteJobStore {
        SqliteJobStore::in_memory().unwrap()
    }

    #[test]
    fn test_create_job() {
        let store = create_test_store();
        let job = store.create(CreateJobRequest::new("content-1")).unwrap();

        assert!(!job.id.is_empty());
        assert_eq!(job.content_id, "content-1");
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempts, 0);
        assert!(job.error.is_none());
    }

    #[test]
    fn test_get_nonexistent_job() {
        let store = create_test_store();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_second_active_job_for_content_rejected() {
        let store = create_test_store();
        store.create(CreateJobRequest::new("content-1")).unwrap();

        let result = store.create(CreateJobRequest::new("content-1"));
        assert!(matches!(
            result,
            Err(JobError::AlreadyActive { ref content_id }) if content_id == "content-1"
        ));
    }

    #[test]
    fn test_new_job_allowed_after_terminal() {
        let store = create_test_store();
        let job = store.create(CreateJobRequest::new("content-1")).unwrap();
        store.claim(&job.id).unwrap().unwrap();
        store
            .transition(
                &job.id,
                JobTransition::Fail {
                    error: "boom".to_string(),
                },
            )
            .unwrap();

        assert!(store.create(CreateJobRequest::new("content-1")).is_ok());
    }

    #[test]
    fn test_list_oldest_first() {
        let store = create_test_store();
        let ids: Vec<String> = (0..4)
            .map(|i| {
                store
                    .create(CreateJobRequest::new(format!("content-{}", i)))
                    .unwrap()
                    .id
            })
            .collect();

        let first = store
            .list(&JobFilter::new().with_status(JobStatus::Pending).with_limit(1))
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, ids[0]);

        let all: Vec<String> = store
            .list(&JobFilter::new())
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(all, ids);
    }

    #[test]
    fn test_claim_is_exclusive() {
        let store = create_test_store();
        let job = store.create(CreateJobRequest::new("content-1")).unwrap();

        let claimed = store.claim(&job.id).unwrap().unwrap();
        assert_eq!(claimed.status, JobStatus::Processing);
        assert_eq!(claimed.attempts, 1);

        assert!(store.claim(&job.id).unwrap().is_none());
    }

    #[test]
    fn test_claim_missing_job() {
        let store = create_test_store();
        assert!(matches!(store.claim("ghost"), Err(JobError::NotFound(_))));
    }

    #[test]
    fn test_complete_clears_error() {
        let store = create_test_store();
        let job = store.create(CreateJobRequest::new("content-1")).unwrap();
        store.claim(&job.id).unwrap();
        store
            .transition(
                &job.id,
                JobTransition::Retry {
                    error: "tts timeout".to_string(),
                    next_attempt_at: Utc::now(),
                },
            )
            .unwrap();

        let reclaimed = store.claim(&job.id).unwrap().unwrap();
        assert!(reclaimed.error.is_none());
        assert!(reclaimed.next_attempt_at.is_none());
        assert_eq!(reclaimed.attempts, 2);

        let done = store.transition(&job.id, JobTransition::Complete).unwrap();
        assert_eq!(done.status, JobStatus::Complete);
        assert!(done.error.is_none());
    }

    #[test]
    fn test_transition_from_pending_rejected() {
        let store = create_test_store();
        let job = store.create(CreateJobRequest::new("content-1")).unwrap();

        let result = store.transition(&job.id, JobTransition::Complete);
        assert!(matches!(
            result,
            Err(JobError::InvalidState {
                current: JobStatus::Pending,
                requested: JobStatus::Complete,
                ..
            })
        ));
    }

    #[test]
    fn test_terminal_is_final() {
        let store = create_test_store();
        let job = store.create(CreateJobRequest::new("content-1")).unwrap();
        store.claim(&job.id).unwrap();
        store.transition(&job.id, JobTransition::Complete).unwrap();

        assert!(store.claim(&job.id).unwrap().is_none());
        assert!(store
            .transition(
                &job.id,
                JobTransition::Fail {
                    error: "late".to_string()
                }
            )
            .is_err());
    }

    #[test]
    fn test_due_filter() {
        let store = create_test_store();
        let soon = store.create(CreateJobRequest::new("a")).unwrap();
        let later = store.create(CreateJobRequest::new("b")).unwrap();

        for (job, offset) in [(&soon, -5), (&later, 600)] {
            store.claim(&job.id).unwrap();
            store
                .transition(
                    &job.id,
                    JobTransition::Retry {
                        error: "flaky".to_string(),
                        next_attempt_at: Utc::now() + Duration::seconds(offset),
                    },
                )
                .unwrap();
        }

        let due = store
            .list(
                &JobFilter::new()
                    .with_status(JobStatus::PendingRetry)
                    .due_at(Utc::now()),
            )
            .unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, soon.id);
    }

    #[test]
    fn test_count_by_status_and_content() {
        let store = create_test_store();
        let a = store.create(CreateJobRequest::new("a")).unwrap();
        store.create(CreateJobRequest::new("b")).unwrap();
        store.claim(&a.id).unwrap();

        assert_eq!(store.count(&JobFilter::new()).unwrap(), 2);
        assert_eq!(
            store
                .count(&JobFilter::new().with_status(JobStatus::Pending))
                .unwrap(),
            1
        );
        assert_eq!(
            store.count(&JobFilter::new().with_content_id("a")).unwrap(),
            1
        );
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("jobs.db");

        let id = {
            let store = SqliteJobStore::new(&path).unwrap();
            store.create(CreateJobRequest::new("content-1")).unwrap().id
        };

        let store = SqliteJobStore::new(&path).unwrap();
        let job = store.get(&id).unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Pending);
    }
}
