//! SQLite implementation of `SubmissionRepository`.
//!
//! Submissions are stored in a single table with explicit columns for the
//! lifecycle fields (status, rejection reason, timestamps) and the
//! kind-specific payload as a JSON column. Uses a `Mutex<Connection>`
//! because `rusqlite::Connection` is not `Sync`; operations run inside
//! `tokio::task::spawn_blocking` for async compatibility.
//!
//! # Schema Versioning
//!
//! The database uses SQLite's `user_version` pragma to track schema
//! versions. When the schema changes, increment `CURRENT_SCHEMA_VERSION`
//! and extend `run_migrations`.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use distrohub_core::{OwnerId, Payload, Status, Submission, SubmissionId, SubmissionKind};

use super::{RepositoryError, SubmissionPatch, SubmissionRepository};

/// Current schema version. Increment when making schema changes.
const CURRENT_SCHEMA_VERSION: i64 = 1;

/// SQLite-backed submission repository.
pub struct SqliteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    /// Open (or create) the database at the given path.
    ///
    /// The database is configured with WAL journal mode (verified, since
    /// SQLite can silently keep DELETE mode on filesystems without shared
    /// memory support) and a 5s busy timeout.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        let conn = Connection::open(path_ref)
            .map_err(|e| RepositoryError::storage("open database", e.to_string()))?;

        let is_in_memory = path_str == ":memory:";
        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(|e| RepositoryError::storage("set journal_mode", e.to_string()))?;
        let journal_mode_ok = journal_mode.eq_ignore_ascii_case("wal")
            || (is_in_memory && journal_mode.eq_ignore_ascii_case("memory"));
        if !journal_mode_ok {
            return Err(RepositoryError::storage(
                "configure journal_mode",
                format!(
                    "failed to enable WAL mode: SQLite returned '{}' instead of 'wal'",
                    journal_mode
                ),
            ));
        }

        conn.execute_batch(
            r#"
            PRAGMA synchronous = FULL;
            PRAGMA busy_timeout = 5000;
            "#,
        )
        .map_err(|e| RepositoryError::storage("configure pragmas", e.to_string()))?;

        let current_version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(|e| RepositoryError::storage("read schema version", e.to_string()))?;
        Self::run_migrations(&conn, current_version)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory database, for tests.
    pub fn in_memory() -> Result<Self, RepositoryError> {
        Self::new(":memory:")
    }

    fn run_migrations(conn: &Connection, from_version: i64) -> Result<(), RepositoryError> {
        if from_version > CURRENT_SCHEMA_VERSION {
            return Err(RepositoryError::storage(
                "schema version",
                format!(
                    "database schema version {} is newer than supported version {}",
                    from_version, CURRENT_SCHEMA_VERSION
                ),
            ));
        }

        if from_version < 1 {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS submissions (
                    id TEXT PRIMARY KEY,
                    kind TEXT NOT NULL,
                    owner_id TEXT NOT NULL,
                    status TEXT NOT NULL,
                    rejection_reason TEXT,
                    payload TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_submissions_kind_owner
                    ON submissions(kind, owner_id);
                CREATE INDEX IF NOT EXISTS idx_submissions_kind_status
                    ON submissions(kind, status);
                "#,
            )
            .map_err(|e| RepositoryError::storage("create schema", e.to_string()))?;
            conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
                .map_err(|e| RepositoryError::storage("set schema version", e.to_string()))?;
        }

        Ok(())
    }

    fn lock(conn: &Arc<Mutex<Connection>>) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        conn.lock()
            .map_err(|_| RepositoryError::storage("lock connection", "mutex poisoned"))
    }
}

fn kind_to_str(kind: SubmissionKind) -> &'static str {
    match kind {
        SubmissionKind::Release => "release",
        SubmissionKind::Smartlink => "smartlink",
        SubmissionKind::PromoRelease => "promo_release",
        SubmissionKind::Video => "video",
        SubmissionKind::PlatformAccount => "platform_account",
    }
}

fn status_to_str(status: Status) -> &'static str {
    match status {
        Status::Draft => "draft",
        Status::OnModeration => "on_moderation",
        Status::Accepted => "accepted",
        Status::Rejected => "rejected",
    }
}

fn status_from_str(s: &str) -> Result<Status, RepositoryError> {
    match s {
        "draft" => Ok(Status::Draft),
        "on_moderation" => Ok(Status::OnModeration),
        "accepted" => Ok(Status::Accepted),
        "rejected" => Ok(Status::Rejected),
        other => Err(RepositoryError::serialization(format!(
            "unknown status `{}` in database",
            other
        ))),
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    // Fixed-width subseconds so lexicographic order is chronological
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::serialization(format!("bad timestamp `{}`: {}", s, e)))
}

/// One raw row, before JSON/timestamp decoding.
struct SubmissionRow {
    id: String,
    owner_id: String,
    status: String,
    rejection_reason: Option<String>,
    payload: String,
    created_at: String,
    updated_at: String,
}

const SELECT_COLUMNS: &str =
    "id, owner_id, status, rejection_reason, payload, created_at, updated_at";

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubmissionRow> {
    Ok(SubmissionRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        status: row.get(2)?,
        rejection_reason: row.get(3)?,
        payload: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn hydrate(row: SubmissionRow) -> Result<Submission, RepositoryError> {
    let payload: Payload = serde_json::from_str(&row.payload)
        .map_err(|e| RepositoryError::serialization(format!("bad payload JSON: {}", e)))?;
    Ok(Submission {
        id: SubmissionId(row.id),
        owner_id: OwnerId(row.owner_id),
        status: status_from_str(&row.status)?,
        rejection_reason: row.rejection_reason,
        payload,
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
    })
}

#[async_trait]
impl SubmissionRepository for SqliteRepository {
    async fn list(
        &self,
        kind: SubmissionKind,
        owner: Option<&OwnerId>,
        status: Option<Status>,
    ) -> Result<Vec<Submission>, RepositoryError> {
        let conn = self.conn.clone();
        let owner = owner.cloned();

        tokio::task::spawn_blocking(move || {
            let conn = SqliteRepository::lock(&conn)?;

            let mut sql = format!(
                "SELECT {} FROM submissions WHERE kind = ?1",
                SELECT_COLUMNS
            );
            let mut sql_params: Vec<String> = vec![kind_to_str(kind).to_string()];
            if let Some(owner) = owner {
                sql_params.push(owner.0);
                sql.push_str(&format!(" AND owner_id = ?{}", sql_params.len()));
            }
            if let Some(status) = status {
                sql_params.push(status_to_str(status).to_string());
                sql.push_str(&format!(" AND status = ?{}", sql_params.len()));
            }
            sql.push_str(" ORDER BY created_at DESC, id DESC");

            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| RepositoryError::storage("prepare list", e.to_string()))?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(sql_params), read_row)
                .map_err(|e| RepositoryError::storage("query list", e.to_string()))?;

            let mut submissions = Vec::new();
            for row in rows {
                let row = row.map_err(|e| RepositoryError::storage("read row", e.to_string()))?;
                submissions.push(hydrate(row)?);
            }
            Ok(submissions)
        })
        .await
        .map_err(|e| RepositoryError::storage("join blocking task", e.to_string()))?
    }

    async fn get(
        &self,
        kind: SubmissionKind,
        id: &SubmissionId,
    ) -> Result<Option<Submission>, RepositoryError> {
        let conn = self.conn.clone();
        let id = id.clone();

        tokio::task::spawn_blocking(move || {
            let conn = SqliteRepository::lock(&conn)?;
            let row = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM submissions WHERE id = ?1 AND kind = ?2",
                        SELECT_COLUMNS
                    ),
                    params![id.0, kind_to_str(kind)],
                    read_row,
                )
                .optional()
                .map_err(|e| RepositoryError::storage("query get", e.to_string()))?;
            row.map(hydrate).transpose()
        })
        .await
        .map_err(|e| RepositoryError::storage("join blocking task", e.to_string()))?
    }

    async fn create(
        &self,
        owner: OwnerId,
        payload: Payload,
    ) -> Result<Submission, RepositoryError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let now = Utc::now();
            let submission = Submission {
                id: SubmissionId(Uuid::new_v4().to_string()),
                owner_id: owner,
                status: payload.kind().initial_status(),
                rejection_reason: None,
                payload,
                created_at: now,
                updated_at: now,
            };

            let payload_json = serde_json::to_string(&submission.payload)
                .map_err(|e| RepositoryError::serialization(e.to_string()))?;

            let conn = SqliteRepository::lock(&conn)?;
            conn.execute(
                r#"
                INSERT INTO submissions
                    (id, kind, owner_id, status, rejection_reason, payload, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    submission.id.0,
                    kind_to_str(submission.kind()),
                    submission.owner_id.0,
                    status_to_str(submission.status),
                    submission.rejection_reason,
                    payload_json,
                    format_timestamp(submission.created_at),
                    format_timestamp(submission.updated_at),
                ],
            )
            .map_err(|e| RepositoryError::storage("insert submission", e.to_string()))?;

            Ok(submission)
        })
        .await
        .map_err(|e| RepositoryError::storage("join blocking task", e.to_string()))?
    }

    async fn update(
        &self,
        kind: SubmissionKind,
        id: &SubmissionId,
        patch: SubmissionPatch,
    ) -> Result<Option<Submission>, RepositoryError> {
        let conn = self.conn.clone();
        let id = id.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = SqliteRepository::lock(&conn)?;
            let tx = conn
                .transaction()
                .map_err(|e| RepositoryError::storage("begin transaction", e.to_string()))?;

            let row = tx
                .query_row(
                    &format!(
                        "SELECT {} FROM submissions WHERE id = ?1 AND kind = ?2",
                        SELECT_COLUMNS
                    ),
                    params![id.0, kind_to_str(kind)],
                    read_row,
                )
                .optional()
                .map_err(|e| RepositoryError::storage("query for update", e.to_string()))?;
            let Some(row) = row else {
                return Ok(None);
            };

            let mut submission = hydrate(row)?;
            patch.apply(&mut submission);
            submission.updated_at = Utc::now();

            let payload_json = serde_json::to_string(&submission.payload)
                .map_err(|e| RepositoryError::serialization(e.to_string()))?;
            tx.execute(
                r#"
                UPDATE submissions
                SET status = ?1, rejection_reason = ?2, payload = ?3, updated_at = ?4
                WHERE id = ?5
                "#,
                params![
                    status_to_str(submission.status),
                    submission.rejection_reason,
                    payload_json,
                    format_timestamp(submission.updated_at),
                    submission.id.0,
                ],
            )
            .map_err(|e| RepositoryError::storage("update submission", e.to_string()))?;

            tx.commit()
                .map_err(|e| RepositoryError::storage("commit update", e.to_string()))?;
            Ok(Some(submission))
        })
        .await
        .map_err(|e| RepositoryError::storage("join blocking task", e.to_string()))?
    }
}
