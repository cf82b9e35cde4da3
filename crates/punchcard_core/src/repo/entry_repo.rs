//! SQLite-backed published record store.
//!
//! # Responsibility
//! - Persist the published entry set and serve it back.
//! - Gate every write behind the admin token check.
//! - Implement the publish/fetch boundary contracts for the service layer.
//!
//! # Invariants
//! - Writes validate every entry before any SQL mutation.
//! - A rejected token mutates nothing.
//! - `replace_all` swaps the full set in one transaction.
//! - Reads reject invalid persisted rows instead of skipping them.

use crate::db::DbError;
use crate::model::coordinate::EntryId;
use crate::model::entry::{Entry, EntrySet, EntryValidationError};
use crate::sync::boundary::{
    AuthorizationToken, BoundaryError, FetchBoundary, FetchOutcome, PublishBoundary,
};
use crate::sync::snapshot::SnapshotError;
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    label,
    text,
    created_at,
    image_url
FROM published_entries";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for published entry persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Admin token missing or rejected.
    Unauthorized,
    Validation(EntryValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted entry data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Unauthorized | Self::InvalidData(_) => None,
        }
    }
}

impl From<EntryValidationError> for RepoError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RepoError> for BoundaryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Unauthorized => Self::Unauthorized,
            RepoError::Validation(err) => {
                Self::Snapshot(SnapshotError::MalformedSnapshot(err.to_string()))
            }
            RepoError::InvalidData(message) => {
                Self::Snapshot(SnapshotError::MalformedSnapshot(message))
            }
            RepoError::Db(err) => Self::Storage(err.to_string()),
        }
    }
}

/// Admin secret check for write paths.
///
/// A gate without a secret rejects every token.
#[derive(Clone, Default)]
pub struct AdminGate {
    secret: Option<String>,
}

impl AdminGate {
    /// Builds a gate from a configured secret; blank secrets disable writes.
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToString::to_string),
        }
    }

    /// Gate that rejects every write.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Accepts `token` when it matches the secret after trimming.
    pub fn check(&self, token: &AuthorizationToken) -> RepoResult<()> {
        match self.secret.as_deref() {
            Some(secret) if token.expose().trim() == secret => Ok(()),
            _ => Err(RepoError::Unauthorized),
        }
    }
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// One row of the publish audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRecord {
    pub seq: i64,
    /// `snapshot`, `upsert` or `delete`.
    pub kind: String,
    pub entry_count: i64,
    pub published_at: i64,
}

/// SQLite implementation of the published record store.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
    gate: AdminGate,
}

impl<'conn> SqliteEntryRepository<'conn> {
    /// Wraps a migrated connection (see `db::open_db`).
    pub fn new(conn: &'conn Connection, gate: AdminGate) -> Self {
        Self { conn, gate }
    }

    /// Loads every published entry.
    pub fn list_entries(&self) -> RepoResult<EntrySet> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        EntrySet::try_from_entries(entries)
            .map_err(|err| RepoError::InvalidData(err.to_string()))
    }

    /// Loads one published entry.
    pub fn get_entry(&self, id: EntryId) -> RepoResult<Option<Entry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_entry_row(row)?)),
            None => Ok(None),
        }
    }

    /// Replaces the whole published set with `entries`.
    pub fn replace_all(&self, entries: &[Entry], token: &AuthorizationToken) -> RepoResult<usize> {
        self.gate.check(token)?;
        let set = EntrySet::try_from_entries(entries.iter().cloned())?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM published_entries;", [])?;
        for entry in &set {
            insert_entry(&tx, entry)?;
        }
        append_publish_log(&tx, "snapshot", set.len())?;
        tx.commit()?;

        info!(
            "event=entries_publish module=repo status=ok kind=snapshot count={}",
            set.len()
        );
        Ok(set.len())
    }

    /// Creates or replaces one published entry.
    pub fn upsert_one(&self, entry: &Entry, token: &AuthorizationToken) -> RepoResult<()> {
        self.gate.check(token)?;
        entry.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        insert_entry(&tx, entry)?;
        append_publish_log(&tx, "upsert", 1)?;
        tx.commit()?;

        info!(
            "event=entries_publish module=repo status=ok kind=upsert id={}",
            entry.id
        );
        Ok(())
    }

    /// Deletes one published entry. Returns whether a row existed.
    pub fn delete_one(&self, id: EntryId, token: &AuthorizationToken) -> RepoResult<bool> {
        self.gate.check(token)?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "DELETE FROM published_entries WHERE id = ?1;",
            [id.to_string()],
        )?;
        append_publish_log(&tx, "delete", changed)?;
        tx.commit()?;

        info!(
            "event=entries_publish module=repo status=ok kind=delete id={} existed={}",
            id,
            changed > 0
        );
        Ok(changed > 0)
    }

    /// Returns the most recent publish audit record.
    pub fn last_publish(&self) -> RepoResult<Option<PublishRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT seq, kind, entry_count, published_at
                 FROM publish_log
                 ORDER BY seq DESC
                 LIMIT 1;",
                [],
                |row| {
                    Ok(PublishRecord {
                        seq: row.get("seq")?,
                        kind: row.get("kind")?,
                        entry_count: row.get("entry_count")?,
                        published_at: row.get("published_at")?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }
}

impl PublishBoundary for SqliteEntryRepository<'_> {
    fn publish(
        &self,
        entries: &[Entry],
        token: &AuthorizationToken,
    ) -> Result<usize, BoundaryError> {
        self.replace_all(entries, token).map_err(|err| {
            match &err {
                RepoError::Unauthorized => warn!(
                    "event=entries_publish module=repo status=error error_code=unauthorized"
                ),
                other => error!(
                    "event=entries_publish module=repo status=error error_code=publish_failed error={}",
                    other
                ),
            }
            BoundaryError::from(err)
        })
    }
}

impl FetchBoundary for SqliteEntryRepository<'_> {
    fn fetch_entries(&self) -> FetchOutcome {
        match self.list_entries() {
            Ok(entries) => {
                info!(
                    "event=entries_fetch module=repo status=ok count={}",
                    entries.len()
                );
                FetchOutcome::loaded(entries)
            }
            Err(err) => {
                error!(
                    "event=entries_fetch module=repo status=error error_code=fetch_failed error={}",
                    err
                );
                FetchOutcome::failed(err.to_string())
            }
        }
    }
}

fn insert_entry(conn: &Connection, entry: &Entry) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO published_entries (id, label, text, created_at, image_url)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            label = excluded.label,
            text = excluded.text,
            created_at = excluded.created_at,
            image_url = excluded.image_url,
            published_at = (strftime('%s', 'now') * 1000);",
        params![
            entry.id.to_string(),
            entry.label.as_str(),
            entry.text.as_str(),
            entry.created_at,
            entry.image_url.as_deref(),
        ],
    )?;
    Ok(())
}

fn append_publish_log(conn: &Connection, kind: &str, count: usize) -> RepoResult<()> {
    let count = i64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("publish count {count} overflows i64")))?;
    conn.execute(
        "INSERT INTO publish_log (kind, entry_count) VALUES (?1, ?2);",
        params![kind, count],
    )?;
    Ok(())
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<Entry> {
    let id_text: String = row.get("id")?;
    let id = EntryId::parse(&id_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid id value `{id_text}` in published_entries.id"
        ))
    })?;

    let entry = Entry {
        id,
        label: row.get("label")?,
        text: row.get("text")?,
        created_at: row.get("created_at")?,
        image_url: row.get("image_url")?,
    };
    entry
        .validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::AdminGate;
    use crate::sync::boundary::AuthorizationToken;

    #[test]
    fn gate_without_secret_rejects_everything() {
        let gate = AdminGate::new(Some("   "));
        assert!(!gate.is_enabled());
        assert!(gate.check(&AuthorizationToken::new("")).is_err());
        assert!(gate.check(&AuthorizationToken::new("   ")).is_err());
    }

    #[test]
    fn gate_compares_trimmed_values() {
        let gate = AdminGate::new(Some(" s3cret "));
        assert!(gate.check(&AuthorizationToken::new("s3cret\n")).is_ok());
        assert!(gate.check(&AuthorizationToken::new("S3CRET")).is_err());
    }

    #[test]
    fn gate_debug_hides_secret() {
        let gate = AdminGate::new(Some("s3cret"));
        assert!(!format!("{gate:?}").contains("s3cret"));
    }
}
