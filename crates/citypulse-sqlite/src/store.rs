//! SQLite storage backend implementing the TaxonomyStore trait

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use citypulse_core::storage::{validate_update, StoreError, StoreResult, TaxonomyStore};
use citypulse_core::taxonomy::{
    Subcategory, SubcategoryStatus, SubcategoryUpdate, Topic, UsageUpdate,
};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, trace, warn};

use crate::error::{Result, SqliteError};
use crate::json::{from_json, sql_to_timestamp, timestamp_to_sql, to_json};

/// Attempts at an optimistic usage update before giving up
const MAX_USAGE_RETRIES: usize = 64;

/// How long a statement waits on a locked database file
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const COLUMNS: &str = "id, name, topic, display_name, description, source, status, \
                       relationships, metadata, created_at, updated_at, created_by, version";

/// SQLite-backed taxonomy store
///
/// The connection sits behind a mutex that is held for single statements, not
/// for read-modify-write cycles: usage updates re-check a per-row `version`
/// column and retry on conflict, and name uniqueness comes from a partial
/// unique index. Several stores (or processes) can share one database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Raw column values of one row
struct RawRow {
    id: String,
    name: String,
    topic: String,
    display_name: String,
    description: Option<String>,
    source: String,
    status: String,
    relationships: String,
    metadata: String,
    created_at: String,
    updated_at: String,
    created_by: Option<String>,
    version: i64,
}

impl RawRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            topic: row.get(2)?,
            display_name: row.get(3)?,
            description: row.get(4)?,
            source: row.get(5)?,
            status: row.get(6)?,
            relationships: row.get(7)?,
            metadata: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
            created_by: row.get(11)?,
            version: row.get(12)?,
        })
    }

    fn into_subcategory(self) -> Result<(Subcategory, i64)> {
        let invalid = |e: citypulse_core::taxonomy::UnknownVariant| {
            SqliteError::InvalidRow(format!("{} in row {}", e, self.id))
        };
        let subcategory = Subcategory {
            topic: self.topic.parse().map_err(invalid)?,
            source: self.source.parse().map_err(invalid)?,
            status: self.status.parse().map_err(invalid)?,
            relationships: from_json(&self.relationships)?,
            metadata: from_json(&self.metadata)?,
            created_at: sql_to_timestamp(&self.created_at)?,
            updated_at: sql_to_timestamp(&self.updated_at)?,
            id: self.id,
            name: self.name,
            display_name: self.display_name,
            description: self.description,
            created_by: self.created_by,
        };
        Ok((subcategory, self.version))
    }
}

fn query_rows(
    conn: &Connection,
    filter: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<(Subcategory, i64)>> {
    let sql = format!(
        "SELECT {} FROM subcategories {} ORDER BY name, id",
        COLUMNS, filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params, RawRow::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(RawRow::into_subcategory).collect()
}

fn load_row(conn: &Connection, id: &str) -> Result<Option<(Subcategory, i64)>> {
    let sql = format!("SELECT {} FROM subcategories WHERE id = ?1", COLUMNS);
    conn.query_row(&sql, [id], RawRow::read)
        .optional()?
        .map(RawRow::into_subcategory)
        .transpose()
}

fn insert_row(conn: &Connection, s: &Subcategory) -> Result<()> {
    conn.execute(
        "INSERT INTO subcategories (id, name, topic, display_name, description, source, status,
                                    relationships, metadata, created_at, updated_at, created_by, version)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 0)",
        params![
            s.id,
            s.name,
            s.topic.as_str(),
            s.display_name,
            s.description,
            s.source.as_str(),
            s.status.as_str(),
            to_json(&s.relationships)?,
            to_json(&s.metadata)?,
            timestamp_to_sql(s.created_at),
            timestamp_to_sql(s.updated_at),
            s.created_by,
        ],
    )?;
    Ok(())
}

impl SqliteStore {
    /// Create a new SQLite store from a connection
    ///
    /// The connection should already have migrations applied.
    /// Use [`crate::migrate::migrate`] to initialize a fresh database.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Create a new in-memory SQLite store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        crate::migrate::migrate(&conn)?;
        Ok(Self::new(conn))
    }

    /// Open (or create) a file-backed SQLite store and apply migrations
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // journal_mode returns the resulting mode as a row
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        crate::migrate::migrate(&conn)?;
        debug!(path = %path.display(), journal_mode = %mode, "opened taxonomy database");
        Ok(Self::new(conn))
    }

    fn create_inner(&self, subcategory: &Subcategory) -> Result<bool> {
        let mut conn = self.conn.lock();
        // IMMEDIATE so an alias added by another connection can't slip in
        // between the check and the insert
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let id_taken = tx
            .prepare("SELECT 1 FROM subcategories WHERE id = ?1")?
            .exists([&subcategory.id])?;
        if id_taken {
            return Err(SqliteError::AlreadyExists(subcategory.id.clone()));
        }

        if subcategory.status.is_live() {
            let alias_owner = query_rows(
                &tx,
                "WHERE topic = ?1 AND status != 'merged'",
                params![subcategory.topic.as_str()],
            )?
            .into_iter()
            .find(|(s, _)| s.has_alias(&subcategory.name));
            if let Some((owner, _)) = alias_owner {
                debug!(
                    name = %subcategory.name,
                    owner = %owner.name,
                    "name is a live alias, not inserting"
                );
                return Ok(false);
            }
        }

        match insert_row(&tx, subcategory) {
            Ok(()) => {
                tx.commit()?;
                debug!(
                    id = %subcategory.id,
                    topic = %subcategory.topic,
                    name = %subcategory.name,
                    "inserted subcategory"
                );
                Ok(true)
            }
            Err(e) if e.is_constraint_violation() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn update_usage_inner(&self, id: &str, usage: &UsageUpdate) -> Result<bool> {
        for attempt in 0..MAX_USAGE_RETRIES {
            let Some((mut entry, version)) = load_row(&self.conn.lock(), id)? else {
                return Ok(false);
            };

            let now = Utc::now();
            entry.apply_usage(usage, now);
            let metadata = to_json(&entry.metadata)?;

            let changed = self.conn.lock().execute(
                "UPDATE subcategories
                 SET metadata = ?1, updated_at = ?2, version = version + 1
                 WHERE id = ?3 AND version = ?4",
                params![metadata, timestamp_to_sql(now), id, version],
            )?;
            if changed == 1 {
                return Ok(true);
            }
            trace!(id, attempt, "usage update lost a version race, retrying");
            std::thread::yield_now();
        }

        warn!(id, "usage update gave up after {} attempts", MAX_USAGE_RETRIES);
        Err(SqliteError::Contended(id.to_string()))
    }

    fn update_subcategory_inner(&self, id: &str, update: &SubcategoryUpdate) -> StoreResult<Subcategory> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(SqliteError::from)?;

        let (mut target, version) =
            load_row(&tx, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let siblings: Vec<Subcategory> = query_rows(
            &tx,
            "WHERE topic = ?1 AND id != ?2",
            params![target.topic.as_str(), id],
        )?
        .into_iter()
        .map(|(s, _)| s)
        .collect();
        validate_update(&target, update, &siblings)?;

        target.apply_update(update, Utc::now());
        let changed = tx
            .execute(
                "UPDATE subcategories
                 SET display_name = ?1, description = ?2, status = ?3, relationships = ?4,
                     updated_at = ?5, version = version + 1
                 WHERE id = ?6 AND version = ?7",
                params![
                    target.display_name,
                    target.description,
                    target.status.as_str(),
                    to_json(&target.relationships)?,
                    timestamp_to_sql(target.updated_at),
                    id,
                    version,
                ],
            )
            .map_err(SqliteError::from)?;
        if changed != 1 {
            return Err(SqliteError::Contended(id.to_string()).into());
        }
        tx.commit().map_err(SqliteError::from)?;

        debug!(id, "updated subcategory");
        Ok(target)
    }
}

impl TaxonomyStore for SqliteStore {
    fn create(&self, subcategory: Subcategory) -> StoreResult<bool> {
        Ok(self.create_inner(&subcategory)?)
    }

    fn get(&self, id: &str) -> StoreResult<Option<Subcategory>> {
        Ok(load_row(&self.conn.lock(), id)?.map(|(s, _)| s))
    }

    fn exists(&self, id: &str) -> StoreResult<bool> {
        let conn = self.conn.lock();
        let exists = conn
            .prepare("SELECT 1 FROM subcategories WHERE id = ?1")
            .and_then(|mut stmt| stmt.exists([id]))
            .map_err(SqliteError::from)?;
        Ok(exists)
    }

    fn list_by_topic(
        &self,
        topic: Topic,
        status: Option<SubcategoryStatus>,
    ) -> StoreResult<Vec<Subcategory>> {
        let conn = self.conn.lock();
        let rows = match status {
            Some(status) => query_rows(
                &conn,
                "WHERE topic = ?1 AND status = ?2",
                params![topic.as_str(), status.as_str()],
            )?,
            None => query_rows(&conn, "WHERE topic = ?1", params![topic.as_str()])?,
        };
        Ok(rows.into_iter().map(|(s, _)| s).collect())
    }

    fn list_all(&self) -> StoreResult<Vec<Subcategory>> {
        let rows = query_rows(&self.conn.lock(), "", [])?;
        Ok(rows.into_iter().map(|(s, _)| s).collect())
    }

    fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM subcategories", [], |row| row.get(0))
            .map_err(SqliteError::from)?;
        Ok(count as usize)
    }

    fn find_by_name_or_alias(&self, topic: Topic, name: &str) -> StoreResult<Option<Subcategory>> {
        let live = query_rows(
            &self.conn.lock(),
            "WHERE topic = ?1 AND status != 'merged'",
            params![topic.as_str()],
        )?;
        let live: Vec<Subcategory> = live.into_iter().map(|(s, _)| s).collect();

        if let Some(found) = live.iter().find(|s| s.has_name(name)) {
            return Ok(Some(found.clone()));
        }
        Ok(live.into_iter().find(|s| s.has_alias(name)))
    }

    fn update_usage(&self, id: &str, usage: &UsageUpdate) -> StoreResult<bool> {
        Ok(self.update_usage_inner(id, usage)?)
    }

    fn update_subcategory(&self, id: &str, update: &SubcategoryUpdate) -> StoreResult<Subcategory> {
        self.update_subcategory_inner(id, update)
    }

    fn ping(&self) -> StoreResult<()> {
        self.conn
            .lock()
            .query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}
