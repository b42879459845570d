//! Database migration runner
//!
//! Migration SQL lives in `migrations/` and is embedded at compile time.
//! Applied versions are tracked in `schema_migrations`.

use std::collections::BTreeSet;

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, SqliteError};

/// Embedded migrations, applied in order
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "000",
        include_str!("../migrations/000_create_schema_migrations.sql"),
    ),
    (
        "001",
        include_str!("../migrations/001_create_subcategories_table.sql"),
    ),
];

/// Bring the schema up to date. Safe to run on every open.
pub fn migrate(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;

    let applied = applied_versions(conn)?;
    let mut count = 0;
    for (version, sql) in MIGRATIONS.iter().filter(|(v, _)| !applied.contains(*v)) {
        run_one(conn, version, sql)
            .map_err(|e| SqliteError::Migration(format!("{}: {}", version, e)))?;
        count += 1;
    }

    if count > 0 {
        debug!(count, "applied schema migrations");
    }
    Ok(())
}

/// Versions recorded in `schema_migrations`; empty on a fresh database
pub fn applied_versions(conn: &Connection) -> Result<BTreeSet<String>> {
    let tracked = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations'")?
        .exists([])?;
    if !tracked {
        return Ok(BTreeSet::new());
    }

    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<BTreeSet<_>>>()?;
    Ok(versions)
}

/// Script and bookkeeping row commit together
fn run_one(conn: &Connection, version: &str, sql: &str) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, CURRENT_TIMESTAMP)",
        [version],
    )?;
    tx.commit()?;
    debug!(version, "migration applied");
    Ok(())
}
