use crate::error::{Result, StoreError};
use rusqlite::{Connection, OptionalExtension};

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Ordered schema steps. The default `pipeline` table comes from `001`;
/// tables named in the config are created on their first import.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "001_init",
        sql: include_str!("../migrations/001_init.sql"),
    },
    Migration {
        version: 2,
        name: "002_import_log",
        sql: include_str!("../migrations/002_import_log.sql"),
    },
];

pub fn latest_version() -> i64 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the schema up to date and returns the resulting version.
pub fn run_migrations(conn: &Connection) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS gatekeeper_schema (version INTEGER NOT NULL);")?;
    let current = match read_version(&tx)? {
        Some(version) => version,
        None => {
            tx.execute("INSERT INTO gatekeeper_schema (version) VALUES (0);", [])?;
            0
        }
    };

    let latest = latest_version();
    if current > latest {
        return Err(StoreError::Migration(format!(
            "db version {current} newer than available migrations {latest}"
        )));
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tx.execute_batch(migration.sql)
            .map_err(|err| StoreError::Migration(format!("{}: {err}", migration.name)))?;
    }
    if latest > current {
        let updated = tx.execute("UPDATE gatekeeper_schema SET version = ?1;", [latest])?;
        if updated != 1 {
            return Err(StoreError::Migration(format!(
                "expected single schema row, updated {updated}"
            )));
        }
    }

    tx.commit()?;
    Ok(latest)
}

pub fn schema_version(conn: &Connection) -> Result<i64> {
    Ok(read_version(conn)?.unwrap_or(0))
}

fn read_version(conn: &Connection) -> Result<Option<i64>> {
    let version = conn
        .query_row("SELECT version FROM gatekeeper_schema LIMIT 1;", [], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(version)
}
