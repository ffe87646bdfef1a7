use crate::error::Result;
use rusqlite::Connection;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// What a command does with the pipeline database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Lookups read one snapshot and must never write to it.
    Snapshot,
    /// Imports append or replace pipeline rows.
    ReadWrite,
}

impl Access {
    pub const fn is_read_only(self) -> bool {
        matches!(self, Access::Snapshot)
    }
}

pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    apply_pragmas(&conn)?;
    restrict_db_permissions(path)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    apply_pragmas(&conn)?;
    Ok(conn)
}

/// Locks a migrated connection down to the requested access.
pub fn apply_access(conn: &Connection, access: Access) -> Result<()> {
    conn.pragma_update(None, "query_only", access.is_read_only())?;
    Ok(())
}

// Imports and lookups may run side by side: WAL lets a lookup keep reading
// the previous snapshot while `replace_rows` swaps it.
fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "busy_timeout", 2000)?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    Ok(())
}

/// The database file plus the WAL sidecars that hold the same customer rows.
fn db_files(path: &Path) -> [PathBuf; 3] {
    let sidecar = |suffix: &str| {
        let mut name = OsString::from(path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    };
    [path.to_path_buf(), sidecar("-wal"), sidecar("-shm")]
}

/// Customer names and phones are personal data: owner-only access.
#[cfg(unix)]
pub fn restrict_db_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    for file in db_files(path).iter().filter(|file| file.exists()) {
        fs::set_permissions(file, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn restrict_db_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
