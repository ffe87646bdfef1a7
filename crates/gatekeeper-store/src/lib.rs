//! SQLite home of the pipeline snapshot that lookups read.

pub mod db;
pub mod error;
pub mod migrate;
pub mod paths;
pub mod repo;

pub use db::Access;

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;

pub struct Store {
    conn: Connection,
    access: Access,
}

impl Store {
    /// Opens and migrates the database, then applies `access`.
    pub fn open(path: &Path, access: Access) -> Result<Self> {
        let conn = db::open(path)?;
        migrate::run_migrations(&conn)?;
        // Migrations may have created the WAL sidecars.
        db::restrict_db_permissions(path)?;
        db::apply_access(&conn, access)?;
        Ok(Self { conn, access })
    }

    /// A migrated, writable database that lives for the process only.
    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        migrate::run_migrations(&conn)?;
        Ok(Self {
            conn,
            access: Access::ReadWrite,
        })
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn migrate(&self) -> Result<i64> {
        migrate::run_migrations(&self.conn)
    }

    pub fn schema_version(&self) -> Result<i64> {
        migrate::schema_version(&self.conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Repository over a pipeline table. The name is validated on use.
    pub fn pipeline<'a>(&'a self, table: &'a str) -> repo::PipelineRepo<'a> {
        repo::PipelineRepo::new(&self.conn, table)
    }
}
