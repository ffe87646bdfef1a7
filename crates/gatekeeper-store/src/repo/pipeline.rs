use crate::error::{Result, StoreError};
use gatekeeper_core::domain::{is_valid_table_name, PipelineRow};
use rusqlite::{params, Connection, OptionalExtension};

/// Rows of one pipeline table, in sheet order (`row_no`).
pub struct PipelineRepo<'a> {
    conn: &'a Connection,
    table: &'a str,
}

/// When a pipeline table was last written by an import, and how many rows it
/// held afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportStamp {
    pub rows: usize,
    pub imported_at: i64,
}

impl<'a> PipelineRepo<'a> {
    pub fn new(conn: &'a Connection, table: &'a str) -> Self {
        Self { conn, table }
    }

    pub fn table(&self) -> &str {
        self.table
    }

    pub fn exists(&self) -> Result<bool> {
        let table = self.checked_table()?;
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn ensure_table(&self) -> Result<()> {
        let table = self.checked_table()?;
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" (
               row_no INTEGER PRIMARY KEY AUTOINCREMENT,
               id TEXT NOT NULL DEFAULT '',
               first_name TEXT NOT NULL DEFAULT '',
               last_name TEXT NOT NULL DEFAULT '',
               customer TEXT NOT NULL DEFAULT '',
               phone TEXT NOT NULL DEFAULT '',
               imported_at INTEGER NOT NULL
             );"
        ))?;
        Ok(())
    }

    /// Reads every row. A missing table is an error, never an empty snapshot.
    pub fn read_all(&self) -> Result<Vec<PipelineRow>> {
        self.require_table()?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, first_name, last_name, customer, phone
             FROM \"{}\"
             ORDER BY row_no ASC;",
            self.table
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(pipeline_row_from_row(row)?);
        }
        Ok(items)
    }

    pub fn count(&self) -> Result<usize> {
        self.require_table()?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\";", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn insert_rows(&self, rows: &[PipelineRow], imported_at: i64) -> Result<usize> {
        self.require_table()?;
        let tx = self.conn.unchecked_transaction()?;
        let inserted = insert_inner(&tx, self.table, rows, imported_at)?;
        stamp_import(&tx, self.table, imported_at)?;
        tx.commit()?;
        Ok(inserted)
    }

    pub fn clear(&self) -> Result<usize> {
        self.require_table()?;
        let removed = self
            .conn
            .execute(&format!("DELETE FROM \"{}\";", self.table), [])?;
        Ok(removed)
    }

    /// Swaps the whole snapshot in a single transaction.
    pub fn replace_rows(&self, rows: &[PipelineRow], imported_at: i64) -> Result<usize> {
        self.require_table()?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(&format!("DELETE FROM \"{}\";", self.table), [])?;
        let inserted = insert_inner(&tx, self.table, rows, imported_at)?;
        stamp_import(&tx, self.table, imported_at)?;
        tx.commit()?;
        Ok(inserted)
    }

    /// `None` for tables never written by an import (e.g. created by hand).
    pub fn last_import(&self) -> Result<Option<ImportStamp>> {
        let table = self.checked_table()?;
        let stamp = self
            .conn
            .query_row(
                "SELECT row_count, imported_at FROM pipeline_imports WHERE table_name = ?1;",
                [table],
                |row| {
                    let rows: i64 = row.get(0)?;
                    Ok(ImportStamp {
                        rows: usize::try_from(rows).unwrap_or(0),
                        imported_at: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(stamp)
    }

    fn checked_table(&self) -> Result<&str> {
        if is_valid_table_name(self.table) {
            Ok(self.table)
        } else {
            Err(StoreError::InvalidTableName(self.table.to_string()))
        }
    }

    fn require_table(&self) -> Result<()> {
        if self.exists()? {
            Ok(())
        } else {
            Err(StoreError::MissingTable(self.table.to_string()))
        }
    }
}

fn insert_inner(
    conn: &Connection,
    table: &str,
    rows: &[PipelineRow],
    imported_at: i64,
) -> Result<usize> {
    let mut stmt = conn.prepare(&format!(
        "INSERT INTO \"{table}\" (id, first_name, last_name, customer, phone, imported_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);"
    ))?;
    for row in rows {
        stmt.execute(params![
            row.id,
            row.first_name,
            row.last_name,
            row.customer,
            row.phone,
            imported_at
        ])?;
    }
    Ok(rows.len())
}

fn stamp_import(conn: &Connection, table: &str, imported_at: i64) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO pipeline_imports (table_name, row_count, imported_at)
             VALUES (?1, (SELECT COUNT(*) FROM \"{table}\"), ?2)
             ON CONFLICT(table_name) DO UPDATE SET
               row_count = excluded.row_count,
               imported_at = excluded.imported_at;"
        ),
        params![table, imported_at],
    )?;
    Ok(())
}

// Tables created outside the migrations may hold NULL or numeric cells.
fn pipeline_row_from_row(row: &rusqlite::Row<'_>) -> Result<PipelineRow> {
    Ok(PipelineRow {
        id: text_cell(row, 0)?,
        first_name: text_cell(row, 1)?,
        last_name: text_cell(row, 2)?,
        customer: text_cell(row, 3)?,
        phone: text_cell(row, 4)?,
    })
}

fn text_cell(row: &rusqlite::Row<'_>, index: usize) -> Result<String> {
    use rusqlite::types::ValueRef;
    let value = match row.get_ref(index)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(value) => value.to_string(),
        ValueRef::Real(value) => value.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    };
    Ok(value)
}
