//! Table replacement and batched row insertion against SQLite.
//!
//! [`TableLoader::recreate_table`] and [`TableLoader::load_rows`] run as two
//! separate units of work. If loading fails after the table was recreated,
//! the table is left in place but empty; the previous contents are not
//! restored.

use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use crate::{
    decode::Row,
    error::{DecodeError, LoadError},
    schema::{TableSchema, quote_identifier},
};

pub struct TableLoader<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> TableLoader<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// SQLite resolves table names without regard to ASCII case, so the
    /// lookup does too.
    pub fn table_exists(&self, table: &str) -> Result<bool, LoadError> {
        self.conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
                params![table],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(LoadError::sql(table))
    }

    /// Drops `schema.table_name` when present, then creates it with one
    /// `TEXT` column per header.
    pub fn recreate_table(&mut self, schema: &TableSchema) -> Result<(), LoadError> {
        let table = schema.table_name.as_str();
        if self.table_exists(table)? {
            debug!("Dropping existing table '{table}'");
            self.conn
                .execute(&format!("DROP TABLE {}", quote_identifier(table)), [])
                .map_err(LoadError::sql(table))?;
        }
        let ddl = schema.create_table_sql();
        info!("Executing: {ddl}");
        self.conn
            .execute(&ddl, [])
            .map_err(LoadError::sql(table))?;
        Ok(())
    }

    /// Inserts every row inside one transaction and returns the row count.
    ///
    /// Rows are checked against the column count before they reach the
    /// statement. The first bad row aborts the batch and nothing is
    /// committed.
    pub fn load_rows<I>(&mut self, schema: &TableSchema, rows: I) -> Result<usize, LoadError>
    where
        I: IntoIterator<Item = Result<Row, DecodeError>>,
    {
        let table = schema.table_name.as_str();
        let expected = schema.column_count();
        let tx = self.conn.transaction().map_err(LoadError::sql(table))?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx
                .prepare(&schema.insert_sql())
                .map_err(LoadError::sql(table))?;
            for (idx, row) in rows.into_iter().enumerate() {
                let row = row.map_err(|source| LoadError::Decode {
                    table: table.to_string(),
                    source,
                })?;
                if row.len() != expected {
                    return Err(LoadError::FieldCount {
                        table: table.to_string(),
                        row: idx + 1,
                        expected,
                        found: row.len(),
                    });
                }
                stmt.execute(params_from_iter(row.iter()))
                    .map_err(LoadError::sql(table))?;
                inserted += 1;
            }
        }
        tx.commit().map_err(LoadError::sql(table))?;
        debug!("Committed {inserted} row(s) into '{table}'");
        Ok(inserted)
    }
}
