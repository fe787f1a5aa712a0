//! SQLite-backed table store.

use crate::dataset::{Column, ColumnKind, Dataset, Value};
use crate::error::{EtlError, Result};
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A SQLite file holding whole-table snapshots of datasets.
pub struct SqliteStore {
    path: PathBuf,
    db: Connection,
}

impl SqliteStore {
    /// Open or create the store at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EtlError::Storage {
                path: path.clone(),
                reason: format!("failed to create {}: {e}", parent.display()),
                source: None,
            })?;
        }

        let db = Connection::open(&path).map_err(|e| EtlError::storage(&path, e))?;
        Ok(Self { path, db })
    }

    /// Drop `table` if present and recreate it from `dataset`.
    ///
    /// Runs in one transaction, so a failed write leaves the previous
    /// contents in place. Returns the number of rows written.
    pub fn replace_table(&mut self, table: &str, dataset: &Dataset) -> Result<usize> {
        if dataset.column_count() == 0 {
            return Err(EtlError::Storage {
                path: self.path.clone(),
                reason: format!("cannot create table {table:?} without columns"),
                source: None,
            });
        }

        let written =
            write_table(&mut self.db, table, dataset).map_err(|e| EtlError::storage(&self.path, e))?;
        debug!("wrote {written} rows to {table} in {}", self.path.display());
        Ok(written)
    }

    /// Read `table` back in column order and insertion order.
    pub fn read_table(&self, table: &str) -> Result<Dataset> {
        let columns = read_columns(&self.db, table).map_err(|e| EtlError::storage(&self.path, e))?;
        Ok(Dataset::new(columns)?)
    }

    /// Close the connection, reporting any error from SQLite.
    ///
    /// Dropping the store also closes it, but swallows that error.
    pub fn close(self) -> Result<()> {
        let Self { path, db } = self;
        db.close().map_err(|(_, e)| EtlError::storage(path, e))
    }
}

fn write_table(db: &mut Connection, table: &str, dataset: &Dataset) -> rusqlite::Result<usize> {
    let tx = db.transaction()?;
    let name = quote_ident(table);

    let definitions = dataset
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), sql_type(c.kind())))
        .collect::<Vec<_>>()
        .join(", ");
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {name};
         CREATE TABLE {name} ({definitions});"
    ))?;

    {
        let placeholders = (1..=dataset.column_count())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = tx.prepare(&format!("INSERT INTO {name} VALUES ({placeholders})"))?;
        for row in 0..dataset.row_count() {
            stmt.execute(rusqlite::params_from_iter(dataset.row(row)))?;
        }
    }

    tx.commit()?;
    Ok(dataset.row_count())
}

fn read_columns(db: &Connection, table: &str) -> rusqlite::Result<Vec<Column>> {
    let mut stmt = db.prepare(&format!(
        "SELECT * FROM {} ORDER BY rowid",
        quote_ident(table)
    ))?;
    let mut columns: Vec<Column> = stmt
        .column_names()
        .into_iter()
        .map(|name| Column::new(name, Vec::new()))
        .collect();

    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        for (i, column) in columns.iter_mut().enumerate() {
            column.values.push(from_sql(row.get_ref(i)?));
        }
    }
    Ok(columns)
}

fn sql_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Integer => "INTEGER",
        ColumnKind::Real => "REAL",
        ColumnKind::Text => "TEXT",
    }
}

/// Double-quote an identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) | ValueRef::Blob(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}
