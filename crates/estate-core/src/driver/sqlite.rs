//! SQLite adapter built on `rusqlite`.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use rusqlite::{
    params_from_iter,
    types::{ToSqlOutput, ValueRef},
    Connection, ToSql,
};

use super::{Driver, DriverConnection};
use crate::{
    error::{CrmError, DatabaseResultExt, Result},
    value::{ExecResult, Row, Value},
};

const PING_SQL: &str = "SELECT 1";

/// Opens SQLite connections to a single database file.
#[derive(Debug, Clone)]
pub struct SqliteDriver {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteDriver {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// How long a connection waits on a locked database before failing.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn connect(&self) -> Result<Box<dyn DriverConnection>> {
        let connection = Connection::open(&self.path).map_err(|e| {
            CrmError::connection(format!(
                "Failed to open database '{}': {e}",
                self.path.display()
            ))
        })?;
        connection
            .busy_timeout(self.busy_timeout)
            .db_context("Failed to set busy timeout")?;
        connection
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;
        Ok(Box::new(SqliteConnection { connection }))
    }
}

/// A pooled SQLite connection.
pub struct SqliteConnection {
    connection: Connection,
}

impl DriverConnection for SqliteConnection {
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let mut stmt = self
            .connection
            .prepare(sql)
            .db_context("Failed to prepare query")?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .db_context("Failed to run query")?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().db_context("Failed to read row")? {
            let values = (0..columns.len())
                .map(|i| row.get_ref(i).map(value_from_ref))
                .collect::<rusqlite::Result<Vec<_>>>()
                .db_context("Failed to read column")?;
            out.push(Row::new(columns.clone(), values));
        }
        Ok(out)
    }

    /// The insert identity comes from the connection: a statement generated
    /// one when `last_insert_rowid` moved. A plain `INSERT`/`REPLACE` that
    /// reused the previous rowid (the highest row was deleted in between)
    /// leaves it unchanged, so those are recognized by their keyword.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        let before = self.connection.last_insert_rowid();
        let changes = self
            .connection
            .execute(sql, params_from_iter(params.iter()))
            .db_context("Failed to execute statement")?;
        let after = self.connection.last_insert_rowid();

        let inserted = (after != before || starts_with_insert(sql)).then_some(after);
        Ok(ExecResult::normalized(changes as u64, inserted))
    }

    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.connection
            .execute_batch(sql)
            .db_context("Failed to execute batch")
    }

    fn begin(&mut self) -> Result<()> {
        self.connection
            .execute_batch("BEGIN")
            .db_context("Failed to begin transaction")
    }

    fn commit(&mut self) -> Result<()> {
        self.connection
            .execute_batch("COMMIT")
            .db_context("Failed to commit transaction")
    }

    fn rollback(&mut self) -> Result<()> {
        self.connection
            .execute_batch("ROLLBACK")
            .db_context("Failed to roll back transaction")
    }

    fn ping(&mut self) -> Result<()> {
        self.connection
            .query_row(PING_SQL, [], |row| row.get::<_, i64>(0))
            .db_context("Ping failed")
            .map(|_| ())
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Borrowed(ValueRef::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

fn starts_with_insert(sql: &str) -> bool {
    let keyword: String = sql
        .trim_start()
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect();
    keyword.eq_ignore_ascii_case("insert") || keyword.eq_ignore_ascii_case("replace")
}

fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}
