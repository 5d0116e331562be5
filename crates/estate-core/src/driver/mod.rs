//! Database driver adapters.
//!
//! A [`Driver`] knows how to open connections to one kind of database; each
//! [`DriverConnection`] it produces translates that driver's native result
//! shapes into the crate's [`Row`] and [`ExecResult`] types. The pool and the
//! query executor only ever talk to these traits.
//!
//! Connection methods are blocking. The database manager runs them on
//! tokio's blocking thread pool.

use crate::{
    error::Result,
    value::{ExecResult, Row, Value},
};

pub mod sqlite;

pub use sqlite::SqliteDriver;

/// Factory for connections to a particular database.
pub trait Driver: Send + Sync + 'static {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Opens a new connection. Fails with a connection error when the
    /// database cannot be reached.
    fn connect(&self) -> Result<Box<dyn DriverConnection>>;
}

/// A live connection owned by the pool.
pub trait DriverConnection: Send {
    /// Runs a read statement and returns every row.
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Runs a write statement.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecResult>;

    /// Runs several parameterless statements in one call.
    fn execute_batch(&mut self, sql: &str) -> Result<()>;

    fn begin(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    /// Trivial round trip used by the health check.
    fn ping(&mut self) -> Result<()>;

    /// Invoked by the pool exactly once each time a lease on this
    /// connection ends.
    fn release(&mut self) {}
}
