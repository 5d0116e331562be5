//! Connection-bound transaction handle.

use std::cell::Cell;

use log::error;

use crate::{
    driver::DriverConnection,
    error::Result,
    pool::PooledConnection,
    value::{ExecResult, Row, Value},
};

thread_local! {
    static IN_UNIT_OF_WORK: Cell<bool> = const { Cell::new(false) };
}

/// True while the current thread is running a transaction's unit of work.
pub(crate) fn in_unit_of_work() -> bool {
    IN_UNIT_OF_WORK.with(Cell::get)
}

/// Sets the unit-of-work marker for the current thread until dropped.
struct WorkMarker;

impl WorkMarker {
    fn enter() -> Self {
        IN_UNIT_OF_WORK.with(|flag| flag.set(true));
        WorkMarker
    }
}

impl Drop for WorkMarker {
    fn drop(&mut self) {
        IN_UNIT_OF_WORK.with(|flag| flag.set(false));
    }
}

/// Statement access inside a transaction.
///
/// Borrowed from the leased connection for the duration of the unit of work;
/// it cannot outlive the call to [`DatabaseManager::transaction`] and offers
/// no way to commit or roll back on its own.
///
/// [`DatabaseManager::transaction`]: super::DatabaseManager::transaction
pub struct Transaction<'a> {
    conn: &'a mut dyn DriverConnection,
}

impl Transaction<'_> {
    pub fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.conn.query(sql, params)
    }

    pub fn query_one(&mut self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.conn.query(sql, params)?.into_iter().next())
    }

    pub fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        self.conn.execute(sql, params)
    }
}

/// Begin, run `work`, then commit or roll back. Runs on a blocking thread.
pub(super) fn run<T, F>(conn: &mut PooledConnection, work: F) -> Result<T>
where
    F: FnOnce(&mut Transaction<'_>) -> Result<T>,
{
    conn.begin()?;
    conn.set_in_transaction(true);

    let outcome = {
        let _marker = WorkMarker::enter();
        let mut tx = Transaction { conn: &mut **conn };
        work(&mut tx)
    };
    let outcome = outcome.and_then(|value| conn.commit().map(|()| value));

    match outcome {
        Ok(value) => {
            conn.set_in_transaction(false);
            Ok(value)
        }
        Err(err) => {
            match conn.rollback() {
                Ok(()) => conn.set_in_transaction(false),
                Err(rollback_err) => {
                    error!("Rollback failed after error '{err}': {rollback_err}");
                }
            }
            Err(err)
        }
    }
}
