//! Query executor, transaction wrapper and health check.
//!
//! [`DatabaseManager`] is the single entry point the rest of the crate uses to
//! reach the database. It is built explicitly (see
//! [`DatabaseManagerBuilder`]), handed to consumers by reference, and closed
//! with [`DatabaseManager::shutdown`]. Every call leases one connection from
//! the [`Pool`], runs the blocking driver work on tokio's blocking thread
//! pool, and drops the lease before returning, so the connection is released
//! on success and failure alike.

use log::warn;
use tokio::task;

use crate::{
    driver::Driver,
    error::{CrmError, Result},
    pool::{Pool, PoolConfig, PoolStatus},
    value::{ExecResult, Row, Value},
};

pub mod builder;
pub mod migrations;
pub mod transaction;

pub use builder::DatabaseManagerBuilder;
pub use transaction::Transaction;

/// Pooled access to the database.
#[derive(Clone)]
pub struct DatabaseManager {
    pool: Pool,
}

impl DatabaseManager {
    /// Wraps an existing pool. No schema work is performed.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Builds a manager over an arbitrary driver. No schema work is
    /// performed; call [`DatabaseManager::migrate`] when needed.
    pub fn with_driver<D: Driver>(driver: D, config: PoolConfig) -> Result<Self> {
        Ok(Self::new(Pool::new(driver, config)?))
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn pool_status(&self) -> PoolStatus {
        self.pool.status()
    }

    /// Runs a read statement. Returns an empty vector when nothing matches.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let mut conn = self.pool.get_connection().await?;
        let sql = sql.to_owned();
        let params = params.to_vec();
        run_blocking(move || conn.query(&sql, &params)).await
    }

    /// Runs a read statement and returns its first row, if any.
    pub async fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(sql, params).await?.into_iter().next())
    }

    /// Runs a write statement.
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        let mut conn = self.pool.get_connection().await?;
        let sql = sql.to_owned();
        let params = params.to_vec();
        run_blocking(move || conn.execute(&sql, &params)).await
    }

    /// Runs `work` inside a single database transaction.
    ///
    /// One connection is leased for the whole call. `work` receives a
    /// [`Transaction`] bound to that connection; every statement it issues
    /// joins the same transaction. When `work` returns `Ok` the transaction
    /// is committed and the value returned. When `work` or the commit fails
    /// the transaction is rolled back and the original error returned; a
    /// failed rollback is logged and does not replace that error.
    ///
    /// `work` runs on a blocking thread and must not call `transaction`
    /// again; doing so fails with [`CrmError::NestedTransaction`].
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use estate_core::{params, DatabaseManagerBuilder};
    /// # async fn example() -> estate_core::Result<()> {
    /// let db = DatabaseManagerBuilder::new()
    ///     .with_database_path(Some("crm.db"))
    ///     .init()
    ///     .await?;
    /// let id = db
    ///     .transaction(|tx| {
    ///         let inserted = tx.execute(
    ///             "INSERT INTO customers (name, phone, status, created_at, updated_at) \
    ///              VALUES (?1, ?2, 1, datetime('now'), datetime('now'))",
    ///             &params!["张三", "13800138000"],
    ///         )?;
    ///         Ok(inserted.last_insert_rowid)
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        if transaction::in_unit_of_work() {
            return Err(CrmError::NestedTransaction);
        }
        let mut conn = self.pool.get_connection().await?;
        run_blocking(move || transaction::run(&mut conn, work)).await
    }

    /// Checks that a connection can be leased and answers a trivial query.
    /// Never fails; any problem is logged and reported as `false`.
    pub async fn health_check(&self) -> bool {
        let outcome: Result<()> = async {
            let mut conn = self.pool.get_connection().await?;
            run_blocking(move || conn.ping()).await
        }
        .await;

        match outcome {
            Ok(()) => true,
            Err(e) => {
                warn!("Database health check failed: {e}");
                false
            }
        }
    }

    /// Applies the embedded schema and legacy-table upgrades.
    pub async fn migrate(&self) -> Result<()> {
        let mut conn = self.pool.get_connection().await?;
        run_blocking(move || migrations::apply(&mut *conn)).await
    }

    /// Closes the pool. Subsequent calls fail with a connection error.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}

/// Runs blocking driver work off the async executor.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(f).await.map_err(|e| {
        CrmError::database(format!("Database task failed: {e}")).build()
    })?
}
