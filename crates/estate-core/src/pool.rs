//! Bounded connection pool.
//!
//! The pool owns at most `max_connections` live connections. A caller gets a
//! [`PooledConnection`] lease from [`Pool::get_connection`]; when the lease is
//! dropped the connection's `release` hook runs and the connection goes back
//! to the idle set, so release happens exactly once on every exit path.
//! Callers arriving while every connection is leased wait on a semaphore
//! until one is released or the acquire timeout elapses.

use std::{
    ops::{Deref, DerefMut},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use log::{debug, info, warn};
use tokio::{
    sync::{OwnedSemaphorePermit, Semaphore},
    task,
    time::timeout,
};

use crate::{
    driver::{Driver, DriverConnection},
    error::{CrmError, Result},
};

/// Pool sizing and timeout settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Upper bound on simultaneously open connections
    pub max_connections: usize,
    /// How long `get_connection` waits for a free connection
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

/// Point-in-time pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub max: usize,
    pub idle: usize,
    pub in_use: usize,
}

struct Shared {
    driver: Box<dyn Driver>,
    config: PoolConfig,
    semaphore: Arc<Semaphore>,
    idle: Mutex<Vec<Box<dyn DriverConnection>>>,
}

impl Shared {
    fn idle(&self) -> MutexGuard<'_, Vec<Box<dyn DriverConnection>>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cheaply cloneable handle to a connection pool.
#[derive(Clone)]
pub struct Pool {
    shared: Arc<Shared>,
}

impl Pool {
    /// Creates an empty pool. Connections are opened lazily.
    ///
    /// # Errors
    ///
    /// Returns `CrmError::Configuration` if `max_connections` is zero.
    pub fn new<D: Driver>(driver: D, config: PoolConfig) -> Result<Self> {
        if config.max_connections == 0 {
            return Err(CrmError::Configuration {
                message: "max_connections must be at least 1".to_string(),
            });
        }
        Ok(Self {
            shared: Arc::new(Shared {
                driver: Box::new(driver),
                config,
                semaphore: Arc::new(Semaphore::new(config.max_connections)),
                idle: Mutex::new(Vec::with_capacity(config.max_connections)),
            }),
        })
    }

    pub fn config(&self) -> PoolConfig {
        self.shared.config
    }

    /// Leases a connection, reusing an idle one when available.
    ///
    /// # Errors
    ///
    /// Returns `CrmError::Connection` when the pool has been shut down, when
    /// no connection frees up within the acquire timeout, or when opening a
    /// new connection fails.
    pub async fn get_connection(&self) -> Result<PooledConnection> {
        let semaphore = Arc::clone(&self.shared.semaphore);
        let permit = match timeout(self.shared.config.acquire_timeout, semaphore.acquire_owned())
            .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(CrmError::connection("Connection pool is shut down")),
            Err(_) => {
                return Err(CrmError::connection(format!(
                    "Timed out after {:?} waiting for a connection (pool size {})",
                    self.shared.config.acquire_timeout, self.shared.config.max_connections
                )))
            }
        };

        let reused = self.shared.idle().pop();
        let conn = match reused {
            Some(conn) => conn,
            None => {
                let shared = Arc::clone(&self.shared);
                debug!("Opening new {} connection", shared.driver.name());
                task::spawn_blocking(move || shared.driver.connect())
                    .await
                    .map_err(|e| CrmError::connection(format!("Task join error: {e}")))??
            }
        };

        Ok(PooledConnection {
            conn: Some(conn),
            shared: Arc::clone(&self.shared),
            in_transaction: false,
            _permit: permit,
        })
    }

    pub fn status(&self) -> PoolStatus {
        let max = self.shared.config.max_connections;
        let available = self.shared.semaphore.available_permits();
        PoolStatus {
            max,
            idle: self.shared.idle().len(),
            in_use: max.saturating_sub(available),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.semaphore.is_closed()
    }

    /// Closes the pool. Idle connections are dropped immediately; leased
    /// connections are dropped when their lease ends. Later
    /// `get_connection` calls fail.
    pub fn shutdown(&self) {
        if self.shared.semaphore.is_closed() {
            return;
        }
        self.shared.semaphore.close();
        let drained = std::mem::take(&mut *self.shared.idle());
        info!(
            "Connection pool shut down, closed {} idle connection(s)",
            drained.len()
        );
    }
}

/// A leased connection. Dereferences to the driver connection.
pub struct PooledConnection {
    conn: Option<Box<dyn DriverConnection>>,
    shared: Arc<Shared>,
    in_transaction: bool,
    _permit: OwnedSemaphorePermit,
}

impl PooledConnection {
    /// Marks whether the connection currently has an open transaction. A
    /// connection released mid-transaction is discarded rather than reused.
    pub(crate) fn set_in_transaction(&mut self, open: bool) {
        self.in_transaction = open;
    }
}

impl Deref for PooledConnection {
    type Target = dyn DriverConnection;

    fn deref(&self) -> &Self::Target {
        self.conn
            .as_deref()
            .unwrap_or_else(|| unreachable!("connection taken before drop"))
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn
            .as_deref_mut()
            .unwrap_or_else(|| unreachable!("connection taken before drop"))
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };
        conn.release();

        if self.in_transaction {
            warn!("Discarding connection released with an open transaction");
            return;
        }
        if self.shared.semaphore.is_closed() {
            return;
        }
        self.shared.idle().push(conn);
        // The permit is dropped after this, so the next waiter finds the
        // connection already in the idle set.
    }
}
