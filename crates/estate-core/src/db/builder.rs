//! Builder for creating and configuring DatabaseManager instances.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use log::info;

use super::DatabaseManager;
use crate::{
    driver::SqliteDriver,
    error::{CrmError, Result},
    pool::{Pool, PoolConfig},
};

/// Builder for creating and configuring [`DatabaseManager`] instances.
#[derive(Debug, Clone)]
pub struct DatabaseManagerBuilder {
    database_path: Option<PathBuf>,
    pool: PoolConfig,
    busy_timeout: Duration,
}

impl DatabaseManagerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
            pool: PoolConfig::default(),
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/estate/estate.db` or `~/.local/share/estate/estate.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Upper bound on simultaneously open connections.
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.pool.max_connections = max;
        self
    }

    /// How long a caller waits for a free connection before failing.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.pool.acquire_timeout = timeout;
        self
    }

    /// How long a statement waits on a locked database file.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Opens the pool and applies the schema.
    ///
    /// # Errors
    ///
    /// Returns `CrmError::FileSystem` if the database directory cannot be
    /// created, `CrmError::Connection` if the database cannot be opened and
    /// `CrmError::Database` if schema initialization fails.
    pub async fn init(self) -> Result<DatabaseManager> {
        let db_path = if let Some(path) = self.database_path {
            path
        } else {
            Self::default_database_path()?
        };

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CrmError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let driver = SqliteDriver::new(&db_path).with_busy_timeout(self.busy_timeout);
        let manager = DatabaseManager::new(Pool::new(driver, self.pool)?);
        manager.migrate().await?;

        info!(
            "Database ready at {} (max {} connections)",
            db_path.display(),
            self.pool.max_connections
        );
        Ok(manager)
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("estate")
            .place_data_file("estate.db")
            .map_err(|e| CrmError::XdgDirectory(e.to_string()))
    }
}

impl Default for DatabaseManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
