#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use estate_core::{
    CrmError, DatabaseManager, DatabaseManagerBuilder, Driver, DriverConnection, ExecResult,
    PoolConfig, Result, Row, Value,
};
use tempfile::TempDir;

/// Helper function to create a migrated SQLite database in a temp dir
pub async fn create_test_db() -> (TempDir, DatabaseManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = DatabaseManagerBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .init()
        .await
        .expect("Failed to initialize database");
    (temp_dir, db)
}

/// Counters and failure switches shared between a test and its mock driver.
#[derive(Default)]
pub struct MockState {
    pub connects: AtomicUsize,
    pub begins: AtomicUsize,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
    pub releases: AtomicUsize,
    pub statements: AtomicUsize,
    pub fail_connect: AtomicBool,
    pub fail_statement: AtomicBool,
    pub fail_commit: AtomicBool,
    pub fail_rollback: AtomicBool,
}

impl MockState {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn set(flag: &AtomicBool, on: bool) {
        flag.store(on, Ordering::SeqCst);
    }
}

/// Driver that records every call instead of talking to a database.
pub struct MockDriver {
    state: Arc<MockState>,
}

impl MockDriver {
    pub fn new() -> (Self, Arc<MockState>) {
        let state = Arc::new(MockState::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

impl Driver for MockDriver {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn connect(&self) -> Result<Box<dyn DriverConnection>> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_connect.load(Ordering::SeqCst) {
            return Err(CrmError::connection("mock database unreachable"));
        }
        Ok(Box::new(MockConnection {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockConnection {
    state: Arc<MockState>,
}

impl MockConnection {
    fn statement(&self) -> Result<()> {
        self.state.statements.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_statement.load(Ordering::SeqCst) {
            return Err(CrmError::database("mock statement failed").build());
        }
        Ok(())
    }
}

impl DriverConnection for MockConnection {
    fn query(&mut self, _sql: &str, _params: &[Value]) -> Result<Vec<Row>> {
        self.statement()?;
        Ok(vec![Row::new(vec!["ok".into()], vec![Value::Integer(1)])])
    }

    fn execute(&mut self, sql: &str, _params: &[Value]) -> Result<ExecResult> {
        self.statement()?;
        let inserted = sql.starts_with("INSERT").then_some(7);
        Ok(ExecResult::normalized(1, inserted))
    }

    fn execute_batch(&mut self, _sql: &str) -> Result<()> {
        self.statement()
    }

    fn begin(&mut self) -> Result<()> {
        self.state.begins.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.state.commits.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_commit.load(Ordering::SeqCst) {
            return Err(CrmError::database("mock commit failed").build());
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.state.rollbacks.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_rollback.load(Ordering::SeqCst) {
            return Err(CrmError::database("mock rollback failed").build());
        }
        Ok(())
    }

    fn ping(&mut self) -> Result<()> {
        self.statement()
    }

    fn release(&mut self) {
        self.state.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Helper function to create a manager over the mock driver
pub fn create_mock_db(max_connections: usize) -> (DatabaseManager, Arc<MockState>) {
    let (driver, state) = MockDriver::new();
    let db = DatabaseManager::with_driver(
        driver,
        PoolConfig {
            max_connections,
            acquire_timeout: Duration::from_millis(100),
        },
    )
    .expect("Failed to create mock pool");
    (db, state)
}
