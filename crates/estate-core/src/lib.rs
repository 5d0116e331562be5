//! Core library for the estate brokerage CRM.
//!
//! The crate is built around a small data-access layer:
//!
//! - **Driver adapters** ([`driver`]): one implementation per database
//!   driver, each producing the same [`Row`] / [`ExecResult`] shapes
//! - **Connection pool** ([`pool`]): a bounded set of reusable connections
//! - **Database manager** ([`db`]): `query`, `query_one`, `execute`,
//!   `transaction` and `health_check` over the pool
//! - **Validation** ([`validation`]): input checks run before any write
//!
//! On top of it, [`crm::Crm`] implements customer, viewing-record and
//! statistics operations.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use estate_core::{params::CustomerData, Crm, DatabaseManagerBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DatabaseManagerBuilder::new()
//!     .with_database_path(Some("crm.db"))
//!     .with_max_connections(4)
//!     .init()
//!     .await?;
//!
//! let crm = Crm::new(&db);
//! let customer = crm
//!     .create_customer(&CustomerData {
//!         name: Some("张三".to_string()),
//!         phone: Some("13800138000".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{customer}");
//!
//! assert!(db.health_check().await);
//! db.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod crm;
pub mod db;
pub mod display;
pub mod driver;
pub mod error;
pub mod models;
pub mod params;
pub mod pool;
pub mod validation;
pub mod value;

// Re-export commonly used types
pub use crm::Crm;
pub use db::{DatabaseManager, DatabaseManagerBuilder, Transaction};
pub use driver::{Driver, DriverConnection, SqliteDriver};
pub use error::{CrmError, Result};
pub use models::{
    CrmStatistics, Customer, CustomerStatus, StatusCount, ViewingFeedback, ViewingRecord,
    ViewingStatus,
};
pub use pool::{Pool, PoolConfig, PoolStatus, PooledConnection};
pub use validation::{
    validate_customer_data, validate_number_range, validate_phone_number,
    validate_string_length, validate_viewing_record_data,
};
pub use value::{ExecResult, Row, Value};
