//! Error types for the estate core library.

use std::path::PathBuf;

use thiserror::Error;

/// Error type shared by every layer of the core: pool, executor,
/// transaction wrapper, validation and CRM services.
#[derive(Error, Debug)]
pub enum CrmError {
    /// Input failed a business-rule check before touching the database
    #[error("Invalid input for field '{field}': {reason}")]
    Validation { field: String, reason: String },
    /// Pool exhausted, shut down, or the database could not be reached
    #[error("Connection error: {message}")]
    Connection { message: String },
    /// A statement failed at the driver or server level
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },
    /// `transaction` was called from inside a running unit of work
    #[error("Nested transactions are not supported")]
    NestedTransaction,
    /// A referenced record does not exist
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    /// A write would violate a uniqueness rule
    #[error("Conflict on field '{field}': {reason}")]
    Conflict { field: String, reason: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given driver error as its source. The
    /// driver's message is kept in the rendered text.
    pub fn with_source(self, source: rusqlite::Error) -> CrmError {
        CrmError::Database {
            message: format!("{}: {}", self.message, source),
            source: Some(source),
        }
    }

    /// Build the error without an underlying driver error.
    pub fn build(self) -> CrmError {
        CrmError::Database {
            message: self.message,
            source: None,
        }
    }
}

/// Builder for creating input validation errors.
pub struct ValidationErrorBuilder {
    field: String,
}

impl ValidationErrorBuilder {
    /// Create a new validation error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> CrmError {
        CrmError::Validation {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl CrmError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for validation errors.
    pub fn validation(field: impl Into<String>) -> ValidationErrorBuilder {
        ValidationErrorBuilder::new(field)
    }

    /// Creates a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Machine-readable code for callers translating errors into responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Connection { .. } => "CONNECTION_ERROR",
            Self::Database { .. } | Self::NestedTransaction => "DATABASE_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::FileSystem { .. } | Self::XdgDirectory(_) | Self::Configuration { .. } => {
                "CONFIGURATION_ERROR"
            }
        }
    }

    /// Field name carried by validation and conflict errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } | Self::Conflict { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| CrmError::database(message).with_source(e))
    }
}

/// Result type alias for estate operations
pub type Result<T> = std::result::Result<T, CrmError>;
