//! Customer, viewing-record and statistics operations.
//!
//! [`Crm`] is what an HTTP route handler or the CLI calls. Each operation
//! validates its input first, then reaches the database only through the
//! borrowed [`DatabaseManager`]:
//!
//! ```text
//! caller ─▶ Crm ─▶ validation ─▶ DatabaseManager (query | transaction) ─▶ Pool
//! ```
//!
//! Multi-statement writes (existence check then insert, cascading delete)
//! run inside one [`DatabaseManager::transaction`] so a failure leaves no
//! partial write behind.

use crate::{
    db::DatabaseManager,
    error::{CrmError, Result},
    value::Value,
};

pub mod customer_ops;
pub mod stats_ops;
pub mod viewing_ops;

#[cfg(test)]
mod tests;

/// CRM service bound to a database manager.
#[derive(Clone, Copy)]
pub struct Crm<'a> {
    db: &'a DatabaseManager,
}

impl<'a> Crm<'a> {
    pub fn new(db: &'a DatabaseManager) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &'a DatabaseManager {
        self.db
    }
}

/// Returns the value of a field a create operation cannot do without.
fn require<'v, T: ?Sized>(value: Option<&'v T>, field: &str) -> Result<&'v T> {
    value.ok_or_else(|| CrmError::validation(field).with_reason("is required"))
}

/// Accumulates `column = ?N` assignments for a partial update.
#[derive(Default)]
struct UpdateSet {
    assignments: Vec<String>,
    params: Vec<Value>,
}

impl UpdateSet {
    fn set(&mut self, column: &str, value: impl Into<Value>) {
        self.params.push(value.into());
        self.assignments
            .push(format!("{column} = ?{}", self.params.len()));
    }

    fn set_if<T: Into<Value> + Clone>(&mut self, column: &str, value: Option<&T>) {
        if let Some(value) = value {
            self.set(column, value.clone());
        }
    }

    fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Finishes an `UPDATE <table> SET ... WHERE id = ?` statement.
    fn into_statement(mut self, table: &str, id: u64) -> (String, Vec<Value>) {
        self.params.push(Value::from(id));
        let sql = format!(
            "UPDATE {table} SET {} WHERE id = ?{}",
            self.assignments.join(", "),
            self.params.len()
        );
        (sql, self.params)
    }
}

/// Appends LIMIT/OFFSET clauses.
fn paginate(sql: &mut String, params: &mut Vec<Value>, limit: Option<u32>, offset: Option<u32>) {
    if limit.is_some() || offset.is_some() {
        params.push(Value::from(limit.map_or(-1, i64::from)));
        sql.push_str(&format!(" LIMIT ?{}", params.len()));
        params.push(Value::from(offset.unwrap_or(0)));
        sql.push_str(&format!(" OFFSET ?{}", params.len()));
    }
}
