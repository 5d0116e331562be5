//! Customer model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{required_i64, required_string, required_timestamp, CustomerStatus};
use crate::{error::CrmError, value::Row};

/// A brokerage customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    /// Unique identifier for the customer
    pub id: u64,

    pub name: String,

    /// Mobile number, unique among customers
    pub phone: String,

    /// Residential community the customer is interested in
    pub community: Option<String>,

    /// Funnel stage, see [`CustomerStatus`]
    pub status: i64,

    pub remark: Option<String>,

    /// Timestamp when the customer was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the customer was last modified (UTC)
    pub updated_at: Timestamp,
}

impl Customer {
    /// Named status, when the stored code is in range.
    pub fn status_kind(&self) -> Option<CustomerStatus> {
        CustomerStatus::from_code(self.status)
    }
}

impl TryFrom<&Row> for Customer {
    type Error = CrmError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        const ENTITY: &str = "customer";
        Ok(Customer {
            id: required_i64(row, ENTITY, "id")? as u64,
            name: required_string(row, ENTITY, "name")?,
            phone: required_string(row, ENTITY, "phone")?,
            community: row.get_string("community"),
            status: row.get_i64("status").unwrap_or(CustomerStatus::New.code()),
            remark: row.get_string("remark"),
            created_at: required_timestamp(row, ENTITY, "created_at")?,
            updated_at: required_timestamp(row, ENTITY, "updated_at")?,
        })
    }
}
