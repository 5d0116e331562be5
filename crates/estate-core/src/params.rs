//! Parameter structures for estate operations
//!
//! These structures are shared by every interface (CLI today, any HTTP layer
//! tomorrow) and carry no framework-specific derives beyond serde. Payload
//! types keep every field optional so the same type serves creates and
//! partial updates; the CRM service checks which fields a create requires.

use serde::{Deserialize, Serialize};

/// Simple ID parameter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Id {
    pub id: u64,
}

/// Customer fields supplied on create or update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CustomerData {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub community: Option<String>,
    pub status: Option<i64>,
    pub remark: Option<String>,
}

impl CustomerData {
    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.community.is_none()
            && self.status.is_none()
            && self.remark.is_none()
    }
}

/// Viewing record fields supplied on create or update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewingRecordData {
    pub customer_id: Option<u64>,
    pub property_name: Option<String>,
    pub property_address: Option<String>,
    /// Viewing date and time, RFC 3339 or `YYYY-MM-DD HH:MM[:SS]`
    pub viewing_time: Option<String>,
    pub commission: Option<f64>,
    pub viewing_status: Option<i64>,
    pub viewing_feedback: Option<i64>,
    pub business_type: Option<String>,
    pub viewer_name: Option<String>,
}

impl ViewingRecordData {
    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none()
            && self.property_name.is_none()
            && self.property_address.is_none()
            && self.viewing_time.is_none()
            && self.commission.is_none()
            && self.viewing_status.is_none()
            && self.viewing_feedback.is_none()
            && self.business_type.is_none()
            && self.viewer_name.is_none()
    }
}

/// Filters for listing customers
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListCustomers {
    /// Only customers with this status code
    pub status: Option<i64>,
    /// Substring matched against name, phone and community
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Filters for listing viewing records
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListViewingRecords {
    pub customer_id: Option<u64>,
    pub viewing_status: Option<i64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}
