//! Viewing record model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{required_i64, required_timestamp, ViewingFeedback, ViewingStatus};
use crate::{error::CrmError, value::Row};

/// Placeholder stored when a viewing is recorded without a property name.
pub const DEFAULT_PROPERTY_NAME: &str = "未知楼盘";

/// A customer's visit to a property.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewingRecord {
    pub id: u64,

    pub customer_id: u64,

    /// Name of the customer, when the customer still exists
    pub customer_name: Option<String>,

    pub property_name: String,

    pub property_address: Option<String>,

    /// When the viewing took place. Falls back to `created_at` for records
    /// written before the column existed.
    pub viewing_time: Option<String>,

    pub commission: f64,

    /// See [`ViewingStatus`]
    pub viewing_status: i64,

    /// See [`ViewingFeedback`]
    pub viewing_feedback: Option<i64>,

    pub business_type: Option<String>,

    /// Agent who accompanied the customer
    pub viewer_name: Option<String>,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,
}

impl ViewingRecord {
    pub fn status_kind(&self) -> Option<ViewingStatus> {
        ViewingStatus::from_code(self.viewing_status)
    }

    pub fn feedback_kind(&self) -> Option<ViewingFeedback> {
        self.viewing_feedback.and_then(ViewingFeedback::from_code)
    }
}

impl TryFrom<&Row> for ViewingRecord {
    type Error = CrmError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        const ENTITY: &str = "viewing record";
        Ok(ViewingRecord {
            id: required_i64(row, ENTITY, "id")? as u64,
            customer_id: required_i64(row, ENTITY, "customer_id")? as u64,
            customer_name: row.get_string("customer_name"),
            property_name: row
                .get_string("property_name")
                .unwrap_or_else(|| DEFAULT_PROPERTY_NAME.to_string()),
            property_address: row.get_string("property_address"),
            viewing_time: row
                .get_string("viewing_time")
                .or_else(|| row.get_string("created_at")),
            commission: row.get_f64("commission").unwrap_or(0.0),
            viewing_status: row
                .get_i64("viewing_status")
                .unwrap_or(ViewingStatus::Scheduled.code()),
            viewing_feedback: row.get_i64("viewing_feedback"),
            business_type: row.get_string("business_type"),
            viewer_name: row.get_string("viewer_name"),
            created_at: required_timestamp(row, ENTITY, "created_at")?,
            updated_at: required_timestamp(row, ENTITY, "updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn legacy_row() -> Row {
        Row::new(
            vec![
                "id".into(),
                "customer_id".into(),
                "commission".into(),
                "viewing_status".into(),
                "created_at".into(),
                "updated_at".into(),
            ],
            vec![
                Value::Integer(9),
                Value::Integer(2),
                Value::Integer(1500),
                Value::Integer(2),
                Value::from("2023-05-02 10:30:00"),
                Value::from("2023-05-02 10:30:00"),
            ],
        )
    }

    #[test]
    fn test_legacy_row_without_property_columns() {
        let record = ViewingRecord::try_from(&legacy_row()).expect("Row should convert");
        assert_eq!(record.property_name, DEFAULT_PROPERTY_NAME);
        assert_eq!(record.viewing_time.as_deref(), Some("2023-05-02 10:30:00"));
        assert_eq!(record.commission, 1500.0);
        assert_eq!(record.status_kind(), Some(ViewingStatus::Viewed));
        assert_eq!(record.feedback_kind(), None);
    }

    #[test]
    fn test_missing_identity_is_database_error() {
        let row = Row::new(vec!["customer_id".into()], vec![Value::Integer(1)]);
        let err = ViewingRecord::try_from(&row).unwrap_err();
        assert_eq!(err.code(), "DATABASE_ERROR");
        assert!(err.to_string().contains("'id'"));
    }
}
