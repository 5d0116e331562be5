//! Input validation run before any write reaches the database.
//!
//! Every helper returns `Ok(())` or a [`CrmError::Validation`] naming the
//! offending field. The record-level validators only check fields that are
//! present, so the same functions serve creates and partial updates.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::{CrmError, Result},
    models::{parse_timestamp, CustomerStatus, ViewingStatus},
    params::{CustomerData, ViewingRecordData},
};

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^1[3-9]\d{9}$").expect("phone pattern is valid"));

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_COMMUNITY_LENGTH: usize = 100;
pub const MAX_REMARK_LENGTH: usize = 500;
pub const MAX_PROPERTY_NAME_LENGTH: usize = 100;
pub const MAX_PROPERTY_ADDRESS_LENGTH: usize = 200;
pub const MAX_VIEWER_NAME_LENGTH: usize = 50;
pub const MAX_BUSINESS_TYPE_LENGTH: usize = 20;

/// Checks for an 11-digit mainland mobile number.
pub fn validate_phone_number(value: &str) -> Result<()> {
    if PHONE_RE.is_match(value) {
        Ok(())
    } else {
        Err(CrmError::validation("phone").with_reason(format!(
            "'{value}' is not a valid mobile number (11 digits starting with 13-19)"
        )))
    }
}

/// Checks `min <= value <= max`.
pub fn validate_number_range<T>(value: T, min: T, max: T, field_name: &str) -> Result<()>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    // NaN fails both comparisons and is rejected here.
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(CrmError::validation(field_name)
            .with_reason(format!("{value} is outside the range {min}..={max}")))
    }
}

/// Checks that `value` has at most `max_length` characters.
pub fn validate_string_length(value: &str, max_length: usize, field_name: &str) -> Result<()> {
    let length = value.chars().count();
    if length <= max_length {
        Ok(())
    } else {
        Err(CrmError::validation(field_name).with_reason(format!(
            "length {length} exceeds the maximum of {max_length} characters"
        )))
    }
}

fn validate_not_blank(value: &str, field_name: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(CrmError::validation(field_name).with_reason("must not be empty"))
    } else {
        Ok(())
    }
}

fn validate_datetime(value: &str, field_name: &str) -> Result<()> {
    if parse_timestamp(value).is_some() {
        Ok(())
    } else {
        Err(CrmError::validation(field_name)
            .with_reason(format!("'{value}' is not a recognizable date and time")))
    }
}

/// Validates whichever customer fields are present.
pub fn validate_customer_data(data: &CustomerData) -> Result<()> {
    if let Some(name) = &data.name {
        validate_not_blank(name, "name")?;
        validate_string_length(name, MAX_NAME_LENGTH, "name")?;
    }
    if let Some(phone) = &data.phone {
        validate_phone_number(phone)?;
    }
    if let Some(community) = &data.community {
        validate_string_length(community, MAX_COMMUNITY_LENGTH, "community")?;
    }
    if let Some(remark) = &data.remark {
        validate_string_length(remark, MAX_REMARK_LENGTH, "remark")?;
    }
    if let Some(status) = data.status {
        validate_number_range(status, CustomerStatus::MIN, CustomerStatus::MAX, "status")?;
    }
    Ok(())
}

/// Validates whichever viewing record fields are present.
pub fn validate_viewing_record_data(data: &ViewingRecordData) -> Result<()> {
    if let Some(commission) = data.commission {
        if !commission.is_finite() || commission < 0.0 {
            return Err(CrmError::validation("commission")
                .with_reason(format!("{commission} must be a non-negative amount")));
        }
    }
    if let Some(status) = data.viewing_status {
        validate_number_range(
            status,
            ViewingStatus::MIN,
            ViewingStatus::MAX,
            "viewing_status",
        )?;
    }
    if let Some(feedback) = data.viewing_feedback {
        validate_number_range(feedback, 0, 1, "viewing_feedback")?;
    }
    if let Some(property_name) = &data.property_name {
        validate_not_blank(property_name, "property_name")?;
        validate_string_length(property_name, MAX_PROPERTY_NAME_LENGTH, "property_name")?;
    }
    if let Some(address) = &data.property_address {
        validate_string_length(address, MAX_PROPERTY_ADDRESS_LENGTH, "property_address")?;
    }
    if let Some(viewer) = &data.viewer_name {
        validate_string_length(viewer, MAX_VIEWER_NAME_LENGTH, "viewer_name")?;
    }
    if let Some(business_type) = &data.business_type {
        validate_string_length(business_type, MAX_BUSINESS_TYPE_LENGTH, "business_type")?;
    }
    if let Some(viewing_time) = &data.viewing_time {
        validate_datetime(viewing_time, "viewing_time")?;
    }
    Ok(())
}
