//! Markdown display for models and operation results.
//!
//! Domain models implement [`fmt::Display`] directly; the wrapper types here
//! format collections and create/update/delete outcomes so every interface
//! prints the same text. The CLI renders this markdown to the terminal.
//!
//! ```rust
//! use estate_core::{display::CustomerList, Customer};
//! use jiff::Timestamp;
//!
//! let customer = Customer {
//!     id: 1,
//!     name: "张三".to_string(),
//!     phone: "13800138000".to_string(),
//!     community: Some("翠湖花园".to_string()),
//!     status: 2,
//!     remark: None,
//!     created_at: Timestamp::now(),
//!     updated_at: Timestamp::now(),
//! };
//! let output = CustomerList(&[customer]).to_string();
//! assert!(output.contains("张三"));
//! assert!(output.contains("跟进中"));
//! ```

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

use crate::models::{
    CrmStatistics, Customer, CustomerStatus, StatusCount, ViewingFeedback, ViewingRecord,
    ViewingStatus,
};

/// Formats a timestamp in the system time zone as `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

fn customer_status_label(code: i64) -> String {
    CustomerStatus::from_code(code).map_or_else(|| format!("unknown ({code})"), |s| s.to_string())
}

fn viewing_status_label(code: i64) -> String {
    ViewingStatus::from_code(code).map_or_else(|| format!("unknown ({code})"), |s| s.to_string())
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.name)?;
        writeln!(f)?;
        writeln!(f, "- Phone: {}", self.phone)?;
        if let Some(community) = &self.community {
            writeln!(f, "- Community: {community}")?;
        }
        writeln!(f, "- Status: {}", customer_status_label(self.status))?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;
        if let Some(remark) = &self.remark {
            writeln!(f)?;
            writeln!(f, "{remark}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ViewingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.property_name)?;
        writeln!(f)?;
        match &self.customer_name {
            Some(name) => writeln!(f, "- Customer: {name} (#{})", self.customer_id)?,
            None => writeln!(f, "- Customer: #{}", self.customer_id)?,
        }
        if let Some(address) = &self.property_address {
            writeln!(f, "- Address: {address}")?;
        }
        if let Some(time) = &self.viewing_time {
            writeln!(f, "- Viewing time: {time}")?;
        }
        writeln!(f, "- Status: {}", viewing_status_label(self.viewing_status))?;
        if let Some(feedback) = self.viewing_feedback {
            let label = ViewingFeedback::from_code(feedback)
                .map_or_else(|| format!("unknown ({feedback})"), |fb| fb.to_string());
            writeln!(f, "- Feedback: {label}")?;
        }
        writeln!(f, "- Commission: {:.2}", self.commission)?;
        if let Some(business_type) = &self.business_type {
            writeln!(f, "- Business type: {business_type}")?;
        }
        if let Some(viewer) = &self.viewer_name {
            writeln!(f, "- Agent: {viewer}")?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        Ok(())
    }
}

fn write_breakdown(f: &mut fmt::Formatter<'_>, counts: &[StatusCount]) -> fmt::Result {
    if counts.is_empty() {
        return writeln!(f, "- (none)");
    }
    for entry in counts {
        let label = if entry.label.is_empty() {
            format!("status {}", entry.status)
        } else {
            entry.label.clone()
        };
        writeln!(f, "- {label}: {}", entry.count)?;
    }
    Ok(())
}

impl fmt::Display for CrmStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Statistics")?;
        writeln!(f)?;
        writeln!(f, "## Customers: {}", self.total_customers)?;
        writeln!(f)?;
        write_breakdown(f, &self.customers_by_status)?;
        writeln!(f)?;
        writeln!(f, "## Viewings: {}", self.total_viewings)?;
        writeln!(f)?;
        write_breakdown(f, &self.viewings_by_status)?;
        writeln!(f)?;
        writeln!(f, "- Interested: {}", self.interested_viewings)?;
        writeln!(f, "- Deal rate: {:.1}%", self.deal_rate() * 100.0)?;
        writeln!(f, "- Total commission: {:.2}", self.total_commission)?;
        writeln!(f, "- Deal commission: {:.2}", self.deal_commission)?;
        Ok(())
    }
}

/// Compact list of customers, one line each.
pub struct CustomerList<'a>(pub &'a [Customer]);

impl fmt::Display for CustomerList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No customers found.");
        }
        for customer in self.0 {
            write!(
                f,
                "- **{}. {}** {} [{}]",
                customer.id,
                customer.name,
                customer.phone,
                customer_status_label(customer.status)
            )?;
            if let Some(community) = &customer.community {
                write!(f, " {community}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Compact list of viewing records, one line each.
pub struct ViewingList<'a>(pub &'a [ViewingRecord]);

impl fmt::Display for ViewingList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No viewing records found.");
        }
        for record in self.0 {
            writeln!(
                f,
                "- **{}. {}** {} · {} · {} · {:.2}",
                record.id,
                record.property_name,
                record
                    .customer_name
                    .clone()
                    .unwrap_or_else(|| format!("#{}", record.customer_id)),
                record.viewing_time.as_deref().unwrap_or("-"),
                viewing_status_label(record.viewing_status),
                record.commission
            )?;
        }
        Ok(())
    }
}

/// Kind of write an [`OperationResult`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Created => "Created",
            Operation::Updated => "Updated",
            Operation::Deleted => "Deleted",
        })
    }
}

/// Confirmation line followed by the affected resource.
pub struct OperationResult<'a, T> {
    pub operation: Operation,
    pub kind: &'static str,
    pub id: u64,
    pub resource: &'a T,
}

impl<T: fmt::Display> fmt::Display for OperationResult<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} with ID: {}", self.operation, self.kind, self.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}
