//! Statistics for the CRM service.

use super::Crm;
use crate::{
    error::Result,
    models::{CrmStatistics, CustomerStatus, StatusCount, ViewingStatus},
    value::Row,
};

const CUSTOMER_TOTAL_SQL: &str = "SELECT COUNT(*) AS total FROM customers";
const CUSTOMERS_BY_STATUS_SQL: &str =
    "SELECT status, COUNT(*) AS count FROM customers GROUP BY status ORDER BY status";
const VIEWING_TOTALS_SQL: &str = "SELECT COUNT(*) AS total, \
     COALESCE(SUM(commission), 0) AS total_commission, \
     COALESCE(SUM(CASE WHEN viewing_status = 4 THEN commission ELSE 0 END), 0) AS deal_commission, \
     COALESCE(SUM(CASE WHEN viewing_feedback = 1 THEN 1 ELSE 0 END), 0) AS interested \
     FROM viewing_records";
const VIEWINGS_BY_STATUS_SQL: &str = "SELECT viewing_status AS status, COUNT(*) AS count FROM viewing_records GROUP BY viewing_status ORDER BY viewing_status";

impl Crm<'_> {
    /// Collects customer and viewing figures. The four aggregate queries run
    /// concurrently, each on its own pooled connection.
    pub async fn statistics(&self) -> Result<CrmStatistics> {
        let (customer_total, customers_by_status, viewing_totals, viewings_by_status) =
            tokio::try_join!(
                self.db.query_one(CUSTOMER_TOTAL_SQL, &[]),
                self.db.query(CUSTOMERS_BY_STATUS_SQL, &[]),
                self.db.query_one(VIEWING_TOTALS_SQL, &[]),
                self.db.query(VIEWINGS_BY_STATUS_SQL, &[]),
            )?;

        let count = |row: Option<&Row>, column: &str| {
            row.and_then(|r| r.get_i64(column)).unwrap_or(0).max(0) as u64
        };
        let amount = |row: Option<&Row>, column: &str| {
            row.and_then(|r| r.get_f64(column)).unwrap_or(0.0)
        };

        Ok(CrmStatistics {
            total_customers: count(customer_total.as_ref(), "total"),
            customers_by_status: status_counts(&customers_by_status, |code| {
                CustomerStatus::from_code(code).map(CustomerStatus::label)
            }),
            total_viewings: count(viewing_totals.as_ref(), "total"),
            viewings_by_status: status_counts(&viewings_by_status, |code| {
                ViewingStatus::from_code(code).map(ViewingStatus::label)
            }),
            interested_viewings: count(viewing_totals.as_ref(), "interested"),
            total_commission: amount(viewing_totals.as_ref(), "total_commission"),
            deal_commission: amount(viewing_totals.as_ref(), "deal_commission"),
        })
    }
}

fn status_counts(rows: &[Row], label: impl Fn(i64) -> Option<&'static str>) -> Vec<StatusCount> {
    rows.iter()
        .filter_map(|row| {
            let status = row.get_i64("status")?;
            Some(StatusCount {
                status,
                label: label(status).unwrap_or_default().to_string(),
                count: row.get_i64("count").unwrap_or(0).max(0) as u64,
            })
        })
        .collect()
}
