//! Aggregate figures reported by the statistics operation.

use serde::{Deserialize, Serialize};

/// Number of records sharing one status code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusCount {
    pub status: i64,
    /// Display name of the status, empty for codes outside the known range
    pub label: String,
    pub count: u64,
}

/// Snapshot of CRM activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CrmStatistics {
    pub total_customers: u64,
    pub customers_by_status: Vec<StatusCount>,
    pub total_viewings: u64,
    pub viewings_by_status: Vec<StatusCount>,
    /// Viewings where the customer reported interest
    pub interested_viewings: u64,
    /// Sum of commission over all viewing records
    pub total_commission: f64,
    /// Sum of commission over viewings that closed a deal
    pub deal_commission: f64,
}

impl CrmStatistics {
    /// Share of viewings that ended in a deal, 0.0 when there are none.
    pub fn deal_rate(&self) -> f64 {
        if self.total_viewings == 0 {
            return 0.0;
        }
        let deals: u64 = self
            .viewings_by_status
            .iter()
            .filter(|s| s.status == super::ViewingStatus::DealClosed.code())
            .map(|s| s.count)
            .sum();
        deals as f64 / self.total_viewings as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deal_rate() {
        let stats = CrmStatistics {
            total_viewings: 4,
            viewings_by_status: vec![
                StatusCount {
                    status: 2,
                    label: "已带看".into(),
                    count: 3,
                },
                StatusCount {
                    status: 4,
                    label: "已成交".into(),
                    count: 1,
                },
            ],
            ..Default::default()
        };
        assert_eq!(stats.deal_rate(), 0.25);
        assert_eq!(CrmStatistics::default().deal_rate(), 0.0);
    }
}
