//! Usage records and derived statistics types

use crate::types::Plan;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Append-only usage log for one service.
///
/// `usage_dates` holds one timestamp per recorded use, in insertion order
/// (which is chronological order of use). At most one record exists per
/// `service_name` in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageRecord {
    pub service_name: String,
    #[serde(default)]
    pub usage_dates: Vec<DateTime<Utc>>,
}

impl UsageRecord {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            usage_dates: Vec::new(),
        }
    }

    /// Append a use event. The log is append-only; timestamps are never
    /// removed or reordered.
    pub fn record_use(&mut self, at: DateTime<Utc>) {
        self.usage_dates.push(at);
    }

    /// Number of recorded uses in the calendar month containing `now`.
    ///
    /// Month membership is year+month equality, so the last instant of the
    /// month counts and the first instant of the next month does not.
    pub fn count_in_month(&self, now: DateTime<Utc>) -> u32 {
        self.usage_dates
            .iter()
            .filter(|ts| ts.year() == now.year() && ts.month() == now.month())
            .count() as u32
    }
}

/// Derived monthly statistics for one service.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServiceStat {
    pub service_name: String,
    pub plan: Plan,
    pub monthly_count: u32,
    pub monthly_price: u32,
    /// Monthly price divided by monthly use count, rounded to cents.
    /// When nothing was used this month, this is the flat monthly price.
    pub cost_per_use: f64,
}

/// Whole-registry subscription cost figures.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct CostSummary {
    /// Sum of resolved plan prices over every registered service.
    pub total_monthly_cost: u32,
    /// Number of stored assignments on a paid plan. Counts assignments,
    /// not registry entries.
    pub paid_service_count: u32,
}
