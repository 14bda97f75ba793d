//! Earnings records and summary

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Payout for one completed trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Earning {
    /// Backend identifier
    pub id: String,
    /// Owning captain
    pub captain_id: String,
    /// Trip that produced the payout
    pub trip_id: String,
    /// Amount in rupees
    pub amount: f64,
    /// Calendar day the payout belongs to
    pub date: NaiveDate,
    /// When the record was written
    pub created_at: DateTime<Utc>,
}

/// Aggregates computed by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningSummary {
    /// Earned today
    pub today: f64,
    /// Earned this week
    pub week: f64,
    /// Earned this month
    pub month: f64,
    /// Earned overall
    pub total: f64,
}

impl EarningSummary {
    /// Amount for the given period
    pub const fn for_period(&self, period: EarningsPeriod) -> f64 {
        match period {
            EarningsPeriod::Week => self.week,
            EarningsPeriod::Month => self.month,
        }
    }
}

/// Period selector on the earnings screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EarningsPeriod {
    /// This week
    #[default]
    Week,
    /// This month
    Month,
}

impl EarningsPeriod {
    /// Toggle between week and month
    pub const fn toggle(&self) -> Self {
        match self {
            Self::Week => Self::Month,
            Self::Month => Self::Week,
        }
    }

    /// Display label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Week => "This Week",
            Self::Month => "This Month",
        }
    }
}

/// Optional date bounds for an earnings query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// First day included
    pub start: Option<NaiveDate>,
    /// Last day included
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// No bounds
    pub const fn all() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Whether `date` falls inside the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_earning() {
        let json = r#"{
            "id": "earn_001",
            "captain_id": "cap_001",
            "trip_id": "trip_001",
            "amount": 180,
            "date": "2025-01-05",
            "created_at": "2025-01-05T10:30:00Z"
        }"#;
        let earning: Earning = serde_json::from_str(json).unwrap();
        assert_eq!(earning.date, day("2025-01-05"));
        assert!((earning.amount - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_date_range() {
        let range = DateRange {
            start: Some(day("2025-01-01")),
            end: Some(day("2025-01-31")),
        };
        assert!(range.contains(day("2025-01-01")));
        assert!(range.contains(day("2025-01-31")));
        assert!(!range.contains(day("2025-02-01")));
        assert!(DateRange::all().contains(day("1999-12-31")));
    }

    #[test]
    fn test_period_toggle() {
        let summary = EarningSummary {
            today: 400.0,
            week: 2800.0,
            month: 12000.0,
            total: 55000.0,
        };
        let period = EarningsPeriod::default();
        assert!((summary.for_period(period) - 2800.0).abs() < f64::EPSILON);
        assert!((summary.for_period(period.toggle()) - 12000.0).abs() < f64::EPSILON);
        assert_eq!(period.toggle().toggle(), EarningsPeriod::Week);
    }
}
