//! Membership metrics computed from normalized records
//!
//! Everything in this module is a pure function of the rows produced by the
//! `records` module plus explicit time parameters. Nothing here performs I/O or
//! reads a clock, so the same inputs always give the same outputs.
//!
//! # Implementation Model
//!
//! Time is handled through [`Period`], a half-open `[start, end)` range, and
//! [`BucketSize`], which splits a range into calendar-aligned UTC buckets. The
//! user-facing [`TimePeriod`] choices resolve into a concrete [`Period`] relative
//! to a supplied `now`.
//!
//! The counting functions (`active_count`, `new_in_period`,
//! `canceled_in_period`, `expiring_soon`) and the series functions
//! (`revenue_by_period`, `growth_series`) implement the core dashboard numbers.
//! Recurring revenue, the plan mix, the MRR waterfall and the member directory
//! build on them.
//!
//! The headline numbers are gathered into a [`Headline`], which [`flatten`]
//! turns into a flat list of named [`Metric`] values grouped by
//! [`MetricCategory`]. Reports render those metrics without knowing how each
//! one was computed.
//!
//! Empty inputs are never an error: every function returns zero counts or
//! empty series instead.

mod bucket;
mod directory;
mod engine;
mod headline;
mod metric;
mod metric_category;
mod metric_def;
mod metric_value;
mod movements;
mod period;
mod revenue;
mod series;

pub use bucket::BucketSize;
pub use directory::{DirectoryEntry, member_directory, profile_url};
pub use engine::{
    active_count, active_members_at, canceled_in_period, cancellation_activities, cancellation_instant, expiring_soon, new_in_period,
};
pub use headline::{COMPARISON_DAYS, Headline};
pub use metric::{Metric, flatten};
pub use metric_category::MetricCategory;
pub use metric_value::MetricValue;
pub use movements::{ActivityCategory, MrrMovement, categorize, category_counts, month_start, mrr_movements};
pub use period::{Period, TimePeriod};
pub use revenue::{MrrSummary, PlanUsage, monthly_value, mrr_summary, mrr_summary_at, plan_breakdown, plan_breakdown_at};
pub use series::{GrowthPoint, RevenueBucket, growth_series, recent_revenue, revenue_by_period};

#[cfg(any(debug_assertions, test))]
pub use metric_def::MetricDef;

/// Percent change from `previous` to `current`, or `None` when `previous` is zero.
#[must_use]
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    if previous.abs() < f64::EPSILON {
        return None;
    }

    Some(((current - previous) / previous * 1000.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_change_handles_zero_baseline() {
        assert_eq!(percent_change(0.0, 10.0), None);
        assert_eq!(percent_change(10.0, 15.0), Some(50.0));
        assert_eq!(percent_change(20.0, 15.0), Some(-25.0));
    }
}
