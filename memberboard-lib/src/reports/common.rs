//! Formatting shared by the report generators.

use crate::metrics::{Metric, MetricCategory};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Format a dollar amount, e.g. `$1234.50` or `-$20.00`.
pub fn format_money(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${amount:.2}")
    }
}

/// Format a signed change, with an explicit `+` for growth.
pub fn format_change(change: i64) -> String {
    if change == 0 { "0".to_string() } else { format!("{change:+}") }
}

pub fn format_date(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "n/a".to_string(), |at| at.format("%Y-%m-%d").to_string())
}

pub const fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Group metrics by category, keeping their order within each category.
pub fn group_metrics_by_category(metrics: &[Metric]) -> HashMap<MetricCategory, Vec<&Metric>> {
    let mut by_category: HashMap<MetricCategory, Vec<&Metric>> = HashMap::new();

    for metric in metrics {
        by_category.entry(metric.category()).or_default().push(metric);
    }

    by_category
}
