use super::metric_def::{METRIC_DEFINITIONS, MetricDef};
use super::{Headline, MetricCategory, MetricValue};
use serde::{Serialize, Serializer};
use serde::ser::SerializeStruct;

#[derive(Debug, Clone)]
pub struct Metric {
    pub def: &'static MetricDef,
    pub value: Option<MetricValue>,
}

impl Metric {
    #[must_use]
    pub const fn new(def: &'static MetricDef) -> Self {
        Self { def, value: None }
    }

    #[must_use]
    pub const fn with_value(def: &'static MetricDef, value: MetricValue) -> Self {
        Self { def, value: Some(value) }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.def.name
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.def.description
    }

    #[must_use]
    pub const fn category(&self) -> MetricCategory {
        self.def.category
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Metric", 4)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("description", self.description())?;
        state.serialize_field("category", &self.category())?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

/// Flatten a [`Headline`] into named metrics.
pub fn flatten(headline: &Headline) -> impl Iterator<Item = Metric> + '_ {
    METRIC_DEFINITIONS
        .iter()
        .map(|def| (def.extractor)(headline).map_or_else(|| Metric::new(def), |value| Metric::with_value(def, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Period;
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;

    fn headline() -> Headline {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Headline {
            period: Period::trailing_days(now, 30),
            now,
            active_members: 10,
            live_members: 12,
            live_members_change: -2,
            new_subscriptions: 3,
            education_members: 1,
            mrr: 250.5,
            mrr_change_percent: None,
            paying_subscriptions: 9,
            period_revenue: 300.0,
            recent_revenue: 120.0,
            cancellations: 2,
            expiring_soon: 1,
            horizon_days: 30,
        }
    }

    #[test]
    fn flatten_produces_every_metric() {
        let metrics: Vec<_> = flatten(&headline()).collect();
        assert_eq!(metrics.len(), METRIC_DEFINITIONS.len());

        let names: HashSet<_> = metrics.iter().map(Metric::name).collect();
        assert_eq!(names.len(), metrics.len(), "metric names must be unique");
    }

    #[test]
    fn missing_values_stay_empty() {
        let metrics: Vec<_> = flatten(&headline()).collect();
        let change = metrics.iter().find(|m| m.name() == "revenue.mrr_change_30d").unwrap();
        assert!(change.value.is_none());

        let mrr = metrics.iter().find(|m| m.name() == "revenue.mrr").unwrap();
        assert_eq!(mrr.value, Some(MetricValue::Money(250.5)));
    }

    #[test]
    fn every_category_is_used() {
        let categories: HashSet<_> = flatten(&headline()).map(|m| m.category()).collect();
        assert_eq!(categories.len(), 3);
    }

    #[test]
    fn metric_names_are_prefixed_by_category() {
        for metric in flatten(&headline()) {
            let prefix = match metric.category() {
                MetricCategory::Membership => "members.",
                MetricCategory::Revenue => "revenue.",
                MetricCategory::Retention => "retention.",
            };
            assert!(metric.name().starts_with(prefix), "{}", metric.name());
            assert!(metric.description().len() > 10);
        }
    }

    #[test]
    fn metrics_serialize_with_names() {
        let metric = flatten(&headline()).next().unwrap();
        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(json["name"], "members.active");
        assert_eq!(json["value"], 10);
    }
}
