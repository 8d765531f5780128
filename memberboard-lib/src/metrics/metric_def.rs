use super::{Headline, MetricCategory, MetricValue};

#[derive(Debug)]
pub struct MetricDef {
    pub name: &'static str,
    pub description: &'static str,
    pub category: MetricCategory,
    pub extractor: fn(&Headline) -> Option<MetricValue>,
}

macro_rules! metric_def {
    ($name:expr, $description:expr, $category:ident, $extractor:expr) => {
        MetricDef {
            name: $name,
            description: $description,
            category: MetricCategory::$category,
            extractor: $extractor,
        }
    };
}

fn count(value: usize) -> MetricValue {
    MetricValue::UInt(u64::try_from(value).unwrap_or(u64::MAX))
}

pub const METRIC_DEFINITIONS: &[MetricDef] = &[
    metric_def!(
        "members.active",
        "Members whose most recent subscription is active",
        Membership,
        |h| Some(count(h.active_members))
    ),
    metric_def!(
        "members.live",
        "Members with a subscription that has not expired",
        Membership,
        |h| Some(count(h.live_members))
    ),
    metric_def!(
        "members.change_30d",
        "Change in live members over the last 30 days",
        Membership,
        |h| Some(MetricValue::Int(h.live_members_change))
    ),
    metric_def!(
        "members.new_subscriptions",
        "Subscriptions created during the selected period",
        Membership,
        |h| Some(count(h.new_subscriptions))
    ),
    metric_def!(
        "members.education",
        "Active members enrolled through the education coupon",
        Membership,
        |h| Some(count(h.education_members))
    ),
    metric_def!(
        "revenue.mrr",
        "Monthly recurring revenue, excluding education members",
        Revenue,
        |h| Some(MetricValue::Money(h.mrr))
    ),
    metric_def!(
        "revenue.mrr_change_30d",
        "Percent change in MRR over the last 30 days",
        Revenue,
        |h| h.mrr_change_percent.map(MetricValue::Percent)
    ),
    metric_def!(
        "revenue.paying_subscriptions",
        "Active subscriptions contributing to MRR",
        Revenue,
        |h| Some(count(h.paying_subscriptions))
    ),
    metric_def!(
        "revenue.period_total",
        "Completed order revenue during the selected period",
        Revenue,
        |h| Some(MetricValue::Money(h.period_revenue))
    ),
    metric_def!(
        "revenue.last_30_days",
        "Completed order revenue over the last 30 days",
        Revenue,
        |h| Some(MetricValue::Money(h.recent_revenue))
    ),
    metric_def!(
        "retention.cancellations",
        "Subscriptions without auto-renew that ended during the selected period",
        Retention,
        |h| Some(count(h.cancellations))
    ),
    metric_def!(
        "retention.expiring_soon",
        "Active subscriptions without auto-renew expiring within the horizon",
        Retention,
        |h| Some(count(h.expiring_soon))
    ),
    metric_def!(
        "retention.horizon_days",
        "Days ahead considered for expiring subscriptions",
        Retention,
        |h| Some(MetricValue::UInt(u64::from(h.horizon_days)))
    ),
];
