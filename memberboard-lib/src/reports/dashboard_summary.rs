use crate::metrics::{
    ActivityCategory, BucketSize, COMPARISON_DAYS, GrowthPoint, Headline, Metric, MrrMovement, Period, PlanUsage, RevenueBucket,
    TimePeriod, categorize, category_counts, expiring_soon, flatten, growth_series, month_start, mrr_movements, mrr_summary_at, plan_breakdown,
    plan_breakdown_at, revenue_by_period,
};
use crate::records::{Records, Subscription};
use crate::snapshot::DashboardContext;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// A subscription about to lapse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiringEntry {
    pub subscription_id: String,
    pub member_id: String,
    pub name: String,
    pub email: String,
    pub plan: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Plan usage now and its change over the comparison window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanRow {
    #[serde(flatten)]
    pub usage: PlanUsage,
    pub accounts_change: i64,
    pub members_change: i64,
}

/// How many activities of one category happened in the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: ActivityCategory,
    pub count: usize,
}

/// One activity, ready for listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRow {
    pub at: DateTime<Utc>,
    pub kind: String,
    pub category: ActivityCategory,
    pub member: String,
    pub email: String,
    pub plan: String,

    /// Estimated effect on MRR, in dollars.
    pub mrr_impact: f64,
}

/// Everything the dashboard shows, computed once from a [`DashboardContext`].
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub organization: String,
    pub fetched_at: DateTime<Utc>,
    pub period: TimePeriod,
    pub range: Period,
    pub bucket: BucketSize,
    pub headline: Headline,
    pub metrics: Vec<Metric>,
    pub revenue: Vec<RevenueBucket>,
    pub growth: Vec<GrowthPoint>,
    pub expiring: Vec<ExpiringEntry>,
    pub plans: Vec<PlanRow>,
    pub waterfall: Vec<MrrMovement>,
    pub activity_counts: Vec<CategoryCount>,
}

impl DashboardSummary {
    #[must_use]
    pub fn build(context: &DashboardContext) -> Self {
        let records = context.records();
        let filters = &context.filters;
        let range = context.range();
        let plans = records.plans_by_id();
        let education = records.education_members();

        let headline = Headline::compute(records, range, filters.now, filters.horizon_days);
        let metrics = flatten(&headline).collect();
        let starting_mrr = mrr_summary_at(&records.subscriptions, &plans, &education, month_start(range.start)).mrr;

        Self {
            organization: context.snapshot.organization.clone(),
            fetched_at: context.snapshot.fetched_at,
            period: filters.period,
            range,
            bucket: filters.bucket,
            metrics,
            revenue: revenue_by_period(&records.orders, range, filters.bucket),
            growth: growth_series(&records.subscriptions, &records.activities, range, filters.bucket),
            expiring: expiring_entries(records, filters.now, filters.horizon_days),
            plans: plan_rows(&records.subscriptions, &plans, filters.now),
            waterfall: mrr_movements(&records.activities, &plans, range, starting_mrr),
            activity_counts: category_counts(&records.activities, &plans, range)
                .into_iter()
                .map(|(category, count)| CategoryCount { category, count })
                .collect(),
            headline,
        }
    }
}

fn plan_name(records: &Records, plan_id: Option<&str>) -> String {
    plan_id
        .and_then(|id| records.plans.iter().find(|p| p.id == id))
        .map_or_else(|| "Unknown".to_string(), |plan| plan.name.clone())
}

fn expiring_entries(records: &Records, now: DateTime<Utc>, horizon_days: u32) -> Vec<ExpiringEntry> {
    let members: HashMap<&str, _> = records.members.iter().map(|m| (m.id.as_str(), m)).collect();

    expiring_soon(&records.subscriptions, now, horizon_days)
        .into_iter()
        .map(|sub: &Subscription| {
            let member = members.get(sub.member_id.as_str());
            ExpiringEntry {
                subscription_id: sub.id.clone(),
                member_id: sub.member_id.clone(),
                name: member.map(|m| m.full_name.clone()).unwrap_or_default(),
                email: member.map(|m| m.email.clone()).unwrap_or_default(),
                plan: plan_name(records, sub.plan_id.as_deref()),
                expires_at: sub.expires_at,
            }
        })
        .collect()
}

fn signed(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn plan_rows(subscriptions: &[Subscription], plans: &HashMap<&str, &crate::records::Plan>, now: DateTime<Utc>) -> Vec<PlanRow> {
    let before: HashMap<String, PlanUsage> = plan_breakdown_at(subscriptions, plans, now - Duration::days(i64::from(COMPARISON_DAYS)))
        .into_iter()
        .map(|usage| (usage.plan_id.clone(), usage))
        .collect();

    plan_breakdown(subscriptions, plans)
        .into_iter()
        .map(|usage| {
            let (accounts, members) = before.get(&usage.plan_id).map_or((0, 0), |b| (b.accounts, b.members));
            PlanRow {
                accounts_change: signed(usage.accounts) - signed(accounts),
                members_change: signed(usage.members) - signed(members),
                usage,
            }
        })
        .collect()
}

/// Activities inside the context's range, newest first.
#[must_use]
pub fn activity_rows(context: &DashboardContext) -> Vec<ActivityRow> {
    let records = context.records();
    let range = context.range();
    let plans = records.plans_by_id();

    let mut rows: Vec<_> = records
        .activities
        .iter()
        .filter(|a| range.contains(a.created_at))
        .map(|activity| {
            let plan = activity.plan_id.as_deref().and_then(|id| plans.get(id)).copied();
            let (category, mrr_impact) = categorize(activity, plan);
            ActivityRow {
                at: activity.created_at,
                kind: activity.kind.to_string(),
                category,
                member: activity.member_name.clone(),
                email: activity.member_email.clone(),
                plan: plan.map(|p| p.name.clone()).unwrap_or_default(),
                mrr_impact,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.at.cmp(&a.at));
    rows
}
