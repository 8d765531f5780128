//! Recurring revenue and plan mix.

use crate::records::{Plan, Subscription, round_currency};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A plan's price normalized to one month, in dollars.
#[must_use]
pub fn monthly_value(plan: &Plan) -> f64 {
    round_currency(plan.monthly_cents() / 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct MrrSummary {
    /// Monthly recurring revenue in dollars, excluding education members.
    pub mrr: f64,

    /// Distinct subscriptions contributing to MRR.
    pub paying_subscriptions: usize,

    /// Distinct members with a qualifying subscription, education members included.
    pub active_members: usize,
    pub education_members: usize,
}

fn summarize<'a>(
    qualifying: impl Iterator<Item = &'a Subscription>,
    plans: &HashMap<&str, &Plan>,
    education: &HashSet<&str>,
) -> MrrSummary {
    let mut paying: HashMap<&str, f64> = HashMap::new();
    let mut members: HashSet<&str> = HashSet::new();
    let mut education_members: HashSet<&str> = HashSet::new();

    for sub in qualifying {
        let member = sub.member_id.as_str();
        let _ = members.insert(member);

        if education.contains(member) {
            let _ = education_members.insert(member);
            continue;
        }

        let monthly_cents = sub
            .plan_id
            .as_deref()
            .and_then(|id| plans.get(id))
            .map_or(0.0, |plan| plan.monthly_cents());
        let _ = paying.entry(sub.id.as_str()).or_insert(monthly_cents);
    }

    MrrSummary {
        mrr: round_currency(paying.values().sum::<f64>() / 100.0),
        paying_subscriptions: paying.len(),
        active_members: members.len(),
        education_members: education_members.len(),
    }
}

/// Current MRR over active subscriptions, counting each subscription once.
#[must_use]
pub fn mrr_summary(subscriptions: &[Subscription], plans: &HashMap<&str, &Plan>, education: &HashSet<&str>) -> MrrSummary {
    summarize(subscriptions.iter().filter(|sub| sub.active), plans, education)
}

/// MRR as it stood at `at`, over subscriptions live at that instant.
#[must_use]
pub fn mrr_summary_at(
    subscriptions: &[Subscription],
    plans: &HashMap<&str, &Plan>,
    education: &HashSet<&str>,
    at: DateTime<Utc>,
) -> MrrSummary {
    summarize(subscriptions.iter().filter(|sub| sub.live_at(at)), plans, education)
}

/// Usage of one plan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlanUsage {
    pub plan_id: String,
    pub name: String,

    /// Distinct subscriptions on the plan.
    pub accounts: usize,

    /// Distinct members on the plan; team plans have several per account.
    pub members: usize,
}

fn breakdown<'a>(qualifying: impl Iterator<Item = &'a Subscription>, plans: &HashMap<&str, &Plan>) -> Vec<PlanUsage> {
    let mut groups: BTreeMap<&str, (HashSet<&str>, HashSet<&str>)> = BTreeMap::new();

    for sub in qualifying {
        let (accounts, members) = groups.entry(sub.plan_id.as_deref().unwrap_or_default()).or_default();
        let _ = accounts.insert(sub.id.as_str());
        let _ = members.insert(sub.member_id.as_str());
    }

    let mut usage: Vec<_> = groups
        .into_iter()
        .map(|(plan_id, (accounts, members))| PlanUsage {
            plan_id: plan_id.to_string(),
            name: plans.get(plan_id).map_or_else(|| "Unknown".to_string(), |plan| plan.name.clone()),
            accounts: accounts.len(),
            members: members.len(),
        })
        .collect();

    usage.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.plan_id.cmp(&b.plan_id)));
    usage
}

/// Active accounts and members per plan.
#[must_use]
pub fn plan_breakdown(subscriptions: &[Subscription], plans: &HashMap<&str, &Plan>) -> Vec<PlanUsage> {
    breakdown(subscriptions.iter().filter(|sub| sub.active), plans)
}

/// Accounts and members per plan among subscriptions live at `at`.
#[must_use]
pub fn plan_breakdown_at(subscriptions: &[Subscription], plans: &HashMap<&str, &Plan>, at: DateTime<Utc>) -> Vec<PlanUsage> {
    breakdown(subscriptions.iter().filter(|sub| sub.live_at(at)), plans)
}
