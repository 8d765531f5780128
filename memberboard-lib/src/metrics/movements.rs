//! Activity categorization and the monthly MRR waterfall.

use super::{BucketSize, Period, monthly_value};
use crate::records::{Activity, ActivityType, Plan, round_currency};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumIter};

/// How an activity is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Display, Deserialize, Serialize)]
pub enum ActivityCategory {
    #[strum(to_string = "New members")]
    NewMembers,
    Reactivations,
    Upgrades,
    Downgrades,
    Cancellations,
    #[strum(to_string = "Failed payments")]
    FailedPayments,
    Renewals,
    #[strum(to_string = "Education members")]
    EducationMembers,
    #[strum(to_string = "Education renewals")]
    EducationRenewals,
    #[strum(to_string = "Education cancellations")]
    EducationCancellations,
    #[strum(to_string = "Education changes")]
    EducationChanges,
    #[strum(to_string = "Free signups")]
    FreeSignups,
    #[strum(to_string = "Team member changes")]
    TeamMemberChanges,
    #[strum(to_string = "Subscription changes")]
    SubscriptionChanges,
    Other,
}

/// Classify an activity and estimate its effect on MRR in dollars.
///
/// Education enrollments never move MRR. Upgrades and downgrades are approximated by
/// the full monthly value of the new plan because the previous plan is not reported.
#[must_use]
pub fn categorize(activity: &Activity, plan: Option<&Plan>) -> (ActivityCategory, f64) {
    use ActivityCategory as C;
    use ActivityType as T;

    if activity.subscription_id.is_none() && plan.is_none() {
        let category = match &activity.kind {
            T::FreeSignup => C::FreeSignups,
            T::TeamMemberAdded | T::TeamMemberRemoved => C::TeamMemberChanges,
            T::AutoRenewEnabled | T::AutoRenewDisabled => C::SubscriptionChanges,
            T::Other(text) if text.contains("team_member") => C::TeamMemberChanges,
            T::Other(text) if text.contains("auto_renew") => C::SubscriptionChanges,
            _ => C::Other,
        };
        return (category, 0.0);
    }

    let monthly = plan.map_or(0.0, monthly_value);

    if activity.education {
        let category = match &activity.kind {
            T::NewSubscription | T::NewOrder => C::EducationMembers,
            T::Renewal => C::EducationRenewals,
            kind if kind.is_cancellation() => C::EducationCancellations,
            _ => C::EducationChanges,
        };
        return (category, 0.0);
    }

    match &activity.kind {
        T::NewSubscription | T::NewOrder => (C::NewMembers, monthly),
        T::SubscriptionReactivated => (C::Reactivations, monthly),
        T::Upgrade => (C::Upgrades, monthly),
        T::Downgrade => (C::Downgrades, -monthly),
        kind if kind.is_cancellation() => (C::Cancellations, -monthly),
        kind if kind.is_failed_payment() => (C::FailedPayments, -monthly),
        T::Renewal => (C::Renewals, 0.0),
        T::AutoRenewEnabled | T::AutoRenewDisabled => (C::SubscriptionChanges, 0.0),
        T::TeamMemberAdded | T::TeamMemberRemoved => (C::TeamMemberChanges, 0.0),
        _ => (C::Other, 0.0),
    }
}

/// One month of the MRR waterfall, in dollars.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MrrMovement {
    pub month: Period,
    pub starting: f64,
    pub new_members: f64,
    pub reactivations: f64,
    pub upgrades: f64,
    pub downgrades: f64,
    pub cancellations: f64,
    pub failed_payments: f64,
    pub total: f64,
}

impl MrrMovement {
    const fn empty(month: Period, starting: f64) -> Self {
        Self {
            month,
            starting,
            new_members: 0.0,
            reactivations: 0.0,
            upgrades: 0.0,
            downgrades: 0.0,
            cancellations: 0.0,
            failed_payments: 0.0,
            total: starting,
        }
    }

    fn apply(&mut self, category: ActivityCategory, impact: f64) {
        let slot = match category {
            ActivityCategory::NewMembers => &mut self.new_members,
            ActivityCategory::Reactivations => &mut self.reactivations,
            ActivityCategory::Upgrades => &mut self.upgrades,
            ActivityCategory::Downgrades => &mut self.downgrades,
            ActivityCategory::Cancellations => &mut self.cancellations,
            ActivityCategory::FailedPayments => &mut self.failed_payments,
            _ => return,
        };
        *slot += impact;
    }

    fn close(&mut self) {
        self.new_members = round_currency(self.new_members);
        self.reactivations = round_currency(self.reactivations);
        self.upgrades = round_currency(self.upgrades);
        self.downgrades = round_currency(self.downgrades);
        self.cancellations = round_currency(self.cancellations);
        self.failed_payments = round_currency(self.failed_payments);
        self.total = round_currency(
            self.starting
                + self.new_members
                + self.reactivations
                + self.upgrades
                + self.downgrades
                + self.cancellations
                + self.failed_payments,
        );
    }

    /// The month's label, e.g. `Jan 2024`.
    #[must_use]
    pub fn label(&self) -> String {
        self.month.start.format("%b %Y").to_string()
    }
}

/// Build a month-by-month MRR waterfall covering `range`.
///
/// Months are whole calendar months, so the first one begins at
/// [`month_start`] of `range.start` and `starting_mrr` must be the MRR at that
/// instant. Each later month starts from the previous month's total. Months
/// without activity are still present.
#[must_use]
pub fn mrr_movements(activities: &[Activity], plans: &HashMap<&str, &Plan>, range: Period, starting_mrr: f64) -> Vec<MrrMovement> {
    let months = BucketSize::Month.buckets(range);
    let mut starting = round_currency(starting_mrr);
    let mut movements = Vec::with_capacity(months.len());

    for month in months {
        let mut movement = MrrMovement::empty(month, starting);

        for activity in activities.iter().filter(|a| month.contains(a.created_at)) {
            let plan = activity.plan_id.as_deref().and_then(|id| plans.get(id)).copied();
            let (category, impact) = categorize(activity, plan);
            movement.apply(category, impact);
        }

        movement.close();
        starting = movement.total;
        movements.push(movement);
    }

    movements
}

/// Count activities per category inside `range`.
#[must_use]
pub fn category_counts(activities: &[Activity], plans: &HashMap<&str, &Plan>, range: Period) -> Vec<(ActivityCategory, usize)> {
    let mut counts: HashMap<ActivityCategory, usize> = HashMap::new();

    for activity in activities.iter().filter(|a| range.contains(a.created_at)) {
        let plan = activity.plan_id.as_deref().and_then(|id| plans.get(id)).copied();
        *counts.entry(categorize(activity, plan).0).or_default() += 1;
    }

    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort();
    counts
}

/// First instant of the month containing `at`.
#[must_use]
pub fn month_start(at: DateTime<Utc>) -> DateTime<Utc> {
    BucketSize::Month.align(at)
}
