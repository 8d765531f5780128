//! The headline numbers shown at the top of the dashboard.

use super::engine::{active_count, active_members_at, canceled_in_period, expiring_soon, new_in_period};
use super::revenue::{mrr_summary, mrr_summary_at};
use super::series::recent_revenue;
use super::{Period, percent_change};
use crate::records::{Records, cents_to_dollars};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Days looked back for month-over-month comparisons and recent revenue.
pub const COMPARISON_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Headline {
    pub period: Period,
    pub now: DateTime<Utc>,

    pub active_members: usize,
    pub live_members: usize,
    pub live_members_change: i64,
    pub new_subscriptions: usize,
    pub education_members: usize,

    pub mrr: f64,
    pub mrr_change_percent: Option<f64>,
    pub paying_subscriptions: usize,
    pub period_revenue: f64,
    pub recent_revenue: f64,

    pub cancellations: usize,
    pub expiring_soon: usize,
    pub horizon_days: u32,
}

impl Headline {
    /// Compute the headline numbers for `period`, as seen at `now`.
    #[must_use]
    pub fn compute(records: &Records, period: Period, now: DateTime<Utc>, horizon_days: u32) -> Self {
        let plans = records.plans_by_id();
        let education = records.education_members();
        let subs = &records.subscriptions;

        let month_ago = now - Duration::days(i64::from(COMPARISON_DAYS));
        let current = mrr_summary(subs, &plans, &education);
        let previous = mrr_summary_at(subs, &plans, &education, month_ago);

        let live_now = active_members_at(subs, now);
        let live_before = active_members_at(subs, month_ago);

        let period_cents: i64 = records
            .orders
            .iter()
            .filter(|o| o.is_completed() && period.contains(o.created_at))
            .map(|o| o.total_cents)
            .sum();

        Self {
            period,
            now,
            active_members: active_count(subs),
            live_members: live_now,
            live_members_change: signed(live_now) - signed(live_before),
            new_subscriptions: new_in_period(subs, period),
            education_members: current.education_members,
            mrr: current.mrr,
            mrr_change_percent: percent_change(previous.mrr, current.mrr),
            paying_subscriptions: current.paying_subscriptions,
            period_revenue: cents_to_dollars(period_cents),
            recent_revenue: recent_revenue(&records.orders, now, COMPARISON_DAYS),
            cancellations: canceled_in_period(subs, &records.activities, period),
            expiring_soon: expiring_soon(subs, now, horizon_days).len(),
            horizon_days,
        }
    }
}

fn signed(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{IntervalUnit, Order, OrderStatus, Plan, PlanKind, Subscription};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn sub(id: &str, member: &str, days_ago: i64, active: bool) -> Subscription {
        Subscription {
            id: id.into(),
            member_id: member.into(),
            plan_id: Some("p".into()),
            active,
            auto_renew: true,
            created_at: now() - Duration::days(days_ago),
            expires_at: None,
        }
    }

    #[test]
    fn empty_records_give_zero_state() {
        let period = Period::trailing_days(now(), 30);
        let headline = Headline::compute(&Records::default(), period, now(), 30);

        assert_eq!(headline.active_members, 0);
        assert_eq!(headline.new_subscriptions, 0);
        assert_eq!(headline.live_members_change, 0);
        assert!(headline.mrr.abs() < f64::EPSILON);
        assert_eq!(headline.mrr_change_percent, None);
        assert!(headline.period_revenue.abs() < f64::EPSILON);
    }

    #[test]
    fn compares_against_a_month_ago() {
        let records = Records {
            subscriptions: vec![sub("1", "a", 100, true), sub("2", "b", 10, true)],
            plans: vec![Plan {
                id: "p".into(),
                name: "Monthly".into(),
                price: 10.0,
                price_cents: 1000,
                interval_unit: IntervalUnit::Month,
                interval_count: 1,
                kind: PlanKind::Standard,
            }],
            orders: vec![Order {
                id: "o".into(),
                member_id: "b".into(),
                subscription_id: Some("2".into()),
                total: 10.0,
                total_cents: 1000,
                discount_cents: 0,
                status: OrderStatus::Completed,
                created_at: now() - Duration::days(10),
                coupon_code: None,
            }],
            ..Records::default()
        };

        let headline = Headline::compute(&records, Period::trailing_days(now(), 30), now(), 30);
        assert_eq!(headline.active_members, 2);
        assert_eq!(headline.live_members, 2);
        assert_eq!(headline.live_members_change, 1);
        assert_eq!(headline.new_subscriptions, 1);
        assert!((headline.mrr - 20.0).abs() < 1e-9);
        assert_eq!(headline.mrr_change_percent, Some(100.0));
        assert!((headline.period_revenue - 10.0).abs() < 1e-9);
        assert!((headline.recent_revenue - 10.0).abs() < 1e-9);
    }
}
