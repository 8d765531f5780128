//! Time series: revenue per bucket and cumulative membership.

use super::engine::{cancellation_activities, cancellation_instant};
use super::{BucketSize, Period};
use crate::records::{Activity, Order, Subscription, cents_to_dollars};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Completed revenue inside one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RevenueBucket {
    pub period: Period,

    /// Dollars, rounded to cents.
    pub total: f64,
    pub orders: usize,
}

/// Membership count at one bucket boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct GrowthPoint {
    pub at: DateTime<Utc>,
    pub members: usize,
}

/// Sum completed order totals into buckets covering `range`.
///
/// Every bucket is present in the output, including those with no orders. The
/// edge buckets are calendar-aligned and may extend past `range`, but only orders
/// inside `range` are counted.
#[must_use]
pub fn revenue_by_period(orders: &[Order], range: Period, bucket: BucketSize) -> Vec<RevenueBucket> {
    let buckets = bucket.buckets(range);
    let mut cents = vec![0i64; buckets.len()];
    let mut counts = vec![0usize; buckets.len()];

    for order in orders.iter().filter(|o| o.is_completed() && range.contains(o.created_at)) {
        // buckets are sorted and contiguous
        let index = buckets.partition_point(|b| b.end <= order.created_at);
        if let Some(b) = buckets.get(index)
            && b.contains(order.created_at)
        {
            cents[index] += order.total_cents;
            counts[index] += 1;
        }
    }

    buckets
        .into_iter()
        .zip(cents)
        .zip(counts)
        .map(|((period, cents), orders)| RevenueBucket {
            period,
            total: cents_to_dollars(cents),
            orders,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Change {
    Join,
    Leave,
}

/// Members with at least one live subscription, sampled at every bucket start and at `range.end`.
///
/// Join events are subscription creations and leave events are cancellation instants.
/// An event at exactly a sample time is reflected in that sample.
#[must_use]
pub fn growth_series(subscriptions: &[Subscription], activities: &[Activity], range: Period, bucket: BucketSize) -> Vec<GrowthPoint> {
    let buckets = bucket.buckets(range);
    if buckets.is_empty() {
        return Vec::new();
    }

    let cancellations = cancellation_activities(activities);
    let mut events: Vec<(DateTime<Utc>, Change, &str)> = Vec::with_capacity(subscriptions.len() * 2);
    for sub in subscriptions {
        events.push((sub.created_at, Change::Join, sub.member_id.as_str()));
        if let Some(ended) = cancellation_instant(sub, &cancellations) {
            events.push((ended.max(sub.created_at), Change::Leave, sub.member_id.as_str()));
        }
    }

    // joins sort before leaves at the same instant so no counter goes negative
    events.sort_unstable();

    let mut samples: Vec<DateTime<Utc>> = buckets.iter().map(|b| b.start).collect();
    samples.push(range.end);

    let mut live: HashMap<&str, usize> = HashMap::new();
    let mut members = 0usize;
    let mut pending = events.into_iter().peekable();
    let mut points = Vec::with_capacity(samples.len());

    for at in samples {
        while let Some((_, change, member)) = pending.next_if(|(when, _, _)| *when <= at) {
            let count = live.entry(member).or_insert(0);
            match change {
                Change::Join => {
                    if *count == 0 {
                        members += 1;
                    }
                    *count += 1;
                }
                Change::Leave => {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        members = members.saturating_sub(1);
                    }
                }
            }
        }

        points.push(GrowthPoint { at, members });
    }

    points
}

/// Completed order revenue in the `days` days before `now`, in dollars.
#[must_use]
pub fn recent_revenue(orders: &[Order], now: DateTime<Utc>, days: u32) -> f64 {
    let window = Period::trailing_days(now, days);
    let cents: i64 = orders
        .iter()
        .filter(|o| o.is_completed() && window.contains(o.created_at))
        .map(|o| o.total_cents)
        .sum();
    cents_to_dollars(cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ActivityType, OrderStatus};
    use chrono::{Duration, TimeZone};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, d, 0, 0, 0).unwrap()
    }

    fn order(id: &str, at: DateTime<Utc>, cents: i64, status: OrderStatus) -> Order {
        Order {
            id: id.into(),
            member_id: "m".into(),
            subscription_id: None,
            total: cents_to_dollars(cents),
            total_cents: cents,
            discount_cents: 0,
            status,
            created_at: at,
            coupon_code: None,
        }
    }

    fn sub(id: &str, member: &str, created: DateTime<Utc>, active: bool, expires: Option<DateTime<Utc>>) -> Subscription {
        Subscription {
            id: id.into(),
            member_id: member.into(),
            plan_id: None,
            active,
            auto_renew: false,
            created_at: created,
            expires_at: expires,
        }
    }

    #[test]
    fn revenue_zero_fills_empty_buckets() {
        let range = Period::new(day(1), day(4));
        let orders = vec![
            order("a", day(1) + Duration::hours(5), 1000, OrderStatus::Completed),
            order("b", day(3) + Duration::hours(1), 2550, OrderStatus::Completed),
        ];

        let series = revenue_by_period(&orders, range, BucketSize::Day);
        assert_eq!(series.len(), 3);
        assert!((series[0].total - 10.0).abs() < 1e-9);
        assert!(series[1].total.abs() < f64::EPSILON);
        assert_eq!(series[1].orders, 0);
        assert!((series[2].total - 25.5).abs() < 1e-9);
    }

    #[test]
    fn revenue_ignores_incomplete_orders_and_out_of_range() {
        let range = Period::new(day(1), day(3));
        let orders = vec![
            order("refund", day(1), 1000, OrderStatus::Refunded),
            order("late", day(5), 1000, OrderStatus::Completed),
            order("edge", day(2), 700, OrderStatus::Completed),
        ];

        let series = revenue_by_period(&orders, range, BucketSize::Day);
        assert!(series[0].total.abs() < f64::EPSILON);
        assert!((series[1].total - 7.0).abs() < 1e-9);
    }

    #[test]
    fn revenue_excludes_orders_in_aligned_edges_outside_range() {
        let range = Period::new(day(1) + Duration::hours(12), day(3) + Duration::hours(12));
        let orders = vec![
            order("early", day(1) + Duration::hours(1), 5000, OrderStatus::Completed),
            order("inside", day(1) + Duration::hours(12), 1000, OrderStatus::Completed),
            order("late", day(3) + Duration::hours(12), 4000, OrderStatus::Completed),
        ];

        let series = revenue_by_period(&orders, range, BucketSize::Day);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].period.start, day(1));
        assert_eq!(series[0].orders, 1);
        assert!((series[0].total - 10.0).abs() < 1e-9);
        assert_eq!(series[2].orders, 0);
        assert!(series[2].total.abs() < f64::EPSILON);
    }

    #[test]
    fn revenue_over_empty_input() {
        let series = revenue_by_period(&[], Period::new(day(1), day(8)), BucketSize::Week);
        assert!(!series.is_empty());
        assert!(series.iter().all(|b| b.total.abs() < f64::EPSILON));
        assert!(revenue_by_period(&[], Period::new(day(1), day(1)), BucketSize::Week).is_empty());
    }

    #[test]
    fn growth_replays_joins_and_cancellations() {
        let subs = vec![
            sub("1", "a", day(1), true, None),
            sub("2", "b", day(2), false, Some(day(4))),
            sub("3", "c", day(2) + Duration::hours(3), false, None),
            // second subscription for a member already counted
            sub("4", "a", day(3), true, None),
        ];
        let activities = vec![Activity {
            id: "x".into(),
            kind: ActivityType::SubscriptionDeleted,
            created_at: day(3),
            member_id: Some("c".into()),
            member_name: String::new(),
            member_email: String::new(),
            subscription_id: Some("3".into()),
            plan_id: None,
            education: false,
        }];

        let points = growth_series(&subs, &activities, Period::new(day(1), day(5)), BucketSize::Day);
        let counts: Vec<_> = points.iter().map(|p| p.members).collect();
        // samples at days 1, 2, 3, 4 and the range end (day 5)
        assert_eq!(counts, vec![1, 2, 2, 1, 1]);
        assert_eq!(points.last().unwrap().at, day(5));
    }

    #[test]
    fn growth_counts_members_joined_before_range() {
        let subs = vec![sub("1", "a", day(1) - Duration::days(100), true, None)];
        let points = growth_series(&subs, &[], Period::new(day(1), day(3)), BucketSize::Day);
        assert!(points.iter().all(|p| p.members == 1));
    }

    #[test]
    fn growth_over_empty_input() {
        let points = growth_series(&[], &[], Period::new(day(1), day(3)), BucketSize::Day);
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.members == 0));
    }

    #[test]
    fn recent_revenue_sums_completed_orders() {
        let now = day(30);
        let orders = vec![
            order("a", now - Duration::days(1), 1000, OrderStatus::Completed),
            order("b", now - Duration::days(40), 1000, OrderStatus::Completed),
            order("c", now - Duration::days(2), 500, OrderStatus::Suspended),
        ];
        assert!((recent_revenue(&orders, now, 30) - 10.0).abs() < 1e-9);
        assert!(recent_revenue(&[], now, 30).abs() < f64::EPSILON);
    }
}
