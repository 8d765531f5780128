//! Membership counts over normalized rows.

use super::Period;
use crate::records::{Activity, Subscription};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Members whose most recent subscription is active.
///
/// "Most recent" is by creation time, with ties broken by subscription id.
#[must_use]
pub fn active_count(subscriptions: &[Subscription]) -> usize {
    let mut latest: HashMap<&str, &Subscription> = HashMap::new();

    for sub in subscriptions {
        let _ = latest
            .entry(sub.member_id.as_str())
            .and_modify(|current| {
                if (sub.created_at, &sub.id) > (current.created_at, &current.id) {
                    *current = sub;
                }
            })
            .or_insert(sub);
    }

    latest.values().filter(|sub| sub.active).count()
}

/// Subscriptions created inside `period`.
#[must_use]
pub fn new_in_period(subscriptions: &[Subscription], period: Period) -> usize {
    subscriptions.iter().filter(|sub| period.contains(sub.created_at)).count()
}

/// The earliest cancellation activity per subscription id.
#[must_use]
pub fn cancellation_activities(activities: &[Activity]) -> HashMap<&str, DateTime<Utc>> {
    let mut instants: HashMap<&str, DateTime<Utc>> = HashMap::new();

    for activity in activities.iter().filter(|a| a.kind.is_cancellation()) {
        if let Some(sub_id) = activity.subscription_id.as_deref() {
            let _ = instants
                .entry(sub_id)
                .and_modify(|at| *at = (*at).min(activity.created_at))
                .or_insert(activity.created_at);
        }
    }

    instants
}

/// When a subscription ended, if it has.
///
/// A recorded cancellation activity wins; otherwise an inactive subscription is taken
/// to have ended when it expired.
#[must_use]
pub fn cancellation_instant(sub: &Subscription, cancellations: &HashMap<&str, DateTime<Utc>>) -> Option<DateTime<Utc>> {
    cancellations
        .get(sub.id.as_str())
        .copied()
        .or_else(|| if sub.active { None } else { sub.expires_at })
}

/// Subscriptions without auto-renew whose cancellation falls inside `period`.
#[must_use]
pub fn canceled_in_period(subscriptions: &[Subscription], activities: &[Activity], period: Period) -> usize {
    let cancellations = cancellation_activities(activities);

    subscriptions
        .iter()
        .filter(|sub| !sub.auto_renew)
        .filter(|sub| cancellation_instant(sub, &cancellations).is_some_and(|at| period.contains(at)))
        .count()
}

/// Active subscriptions without auto-renew that expire in `[now, now + horizon_days)`, soonest first.
#[must_use]
pub fn expiring_soon(subscriptions: &[Subscription], now: DateTime<Utc>, horizon_days: u32) -> Vec<&Subscription> {
    let horizon = Period::new(now, now + Duration::days(i64::from(horizon_days)));

    let mut expiring: Vec<_> = subscriptions
        .iter()
        .filter(|sub| sub.active && !sub.auto_renew)
        .filter(|sub| sub.expires_at.is_some_and(|at| horizon.contains(at)))
        .collect();

    expiring.sort_by(|a, b| a.expires_at.cmp(&b.expires_at).then_with(|| a.id.cmp(&b.id)));
    expiring
}

/// Distinct members with a subscription live at `at`.
#[must_use]
pub fn active_members_at(subscriptions: &[Subscription], at: DateTime<Utc>) -> usize {
    let mut members: Vec<&str> = subscriptions
        .iter()
        .filter(|sub| sub.live_at(at))
        .map(|sub| sub.member_id.as_str())
        .collect();
    members.sort_unstable();
    members.dedup();
    members.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ActivityType;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()
    }

    fn sub(id: &str, member: &str, created: DateTime<Utc>, active: bool, auto_renew: bool) -> Subscription {
        Subscription {
            id: id.into(),
            member_id: member.into(),
            plan_id: None,
            active,
            auto_renew,
            created_at: created,
            expires_at: None,
        }
    }

    fn activity(kind: ActivityType, sub_id: &str, at: DateTime<Utc>) -> Activity {
        Activity {
            id: format!("{sub_id}-{at}"),
            kind,
            created_at: at,
            member_id: None,
            member_name: String::new(),
            member_email: String::new(),
            subscription_id: Some(sub_id.into()),
            plan_id: None,
            education: false,
        }
    }

    #[test]
    fn empty_inputs_give_zero() {
        let period = Period::trailing_days(t0(), 30);
        assert_eq!(active_count(&[]), 0);
        assert_eq!(new_in_period(&[], period), 0);
        assert_eq!(canceled_in_period(&[], &[], period), 0);
        assert!(expiring_soon(&[], t0(), 30).is_empty());
        assert_eq!(active_members_at(&[], t0()), 0);
    }

    #[test]
    fn active_count_uses_latest_subscription() {
        let subs = vec![
            sub("1", "a", t0(), true, true),
            sub("2", "a", t0() + Duration::days(1), false, false),
            sub("3", "b", t0(), true, true),
            sub("4", "c", t0(), false, false),
            // same creation time, higher id wins
            sub("5", "d", t0(), false, false),
            sub("6", "d", t0(), true, true),
        ];
        assert_eq!(active_count(&subs), 2);
    }

    #[test]
    fn new_in_period_includes_start_and_excludes_end() {
        let period = Period::new(t0(), t0() + Duration::days(7));
        let subs = vec![
            sub("start", "a", t0(), true, true),
            sub("end", "b", t0() + Duration::days(7), true, true),
            sub("before", "c", t0() - Duration::seconds(1), true, true),
            sub("inside", "d", t0() + Duration::days(3), true, true),
        ];
        assert_eq!(new_in_period(&subs, period), 2);
    }

    #[test]
    fn canceled_in_period_uses_earliest_cancellation_activity() {
        let period = Period::new(t0(), t0() + Duration::days(30));
        let subs = vec![
            sub("1", "a", t0() - Duration::days(100), false, false),
            sub("2", "b", t0() - Duration::days(100), false, true),
            sub("3", "c", t0() - Duration::days(100), false, false),
        ];
        let activities = vec![
            activity(ActivityType::SubscriptionDeleted, "1", t0() + Duration::days(40)),
            activity(ActivityType::SubscriptionDeactivated, "1", t0() + Duration::days(2)),
            // auto-renewing subscriptions are not counted
            activity(ActivityType::SubscriptionDeactivated, "2", t0() + Duration::days(2)),
            // outside the period
            activity(ActivityType::SubscriptionDeactivated, "3", t0() - Duration::days(2)),
        ];
        assert_eq!(canceled_in_period(&subs, &activities, period), 1);
    }

    #[test]
    fn canceled_in_period_falls_back_to_expiry_for_inactive_subscriptions() {
        let period = Period::new(t0(), t0() + Duration::days(30));
        let mut lapsed = sub("1", "a", t0() - Duration::days(100), false, false);
        lapsed.expires_at = Some(t0() + Duration::days(5));
        let mut still_active = sub("2", "b", t0() - Duration::days(100), true, false);
        still_active.expires_at = Some(t0() + Duration::days(5));

        assert_eq!(canceled_in_period(&[lapsed, still_active], &[], period), 1);
    }

    #[test]
    fn expiring_soon_respects_horizon() {
        let mut expiring = sub("1", "a", t0() - Duration::days(300), true, false);
        expiring.expires_at = Some(t0() + Duration::days(29));

        assert_eq!(expiring_soon(std::slice::from_ref(&expiring), t0(), 30).len(), 1);
        assert!(expiring_soon(std::slice::from_ref(&expiring), t0(), 7).is_empty());

        let renewing = Subscription {
            auto_renew: true,
            ..expiring.clone()
        };
        assert!(expiring_soon(&[renewing], t0(), 30).is_empty());

        let mut at_now = expiring.clone();
        at_now.expires_at = Some(t0());
        let mut at_horizon = expiring;
        at_horizon.expires_at = Some(t0() + Duration::days(30));
        let boundary = [at_now, at_horizon];
        let found = expiring_soon(&boundary, t0(), 30);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].expires_at, Some(t0()));
    }

    #[test]
    fn active_members_at_counts_distinct_members() {
        let mut expired = sub("3", "b", t0() - Duration::days(60), false, false);
        expired.expires_at = Some(t0() - Duration::days(30));
        let subs = vec![
            sub("1", "a", t0() - Duration::days(10), true, true),
            sub("2", "a", t0() - Duration::days(5), true, true),
            expired,
            sub("4", "c", t0() + Duration::days(1), true, true),
        ];
        assert_eq!(active_members_at(&subs, t0()), 1);
        assert_eq!(active_members_at(&subs, t0() - Duration::days(40)), 1);
    }
}
