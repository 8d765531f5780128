use super::{ActivityRow, DashboardSummary, activity_rows as rows_for};
use crate::metrics::{BucketSize, DirectoryEntry, TimePeriod};
use crate::records::{Activity, ActivityType, IntervalUnit, Member, MemberState, Order, OrderStatus, Plan, PlanKind, Records, Subscription};
use crate::snapshot::{DashboardContext, Filters, Snapshot};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
}

fn context() -> DashboardContext {
    let records = Records {
        members: vec![Member {
            id: "1".into(),
            email: "ada@example.com".into(),
            full_name: "Ada".into(),
            created_at: Some(now() - Duration::days(40)),
            state: MemberState::Active,
            plan_id: Some("p".into()),
            phone: String::new(),
            total_spend: 120.0,
            metadata: BTreeMap::new(),
            education: false,
        }],
        subscriptions: vec![Subscription {
            id: "s1".into(),
            member_id: "1".into(),
            plan_id: Some("p".into()),
            active: true,
            auto_renew: false,
            created_at: now() - Duration::days(40),
            expires_at: Some(now() + Duration::days(10)),
        }],
        plans: vec![Plan {
            id: "p".into(),
            name: "Individual".into(),
            price: 120.0,
            price_cents: 12_000,
            interval_unit: IntervalUnit::Year,
            interval_count: 1,
            kind: PlanKind::Standard,
        }],
        orders: vec![Order {
            id: "o1".into(),
            member_id: "1".into(),
            subscription_id: Some("s1".into()),
            total: 120.0,
            total_cents: 12_000,
            discount_cents: 0,
            status: OrderStatus::Completed,
            created_at: now() - Duration::days(40),
            coupon_code: None,
        }],
        activities: vec![Activity {
            id: "a1".into(),
            kind: ActivityType::NewSubscription,
            created_at: now() - Duration::days(40),
            member_id: Some("1".into()),
            member_name: "Ada".into(),
            member_email: "ada@example.com".into(),
            subscription_id: Some("s1".into()),
            plan_id: Some("p".into()),
            education: false,
        }],
    };

    DashboardContext::new(
        Snapshot {
            organization: "made".into(),
            fetched_at: now(),
            period: TimePeriod::Past3Months,
            records,
        },
        Filters {
            period: TimePeriod::Past3Months,
            now: now(),
            horizon_days: 30,
            bucket: BucketSize::Month,
        },
    )
}

pub fn summary() -> DashboardSummary {
    DashboardSummary::build(&context())
}

pub fn activity_rows() -> Vec<ActivityRow> {
    rows_for(&context())
}

pub fn directory() -> Vec<DirectoryEntry> {
    vec![
        DirectoryEntry {
            id: "1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            joined: Some(now() - Duration::days(40)),
            plan: Some("Individual".into()),
            active: true,
            education: false,
            profile_url: "https://made.memberful.com/admin/members/1".into(),
        },
        DirectoryEntry {
            id: "2".into(),
            name: "Grace".into(),
            email: "grace@example.com".into(),
            joined: None,
            plan: None,
            active: false,
            education: true,
            profile_url: "https://made.memberful.com/admin/members/2".into(),
        },
    ]
}
