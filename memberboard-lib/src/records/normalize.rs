//! Conversion of raw API records into validated rows.
//!
//! Everything here is pure. Optional fields take documented defaults, while a
//! missing identifier or creation time is reported as a malformed response.

use super::{
    Activity, ActivityType, IntervalUnit, Member, MemberState, Order, OrderStatus, Plan, PlanKind, Records, Subscription,
};
use crate::api::{FetchError, RawActivity, RawMember, RawOrder, RawPlan, RawScalar, RawSubscription};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

const LOG_TARGET: &str = " normalize";

/// Knobs that influence normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Coupon code that marks a free education enrollment.
    pub education_coupon: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            education_coupon: "Education".to_string(),
        }
    }
}

/// A member row together with the rows nested inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMember {
    pub member: Member,
    pub subscriptions: Vec<Subscription>,
    pub plans: Vec<Plan>,
    pub orders: Vec<Order>,
}

/// Convert cents to dollars, rounded to two decimal places half away from zero.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "currency amounts are far below 2^52 cents")]
pub fn cents_to_dollars(cents: i64) -> f64 {
    round_currency(cents as f64 / 100.0)
}

/// Round a dollar amount to cents, half away from zero.
#[must_use]
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn required<'a>(value: Option<&'a RawScalar>, record: &str, field: &str) -> Result<&'a RawScalar, FetchError> {
    value.ok_or_else(|| FetchError::malformed(format!("{record} is missing required field '{field}'")))
}

fn required_id(value: Option<&RawScalar>, record: &str) -> Result<String, FetchError> {
    let id = required(value, record, "id")?.to_id();
    if id.trim().is_empty() {
        return Err(FetchError::malformed(format!("{record} has an empty id")));
    }
    Ok(id)
}

fn timestamp(value: &RawScalar, record: &str, field: &str) -> Result<DateTime<Utc>, FetchError> {
    value
        .as_timestamp()
        .ok_or_else(|| FetchError::malformed(format!("{record} has an unreadable '{field}' value {value:?}")))
}

fn optional_timestamp(value: Option<&RawScalar>, record: &str, field: &str) -> Result<Option<DateTime<Utc>>, FetchError> {
    value.map(|v| timestamp(v, record, field)).transpose()
}

fn coupon_code(order: &RawOrder) -> Option<&str> {
    order
        .coupon
        .as_ref()
        .and_then(|c| c.code.as_deref())
        .map(str::trim)
        .filter(|code| !code.is_empty())
}

/// Normalize a plan object. Plans without an id get one derived from their name.
#[must_use]
pub fn normalize_plan(raw: &RawPlan) -> Plan {
    let name = raw.name.clone().unwrap_or_default();
    let id = raw.id.as_ref().map_or_else(
        || {
            let slug: String = name
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
                .collect();
            format!("name:{slug}")
        },
        RawScalar::to_id,
    );

    let price_cents = raw.price_cents.unwrap_or(0);
    let interval_count = raw
        .interval_count
        .and_then(|count| u32::try_from(count).ok())
        .filter(|count| *count > 0)
        .unwrap_or(1);

    Plan {
        id,
        name,
        price: cents_to_dollars(price_cents),
        price_cents,
        interval_unit: raw.interval_unit.as_deref().map_or(IntervalUnit::Unknown, IntervalUnit::parse),
        interval_count,
        kind: raw.kind.as_deref().map_or(PlanKind::Standard, PlanKind::parse),
    }
}

fn normalize_subscription(raw: &RawSubscription, member_id: &str) -> Result<(Subscription, Option<Plan>), FetchError> {
    let id = required_id(raw.id.as_ref(), "subscription")?;
    let record = format!("subscription '{id}'");
    let created_at = timestamp(required(raw.created_at.as_ref(), &record, "createdAt")?, &record, "createdAt")?;
    let expires_at = optional_timestamp(raw.expires_at.as_ref(), &record, "expiresAt")?;
    let plan = raw.plan.as_ref().map(normalize_plan);

    let subscription = Subscription {
        id,
        member_id: member_id.to_string(),
        plan_id: plan.as_ref().map(|p| p.id.clone()),
        active: raw.active.unwrap_or(false),
        auto_renew: raw.autorenew.unwrap_or(false),
        created_at,
        expires_at,
    };

    Ok((subscription, plan))
}

fn normalize_order(raw: &RawOrder, member_id: &str) -> Result<Option<Order>, FetchError> {
    let id = required_id(raw.uuid.as_ref(), "order")?;
    let record = format!("order '{id}'");

    let Some(created_at) = optional_timestamp(raw.created_at.as_ref(), &record, "createdAt")? else {
        log::warn!(target: LOG_TARGET, "Skipping {record} of member '{member_id}': no creation time");
        return Ok(None);
    };

    let total_cents = raw.total_cents.unwrap_or(0);

    Ok(Some(Order {
        id,
        member_id: member_id.to_string(),
        subscription_id: None,
        total: cents_to_dollars(total_cents),
        total_cents,
        discount_cents: raw.coupon_discount_amount_cents.unwrap_or(0),
        status: raw.status.as_deref().map_or(OrderStatus::Other, OrderStatus::parse),
        created_at,
        coupon_code: coupon_code(raw).map(str::to_string),
    }))
}

/// Whether a member's most recent order is a free education enrollment.
fn is_education_member(orders: &[RawOrder], coupon: &str) -> bool {
    orders
        .iter()
        .max_by_key(|order| order.created_at.as_ref().and_then(RawScalar::as_i64).unwrap_or(0))
        .is_some_and(|latest| latest.total_cents.unwrap_or(0) == 0 && is_education_coupon(latest, coupon))
}

/// Coupon codes match the configured education coupon ignoring ASCII case, never by prefix or substring.
fn is_education_coupon(order: &RawOrder, coupon: &str) -> bool {
    coupon_code(order).is_some_and(|code| code.trim().eq_ignore_ascii_case(coupon))
}

fn metadata_map(value: Option<&Value>) -> BTreeMap<String, String> {
    let Some(Value::Object(map)) = value else {
        return BTreeMap::new();
    };

    map.iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

/// Normalize one member and everything nested in it.
pub fn normalize_member(raw: &RawMember, options: &NormalizeOptions) -> Result<NormalizedMember, FetchError> {
    let id = required_id(raw.id.as_ref(), "member")?;
    let record = format!("member '{id}'");

    let mut subscriptions = Vec::new();
    let mut plans = Vec::new();
    for raw_sub in raw.subscriptions.as_deref().unwrap_or_default() {
        let (subscription, plan) = normalize_subscription(raw_sub, &id)?;
        subscriptions.push(subscription);
        plans.extend(plan);
    }

    let raw_orders = raw.orders.as_deref().unwrap_or_default();
    let mut orders = Vec::with_capacity(raw_orders.len());
    for raw_order in raw_orders {
        orders.extend(normalize_order(raw_order, &id)?);
    }

    let latest = subscriptions
        .iter()
        .max_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    let created_at = match optional_timestamp(raw.created_at.as_ref(), &record, "createdAt")? {
        Some(at) => Some(at),
        None => subscriptions.iter().map(|s| s.created_at).min(),
    };

    let member = Member {
        id,
        email: raw.email.clone().unwrap_or_default(),
        full_name: raw.full_name.clone().unwrap_or_default(),
        created_at,
        state: if latest.is_some_and(|s| s.active) {
            MemberState::Active
        } else {
            MemberState::Inactive
        },
        plan_id: latest.and_then(|s| s.plan_id.clone()),
        phone: raw.phone_number.clone().unwrap_or_default(),
        total_spend: cents_to_dollars(raw.total_spend_cents.unwrap_or(0)),
        metadata: metadata_map(raw.metadata.as_ref()),
        education: is_education_member(raw_orders, &options.education_coupon),
    };

    Ok(NormalizedMember {
        member,
        subscriptions,
        plans,
        orders,
    })
}

/// Normalize one activity.
pub fn normalize_activity(raw: &RawActivity, options: &NormalizeOptions) -> Result<Activity, FetchError> {
    let id = required_id(raw.id.as_ref(), "activity")?;
    let record = format!("activity '{id}'");
    let created_at = timestamp(required(raw.created_at.as_ref(), &record, "createdAt")?, &record, "createdAt")?;

    let member = raw.member.as_ref();
    let subscription = raw.subscription.as_ref();

    let education = subscription
        .and_then(|s| s.orders.as_deref())
        .unwrap_or_default()
        .iter()
        .any(|order| is_education_coupon(order, &options.education_coupon));

    Ok(Activity {
        id,
        kind: ActivityType::parse(raw.kind.as_deref().unwrap_or("unknown")),
        created_at,
        member_id: member.and_then(|m| m.id.as_ref()).map(RawScalar::to_id),
        member_name: member.and_then(|m| m.full_name.clone()).unwrap_or_default(),
        member_email: member.and_then(|m| m.email.clone()).unwrap_or_default(),
        subscription_id: subscription.and_then(|s| s.id.as_ref()).map(RawScalar::to_id),
        plan_id: subscription.and_then(|s| s.plan.as_ref()).map(|p| normalize_plan(p).id),
        education,
    })
}

/// Member orders carry no subscription reference; activities list the orders of their subscription.
fn order_subscription_ids(raw_activities: &[RawActivity]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for subscription in raw_activities.iter().filter_map(|a| a.subscription.as_ref()) {
        let Some(subscription_id) = subscription.id.as_ref().map(RawScalar::to_id) else {
            continue;
        };
        for uuid in subscription.orders.as_deref().unwrap_or_default().iter().filter_map(|o| o.uuid.as_ref()) {
            let _ = map.entry(uuid.to_id()).or_insert_with(|| subscription_id.clone());
        }
    }
    map
}

/// Normalize a complete fetch into [`Records`], deduplicating plans by id.
pub fn normalize_snapshot(
    raw_members: &[RawMember],
    raw_activities: &[RawActivity],
    options: &NormalizeOptions,
) -> Result<Records, FetchError> {
    let mut records = Records::default();
    let mut plans: BTreeMap<String, Plan> = BTreeMap::new();

    for raw in raw_members {
        let normalized = normalize_member(raw, options)?;
        records.members.push(normalized.member);
        records.subscriptions.extend(normalized.subscriptions);
        records.orders.extend(normalized.orders);
        for plan in normalized.plans {
            let _ = plans.entry(plan.id.clone()).or_insert(plan);
        }
    }

    let order_subscriptions = order_subscription_ids(raw_activities);
    for order in &mut records.orders {
        if let Some(subscription_id) = order_subscriptions.get(&order.id) {
            order.subscription_id = Some(subscription_id.clone());
        }
    }

    for raw in raw_activities {
        records.activities.push(normalize_activity(raw, options)?);
        if let Some(plan) = raw.subscription.as_ref().and_then(|s| s.plan.as_ref()).map(normalize_plan) {
            let _ = plans.entry(plan.id.clone()).or_insert(plan);
        }
    }

    records.plans = plans.into_values().collect();

    log::info!(
        target: LOG_TARGET,
        "Normalized {} member(s), {} subscription(s), {} plan(s), {} order(s), {} activity record(s)",
        records.members.len(),
        records.subscriptions.len(),
        records.plans.len(),
        records.orders.len(),
        records.activities.len()
    );

    Ok(records)
}
