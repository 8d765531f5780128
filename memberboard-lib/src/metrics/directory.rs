//! The member directory.

use crate::records::{Records, Subscription};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the member directory.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DirectoryEntry {
    pub id: String,
    pub name: String,
    pub email: String,
    pub joined: Option<DateTime<Utc>>,
    pub plan: Option<String>,
    pub active: bool,
    pub education: bool,
    pub profile_url: String,
}

/// Link to a member's page in the Memberful admin.
#[must_use]
pub fn profile_url(organization: &str, member_id: &str) -> String {
    format!("https://{organization}.memberful.com/admin/members/{member_id}")
}

/// One entry per member, newest joiners first.
///
/// The join date is the creation of the member's earliest subscription, falling back to
/// the member's own signup time. The plan and active flag come from the latest subscription.
/// Members with no known join date sort last.
#[must_use]
pub fn member_directory(records: &Records, organization: &str) -> Vec<DirectoryEntry> {
    let plans = records.plans_by_id();

    let mut by_member: HashMap<&str, Vec<&Subscription>> = HashMap::new();
    for sub in &records.subscriptions {
        by_member.entry(sub.member_id.as_str()).or_default().push(sub);
    }

    let mut entries: Vec<_> = records
        .members
        .iter()
        .map(|member| {
            let subs = by_member.get(member.id.as_str()).map_or(&[][..], Vec::as_slice);
            let earliest = subs.iter().map(|sub| sub.created_at).min();
            let latest = subs.iter().max_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));

            let plan = latest
                .and_then(|sub| sub.plan_id.as_deref())
                .or(member.plan_id.as_deref())
                .map(|id| plans.get(id).map_or_else(|| id.to_string(), |plan| plan.name.clone()));

            DirectoryEntry {
                id: member.id.clone(),
                name: member.full_name.clone(),
                email: member.email.clone(),
                joined: earliest.or(member.created_at),
                plan,
                active: latest.map_or_else(|| member.is_active(), |sub| sub.active),
                education: member.education,
                profile_url: profile_url(organization, &member.id),
            }
        })
        .collect();

    entries.sort_by(|a, b| match (a.joined, b.joined) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => core::cmp::Ordering::Less,
        (None, Some(_)) => core::cmp::Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    });

    entries
}
