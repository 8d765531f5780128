//! Typed membership records
//!
//! The rows in this module are what the rest of the crate computes over. They
//! are produced from raw API shapes by the functions in `normalize`, which apply
//! defaults for optional fields and reject records missing required ones.
//!
//! All timestamps are UTC and all currency amounts are dollars rounded to cents,
//! with the original cent values kept alongside.

mod activity;
mod member;
mod normalize;
mod order;
mod plan;
mod subscription;

pub use activity::{Activity, ActivityType};
pub use member::{Member, MemberState};
pub use normalize::{
    NormalizeOptions, NormalizedMember, cents_to_dollars, normalize_activity, normalize_member, normalize_plan, normalize_snapshot,
    round_currency,
};
pub use order::{Order, OrderStatus};
pub use plan::{IntervalUnit, Plan, PlanKind};
pub use subscription::Subscription;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Every normalized row from one fetch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Records {
    pub members: Vec<Member>,
    pub subscriptions: Vec<Subscription>,
    pub plans: Vec<Plan>,
    pub orders: Vec<Order>,
    pub activities: Vec<Activity>,
}

impl Records {
    #[must_use]
    pub fn plans_by_id(&self) -> HashMap<&str, &Plan> {
        self.plans.iter().map(|plan| (plan.id.as_str(), plan)).collect()
    }

    /// Ids of members flagged as education members.
    #[must_use]
    pub fn education_members(&self) -> HashSet<&str> {
        self.members
            .iter()
            .filter(|member| member.education)
            .map(|member| member.id.as_str())
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.activities.is_empty()
    }
}
