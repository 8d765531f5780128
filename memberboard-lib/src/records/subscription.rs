use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A member's enrollment in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Subscription {
    pub id: String,
    pub member_id: String,
    pub plan_id: Option<String>,
    pub active: bool,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Whether the subscription was live at `at`: created at or before it and not yet expired.
    #[must_use]
    pub fn live_at(&self, at: DateTime<Utc>) -> bool {
        self.created_at <= at && self.expires_at.is_none_or(|expires| expires > at)
    }
}
