use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Deserialize, Serialize)]
pub enum MemberState {
    Active,
    #[default]
    Inactive,
}

/// A person with an account in the organization.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Member {
    pub id: String,
    pub email: String,
    pub full_name: String,

    /// Signup time, or the creation of the earliest subscription when the API gives none.
    pub created_at: Option<DateTime<Utc>>,
    pub state: MemberState,

    /// Plan of the most recent subscription.
    pub plan_id: Option<String>,
    pub phone: String,

    /// Lifetime spend in dollars.
    pub total_spend: f64,
    pub metadata: BTreeMap<String, String>,

    /// Whether the member's latest order was a free education enrollment.
    pub education: bool,
}

impl Member {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == MemberState::Active
    }
}
