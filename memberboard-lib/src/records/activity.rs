use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle event kinds reported by the activity feed.
///
/// Unrecognized kinds are preserved verbatim in [`ActivityType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, EnumString, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActivityType {
    NewOrder,
    NewSubscription,
    NewGift,
    FreeSignup,
    MemberSignup,
    MemberDeleted,
    Renewal,
    RenewalPaymentFailed,
    SubscriptionReactivated,
    SubscriptionDeactivated,
    SubscriptionDeleted,
    SubscriptionExpired,
    Upgrade,
    Downgrade,
    AutoRenewEnabled,
    AutoRenewDisabled,
    TeamMemberAdded,
    TeamMemberRemoved,
    OrderRefunded,
    OrderSuspended,
    #[strum(default)]
    Other(String),
}

impl ActivityType {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        text.parse::<Self>().unwrap_or_else(|_| Self::Other(text.to_string()))
    }

    /// Whether this event ends a subscription.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::SubscriptionDeactivated | Self::SubscriptionDeleted)
    }

    /// Whether this event reports a failed charge.
    #[must_use]
    pub fn is_failed_payment(&self) -> bool {
        match self {
            Self::RenewalPaymentFailed => true,
            Self::Other(text) => text.contains("payment_failed") || text.contains("renewal_failed"),
            _ => false,
        }
    }
}

impl From<String> for ActivityType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ActivityType> for String {
    fn from(value: ActivityType) -> Self {
        match value {
            ActivityType::Other(text) => text,
            known => known.to_string(),
        }
    }
}

/// A timestamped lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Activity {
    pub id: String,
    pub kind: ActivityType,
    pub created_at: DateTime<Utc>,
    pub member_id: Option<String>,
    pub member_name: String,
    pub member_email: String,
    pub subscription_id: Option<String>,

    /// Plan of the subscription the event refers to, if any.
    pub plan_id: Option<String>,

    /// Whether the subscription was paid for with an education coupon.
    pub education: bool,
}
