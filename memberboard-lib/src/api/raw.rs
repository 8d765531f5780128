//! Wire shapes of the records returned by the Memberful GraphQL API.
//!
//! Every field is optional here; the normalizer decides which ones are required.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scalar the API sometimes sends as a number and sometimes as a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawScalar {
    Int(i64),
    Text(String),
}

impl RawScalar {
    /// Render the scalar as an identifier string.
    #[must_use]
    pub fn to_id(&self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    /// Interpret the scalar as an integer, accepting strings of digits.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Interpret the scalar as a timestamp.
    ///
    /// Unix seconds are the norm; RFC 3339 strings are accepted as well.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        if let Some(secs) = self.as_i64() {
            return DateTime::from_timestamp(secs, 0);
        }

        match self {
            Self::Text(text) => DateTime::parse_from_rfc3339(text.trim()).ok().map(|dt| dt.with_timezone(&Utc)),
            Self::Int(_) => None,
        }
    }
}

impl From<i64> for RawScalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for RawScalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlan {
    pub id: Option<RawScalar>,
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub interval_unit: Option<String>,
    pub interval_count: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawCoupon {
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    pub uuid: Option<RawScalar>,
    pub total_cents: Option<i64>,
    pub created_at: Option<RawScalar>,
    pub status: Option<String>,
    pub coupon: Option<RawCoupon>,
    pub coupon_discount_amount_cents: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubscription {
    pub id: Option<RawScalar>,
    pub active: Option<bool>,
    pub autorenew: Option<bool>,
    pub created_at: Option<RawScalar>,
    pub expires_at: Option<RawScalar>,
    pub plan: Option<RawPlan>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMember {
    pub id: Option<RawScalar>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: Option<RawScalar>,
    pub total_spend_cents: Option<i64>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub subscriptions: Option<Vec<RawSubscription>>,
    #[serde(default)]
    pub orders: Option<Vec<RawOrder>>,
}

/// The member reference embedded in an activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawActivityMember {
    pub id: Option<RawScalar>,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// The subscription reference embedded in an activity.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawActivitySubscription {
    pub id: Option<RawScalar>,
    pub plan: Option<RawPlan>,
    #[serde(default)]
    pub orders: Option<Vec<RawOrder>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawActivity {
    pub id: Option<RawScalar>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub created_at: Option<RawScalar>,
    pub member: Option<RawActivityMember>,
    pub subscription: Option<RawActivitySubscription>,
}
