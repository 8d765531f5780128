use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OrderStatus {
    Suspended,
    Completed,
    Refunded,
    Other,
}

impl OrderStatus {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        text.trim().parse().unwrap_or(Self::Other)
    }
}

/// A payment record.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Order {
    pub id: String,
    pub member_id: String,
    pub subscription_id: Option<String>,

    /// Total in dollars, rounded to cents.
    pub total: f64,
    pub total_cents: i64,
    pub discount_cents: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub coupon_code: Option<String>,
}

impl Order {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_is_case_insensitive() {
        assert_eq!(OrderStatus::parse("completed"), OrderStatus::Completed);
        assert_eq!(OrderStatus::parse("Refunded"), OrderStatus::Refunded);
        assert_eq!(OrderStatus::parse("SUSPENDED"), OrderStatus::Suspended);
        assert_eq!(OrderStatus::parse("pending"), OrderStatus::Other);
    }
}
