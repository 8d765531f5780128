use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Billing interval unit of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum IntervalUnit {
    #[strum(to_string = "day", serialize = "days")]
    Day,
    #[strum(to_string = "week", serialize = "weeks")]
    Week,
    #[strum(to_string = "month", serialize = "months")]
    Month,
    #[strum(to_string = "year", serialize = "years")]
    Year,
    #[default]
    Unknown,
}

impl IntervalUnit {
    /// Parse the unit as the API spells it, accepting plurals and any case.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        text.trim().parse().unwrap_or_default()
    }

    /// How many of this unit fit in one month.
    const fn per_month(self) -> Option<f64> {
        match self {
            Self::Day => Some(30.0),
            Self::Week => Some(4.0),
            Self::Month => Some(1.0),
            Self::Year => Some(1.0 / 12.0),
            Self::Unknown => None,
        }
    }
}

/// How a plan's access period is determined.
///
/// The API spells these with or without a `_plan` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PlanKind {
    #[default]
    #[strum(to_string = "standard", serialize = "standard_plan")]
    Standard,
    #[strum(to_string = "fixed", serialize = "fixed_plan")]
    Fixed,
    #[strum(to_string = "lifetime", serialize = "lifetime_plan")]
    Lifetime,
    #[strum(to_string = "date_based", serialize = "date_based_plan")]
    DateBased,
}

impl PlanKind {
    /// Parse the kind, treating anything unrecognized as [`PlanKind::Standard`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        text.trim().parse().unwrap_or_default()
    }
}

/// A purchasable plan.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Plan {
    pub id: String,
    pub name: String,

    /// Price in dollars, rounded to cents.
    pub price: f64,
    pub price_cents: i64,
    pub interval_unit: IntervalUnit,
    pub interval_count: u32,
    pub kind: PlanKind,
}

impl Plan {
    /// The plan's price spread over one month, in cents.
    ///
    /// Plans with an unknown interval contribute nothing.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "plan prices are far below 2^52 cents")]
    pub fn monthly_cents(&self) -> f64 {
        self.interval_unit
            .per_month()
            .map_or(0.0, |per_month| self.price_cents as f64 * per_month / f64::from(self.interval_count.max(1)))
    }
}
