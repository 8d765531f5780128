use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use core::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter};

/// A half-open time range, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The `days` days leading up to `end`.
    #[must_use]
    pub fn trailing_days(end: DateTime<Utc>, days: u32) -> Self {
        Self::new(end - Duration::days(i64::from(days)), end)
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} to {}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

/// The reporting windows offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, EnumIter, StrumDisplay, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimePeriod {
    #[value(name = "month")]
    #[strum(to_string = "Past month")]
    PastMonth,

    #[value(name = "3-months")]
    #[strum(to_string = "Past 3 months")]
    Past3Months,

    #[value(name = "6-months")]
    #[strum(to_string = "Past 6 months")]
    Past6Months,

    #[default]
    #[value(name = "year")]
    #[strum(to_string = "Past year")]
    PastYear,

    #[value(name = "all")]
    #[strum(to_string = "All time")]
    AllTime,
}

impl TimePeriod {
    #[must_use]
    pub const fn lookback_days(self) -> Option<u32> {
        match self {
            Self::PastMonth => Some(30),
            Self::Past3Months => Some(90),
            Self::Past6Months => Some(180),
            Self::PastYear => Some(365),
            Self::AllTime => None,
        }
    }

    /// Map the window onto a concrete [`Period`] ending at `now`.
    ///
    /// `AllTime` starts at `earliest`, the oldest record in the data, or is empty when there is none.
    #[must_use]
    pub fn resolve(self, now: DateTime<Utc>, earliest: Option<DateTime<Utc>>) -> Period {
        match self.lookback_days() {
            Some(days) => Period::trailing_days(now, days),
            None => Period::new(earliest.map_or(now, |e| e.min(now)), now),
        }
    }
}
