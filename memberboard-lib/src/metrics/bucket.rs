use super::Period;
use chrono::{DateTime, Datelike, Days, Months, NaiveTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Width of the intervals used by time series.
///
/// Buckets are aligned to calendar boundaries in UTC: midnight for days,
/// Monday midnight for weeks and the 1st of the month for months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Display, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BucketSize {
    Day,
    Week,
    #[default]
    Month,
}

impl BucketSize {
    /// The start of the bucket containing `at`.
    #[must_use]
    pub fn align(self, at: DateTime<Utc>) -> DateTime<Utc> {
        let date = at.date_naive();
        let date = match self {
            Self::Day => date,
            Self::Week => date - Days::new(u64::from(date.weekday().num_days_from_monday())),
            Self::Month => date.with_day(1).unwrap_or(date),
        };
        date.and_time(NaiveTime::MIN).and_utc()
    }

    /// The start of the bucket following the one that starts at `start`.
    #[must_use]
    pub fn advance(self, start: DateTime<Utc>) -> DateTime<Utc> {
        let next = match self {
            Self::Day => start.checked_add_days(Days::new(1)),
            Self::Week => start.checked_add_days(Days::new(7)),
            Self::Month => start.checked_add_months(Months::new(1)),
        };
        next.unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Split `range` into consecutive buckets.
    ///
    /// The first bucket starts at `range.start` truncated to the bucket unit, and
    /// buckets continue until one reaches `range.end`. An empty range has no buckets.
    #[must_use]
    pub fn buckets(self, range: Period) -> Vec<Period> {
        let mut buckets = Vec::new();
        if range.is_empty() {
            return buckets;
        }

        let mut start = self.align(range.start);
        while start < range.end {
            let end = self.advance(start);
            buckets.push(Period::new(start, end));
            start = end;
        }

        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn alignment() {
        // 2024-06-13 is a Thursday
        let t = at(2024, 6, 13, 15);
        assert_eq!(BucketSize::Day.align(t), at(2024, 6, 13, 0));
        assert_eq!(BucketSize::Week.align(t), at(2024, 6, 10, 0));
        assert_eq!(BucketSize::Month.align(t), at(2024, 6, 1, 0));
        assert_eq!(BucketSize::Week.align(at(2024, 6, 10, 0)), at(2024, 6, 10, 0));
    }

    #[test]
    fn months_have_calendar_widths() {
        let buckets = BucketSize::Month.buckets(Period::new(at(2024, 1, 15, 0), at(2024, 4, 1, 0)));
        let starts: Vec<_> = buckets.iter().map(|b| b.start).collect();
        assert_eq!(starts, vec![at(2024, 1, 1, 0), at(2024, 2, 1, 0), at(2024, 3, 1, 0)]);
        assert_eq!(buckets[1].end, at(2024, 3, 1, 0));
    }

    #[test]
    fn buckets_are_contiguous() {
        let buckets = BucketSize::Week.buckets(Period::new(at(2024, 6, 5, 0), at(2024, 7, 5, 0)));
        assert!(!buckets.is_empty());
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert!(buckets.last().unwrap().end >= at(2024, 7, 5, 0));
    }

    #[test]
    fn empty_range_has_no_buckets() {
        let t = at(2024, 1, 1, 0);
        assert!(BucketSize::Day.buckets(Period::new(t, t)).is_empty());
    }
}
