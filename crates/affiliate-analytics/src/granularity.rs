use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Duration, LocalResult, Months, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Timelike,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};
use utoipa::ToSchema;

use crate::error::AnalyticsError;

/// Period key of an hourly bucket, e.g. `2024-01-02 13:00`.
pub const HOUR_KEY_FORMAT: &str = "%Y-%m-%d %H:00";
/// Period key of a daily bucket, e.g. `2024-01-02`.
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";
/// Period key of a weekly bucket: the date of the Monday opening the week.
pub const WEEK_KEY_FORMAT: &str = "%Y-%m-%d";
/// Period key of a monthly bucket, e.g. `2024-01`.
pub const MONTH_KEY_FORMAT: &str = "%Y-%m";

/// Width of a timeseries bucket.
///
/// Every calculation works on local wall-clock values of the reporting
/// timezone. Weeks start on Monday, like Postgres' `date_trunc('week', ..)`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Granularity {
    Hour,
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Picks the bucket width for a window of the given length.
    pub fn for_span(span: Duration) -> Self {
        if span <= Duration::days(2) {
            Self::Hour
        } else if span <= Duration::days(92) {
            Self::Day
        } else if span <= Duration::days(366) {
            Self::Week
        } else {
            Self::Month
        }
    }

    pub const fn key_format(self) -> &'static str {
        match self {
            Self::Hour => HOUR_KEY_FORMAT,
            Self::Day => DAY_KEY_FORMAT,
            Self::Week => WEEK_KEY_FORMAT,
            Self::Month => MONTH_KEY_FORMAT,
        }
    }

    /// Unit understood by Postgres' `date_trunc`.
    pub const fn sql_unit(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Shortest possible length of one period.
    pub fn nominal_length(self) -> Duration {
        match self {
            Self::Hour => Duration::hours(1),
            Self::Day => Duration::days(1),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(28),
        }
    }

    /// Upper bound on the number of periods a window of `span` can touch.
    pub fn max_periods(self, span: Duration) -> usize {
        let periods = span.num_seconds().max(0) / self.nominal_length().num_seconds();
        periods as usize + 3
    }

    /// Label of the period starting at `period_start`.
    ///
    /// This is the only place a period key is produced: rows coming back from
    /// the aggregation query and the backfill cursor both go through it.
    pub fn period_key(self, period_start: NaiveDateTime) -> String {
        period_start.format(self.key_format()).to_string()
    }

    /// Rounds a local wall-clock value down to the start of its period.
    ///
    /// `None` when the period starts before the earliest representable value.
    pub fn floor(self, local: NaiveDateTime) -> Option<NaiveDateTime> {
        let midnight = local.date().and_time(NaiveTime::MIN);
        match self {
            Self::Hour => midnight.checked_add_signed(Duration::hours(i64::from(local.hour()))),
            Self::Day => Some(midnight),
            Self::Week => midnight.checked_sub_signed(Duration::days(i64::from(
                local.weekday().num_days_from_monday(),
            ))),
            Self::Month => midnight.checked_sub_signed(Duration::days(i64::from(local.day0()))),
        }
    }

    /// Start of the period following `period_start`, using calendar arithmetic.
    pub fn increment(self, period_start: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Self::Hour => period_start.checked_add_signed(Duration::hours(1)),
            Self::Day => period_start.checked_add_signed(Duration::days(1)),
            Self::Week => period_start.checked_add_signed(Duration::days(7)),
            Self::Month => period_start.checked_add_months(Months::new(1)),
        }
    }

    /// Maps a local period start back to an instant.
    ///
    /// Returns `None` when no instant of the period exists in `tz`: hours
    /// swallowed by a DST jump, or values at the edge of the representable range.
    pub fn localize(self, tz: &Tz, period_start: NaiveDateTime) -> Option<DateTime<Tz>> {
        let instant = resolve_local(tz, period_start)?;
        (self.floor(instant.naive_local()) == Some(period_start)).then_some(instant)
    }
}

impl FromStr for Granularity {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(AnalyticsError::UnknownGranularity(other.to_string())),
        }
    }
}

/// Interprets a wall-clock value in `tz`.
///
/// Ambiguous values (DST fall back) resolve to the earliest instant. Values
/// inside a DST gap are read with the offset in force before the jump, which
/// lands on the first instant after the gap. `None` when the value is too
/// close to the representable range to be shifted.
pub(crate) fn resolve_local(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(instant) | LocalResult::Ambiguous(instant, _) => Some(instant),
        LocalResult::None => {
            let day_before = local.checked_sub_signed(Duration::days(1))?;
            let before = tz.offset_from_utc_datetime(&day_before).fix();
            let utc = local.checked_sub_signed(Duration::seconds(i64::from(
                before.local_minus_utc(),
            )))?;
            Some(tz.from_utc_datetime(&utc))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use strum::IntoEnumIterator;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_granularity_for_span() {
        assert_eq!(Granularity::for_span(Duration::hours(5)), Granularity::Hour);
        assert_eq!(Granularity::for_span(Duration::days(2)), Granularity::Hour);
        assert_eq!(Granularity::for_span(Duration::days(7)), Granularity::Day);
        assert_eq!(Granularity::for_span(Duration::days(90)), Granularity::Day);
        assert_eq!(Granularity::for_span(Duration::days(93)), Granularity::Week);
        assert_eq!(Granularity::for_span(Duration::days(365)), Granularity::Week);
        assert_eq!(Granularity::for_span(Duration::days(400)), Granularity::Month);
    }

    #[test]
    fn test_floor() {
        let t = at(2024, 5, 16, 13, 47); // Thursday
        assert_eq!(Granularity::Hour.floor(t), Some(at(2024, 5, 16, 13, 0)));
        assert_eq!(Granularity::Day.floor(t), Some(at(2024, 5, 16, 0, 0)));
        assert_eq!(Granularity::Week.floor(t), Some(at(2024, 5, 13, 0, 0)));
        assert_eq!(Granularity::Month.floor(t), Some(at(2024, 5, 1, 0, 0)));
    }

    #[test]
    fn test_floor_is_idempotent() {
        let t = at(2024, 2, 29, 23, 59);
        for granularity in Granularity::iter() {
            let floored = granularity.floor(t).unwrap();
            assert_eq!(granularity.floor(floored), Some(floored));
        }
    }

    #[test]
    fn test_month_increment_follows_calendar() {
        let mut cursor = at(2024, 1, 1, 0, 0);
        let mut seen = Vec::new();
        for _ in 0..4 {
            cursor = Granularity::Month.increment(cursor).unwrap();
            seen.push(cursor.date());
        }
        assert_eq!(
            seen,
            vec![
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            ]
        );
    }

    #[test]
    fn test_period_keys() {
        let t = at(2024, 1, 2, 9, 0);
        assert_eq!(Granularity::Hour.period_key(t), "2024-01-02 09:00");
        assert_eq!(Granularity::Day.period_key(t), "2024-01-02");
        assert_eq!(Granularity::Week.period_key(t), "2024-01-02");
        assert_eq!(Granularity::Month.period_key(t), "2024-01");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("week".parse::<Granularity>().unwrap(), Granularity::Week);
        assert_eq!(
            "minute".parse::<Granularity>(),
            Err(AnalyticsError::UnknownGranularity("minute".to_string()))
        );
        for granularity in Granularity::iter() {
            assert_eq!(
                granularity.as_ref().parse::<Granularity>().unwrap(),
                granularity
            );
            assert_eq!(granularity.as_ref(), granularity.sql_unit());
        }
    }

    #[test]
    fn test_localize_skips_missing_hour() {
        let tz = chrono_tz::America::New_York;
        // 2024-03-10 02:00 does not exist in New York.
        assert!(Granularity::Hour.localize(&tz, at(2024, 3, 10, 2, 0)).is_none());
        let day = Granularity::Day.localize(&tz, at(2024, 3, 10, 0, 0)).unwrap();
        assert_eq!(day.naive_local(), at(2024, 3, 10, 0, 0));
    }

    #[test]
    fn test_localize_ambiguous_hour_takes_earliest() {
        let tz = chrono_tz::America::New_York;
        let instant = Granularity::Hour
            .localize(&tz, at(2024, 11, 3, 1, 0))
            .unwrap();
        assert_eq!(instant.offset().fix().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn test_resolve_local_inside_gap() {
        let tz = chrono_tz::America::New_York;
        let instant = resolve_local(&tz, at(2024, 3, 10, 2, 30)).unwrap();
        assert_eq!(instant.naive_local(), at(2024, 3, 10, 3, 30));
    }

    #[test]
    fn test_floor_at_the_earliest_representable_date() {
        // The earliest representable date is a Thursday, January 1st.
        let first = NaiveDateTime::MIN;
        assert_eq!(Granularity::Day.floor(first), Some(first));
        assert_eq!(Granularity::Month.floor(first), Some(first));
        assert!(Granularity::Week.floor(first).is_none());
        assert!(Granularity::Week.floor(first + Duration::days(3)).is_none());
        assert_eq!(
            Granularity::Week.floor(first + Duration::days(4)),
            Some(first + Duration::days(4))
        );
    }

    #[test]
    fn test_resolve_local_at_range_edges() {
        for tz in [chrono_tz::Asia::Tokyo, chrono_tz::America::Los_Angeles] {
            // Must not panic; either a valid instant or nothing.
            let _ = resolve_local(&tz, NaiveDateTime::MIN);
            let _ = resolve_local(&tz, NaiveDateTime::MAX);
        }
    }
}
