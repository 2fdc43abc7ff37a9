use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::{error::AnalyticsError, granularity::Granularity};

/// Calendar years a window may start or end in.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1900..=9999;

/// Most buckets a single window may expand to.
pub const MAX_BUCKETS: usize = 10_000;

/// Concrete reporting range `[start, end)` with the bucket width used to
/// chart it and the timezone the buckets are aligned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    granularity: Granularity,
    timezone: Tz,
}

impl ReportingWindow {
    /// Builds a window, rejecting ranges that end before they start, fall
    /// outside [`SUPPORTED_YEARS`] or would expand to more than
    /// [`MAX_BUCKETS`] buckets. `start == end` is accepted and describes an
    /// empty window.
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
        timezone: Tz,
    ) -> Result<Self, AnalyticsError> {
        if start > end {
            return Err(AnalyticsError::InvalidDateRange(format!(
                "start {} is after end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        for bound in [start, end] {
            check_supported_year(bound.year())?;
        }
        let periods = granularity.max_periods(end - start);
        if periods > MAX_BUCKETS {
            return Err(AnalyticsError::InvalidDateRange(format!(
                "range spans up to {periods} {granularity} buckets, at most {MAX_BUCKETS} allowed"
            )));
        }

        Ok(Self {
            start,
            end,
            granularity,
            timezone,
        })
    }

    /// Builds a window whose granularity is derived from its span.
    pub fn spanning(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        timezone: Tz,
    ) -> Result<Self, AnalyticsError> {
        Self::new(start, end, Granularity::for_span(end - start), timezone)
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Wall-clock value of `start` in the window's timezone.
    pub fn local_start(&self) -> NaiveDateTime {
        self.start.with_timezone(&self.timezone).naive_local()
    }
}

pub(crate) fn check_supported_year(year: i32) -> Result<(), AnalyticsError> {
    if SUPPORTED_YEARS.contains(&year) {
        Ok(())
    } else {
        Err(AnalyticsError::InvalidDateRange(format!(
            "year {year} is outside {}..={}",
            SUPPORTED_YEARS.start(),
            SUPPORTED_YEARS.end()
        )))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_rejects_inverted_range() {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let err = ReportingWindow::new(start, end, Granularity::Day, Tz::UTC).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidDateRange(_)));
    }

    #[test]
    fn test_spanning_picks_granularity() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let window = ReportingWindow::spanning(start, end, Tz::UTC).unwrap();
        assert_eq!(window.granularity(), Granularity::Week);
        assert!(!window.is_empty());
    }

    #[test]
    fn test_local_start_uses_timezone() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        let window =
            ReportingWindow::new(start, start, Granularity::Day, chrono_tz::America::New_York)
                .unwrap();
        assert_eq!(window.local_start().to_string(), "2023-12-31 22:00:00");
        assert!(window.is_empty());
    }

    #[test]
    fn test_rejects_unsupported_years() {
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ancient = Utc.with_ymd_and_hms(1899, 12, 31, 0, 0, 0).unwrap();
        let err = ReportingWindow::new(ancient, end, Granularity::Month, Tz::UTC).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidDateRange(_)));

        let far = Utc.with_ymd_and_hms(-262_143, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(-262_143, 6, 1, 0, 0, 0).unwrap();
        let err = ReportingWindow::new(far, later, Granularity::Week, Tz::UTC).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidDateRange(_)));
    }

    #[test]
    fn test_rejects_too_many_buckets() {
        let start = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let err = ReportingWindow::new(start, end, Granularity::Hour, Tz::UTC).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidDateRange(_)));

        // A century of months fits.
        let start = Utc.with_ymd_and_hms(1924, 1, 1, 0, 0, 0).unwrap();
        let window = ReportingWindow::spanning(start, end, Tz::UTC).unwrap();
        assert_eq!(window.granularity(), Granularity::Month);
    }
}
