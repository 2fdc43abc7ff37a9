use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};
use utoipa::ToSchema;

use crate::{
    error::AnalyticsError,
    granularity::{Granularity, resolve_local},
    window::{ReportingWindow, check_supported_year},
};

/// Timezone used when the caller does not send one.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// First instant the `all` preset reports on (2022-09-22T00:00:00Z).
pub const EARLIEST_DATA_TIMESTAMP: i64 = 1_663_804_800;

const LOCAL_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

pub fn earliest_data_date() -> DateTime<Utc> {
    DateTime::from_timestamp(EARLIEST_DATA_TIMESTAMP, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Named reporting range.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    AsRefStr,
    EnumIter,
)]
pub enum IntervalPreset {
    #[serde(rename = "today")]
    #[strum(serialize = "today")]
    Today,
    #[serde(rename = "yesterday")]
    #[strum(serialize = "yesterday")]
    Yesterday,
    #[serde(rename = "7d")]
    #[strum(serialize = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    #[strum(serialize = "30d")]
    ThirtyDays,
    #[serde(rename = "90d")]
    #[strum(serialize = "90d")]
    NinetyDays,
    #[serde(rename = "mtd")]
    #[strum(serialize = "mtd")]
    MonthToDate,
    #[serde(rename = "qtd")]
    #[strum(serialize = "qtd")]
    QuarterToDate,
    #[serde(rename = "ytd")]
    #[strum(serialize = "ytd")]
    YearToDate,
    #[serde(rename = "all")]
    #[strum(serialize = "all")]
    All,
    #[serde(rename = "custom")]
    #[strum(serialize = "custom")]
    Custom,
}

impl FromStr for IntervalPreset {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "today" => Self::Today,
            "yesterday" => Self::Yesterday,
            "7d" => Self::SevenDays,
            "30d" => Self::ThirtyDays,
            "90d" => Self::NinetyDays,
            "mtd" => Self::MonthToDate,
            "qtd" => Self::QuarterToDate,
            "ytd" => Self::YearToDate,
            "all" => Self::All,
            "custom" => Self::Custom,
            other => return Err(AnalyticsError::UnknownInterval(other.to_string())),
        })
    }
}

/// Raw interval parameters as they arrive on a query string. Empty strings
/// are treated like missing values.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalRequest<'a> {
    pub interval: Option<&'a str>,
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
    pub timezone: Option<&'a str>,
}

impl IntervalRequest<'_> {
    /// Resolves the request into a [`ReportingWindow`] anchored at `now`.
    ///
    /// A supplied `start` always wins over the preset, with `end` defaulting
    /// to `now`. Otherwise the preset (or `default_preset` when none was sent)
    /// is looked up in the preset table.
    pub fn resolve(
        &self,
        default_preset: IntervalPreset,
        now: DateTime<Utc>,
    ) -> Result<ReportingWindow, AnalyticsError> {
        let timezone = parse_timezone(non_empty(self.timezone).unwrap_or(DEFAULT_TIMEZONE))?;
        let end = non_empty(self.end)
            .map(|value| parse_date_like(value, timezone))
            .transpose()?;

        if let Some(start) = non_empty(self.start) {
            let start = parse_date_like(start, timezone)?;
            return custom_window(start, end.unwrap_or(now), timezone);
        }

        let preset = non_empty(self.interval)
            .map(IntervalPreset::from_str)
            .transpose()?
            .unwrap_or(default_preset);

        let (start, end) = match preset {
            IntervalPreset::Custom => {
                return Err(AnalyticsError::InvalidDateRange(
                    "a custom interval requires a start date".to_string(),
                ));
            }
            IntervalPreset::All => {
                return custom_window(earliest_data_date(), end.unwrap_or(now), timezone);
            }
            preset => preset_range(preset, now, timezone)?,
        };

        ReportingWindow::spanning(start, end, timezone)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn custom_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    timezone: Tz,
) -> Result<ReportingWindow, AnalyticsError> {
    if start >= end {
        return Err(AnalyticsError::InvalidDateRange(format!(
            "start date {} must be before end date {}",
            start.to_rfc3339(),
            end.to_rfc3339()
        )));
    }
    ReportingWindow::spanning(start, end, timezone)
}

/// `[start, end)` of a relative preset.
fn preset_range(
    preset: IntervalPreset,
    now: DateTime<Utc>,
    timezone: Tz,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AnalyticsError> {
    let out_of_range =
        || AnalyticsError::InvalidDateRange(format!("interval {preset} starts out of range"));
    let local_now = now.with_timezone(&timezone).naive_local();
    let today = Granularity::Day.floor(local_now).ok_or_else(out_of_range)?;
    let month = Granularity::Month.floor(local_now).ok_or_else(out_of_range)?;
    let to_instant = |local: NaiveDateTime| {
        resolve_local(&timezone, local)
            .map(|instant| instant.with_timezone(&Utc))
            .ok_or_else(out_of_range)
    };
    let months_back = |months: u32| {
        month
            .checked_sub_months(Months::new(months))
            .ok_or_else(out_of_range)
    };
    let days_back = |days: i64| {
        now.checked_sub_signed(Duration::days(days))
            .ok_or_else(out_of_range)
    };

    let range = match preset {
        IntervalPreset::Today => (to_instant(today)?, now),
        IntervalPreset::Yesterday => {
            let yesterday = today
                .checked_sub_signed(Duration::days(1))
                .ok_or_else(out_of_range)?;
            (to_instant(yesterday)?, to_instant(today)?)
        }
        IntervalPreset::SevenDays => (days_back(7)?, now),
        IntervalPreset::ThirtyDays => (days_back(30)?, now),
        IntervalPreset::NinetyDays => (days_back(90)?, now),
        IntervalPreset::MonthToDate => (to_instant(month)?, now),
        IntervalPreset::QuarterToDate => (to_instant(months_back(local_now.month0() % 3)?)?, now),
        IntervalPreset::YearToDate => (to_instant(months_back(local_now.month0())?)?, now),
        IntervalPreset::All | IntervalPreset::Custom => (earliest_data_date(), now),
    };
    Ok(range)
}

pub fn parse_timezone(name: &str) -> Result<Tz, AnalyticsError> {
    name.parse::<Tz>()
        .map_err(|_| AnalyticsError::InvalidTimezone(name.to_string()))
}

/// Parses an RFC 3339 instant, a local date-time or a bare date (local
/// midnight) in `timezone`.
///
/// Dates outside [`SUPPORTED_YEARS`](crate::window::SUPPORTED_YEARS) are
/// rejected.
pub fn parse_date_like(value: &str, timezone: Tz) -> Result<DateTime<Utc>, AnalyticsError> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        let instant = instant.with_timezone(&Utc);
        check_supported_year(instant.year())?;
        return Ok(instant);
    }

    let local = LOCAL_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| AnalyticsError::InvalidDateRange(format!("`{value}` is not a valid date")))?;

    check_supported_year(local.year())?;

    resolve_local(&timezone, local)
        .map(|instant| instant.with_timezone(&Utc))
        .ok_or_else(|| AnalyticsError::InvalidDateRange(format!("`{value}` is out of range")))
}
