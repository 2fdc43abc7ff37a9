use std::collections::HashMap;
use std::ops::AddAssign;

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::{error::AnalyticsError, granularity::Granularity, window::ReportingWindow};

/// Summed invoice amounts of one period, in minor currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatePoint {
    pub payouts: i64,
    pub fees: i64,
    pub total: i64,
}

impl AggregatePoint {
    pub const ZERO: Self = Self {
        payouts: 0,
        fees: 0,
        total: 0,
    };

    /// Coerces the `NUMERIC` sums returned by the database.
    pub fn try_from_decimals(
        payouts: Decimal,
        fees: Decimal,
        total: Decimal,
    ) -> Result<Self, AnalyticsError> {
        Ok(Self {
            payouts: decimal_to_minor_units(payouts)?,
            fees: decimal_to_minor_units(fees)?,
            total: decimal_to_minor_units(total)?,
        })
    }
}

impl AddAssign for AggregatePoint {
    fn add_assign(&mut self, rhs: Self) {
        self.payouts = self.payouts.saturating_add(rhs.payouts);
        self.fees = self.fees.saturating_add(rhs.fees);
        self.total = self.total.saturating_add(rhs.total);
    }
}

fn decimal_to_minor_units(value: Decimal) -> Result<i64, AnalyticsError> {
    value
        .round()
        .to_i64()
        .ok_or_else(|| AnalyticsError::AmountOutOfRange(value.to_string()))
}

/// One period of the dense timeseries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Period start, in the window's timezone.
    pub date: DateTime<Tz>,
    pub point: AggregatePoint,
}

impl Bucket {
    pub fn date_utc(&self) -> DateTime<Utc> {
        self.date.with_timezone(&Utc)
    }
}

/// Aggregates keyed by period key, as grouped by the database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseAggregates(HashMap<String, AggregatePoint>);

impl SparseAggregates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `point` to the entry of `key`.
    pub fn insert(&mut self, key: impl Into<String>, point: AggregatePoint) {
        *self.0.entry(key.into()).or_default() += point;
    }

    /// Records the aggregate of the period starting at the local wall-clock
    /// value `period_start`.
    pub fn record_period(
        &mut self,
        granularity: Granularity,
        period_start: NaiveDateTime,
        point: AggregatePoint,
    ) {
        self.insert(granularity.period_key(period_start), point);
    }

    pub fn get(&self, key: &str) -> Option<&AggregatePoint> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, AggregatePoint)> for SparseAggregates {
    fn from_iter<I: IntoIterator<Item = (K, AggregatePoint)>>(iter: I) -> Self {
        let mut aggregates = Self::new();
        for (key, point) in iter {
            aggregates.insert(key, point);
        }
        aggregates
    }
}

/// Expands `aggregates` into one bucket per period of `window`, oldest first.
///
/// Iteration starts at the period containing `window.start()` and stops at
/// the first period starting at or after `window.end()`. Periods missing from
/// `aggregates` get zeros; keys outside the window are never looked at.
pub fn bucketize(window: &ReportingWindow, aggregates: &SparseAggregates) -> Vec<Bucket> {
    if window.is_empty() {
        return Vec::new();
    }

    let granularity = window.granularity();
    let timezone = window.timezone();
    let mut buckets = Vec::with_capacity(granularity.max_periods(window.span()));
    let mut cursor = granularity.floor(window.local_start());

    while let Some(period) = cursor {
        cursor = granularity.increment(period);

        let Some(date) = granularity.localize(&timezone, period) else {
            continue;
        };
        if date.with_timezone(&Utc) >= window.end() {
            break;
        }

        let point = aggregates
            .get(&granularity.period_key(period))
            .copied()
            .unwrap_or(AggregatePoint::ZERO);
        buckets.push(Bucket { date, point });
    }

    buckets
}
