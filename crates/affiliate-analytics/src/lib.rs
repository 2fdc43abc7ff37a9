//! Reporting windows and gap-filled timeseries for payout analytics.
//!
//! A request's `interval`/`start`/`end`/`timezone` parameters resolve to a
//! [`ReportingWindow`]. The database groups amounts per period using the
//! window's [`Granularity`], and [`bucketize`] turns that sparse result into
//! one [`Bucket`] per period.

pub mod bucket;
pub mod error;
pub mod granularity;
pub mod interval;
pub mod window;

pub use bucket::{AggregatePoint, Bucket, SparseAggregates, bucketize};
pub use error::AnalyticsError;
pub use granularity::Granularity;
pub use interval::{IntervalPreset, IntervalRequest, parse_date_like, parse_timezone};
pub use window::ReportingWindow;
