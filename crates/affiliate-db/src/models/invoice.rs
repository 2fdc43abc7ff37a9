use affiliate_analytics::ReportingWindow;
use affiliate_types::InvoiceStatus;
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Numeric, Text, Timestamp, Timestamptz};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schema::{invoices, programs};

/// Completed invoices summed per local period of the reporting timezone.
///
/// `period_start` is the wall-clock start of the period (`date_trunc` of the
/// local paid time); the caller derives the period key from it with the same
/// formatter the backfill uses.
const PAID_TOTALS_BY_PERIOD: &str = "\
    SELECT date_trunc($1, paid_at AT TIME ZONE $2) AS period_start,
           COALESCE(SUM(amount), 0)::numeric AS payouts,
           COALESCE(SUM(fee), 0)::numeric AS fees,
           COALESCE(SUM(total), 0)::numeric AS total
    FROM invoices
    WHERE status = $3
      AND paid_at IS NOT NULL
      AND paid_at >= $4
      AND paid_at <= $5
      AND ($6::text IS NULL OR program_id <> $6)
    GROUP BY 1
    ORDER BY 1";

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Invoice {
    pub id: String,
    pub program_id: String,
    pub workspace_id: String,
    pub number: Option<String>,
    pub status: String,
    pub amount: i32,
    pub fee: i32,
    pub total: i32,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A paid invoice with the name and logo of the program it settles.
#[derive(Debug, Clone)]
pub struct PaidInvoice {
    pub invoice: Invoice,
    pub program_name: String,
    pub program_logo: Option<String>,
}

/// Which completed invoices the payout report covers: paid within
/// `[paid_from, paid_to]`, optionally leaving one program out.
#[derive(Debug, Clone)]
pub struct PaidInvoiceFilter {
    pub paid_from: DateTime<Utc>,
    pub paid_to: DateTime<Utc>,
    pub excluded_program_id: Option<String>,
}

impl PaidInvoiceFilter {
    pub fn for_window(window: &ReportingWindow, excluded_program_id: Option<String>) -> Self {
        Self {
            paid_from: window.start(),
            paid_to: window.end(),
            excluded_program_id,
        }
    }
}

#[derive(Debug, Clone, QueryableByName)]
pub struct InvoicePeriodTotals {
    #[diesel(sql_type = Timestamp)]
    pub period_start: NaiveDateTime,
    #[diesel(sql_type = Numeric)]
    pub payouts: Decimal,
    #[diesel(sql_type = Numeric)]
    pub fees: Decimal,
    #[diesel(sql_type = Numeric)]
    pub total: Decimal,
}

impl Invoice {
    /// Completed invoices matching `filter`, most recently paid first.
    pub fn find_completed_paid(
        filter: &PaidInvoiceFilter,
        conn: &mut diesel::PgConnection,
    ) -> QueryResult<Vec<PaidInvoice>> {
        let mut query = invoices::table
            .inner_join(programs::table)
            .filter(invoices::status.eq(InvoiceStatus::Completed.as_str()))
            .filter(invoices::paid_at.is_not_null())
            .filter(invoices::paid_at.ge(filter.paid_from))
            .filter(invoices::paid_at.le(filter.paid_to))
            .select((Self::as_select(), programs::name, programs::logo))
            .into_boxed();

        if let Some(excluded) = &filter.excluded_program_id {
            query = query.filter(invoices::program_id.ne(excluded));
        }

        let rows: Vec<(Self, String, Option<String>)> =
            query.order(invoices::paid_at.desc()).load(conn)?;

        Ok(rows
            .into_iter()
            .map(|(invoice, program_name, program_logo)| PaidInvoice {
                invoice,
                program_name,
                program_logo,
            })
            .collect())
    }

    /// Sums the invoices matching `filter` per period of `window`.
    pub fn totals_by_period(
        window: &ReportingWindow,
        filter: &PaidInvoiceFilter,
        conn: &mut diesel::PgConnection,
    ) -> QueryResult<Vec<InvoicePeriodTotals>> {
        diesel::sql_query(PAID_TOTALS_BY_PERIOD)
            .bind::<Text, _>(window.granularity().sql_unit())
            .bind::<Text, _>(window.timezone().name())
            .bind::<Text, _>(InvoiceStatus::Completed.as_str())
            .bind::<Timestamptz, _>(filter.paid_from)
            .bind::<Timestamptz, _>(filter.paid_to)
            .bind::<Nullable<Text>, _>(filter.excluded_program_id.as_deref())
            .load(conn)
    }
}

#[cfg(test)]
mod tests {
    use affiliate_analytics::{Granularity, ReportingWindow, parse_timezone};
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_filter_for_window() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let window =
            ReportingWindow::new(start, end, Granularity::Day, parse_timezone("UTC").unwrap())
                .unwrap();

        let filter = PaidInvoiceFilter::for_window(&window, Some("prog_acme".to_string()));

        assert_eq!(filter.paid_from, start);
        assert_eq!(filter.paid_to, end);
        assert_eq!(filter.excluded_program_id.as_deref(), Some("prog_acme"));
    }
}
