use affiliate_analytics::{
    AggregatePoint, AnalyticsError, Granularity, IntervalPreset, SparseAggregates, bucketize,
};
use affiliate_db::{
    PoolExt,
    models::{Invoice, InvoicePeriodTotals, PaidInvoiceFilter},
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;

use crate::{
    AppState,
    dto::{IntervalQuery, PayoutInvoiceDTO, PayoutTimeseriesPoint, PayoutsResponse},
    errors::ApiError,
};

#[utoipa::path(
    get,
    path = "/v1/admin/payouts",
    tag = "Admin",
    params(IntervalQuery),
    responses(
        (
            status = 200,
            description = "Paid invoices and the payouts timeseries",
            body = PayoutsResponse
        ),
        (status = 400, description = "Invalid interval, dates or timezone"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_admin_payouts(
    State(state): State<AppState>,
    Query(params): Query<IntervalQuery>,
) -> Result<Json<PayoutsResponse>, ApiError> {
    let window = params
        .as_request()
        .resolve(IntervalPreset::MonthToDate, Utc::now())?;
    let granularity = window.granularity();
    tracing::debug!(
        start = %window.start(),
        end = %window.end(),
        %granularity,
        timezone = %window.timezone(),
        "Resolved payouts window"
    );

    let filter = PaidInvoiceFilter::for_window(&window, state.excluded_program_id.clone());
    let invoices_filter = filter.clone();

    let (invoices, totals) = tokio::try_join!(
        state
            .pool
            .interact_with_context("list paid invoices".to_string(), move |conn| {
                Invoice::find_completed_paid(&invoices_filter, conn)
            }),
        state.pool.interact_with_context(
            format!("sum paid invoices per {granularity}"),
            move |conn| Invoice::totals_by_period(&window, &filter, conn),
        ),
    )?;

    let aggregates = aggregate_period_totals(granularity, totals)?;
    let timeseries_data = bucketize(&window, &aggregates)
        .iter()
        .map(PayoutTimeseriesPoint::from)
        .collect();

    Ok(Json(PayoutsResponse {
        invoices: invoices.into_iter().map(PayoutInvoiceDTO::from).collect(),
        timeseries_data,
    }))
}

/// Keys the per-period sums returned by the database by period key.
fn aggregate_period_totals(
    granularity: Granularity,
    rows: Vec<InvoicePeriodTotals>,
) -> Result<SparseAggregates, AnalyticsError> {
    let mut aggregates = SparseAggregates::new();
    for row in rows {
        let point = AggregatePoint::try_from_decimals(row.payouts, row.fees, row.total)?;
        aggregates.record_period(granularity, row.period_start, point);
    }
    Ok(aggregates)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;

    fn row(y: i32, m: u32, d: u32, h: u32, payouts: i64, fees: i64) -> InvoicePeriodTotals {
        InvoicePeriodTotals {
            period_start: NaiveDate::from_ymd_opt(y, m, d)
                .and_then(|date| date.and_hms_opt(h, 0, 0))
                .unwrap(),
            payouts: Decimal::from(payouts),
            fees: Decimal::from(fees),
            total: Decimal::from(payouts + fees),
        }
    }

    #[test]
    fn test_aggregate_period_totals_keys_each_row() {
        let rows = vec![row(2024, 1, 1, 0, 1_000, 50), row(2024, 1, 3, 0, 250, 5)];
        let aggregates = aggregate_period_totals(Granularity::Day, rows).unwrap();

        assert_eq!(aggregates.len(), 2);
        assert_eq!(
            aggregates.get("2024-01-01"),
            Some(&AggregatePoint {
                payouts: 1_000,
                fees: 50,
                total: 1_050
            })
        );
        assert_eq!(aggregates.get("2024-01-03").map(|p| p.payouts), Some(250));
        assert!(aggregates.get("2024-01-02").is_none());
    }

    #[test]
    fn test_aggregate_period_totals_uses_granularity_keys() {
        let first = row(2024, 3, 10, 13, 10, 1);
        let start = first.period_start;
        let aggregates =
            aggregate_period_totals(Granularity::Hour, vec![first, row(2024, 3, 10, 14, 20, 2)])
                .unwrap();

        assert_eq!(aggregates.len(), 2);
        assert_eq!(Granularity::Hour.period_key(start), "2024-03-10 13:00");
        assert_eq!(aggregates.get("2024-03-10 13:00").map(|p| p.total), Some(11));
        assert_eq!(aggregates.get("2024-03-10 14:00").map(|p| p.total), Some(22));
    }

    #[test]
    fn test_aggregate_period_totals_rejects_oversized_sums() {
        let mut oversized = row(2024, 1, 2, 0, 0, 0);
        oversized.total = Decimal::MAX;
        let rows = vec![row(2024, 1, 1, 0, 1, 0), oversized];

        let err = aggregate_period_totals(Granularity::Day, rows).unwrap_err();
        assert!(matches!(err, AnalyticsError::AmountOutOfRange(_)));
    }

    #[test]
    fn test_aggregate_period_totals_empty() {
        assert!(aggregate_period_totals(Granularity::Month, Vec::new())
            .unwrap()
            .is_empty());
    }
}
