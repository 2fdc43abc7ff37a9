use std::collections::BTreeMap;

use affiliate_analytics::IntervalPreset;
use affiliate_db::{
    PoolExt,
    models::{Commission, CommissionStatusTotals},
};
use affiliate_types::CommissionStatus;
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use strum::IntoEnumIterator;

use super::ensure_program_exists;
use crate::{
    AppState,
    dto::{CommissionCountDTO, CommissionsCountResponse, CommissionsQuery, IntervalQuery},
    errors::ApiError,
    helpers::{commission_filter, required_program_id},
};

pub const ALL_STATUSES_KEY: &str = "all";

#[utoipa::path(
    get,
    path = "/v1/commissions/count",
    tag = "Commissions",
    params(CommissionsQuery, IntervalQuery),
    responses(
        (
            status = 200,
            description = "Commission count and sums per status, plus `all`",
            body = BTreeMap<String, CommissionCountDTO>
        ),
        (status = 400, description = "Invalid filters or interval"),
        (status = 404, description = "Program not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_commissions_count(
    State(state): State<AppState>,
    Query(query): Query<CommissionsQuery>,
) -> Result<Json<CommissionsCountResponse>, ApiError> {
    let program_id = required_program_id(&query)?;
    let window = query
        .interval
        .as_request()
        .resolve(IntervalPreset::All, Utc::now())?;
    let filter = commission_filter(&query, program_id, &window)?;

    ensure_program_exists(&state, &filter.program_id).await?;

    let totals = state
        .pool
        .interact_with_context(
            format!("count commissions of program {}", filter.program_id),
            move |conn| Commission::totals_by_status(&filter, conn),
        )
        .await?;

    Ok(Json(counts_by_status(totals)))
}

/// Every status gets an entry, zeroed when absent from `totals`.
fn counts_by_status(totals: Vec<CommissionStatusTotals>) -> CommissionsCountResponse {
    let mut counts: CommissionsCountResponse = CommissionStatus::iter()
        .map(|status| (status.as_str().to_string(), CommissionCountDTO::default()))
        .collect();
    let mut all = CommissionCountDTO::default();

    for row in totals {
        let entry = CommissionCountDTO {
            count: row.count,
            amount: row.amount,
            earnings: row.earnings,
        };
        all.count += entry.count;
        all.amount += entry.amount;
        all.earnings += entry.earnings;
        counts.insert(row.status, entry);
    }

    counts.insert(ALL_STATUSES_KEY.to_string(), all);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(status: &str, count: i64, amount: i64, earnings: i64) -> CommissionStatusTotals {
        CommissionStatusTotals {
            status: status.to_string(),
            count,
            amount,
            earnings,
        }
    }

    #[test]
    fn test_counts_cover_every_status() {
        let counts = counts_by_status(vec![
            totals("pending", 3, 30_000, 3_000),
            totals("paid", 2, 10_000, 1_500),
        ]);

        assert_eq!(counts.len(), CommissionStatus::iter().count() + 1);
        assert_eq!(counts["pending"].count, 3);
        assert_eq!(counts["fraud"], CommissionCountDTO::default());
        assert_eq!(
            counts[ALL_STATUSES_KEY],
            CommissionCountDTO {
                count: 5,
                amount: 40_000,
                earnings: 4_500,
            }
        );
    }

    #[test]
    fn test_counts_without_commissions() {
        let counts = counts_by_status(Vec::new());
        assert!(counts.values().all(|c| *c == CommissionCountDTO::default()));
        assert!(counts.contains_key(ALL_STATUSES_KEY));
    }
}
