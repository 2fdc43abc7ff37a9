use affiliate_analytics::IntervalPreset;
use affiliate_db::{PoolExt, models::Commission};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;

use super::ensure_program_exists;
use crate::{
    AppState,
    dto::{CommissionDTO, CommissionsQuery, IntervalQuery, PaginationQuery},
    errors::ApiError,
    helpers::{commission_filter, commission_page, required_program_id},
};

#[utoipa::path(
    get,
    path = "/v1/commissions",
    tag = "Commissions",
    params(CommissionsQuery, IntervalQuery, PaginationQuery),
    responses(
        (
            status = 200,
            description = "One page of the program's commissions",
            body = Vec<CommissionDTO>
        ),
        (status = 400, description = "Invalid filters, paging or interval"),
        (status = 404, description = "Program not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_commissions(
    State(state): State<AppState>,
    Query(query): Query<CommissionsQuery>,
    Query(paging): Query<PaginationQuery>,
) -> Result<Json<Vec<CommissionDTO>>, ApiError> {
    let program_id = required_program_id(&query)?;
    let window = query
        .interval
        .as_request()
        .resolve(IntervalPreset::All, Utc::now())?;
    let filter = commission_filter(&query, program_id, &window)?;
    let page = commission_page(&paging)?;

    ensure_program_exists(&state, &filter.program_id).await?;

    let commissions = state
        .pool
        .interact_with_context(
            format!("list commissions of program {}", filter.program_id),
            move |conn| Commission::list(&filter, page, conn),
        )
        .await?;

    Ok(Json(
        commissions.into_iter().map(CommissionDTO::from).collect(),
    ))
}
