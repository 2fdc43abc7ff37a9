use std::{fmt::Display, str::FromStr};

use affiliate_analytics::ReportingWindow;
use affiliate_db::models::{CommissionFilter, CommissionPage};
use affiliate_types::{CommissionSortBy, CommissionStatus, CommissionType, SortOrder};

use crate::{
    dto::{CommissionsQuery, PaginationQuery},
    errors::ApiError,
};

pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Parses an optional query parameter. Blank values count as missing.
pub fn parse_optional<T>(name: &str, value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr,
    T::Err: Display,
{
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| ApiError::BadRequest(format!("invalid {name} '{raw}': {e}"))),
    }
}

pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `programId` is the only mandatory commission filter.
pub fn required_program_id(query: &CommissionsQuery) -> Result<String, ApiError> {
    non_empty(query.program_id.as_deref())
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest("programId is required".to_string()))
}

pub fn commission_filter(
    query: &CommissionsQuery,
    program_id: String,
    window: &ReportingWindow,
) -> Result<CommissionFilter, ApiError> {
    Ok(CommissionFilter {
        program_id,
        created_from: window.start(),
        created_to: window.end(),
        status: parse_optional::<CommissionStatus>("status", query.status.as_deref())?,
        kind: parse_optional::<CommissionType>("type", query.kind.as_deref())?,
        customer_id: non_empty(query.customer_id.as_deref()).map(str::to_string),
        payout_id: non_empty(query.payout_id.as_deref()).map(str::to_string),
        partner_id: non_empty(query.partner_id.as_deref()).map(str::to_string),
    })
}

pub fn commission_page(query: &PaginationQuery) -> Result<CommissionPage, ApiError> {
    let page = parse_optional::<i64>("page", query.page.as_deref())?.unwrap_or(1);
    if page < 1 {
        return Err(ApiError::BadRequest(format!(
            "page must be at least 1, got {page}"
        )));
    }

    let page_size =
        parse_optional::<i64>("pageSize", query.page_size.as_deref())?.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ApiError::BadRequest(format!(
            "pageSize must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
        )));
    }

    Ok(CommissionPage {
        page,
        page_size,
        sort_by: parse_optional::<CommissionSortBy>("sortBy", query.sort_by.as_deref())?
            .unwrap_or_default(),
        sort_order: parse_optional::<SortOrder>("sortOrder", query.sort_order.as_deref())?
            .unwrap_or_default(),
    })
}
