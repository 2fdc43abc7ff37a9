use affiliate_analytics::IntervalRequest;
use serde::Deserialize;
use utoipa::IntoParams;

/// Reporting interval of the analytics endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IntervalQuery {
    /// Named range: today, yesterday, 7d, 30d, 90d, mtd, qtd, ytd, all or custom.
    pub interval: Option<String>,
    /// RFC 3339 instant, or a local date/datetime in `timezone`. Overrides `interval`.
    pub start: Option<String>,
    /// Same formats as `start`. Defaults to now.
    pub end: Option<String>,
    /// IANA timezone the periods are aligned to. Defaults to UTC.
    pub timezone: Option<String>,
}

impl IntervalQuery {
    pub fn as_request(&self) -> IntervalRequest<'_> {
        IntervalRequest {
            interval: self.interval.as_deref(),
            start: self.start.as_deref(),
            end: self.end.as_deref(),
            timezone: self.timezone.as_deref(),
        }
    }
}

/// Filters of the commission endpoints. Values are validated by the handlers
/// so that bad input gets the usual error envelope.
///
/// The interval parameters are flattened in, so handlers must also list
/// [`IntervalQuery`] in their documented params.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CommissionsQuery {
    /// Program the commissions belong to.
    pub program_id: Option<String>,
    /// pending, processed, paid, refunded, duplicate, fraud or canceled.
    pub status: Option<String>,
    /// click, lead or sale.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub customer_id: Option<String>,
    pub payout_id: Option<String>,
    pub partner_id: Option<String>,
    /// Creation range; `interval` defaults to `all`. Documented by
    /// [`IntervalQuery`].
    #[serde(flatten)]
    #[param(ignore)]
    pub interval: IntervalQuery,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// 1-based page number, defaults to 1.
    pub page: Option<String>,
    /// Between 1 and 100, defaults to 100.
    pub page_size: Option<String>,
    /// createdAt or amount, defaults to createdAt.
    pub sort_by: Option<String>,
    /// asc or desc, defaults to desc.
    pub sort_order: Option<String>,
}

#[cfg(test)]
mod tests {
    use axum::{extract::Query, http::Uri};

    use super::*;

    #[test]
    fn test_commissions_query_reads_interval_params() {
        let uri: Uri = "/v1/commissions?programId=prog_1&type=sale&interval=custom\
                        &start=2024-01-01&end=2024-02-01&timezone=Europe/Paris"
            .parse()
            .unwrap();
        let Query(query) = Query::<CommissionsQuery>::try_from_uri(&uri).unwrap();

        assert_eq!(query.program_id.as_deref(), Some("prog_1"));
        assert_eq!(query.kind.as_deref(), Some("sale"));
        let interval = query.interval.as_request();
        assert_eq!(interval.interval, Some("custom"));
        assert_eq!(interval.start, Some("2024-01-01"));
        assert_eq!(interval.end, Some("2024-02-01"));
        assert_eq!(interval.timezone, Some("Europe/Paris"));
    }

    #[test]
    fn test_commissions_query_without_interval() {
        let uri: Uri = "/v1/commissions?programId=prog_1".parse().unwrap();
        let Query(query) = Query::<CommissionsQuery>::try_from_uri(&uri).unwrap();
        assert!(query.interval.as_request().interval.is_none());
        assert!(query.interval.start.is_none());
    }
}
