use std::collections::HashMap;

use affiliate_types::{CommissionSortBy, CommissionStatus, CommissionType, SortOrder};
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, sum};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::QueryFragment;
use diesel::query_dsl::LoadQuery;
use diesel::sql_types::Bool;
use serde::{Deserialize, Serialize};

use crate::models::{Customer, Partner};
use crate::schema::commissions;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = commissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Commission {
    pub id: String,
    pub program_id: String,
    pub partner_id: String,
    pub customer_id: Option<String>,
    pub payout_id: Option<String>,
    pub invoice_id: Option<String>,
    #[diesel(column_name = type_)]
    pub kind: String,
    pub status: String,
    pub amount: i32,
    pub earnings: i32,
    pub quantity: i32,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A commission along with the partner that earned it and, for leads and
/// sales, the customer that triggered it.
#[derive(Debug, Clone)]
pub struct CommissionWithRelations {
    pub commission: Commission,
    pub partner: Partner,
    pub customer: Option<Customer>,
}

/// Selects the earning commissions of one program created within
/// `[created_from, created_to]`.
#[derive(Debug, Clone)]
pub struct CommissionFilter {
    pub program_id: String,
    pub created_from: DateTime<Utc>,
    pub created_to: DateTime<Utc>,
    pub status: Option<CommissionStatus>,
    pub kind: Option<CommissionType>,
    pub customer_id: Option<String>,
    pub payout_id: Option<String>,
    pub partner_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionPage {
    /// 1-based.
    pub page: i64,
    pub page_size: i64,
    pub sort_by: CommissionSortBy,
    pub sort_order: SortOrder,
}

impl CommissionPage {
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Number of commissions and their summed amounts for one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissionStatusTotals {
    pub status: String,
    pub count: i64,
    pub amount: i64,
    pub earnings: i64,
}

type CommissionPredicate<'a> =
    Box<dyn BoxableExpression<commissions::table, Pg, SqlType = Bool> + 'a>;

/// `(status, count, sum(amount), sum(earnings))`
type StatusTotalsRow = (String, i64, Option<i64>, Option<i64>);

impl CommissionFilter {
    /// Conditions shared by the listing and the per-status totals.
    fn predicate(&self) -> CommissionPredicate<'_> {
        let mut predicate: CommissionPredicate<'_> = Box::new(
            commissions::program_id
                .eq(&self.program_id)
                .and(commissions::earnings.gt(0))
                .and(commissions::created_at.ge(self.created_from))
                .and(commissions::created_at.le(self.created_to)),
        );

        if let Some(status) = self.status {
            predicate = Box::new(predicate.and(commissions::status.eq(status.as_str())));
        }
        if let Some(kind) = self.kind {
            predicate = Box::new(predicate.and(commissions::type_.eq(kind.as_str())));
        }
        if let Some(customer_id) = &self.customer_id {
            predicate = Box::new(
                predicate.and(commissions::customer_id.assume_not_null().eq(customer_id)),
            );
        }
        if let Some(payout_id) = &self.payout_id {
            predicate =
                Box::new(predicate.and(commissions::payout_id.assume_not_null().eq(payout_id)));
        }
        if let Some(partner_id) = &self.partner_id {
            predicate = Box::new(predicate.and(commissions::partner_id.eq(partner_id)));
        }

        predicate
    }

    fn totals_query(
        &self,
    ) -> impl LoadQuery<'_, PgConnection, StatusTotalsRow> + QueryFragment<Pg> + '_ {
        commissions::table
            .filter(self.predicate())
            .group_by(commissions::status)
            .select((
                commissions::status,
                count_star(),
                sum(commissions::amount),
                sum(commissions::earnings),
            ))
    }
}

impl Commission {
    /// One page of the commissions matching `filter`, with their partner and
    /// customer loaded.
    pub fn list(
        filter: &CommissionFilter,
        page: CommissionPage,
        conn: &mut diesel::PgConnection,
    ) -> QueryResult<Vec<CommissionWithRelations>> {
        let query = commissions::table.filter(filter.predicate()).into_boxed();
        let query = match (page.sort_by, page.sort_order) {
            (CommissionSortBy::CreatedAt, SortOrder::Asc) => {
                query.order((commissions::created_at.asc(), commissions::id.asc()))
            }
            (CommissionSortBy::CreatedAt, SortOrder::Desc) => {
                query.order((commissions::created_at.desc(), commissions::id.desc()))
            }
            (CommissionSortBy::Amount, SortOrder::Asc) => {
                query.order((commissions::amount.asc(), commissions::id.asc()))
            }
            (CommissionSortBy::Amount, SortOrder::Desc) => {
                query.order((commissions::amount.desc(), commissions::id.desc()))
            }
        };

        let rows: Vec<Self> = query
            .limit(page.page_size)
            .offset(page.offset())
            .select(Self::as_select())
            .load(conn)?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut partner_ids: Vec<String> = rows.iter().map(|c| c.partner_id.clone()).collect();
        partner_ids.sort_unstable();
        partner_ids.dedup();
        let mut customer_ids: Vec<String> =
            rows.iter().filter_map(|c| c.customer_id.clone()).collect();
        customer_ids.sort_unstable();
        customer_ids.dedup();

        let partners: HashMap<String, Partner> = Partner::find_by_ids(&partner_ids, conn)?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        let customers: HashMap<String, Customer> = if customer_ids.is_empty() {
            HashMap::new()
        } else {
            Customer::find_by_ids(&customer_ids, conn)?
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect()
        };

        Ok(rows
            .into_iter()
            .filter_map(|commission| {
                let Some(partner) = partners.get(&commission.partner_id).cloned() else {
                    tracing::warn!(
                        commission_id = %commission.id,
                        partner_id = %commission.partner_id,
                        "Skipping commission without partner"
                    );
                    return None;
                };
                let customer = commission
                    .customer_id
                    .as_ref()
                    .and_then(|id| customers.get(id).cloned());
                Some(CommissionWithRelations {
                    commission,
                    partner,
                    customer,
                })
            })
            .collect())
    }

    /// Count and sums of the commissions matching `filter`, per status.
    /// Statuses without any commission are absent.
    pub fn totals_by_status(
        filter: &CommissionFilter,
        conn: &mut diesel::PgConnection,
    ) -> QueryResult<Vec<CommissionStatusTotals>> {
        let rows: Vec<StatusTotalsRow> = filter.totals_query().load(conn)?;

        Ok(rows
            .into_iter()
            .map(|(status, count, amount, earnings)| CommissionStatusTotals {
                status,
                count,
                amount: amount.unwrap_or_default(),
                earnings: earnings.unwrap_or_default(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        let page = CommissionPage {
            page: 1,
            page_size: 100,
            sort_by: CommissionSortBy::default(),
            sort_order: SortOrder::default(),
        };
        assert_eq!(page.offset(), 0);

        let page = CommissionPage { page: 3, page_size: 25, ..page };
        assert_eq!(page.offset(), 50);
    }

    fn filter() -> CommissionFilter {
        CommissionFilter {
            program_id: "prog_1".to_string(),
            created_from: DateTime::from_timestamp(1_704_067_200, 0).unwrap(),
            created_to: DateTime::from_timestamp(1_706_745_600, 0).unwrap(),
            status: None,
            kind: None,
            customer_id: None,
            payout_id: None,
            partner_id: None,
        }
    }

    #[test]
    fn test_totals_query_groups_by_status() {
        let filter = filter();
        let sql = diesel::debug_query::<Pg, _>(&filter.totals_query()).to_string();

        assert!(sql.contains(r#"GROUP BY "commissions"."status""#), "{sql}");
        assert!(sql.contains(r#"SUM("commissions"."earnings")"#), "{sql}");
        assert!(sql.contains(r#""commissions"."program_id" = $1"#), "{sql}");
        assert!(!sql.contains(r#""commissions"."customer_id""#), "{sql}");
    }

    #[test]
    fn test_optional_filters_narrow_the_totals() {
        let filter = CommissionFilter {
            status: Some(CommissionStatus::Paid),
            kind: Some(CommissionType::Sale),
            customer_id: Some("cus_1".to_string()),
            payout_id: Some("po_1".to_string()),
            partner_id: Some("pn_1".to_string()),
            ..filter()
        };
        let sql = diesel::debug_query::<Pg, _>(&filter.totals_query()).to_string();

        for column in ["status", "type", "customer_id", "payout_id", "partner_id"] {
            assert!(
                sql.contains(&format!(r#""commissions"."{column}" = $"#)),
                "{column} missing from {sql}"
            );
        }
        assert!(sql.contains(r#"GROUP BY "commissions"."status""#), "{sql}");
    }
}
