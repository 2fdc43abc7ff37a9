use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::customers;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Customer {
    pub id: String,
    pub external_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn find_by_ids(ids: &[String], conn: &mut diesel::PgConnection) -> QueryResult<Vec<Self>> {
        customers::table
            .filter(customers::id.eq_any(ids))
            .select(Self::as_select())
            .load(conn)
    }
}
