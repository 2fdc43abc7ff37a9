use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::partners;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = partners)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Partner {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub image: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Partner {
    pub fn find_by_ids(ids: &[String], conn: &mut diesel::PgConnection) -> QueryResult<Vec<Self>> {
        partners::table
            .filter(partners::id.eq_any(ids))
            .select(Self::as_select())
            .load(conn)
    }
}
