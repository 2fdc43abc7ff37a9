use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::programs;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = programs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Program {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub slug: String,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Program {
    pub fn find_by_id(id: &str, conn: &mut diesel::PgConnection) -> QueryResult<Self> {
        programs::table
            .find(id)
            .select(Self::as_select())
            .first(conn)
    }
}
