pub mod errors;
pub mod models;
pub mod pool;
pub mod schema;

use deadpool_diesel::postgres::{Manager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub use errors::{DatabaseError, ErrorKind};
pub use pool::PoolExt;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Builds the connection pool. Connections are opened lazily.
pub fn init_pool(app_name: &str, database_url: &str, max_size: usize) -> Result<Pool, ErrorKind> {
    let manager = Manager::new(database_url, deadpool_diesel::Runtime::Tokio1);
    let pool = Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|e| ErrorKind::Pool(e.to_string()))?;
    tracing::info!(app_name, max_size, "Database pool ready");
    Ok(pool)
}

pub async fn run_migrations(pool: &Pool) -> Result<(), ErrorKind> {
    let conn = pool
        .get()
        .await
        .map_err(|e| ErrorKind::Migrations(e.to_string()))?;
    let applied = conn
        .interact(|conn| {
            conn.run_pending_migrations(MIGRATIONS)
                .map(|versions| versions.len())
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| ErrorKind::Migrations(e.to_string()))?
        .map_err(ErrorKind::Migrations)?;
    tracing::info!(applied, "Database migrations done");
    Ok(())
}
