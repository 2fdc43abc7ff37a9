use std::time::Instant;

use deadpool_diesel::postgres::Pool;
use diesel::QueryResult;

use crate::errors::DatabaseError;

/// Runs blocking diesel work on a pooled connection and turns every failure
/// into a logged [`DatabaseError`] carrying `operation`.
pub trait PoolExt {
    /// # Example
    /// ```ignore
    /// let program = pool
    ///     .interact_with_context(format!("find program {id}"), move |conn| {
    ///         Program::find_by_id(&id, conn)
    ///     })
    ///     .await?;
    /// ```
    fn interact_with_context<F, T>(
        &self,
        operation: String,
        f: F,
    ) -> impl std::future::Future<Output = Result<T, DatabaseError>> + Send
    where
        F: FnOnce(&mut diesel::PgConnection) -> QueryResult<T> + Send + 'static,
        T: Send + 'static;
}

impl PoolExt for Pool {
    async fn interact_with_context<F, T>(&self, operation: String, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&mut diesel::PgConnection) -> QueryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let started = Instant::now();

        let conn = self.get().await.map_err(|e| {
            tracing::error!(operation = %operation, error = %e, "No database connection available");
            DatabaseError::PoolError {
                operation: operation.clone(),
                message: e.to_string(),
            }
        })?;

        let result = conn.interact(f).await.map_err(|e| {
            tracing::error!(operation = %operation, error = %e, "Database connection task failed");
            DatabaseError::InteractionError {
                operation: operation.clone(),
                message: e.to_string(),
            }
        })?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(value) => {
                tracing::debug!(operation = %operation, elapsed_ms, "Database query done");
                Ok(value)
            }
            Err(e) => {
                let err = DatabaseError::from_diesel(&operation, e);
                if err.is_not_found() {
                    tracing::debug!(
                        operation = %operation,
                        elapsed_ms,
                        "Database query found nothing"
                    );
                } else {
                    tracing::error!(
                        operation = %operation,
                        elapsed_ms,
                        error = %err,
                        "Database query failed"
                    );
                }
                Err(err)
            }
        }
    }
}
