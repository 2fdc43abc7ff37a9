pub mod count;
pub mod list;

pub use count::get_commissions_count;
pub use list::list_commissions;

use affiliate_db::{PoolExt, models::Program};

use crate::{AppState, errors::ApiError};

/// Fails with a 404 when `program_id` does not exist.
async fn ensure_program_exists(state: &AppState, program_id: &str) -> Result<(), ApiError> {
    let id = program_id.to_string();
    state
        .pool
        .interact_with_context(format!("find program {program_id}"), move |conn| {
            Program::find_by_id(&id, conn)
        })
        .await
        .map_err(|e| {
            if e.is_not_found() {
                ApiError::NotFound(format!("Program {program_id} not found"))
            } else {
                e.into()
            }
        })?;
    Ok(())
}
