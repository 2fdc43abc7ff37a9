pub mod admin;
pub mod commissions;

pub use admin::get_admin_payouts;
pub use commissions::{get_commissions_count, list_commissions};
