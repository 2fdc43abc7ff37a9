pub mod payouts;

pub use payouts::get_admin_payouts;
