pub mod commission;
pub mod payout;
pub mod query;
pub mod response;

pub use commission::*;
pub use payout::*;
pub use query::*;
pub use response::*;
