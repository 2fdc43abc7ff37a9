pub mod commission;
pub mod invoice;
pub mod sort;

pub use commission::{CommissionStatus, CommissionType};
pub use invoice::InvoiceStatus;
pub use sort::{CommissionSortBy, SortOrder};
