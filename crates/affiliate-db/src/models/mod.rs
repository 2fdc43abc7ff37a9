pub mod commission;
pub mod customer;
pub mod invoice;
pub mod partner;
pub mod program;

pub use commission::{
    Commission, CommissionFilter, CommissionPage, CommissionStatusTotals, CommissionWithRelations,
};
pub use customer::Customer;
pub use invoice::{Invoice, InvoicePeriodTotals, PaidInvoice, PaidInvoiceFilter};
pub use partner::Partner;
pub use program::Program;
