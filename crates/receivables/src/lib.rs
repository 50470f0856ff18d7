//! Accounts-receivable aging.
//!
//! Pure domain logic only: callers load outstanding invoices, this crate
//! classifies them into days-overdue buckets and sums them per customer.

pub mod aging;
pub mod bucket;
pub mod record;

pub use aging::{AgingKey, AgingResult, AgingSummary, compute_aging, compute_aging_by_currency};
pub use bucket::AgingBucket;
pub use record::OutstandingInvoiceRecord;
