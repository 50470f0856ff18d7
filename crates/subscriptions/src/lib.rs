//! Subscription revenue: monthly-recurring-revenue (MRR) over calendar months.
//!
//! Pure domain logic only: callers load subscriptions, this crate normalizes
//! billing frequencies and walks the requested months.

pub mod mrr;
pub mod record;

pub use mrr::{MrrCalculator, MrrResult, compute_mrr};
pub use record::{BillingFrequency, SubscriptionRecord, SubscriptionStatus};
