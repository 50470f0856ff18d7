//! `finreport-core` — shared reporting primitives.
//!
//! This crate contains **pure** building blocks used by the receivables and
//! subscription reports (no IO, no storage concerns).

pub mod calendar;
pub mod error;
pub mod id;
pub mod value_object;

pub use calendar::{days_between, month_end, month_name, month_start, next_month, MonthRange};
pub use error::{DomainError, DomainResult};
pub use id::{CustomerId, InvoiceId, SubscriptionId, TenantId};
pub use value_object::{CurrencyCode, ValueObject};
