//! `finreport-reporting` — query handlers for the receivables and MRR reports.
//!
//! Sits between the repositories (modelled as source traits) and whatever
//! serves the reports: loads records, validates them, runs the pure
//! computations, then sorts, enriches and pages the rows.

pub mod config;
pub mod error;
pub mod paging;
pub mod service;
pub mod source;

pub use config::ReportingConfig;
pub use error::ReportError;
pub use paging::{Page, PageRequest};
pub use service::{AgingReportQuery, MrrReportQuery, ReportService};
pub use source::{
    CustomerDirectory, CustomerProfile, InMemoryReportSource, InvoiceSource, SourceError,
    SubscriptionSource,
};
