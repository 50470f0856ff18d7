//! Reporting error model.

use thiserror::Error;

use finreport_core::DomainError;

use crate::source::SourceError;

/// Failure of a report query.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// The query itself was malformed (range, paging).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A loaded record failed its domain checks.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A repository/collaborator could not supply records.
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl ReportError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
