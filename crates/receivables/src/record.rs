use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finreport_core::{CurrencyCode, CustomerId, DomainError, DomainResult, InvoiceId};

/// An unpaid or partially-paid invoice, as loaded by the invoice repository.
///
/// `balance_amount` is what is still owed, not the invoice total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingInvoiceRecord {
    pub invoice_id: InvoiceId,
    pub customer_id: CustomerId,
    pub currency: CurrencyCode,
    pub due_date: NaiveDate,
    pub balance_amount: Decimal,
}

impl OutstandingInvoiceRecord {
    /// Whole days past `due_date` as of `as_of` (negative when not yet due).
    pub fn days_overdue(&self, as_of: NaiveDate) -> i64 {
        finreport_core::days_between(self.due_date, as_of)
    }

    /// Boundary check for records coming from outside the domain.
    pub fn validate(&self) -> DomainResult<()> {
        if self.balance_amount < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "invoice {} has negative balance {}",
                self.invoice_id, self.balance_amount
            )));
        }
        Ok(())
    }
}
