//! Report query handlers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use finreport_core::{CurrencyCode, TenantId};
use finreport_receivables::{
    AgingResult, AgingSummary, OutstandingInvoiceRecord, compute_aging, compute_aging_by_currency,
};
use finreport_subscriptions::{MrrCalculator, MrrResult};

use crate::config::ReportingConfig;
use crate::error::ReportError;
use crate::paging::{Page, PageRequest};
use crate::source::{CustomerDirectory, InvoiceSource, SubscriptionSource};

/// Query: receivables aging for a tenant as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingReportQuery {
    pub tenant_id: TenantId,
    pub as_of: NaiveDate,
    #[serde(default)]
    pub page: PageRequest,
}

/// Query: month-by-month MRR for a tenant over `[from, to]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrrReportQuery {
    pub tenant_id: TenantId,
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
}

/// Runs report queries against a record source.
///
/// Records are validated on the way in: a negative balance or an inverted
/// subscription window fails the query instead of skewing the totals.
#[derive(Debug)]
pub struct ReportService<S> {
    source: S,
    config: ReportingConfig,
}

impl<S> ReportService<S> {
    pub fn new(source: S, config: ReportingConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ReportingConfig {
        &self.config
    }
}

impl<S> ReportService<S>
where
    S: InvoiceSource + CustomerDirectory,
{
    /// Aging rows sorted by `total_outstanding` descending, one page at a time.
    ///
    /// Rows on the returned page carry the customer's name, contact details
    /// and last payment date when the directory knows the customer.
    #[instrument(
        skip_all,
        fields(tenant_id = %query.tenant_id, as_of = %query.as_of),
        err
    )]
    pub fn aging_report(&self, query: &AgingReportQuery) -> Result<Page<AgingResult>, ReportError> {
        let (page, page_size) = query.page.resolve(&self.config)?;
        let invoices = self.load_invoices(query.tenant_id)?;

        let mut rows: Vec<AgingResult> = if self.config.aging_by_currency {
            compute_aging_by_currency(query.as_of, &invoices).into_values().collect()
        } else {
            compute_aging(query.as_of, &invoices).into_values().collect()
        };

        rows.sort_by(|a, b| {
            b.total_outstanding
                .cmp(&a.total_outstanding)
                .then_with(|| a.customer_id.cmp(&b.customer_id))
                .then_with(|| a.currency.cmp(&b.currency))
        });

        let mut page = Page::from_sorted(rows, page, page_size);
        for row in &mut page.items {
            self.enrich(query.tenant_id, row)?;
        }

        tracing::info!(
            rows = page.total_count,
            page = page.page,
            "aging report generated"
        );
        Ok(page)
    }

    /// Portfolio totals per currency across every customer.
    #[instrument(skip_all, fields(tenant_id = %tenant_id, as_of = %as_of), err)]
    pub fn aging_summary(
        &self,
        tenant_id: TenantId,
        as_of: NaiveDate,
    ) -> Result<Vec<AgingSummary>, ReportError> {
        let invoices = self.load_invoices(tenant_id)?;
        let rows = compute_aging_by_currency(as_of, &invoices);
        Ok(AgingSummary::from_results(rows.values()))
    }

    fn load_invoices(&self, tenant_id: TenantId) -> Result<Vec<OutstandingInvoiceRecord>, ReportError> {
        let invoices = self.source.outstanding_invoices(tenant_id)?;
        for invoice in &invoices {
            invoice.validate()?;
        }
        Ok(invoices)
    }

    fn enrich(&self, tenant_id: TenantId, row: &mut AgingResult) -> Result<(), ReportError> {
        match self.source.customer_profile(tenant_id, &row.customer_id)? {
            Some(profile) => {
                row.customer_name = Some(profile.name);
                row.contact_email = profile.email;
                row.contact_phone = profile.phone;
                row.last_payment_date = profile.last_payment_date;
            }
            None => {
                tracing::debug!(customer_id = %row.customer_id, "customer not in directory");
            }
        }
        Ok(())
    }
}

impl<S> ReportService<S>
where
    S: SubscriptionSource,
{
    /// One MRR row per calendar month from `from`'s month through `to`'s month.
    #[instrument(
        skip_all,
        fields(tenant_id = %query.tenant_id, from = %query.from, to = %query.to),
        err
    )]
    pub fn mrr_report(&self, query: &MrrReportQuery) -> Result<Vec<MrrResult>, ReportError> {
        if query.from > query.to {
            return Err(ReportError::validation(format!(
                "from ({}) is after to ({})",
                query.from, query.to
            )));
        }

        let subscriptions = self.source.subscriptions(query.tenant_id)?;
        for sub in &subscriptions {
            sub.validate()?;
        }

        let currency = query
            .currency
            .clone()
            .unwrap_or_else(|| self.config.default_currency.clone());

        let results = MrrCalculator::new(currency).compute(query.from, query.to, &subscriptions);

        tracing::info!(months = results.len(), "mrr report generated");
        Ok(results)
    }
}
