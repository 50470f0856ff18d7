//! Record sources the report handlers read from.
//!
//! In production these are the invoice, subscription and customer
//! repositories; the traits keep the handlers independent of storage.
//! `InMemoryReportSource` is the tenant-isolated in-memory implementation used
//! for tests and local runs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use finreport_core::{CustomerId, TenantId};
use finreport_receivables::OutstandingInvoiceRecord;
use finreport_subscriptions::SubscriptionRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Customer details shown next to an aging row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: CustomerId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub last_payment_date: Option<NaiveDate>,
}

/// Unpaid and partially-paid invoices for a tenant.
pub trait InvoiceSource: Send + Sync {
    fn outstanding_invoices(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<OutstandingInvoiceRecord>, SourceError>;
}

/// All subscriptions for a tenant, whatever their status.
pub trait SubscriptionSource: Send + Sync {
    fn subscriptions(&self, tenant_id: TenantId) -> Result<Vec<SubscriptionRecord>, SourceError>;
}

/// Customer lookup; `Ok(None)` when the customer is unknown.
pub trait CustomerDirectory: Send + Sync {
    fn customer_profile(
        &self,
        tenant_id: TenantId,
        customer_id: &CustomerId,
    ) -> Result<Option<CustomerProfile>, SourceError>;
}

impl<S> InvoiceSource for Arc<S>
where
    S: InvoiceSource + ?Sized,
{
    fn outstanding_invoices(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<OutstandingInvoiceRecord>, SourceError> {
        (**self).outstanding_invoices(tenant_id)
    }
}

impl<S> SubscriptionSource for Arc<S>
where
    S: SubscriptionSource + ?Sized,
{
    fn subscriptions(&self, tenant_id: TenantId) -> Result<Vec<SubscriptionRecord>, SourceError> {
        (**self).subscriptions(tenant_id)
    }
}

impl<S> CustomerDirectory for Arc<S>
where
    S: CustomerDirectory + ?Sized,
{
    fn customer_profile(
        &self,
        tenant_id: TenantId,
        customer_id: &CustomerId,
    ) -> Result<Option<CustomerProfile>, SourceError> {
        (**self).customer_profile(tenant_id, customer_id)
    }
}

/// In-memory tenant-isolated records for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryReportSource {
    invoices: RwLock<HashMap<TenantId, Vec<OutstandingInvoiceRecord>>>,
    subscriptions: RwLock<HashMap<TenantId, Vec<SubscriptionRecord>>>,
    customers: RwLock<HashMap<(TenantId, CustomerId), CustomerProfile>>,
}

fn poisoned(what: &str) -> SourceError {
    SourceError::Unavailable(format!("{what} lock poisoned"))
}

impl InMemoryReportSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_invoice(
        &self,
        tenant_id: TenantId,
        invoice: OutstandingInvoiceRecord,
    ) -> Result<(), SourceError> {
        let mut map = self.invoices.write().map_err(|_| poisoned("invoices"))?;
        map.entry(tenant_id).or_default().push(invoice);
        Ok(())
    }

    pub fn add_subscription(
        &self,
        tenant_id: TenantId,
        subscription: SubscriptionRecord,
    ) -> Result<(), SourceError> {
        let mut map = self
            .subscriptions
            .write()
            .map_err(|_| poisoned("subscriptions"))?;
        map.entry(tenant_id).or_default().push(subscription);
        Ok(())
    }

    pub fn upsert_customer(
        &self,
        tenant_id: TenantId,
        profile: CustomerProfile,
    ) -> Result<(), SourceError> {
        let mut map = self.customers.write().map_err(|_| poisoned("customers"))?;
        map.insert((tenant_id, profile.customer_id), profile);
        Ok(())
    }

    /// Drop every record held for a tenant.
    pub fn clear_tenant(&self, tenant_id: TenantId) -> Result<(), SourceError> {
        self.invoices
            .write()
            .map_err(|_| poisoned("invoices"))?
            .remove(&tenant_id);
        self.subscriptions
            .write()
            .map_err(|_| poisoned("subscriptions"))?
            .remove(&tenant_id);
        self.customers
            .write()
            .map_err(|_| poisoned("customers"))?
            .retain(|(t, _), _| *t != tenant_id);
        Ok(())
    }
}

impl InvoiceSource for InMemoryReportSource {
    fn outstanding_invoices(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<OutstandingInvoiceRecord>, SourceError> {
        let map = self.invoices.read().map_err(|_| poisoned("invoices"))?;
        Ok(map.get(&tenant_id).cloned().unwrap_or_default())
    }
}

impl SubscriptionSource for InMemoryReportSource {
    fn subscriptions(&self, tenant_id: TenantId) -> Result<Vec<SubscriptionRecord>, SourceError> {
        let map = self
            .subscriptions
            .read()
            .map_err(|_| poisoned("subscriptions"))?;
        Ok(map.get(&tenant_id).cloned().unwrap_or_default())
    }
}

impl CustomerDirectory for InMemoryReportSource {
    fn customer_profile(
        &self,
        tenant_id: TenantId,
        customer_id: &CustomerId,
    ) -> Result<Option<CustomerProfile>, SourceError> {
        let map = self.customers.read().map_err(|_| poisoned("customers"))?;
        Ok(map.get(&(tenant_id, *customer_id)).cloned())
    }
}
