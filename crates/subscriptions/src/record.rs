use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finreport_core::{CustomerId, DomainError, DomainResult, SubscriptionId};

/// How often a subscription is billed.
///
/// Unrecognized frequencies deserialize as `Unknown` and contribute nothing to
/// MRR instead of failing the whole report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillingFrequency {
    Monthly,
    Quarterly,
    Annually,
    Unknown,
}

impl BillingFrequency {
    /// Number of months one billing period covers.
    pub fn months_per_period(self) -> Option<u32> {
        match self {
            BillingFrequency::Monthly => Some(1),
            BillingFrequency::Quarterly => Some(3),
            BillingFrequency::Annually => Some(12),
            BillingFrequency::Unknown => None,
        }
    }

    /// Convert a price charged once per period into its per-month equivalent.
    pub fn monthly_equivalent(self, plan_price: Decimal) -> Decimal {
        match self.months_per_period() {
            Some(months) => plan_price / Decimal::from(months),
            None => Decimal::ZERO,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BillingFrequency::Monthly => "monthly",
            BillingFrequency::Quarterly => "quarterly",
            BillingFrequency::Annually => "annually",
            BillingFrequency::Unknown => "unknown",
        }
    }
}

impl From<String> for BillingFrequency {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" => BillingFrequency::Monthly,
            "quarterly" => BillingFrequency::Quarterly,
            "annually" | "annual" | "yearly" => BillingFrequency::Annually,
            _ => BillingFrequency::Unknown,
        }
    }
}

impl From<BillingFrequency> for String {
    fn from(value: BillingFrequency) -> Self {
        value.as_str().to_string()
    }
}

/// Subscription lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Paused,
    #[serde(alias = "canceled")]
    Cancelled,
    Expired,
}

/// A subscription as loaded by the subscription repository.
///
/// `plan_price` is the price per billing period in the subscription's native
/// frequency (an annual plan at 1200 has `plan_price = 1200`), not a monthly
/// figure. Older payloads name this field `monthly_amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub subscription_id: SubscriptionId,
    pub customer_id: CustomerId,
    pub billing_frequency: BillingFrequency,
    #[serde(alias = "monthly_amount")]
    pub plan_price: Decimal,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: SubscriptionStatus,
}

impl SubscriptionRecord {
    pub fn monthly_equivalent(&self) -> Decimal {
        self.billing_frequency.monthly_equivalent(self.plan_price)
    }

    /// Active as of `month_end`: started by then, not ended before it, and
    /// currently in `Active` status.
    pub fn is_active_at(&self, month_end: NaiveDate) -> bool {
        self.start_date <= month_end
            && self.end_date.is_none_or(|end| end >= month_end)
            && self.status == SubscriptionStatus::Active
    }

    pub fn started_within(&self, first: NaiveDate, last: NaiveDate) -> bool {
        (first..=last).contains(&self.start_date)
    }

    /// Ended within `[first, last]` and is now cancelled.
    pub fn churned_within(&self, first: NaiveDate, last: NaiveDate) -> bool {
        self.status == SubscriptionStatus::Cancelled
            && self.end_date.is_some_and(|end| (first..=last).contains(&end))
    }

    /// Boundary check for records coming from outside the domain.
    pub fn validate(&self) -> DomainResult<()> {
        if self.plan_price < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "subscription {} has negative plan price {}",
                self.subscription_id, self.plan_price
            )));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(DomainError::validation(format!(
                    "subscription {} ends ({end}) before it starts ({})",
                    self.subscription_id, self.start_date
                )));
            }
        }
        Ok(())
    }
}
