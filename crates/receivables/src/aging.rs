//! AgingBucketizer: outstanding invoices → per-customer aging rows.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finreport_core::{CurrencyCode, CustomerId};

use crate::bucket::AgingBucket;
use crate::record::OutstandingInvoiceRecord;

/// Aging row for one customer (or one customer/currency pair).
///
/// Invariant: `total_outstanding` equals the sum of the five bucket fields.
/// Only [`AgingResult::add`] touches the amounts, and it updates both sides.
///
/// `customer_name`, `last_payment_date` and the contact fields are filled in by
/// the caller from the customer directory; the bucketizer leaves them empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingResult {
    pub customer_id: CustomerId,
    pub customer_name: Option<String>,
    pub currency: CurrencyCode,
    pub total_outstanding: Decimal,
    pub current: Decimal,
    pub days_1_to_30: Decimal,
    pub days_31_to_60: Decimal,
    pub days_61_to_90: Decimal,
    pub over_90_days: Decimal,
    pub invoice_count: usize,
    pub last_payment_date: Option<NaiveDate>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl AgingResult {
    pub fn new(customer_id: CustomerId, currency: CurrencyCode) -> Self {
        Self {
            customer_id,
            customer_name: None,
            currency,
            total_outstanding: Decimal::ZERO,
            current: Decimal::ZERO,
            days_1_to_30: Decimal::ZERO,
            days_31_to_60: Decimal::ZERO,
            days_61_to_90: Decimal::ZERO,
            over_90_days: Decimal::ZERO,
            invoice_count: 0,
            last_payment_date: None,
            contact_email: None,
            contact_phone: None,
        }
    }

    /// Add one invoice's whole balance to `bucket`.
    pub fn add(&mut self, bucket: AgingBucket, amount: Decimal) {
        *self.bucket_mut(bucket) += amount;
        self.total_outstanding += amount;
        self.invoice_count += 1;
    }

    pub fn bucket(&self, bucket: AgingBucket) -> Decimal {
        match bucket {
            AgingBucket::Current => self.current,
            AgingBucket::Days1To30 => self.days_1_to_30,
            AgingBucket::Days31To60 => self.days_31_to_60,
            AgingBucket::Days61To90 => self.days_61_to_90,
            AgingBucket::Over90Days => self.over_90_days,
        }
    }

    fn bucket_mut(&mut self, bucket: AgingBucket) -> &mut Decimal {
        match bucket {
            AgingBucket::Current => &mut self.current,
            AgingBucket::Days1To30 => &mut self.days_1_to_30,
            AgingBucket::Days31To60 => &mut self.days_31_to_60,
            AgingBucket::Days61To90 => &mut self.days_61_to_90,
            AgingBucket::Over90Days => &mut self.over_90_days,
        }
    }

    /// Balance more than zero days past due.
    pub fn overdue_amount(&self) -> Decimal {
        self.total_outstanding - self.current
    }
}

/// Grouping key when aging is split by currency.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgingKey {
    pub customer_id: CustomerId,
    pub currency: CurrencyCode,
}

/// Age `invoices` as of `as_of`, one row per customer.
///
/// A customer's row takes its currency from the first of its invoices in input
/// order; balances in other currencies are summed into the same row as-is.
/// Use [`compute_aging_by_currency`] when customers can owe in several currencies.
pub fn compute_aging(
    as_of: NaiveDate,
    invoices: &[OutstandingInvoiceRecord],
) -> HashMap<CustomerId, AgingResult> {
    bucketize(as_of, invoices, |inv| inv.customer_id)
}

/// Age `invoices` as of `as_of`, one row per (customer, currency) pair.
pub fn compute_aging_by_currency(
    as_of: NaiveDate,
    invoices: &[OutstandingInvoiceRecord],
) -> HashMap<AgingKey, AgingResult> {
    bucketize(as_of, invoices, |inv| AgingKey {
        customer_id: inv.customer_id,
        currency: inv.currency.clone(),
    })
}

fn bucketize<K, F>(
    as_of: NaiveDate,
    invoices: &[OutstandingInvoiceRecord],
    key_of: F,
) -> HashMap<K, AgingResult>
where
    K: Eq + Hash,
    F: Fn(&OutstandingInvoiceRecord) -> K,
{
    let mut rows: HashMap<K, AgingResult> = HashMap::new();

    for inv in invoices {
        let bucket = AgingBucket::classify(inv.days_overdue(as_of));
        rows.entry(key_of(inv))
            .or_insert_with(|| AgingResult::new(inv.customer_id, inv.currency.clone()))
            .add(bucket, inv.balance_amount);
    }

    tracing::debug!(
        %as_of,
        invoices = invoices.len(),
        rows = rows.len(),
        "aged outstanding invoices"
    );

    rows
}

/// Portfolio-level aging totals for one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingSummary {
    pub currency: CurrencyCode,
    pub customer_count: usize,
    pub invoice_count: usize,
    pub total_outstanding: Decimal,
    pub current: Decimal,
    pub days_1_to_30: Decimal,
    pub days_31_to_60: Decimal,
    pub days_61_to_90: Decimal,
    pub over_90_days: Decimal,
}

impl AgingSummary {
    fn empty(currency: CurrencyCode) -> Self {
        Self {
            currency,
            customer_count: 0,
            invoice_count: 0,
            total_outstanding: Decimal::ZERO,
            current: Decimal::ZERO,
            days_1_to_30: Decimal::ZERO,
            days_31_to_60: Decimal::ZERO,
            days_61_to_90: Decimal::ZERO,
            over_90_days: Decimal::ZERO,
        }
    }

    fn absorb(&mut self, row: &AgingResult) {
        self.customer_count += 1;
        self.invoice_count += row.invoice_count;
        self.total_outstanding += row.total_outstanding;
        self.current += row.current;
        self.days_1_to_30 += row.days_1_to_30;
        self.days_31_to_60 += row.days_31_to_60;
        self.days_61_to_90 += row.days_61_to_90;
        self.over_90_days += row.over_90_days;
    }

    /// Roll aging rows up into one summary per currency, ordered by currency code.
    pub fn from_results<'a>(rows: impl IntoIterator<Item = &'a AgingResult>) -> Vec<AgingSummary> {
        let mut by_currency: BTreeMap<CurrencyCode, AgingSummary> = BTreeMap::new();
        for row in rows {
            by_currency
                .entry(row.currency.clone())
                .or_insert_with(|| AgingSummary::empty(row.currency.clone()))
                .absorb(row);
        }
        by_currency.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finreport_core::InvoiceId;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(
        customer_id: CustomerId,
        currency: &str,
        due_date: NaiveDate,
        balance_amount: Decimal,
    ) -> OutstandingInvoiceRecord {
        OutstandingInvoiceRecord {
            invoice_id: InvoiceId::new(),
            customer_id,
            currency: CurrencyCode::new(currency).unwrap(),
            due_date,
            balance_amount,
        }
    }

    fn assert_buckets_sum_to_total(row: &AgingResult) {
        let sum: Decimal = AgingBucket::ALL.iter().map(|b| row.bucket(*b)).sum();
        assert_eq!(sum, row.total_outstanding);
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(compute_aging(date(2024, 4, 1), &[]).is_empty());
        assert!(compute_aging_by_currency(date(2024, 4, 1), &[]).is_empty());
    }

    #[test]
    fn end_to_end_single_customer() {
        let c1 = CustomerId::new();
        let invoices = vec![
            invoice(c1, "USD", date(2024, 1, 1), dec!(100)),
            invoice(c1, "USD", date(2024, 3, 1), dec!(50)),
        ];

        let rows = compute_aging(date(2024, 4, 1), &invoices);
        assert_eq!(rows.len(), 1);

        let row = &rows[&c1];
        assert_eq!(row.total_outstanding, dec!(150));
        assert_eq!(row.current, dec!(0));
        assert_eq!(row.days_1_to_30, dec!(0));
        assert_eq!(row.days_31_to_60, dec!(50));
        assert_eq!(row.days_61_to_90, dec!(0));
        assert_eq!(row.over_90_days, dec!(100));
        assert_eq!(row.invoice_count, 2);
        assert_eq!(row.overdue_amount(), dec!(150));
        assert_buckets_sum_to_total(row);
    }

    #[test]
    fn each_boundary_lands_in_its_bucket() {
        let as_of = date(2024, 6, 30);
        let cases = [
            (0, AgingBucket::Current),
            (1, AgingBucket::Days1To30),
            (30, AgingBucket::Days1To30),
            (31, AgingBucket::Days31To60),
            (90, AgingBucket::Days61To90),
            (91, AgingBucket::Over90Days),
        ];

        for (days, expected) in cases {
            let c = CustomerId::new();
            let due = as_of - chrono::Duration::days(days);
            let rows = compute_aging(as_of, &[invoice(c, "USD", due, dec!(10))]);
            let row = &rows[&c];
            for bucket in AgingBucket::ALL {
                let want = if bucket == expected { dec!(10) } else { dec!(0) };
                assert_eq!(row.bucket(bucket), want, "{days} days overdue, bucket {bucket}");
            }
        }
    }

    #[test]
    fn not_yet_due_is_current() {
        let c = CustomerId::new();
        let rows = compute_aging(date(2024, 4, 1), &[invoice(c, "USD", date(2024, 5, 1), dec!(75))]);
        assert_eq!(rows[&c].current, dec!(75));
    }

    #[test]
    fn customer_currency_comes_from_first_invoice() {
        let c = CustomerId::new();
        let invoices = vec![
            invoice(c, "EUR", date(2024, 3, 1), dec!(20)),
            invoice(c, "USD", date(2024, 3, 1), dec!(30)),
        ];

        let rows = compute_aging(date(2024, 4, 1), &invoices);
        assert_eq!(rows[&c].currency.as_str(), "EUR");
        assert_eq!(rows[&c].total_outstanding, dec!(50));
    }

    #[test]
    fn by_currency_splits_multi_currency_customers() {
        let c = CustomerId::new();
        let invoices = vec![
            invoice(c, "EUR", date(2024, 3, 1), dec!(20)),
            invoice(c, "USD", date(2024, 3, 1), dec!(30)),
            invoice(c, "usd", date(2023, 12, 1), dec!(5)),
        ];

        let rows = compute_aging_by_currency(date(2024, 4, 1), &invoices);
        assert_eq!(rows.len(), 2);

        let usd = &rows[&AgingKey { customer_id: c, currency: CurrencyCode::usd() }];
        assert_eq!(usd.total_outstanding, dec!(35));
        assert_eq!(usd.over_90_days, dec!(5));

        let eur_key = AgingKey { customer_id: c, currency: CurrencyCode::new("EUR").unwrap() };
        assert_eq!(rows[&eur_key].total_outstanding, dec!(20));
    }

    #[test]
    fn summary_rolls_up_per_currency() {
        let (a, b) = (CustomerId::new(), CustomerId::new());
        let invoices = vec![
            invoice(a, "USD", date(2024, 1, 1), dec!(100)),
            invoice(b, "USD", date(2024, 3, 20), dec!(40)),
            invoice(b, "EUR", date(2024, 4, 10), dec!(7.5)),
        ];

        let rows = compute_aging_by_currency(date(2024, 4, 1), &invoices);
        let summary = AgingSummary::from_results(rows.values());

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].currency.as_str(), "EUR");
        assert_eq!(summary[0].current, dec!(7.5));
        assert_eq!(summary[1].currency.as_str(), "USD");
        assert_eq!(summary[1].customer_count, 2);
        assert_eq!(summary[1].total_outstanding, dec!(140));
        assert_eq!(summary[1].days_1_to_30, dec!(40));
        assert_eq!(summary[1].over_90_days, dec!(100));
    }

    fn arb_invoices() -> impl Strategy<Value = Vec<(u8, i64, i64)>> {
        // (customer index, days before as_of the invoice fell due, balance in cents)
        prop::collection::vec((0u8..5, -60i64..400, 0i64..10_000_000), 0..40)
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: every row's buckets sum exactly to its total, and the
        /// grand total equals the sum of all input balances.
        #[test]
        fn buckets_always_sum_to_total(raw in arb_invoices()) {
            let as_of = date(2024, 6, 30);
            let customers: Vec<CustomerId> = (0..5).map(|_| CustomerId::new()).collect();

            let invoices: Vec<_> = raw
                .iter()
                .map(|(c, days, cents)| invoice(
                    customers[*c as usize],
                    "USD",
                    as_of - chrono::Duration::days(*days),
                    Decimal::new(*cents, 2),
                ))
                .collect();

            let rows = compute_aging(as_of, &invoices);
            for row in rows.values() {
                let sum: Decimal = AgingBucket::ALL.iter().map(|b| row.bucket(*b)).sum();
                prop_assert_eq!(sum, row.total_outstanding);
            }

            let grand: Decimal = rows.values().map(|r| r.total_outstanding).sum();
            let input: Decimal = invoices.iter().map(|i| i.balance_amount).sum();
            prop_assert_eq!(grand, input);

            let distinct = raw.iter().map(|(c, _, _)| *c).collect::<std::collections::HashSet<_>>();
            prop_assert_eq!(rows.len(), distinct.len());
        }
    }
}
