//! MrrCalculator: walk calendar months and total subscription revenue.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finreport_core::{CurrencyCode, MonthRange, month_end, month_name};

use crate::record::SubscriptionRecord;

/// MRR figures for one calendar month.
///
/// `expansion_mrr` and `contraction_mrr` are not computed: there is no plan
/// change history to derive them from, so they are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrrResult {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub monthly_recurring_revenue: Decimal,
    pub new_mrr: Decimal,
    pub churned_mrr: Decimal,
    pub expansion_mrr: Decimal,
    pub contraction_mrr: Decimal,
    pub active_subscriptions: usize,
    pub new_subscriptions: usize,
    pub churned_subscriptions: usize,
    pub currency: CurrencyCode,
}

impl MrrResult {
    fn empty(month_start: NaiveDate, currency: CurrencyCode) -> Self {
        Self {
            year: month_start.year(),
            month: month_start.month(),
            month_name: month_name(month_start.month()).to_string(),
            monthly_recurring_revenue: Decimal::ZERO,
            new_mrr: Decimal::ZERO,
            churned_mrr: Decimal::ZERO,
            expansion_mrr: Decimal::ZERO,
            contraction_mrr: Decimal::ZERO,
            active_subscriptions: 0,
            new_subscriptions: 0,
            churned_subscriptions: 0,
            currency,
        }
    }

    /// New MRR minus churned MRR for the month.
    pub fn net_new_mrr(&self) -> Decimal {
        self.new_mrr + self.expansion_mrr - self.churned_mrr - self.contraction_mrr
    }

    /// Annualized run rate (MRR x 12).
    pub fn annual_run_rate(&self) -> Decimal {
        self.monthly_recurring_revenue * Decimal::from(12)
    }
}

/// Computes month-by-month MRR in a fixed reporting currency.
///
/// Amounts are not converted: every subscription is assumed to be priced in
/// `currency`.
#[derive(Debug, Clone, Default)]
pub struct MrrCalculator {
    currency: CurrencyCode,
}

impl MrrCalculator {
    pub fn new(currency: CurrencyCode) -> Self {
        Self { currency }
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// One result per calendar month from `from`'s month through `to`'s month.
    ///
    /// Empty when `from` falls in a later month than `to`.
    pub fn compute(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        subscriptions: &[SubscriptionRecord],
    ) -> Vec<MrrResult> {
        let results: Vec<MrrResult> = MonthRange::new(from, to)
            .map(|month| self.compute_month(month, subscriptions))
            .collect();

        tracing::debug!(
            %from,
            %to,
            subscriptions = subscriptions.len(),
            months = results.len(),
            currency = %self.currency,
            "computed monthly recurring revenue"
        );

        results
    }

    fn compute_month(&self, first: NaiveDate, subscriptions: &[SubscriptionRecord]) -> MrrResult {
        let last = month_end(first);
        let mut result = MrrResult::empty(first, self.currency.clone());

        for sub in subscriptions {
            let amount = sub.monthly_equivalent();

            if sub.is_active_at(last) {
                result.active_subscriptions += 1;
                result.monthly_recurring_revenue += amount;
            }
            if sub.started_within(first, last) {
                result.new_subscriptions += 1;
                result.new_mrr += amount;
            }
            if sub.churned_within(first, last) {
                result.churned_subscriptions += 1;
                result.churned_mrr += amount;
            }
        }

        result
    }
}

/// Month-by-month MRR reported in USD.
pub fn compute_mrr(
    from: NaiveDate,
    to: NaiveDate,
    subscriptions: &[SubscriptionRecord],
) -> Vec<MrrResult> {
    MrrCalculator::default().compute(from, to, subscriptions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BillingFrequency, SubscriptionStatus};
    use finreport_core::{CustomerId, SubscriptionId};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sub(
        frequency: BillingFrequency,
        price: Decimal,
        start: NaiveDate,
        end: Option<NaiveDate>,
        status: SubscriptionStatus,
    ) -> SubscriptionRecord {
        SubscriptionRecord {
            subscription_id: SubscriptionId::new(),
            customer_id: CustomerId::new(),
            billing_frequency: frequency,
            plan_price: price,
            start_date: start,
            end_date: end,
            status,
        }
    }

    #[test]
    fn empty_subscriptions_yield_zeroed_months() {
        let results = compute_mrr(date(2024, 1, 1), date(2024, 4, 30), &[]);
        assert_eq!(results.len(), 4);
        for r in &results {
            assert_eq!(r.monthly_recurring_revenue, Decimal::ZERO);
            assert_eq!(r.new_mrr, Decimal::ZERO);
            assert_eq!(r.churned_mrr, Decimal::ZERO);
            assert_eq!(r.expansion_mrr, Decimal::ZERO);
            assert_eq!(r.contraction_mrr, Decimal::ZERO);
            assert_eq!(r.active_subscriptions, 0);
            assert_eq!(r.new_subscriptions, 0);
            assert_eq!(r.churned_subscriptions, 0);
            assert_eq!(r.currency.as_str(), "USD");
        }
    }

    #[test]
    fn month_walk_covers_partial_end_months_in_order() {
        let results = compute_mrr(date(2024, 1, 15), date(2024, 3, 20), &[]);
        let months: Vec<_> = results
            .iter()
            .map(|r| (r.year, r.month, r.month_name.as_str()))
            .collect();
        assert_eq!(
            months,
            vec![(2024, 1, "January"), (2024, 2, "February"), (2024, 3, "March")]
        );
    }

    #[test]
    fn reversed_range_is_empty() {
        assert!(compute_mrr(date(2024, 5, 1), date(2024, 4, 30), &[]).is_empty());
    }

    #[test]
    fn annual_and_quarterly_plans_contribute_monthly_equivalent() {
        let subs = vec![
            sub(BillingFrequency::Annually, dec!(1200), date(2024, 1, 10), None, SubscriptionStatus::Active),
            sub(BillingFrequency::Quarterly, dec!(300), date(2023, 6, 1), None, SubscriptionStatus::Active),
        ];

        let jan = &compute_mrr(date(2024, 1, 1), date(2024, 1, 31), &subs)[0];
        assert_eq!(jan.active_subscriptions, 2);
        assert_eq!(jan.monthly_recurring_revenue, dec!(200));
        assert_eq!(jan.new_subscriptions, 1);
        assert_eq!(jan.new_mrr, dec!(100));
        assert_eq!(jan.annual_run_rate(), dec!(2400));
    }

    #[test]
    fn leap_february_window_ends_on_the_29th() {
        let churned = sub(
            BillingFrequency::Monthly,
            dec!(25),
            date(2023, 11, 1),
            Some(date(2024, 2, 29)),
            SubscriptionStatus::Cancelled,
        );

        let results = compute_mrr(date(2024, 2, 1), date(2024, 2, 1), &[churned]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].churned_subscriptions, 1);
        assert_eq!(results[0].churned_mrr, dec!(25));
        assert_eq!(results[0].net_new_mrr(), dec!(-25));
    }

    #[test]
    fn mid_month_end_drops_out_of_active_snapshot() {
        let cancelled = sub(
            BillingFrequency::Monthly,
            dec!(50),
            date(2024, 1, 1),
            Some(date(2024, 3, 15)),
            SubscriptionStatus::Cancelled,
        );
        let still_active = sub(
            BillingFrequency::Monthly,
            dec!(50),
            date(2024, 1, 1),
            Some(date(2024, 3, 15)),
            SubscriptionStatus::Active,
        );

        let results = compute_mrr(date(2024, 2, 1), date(2024, 3, 31), &[cancelled, still_active]);

        // February: only the one still in Active status counts, ending later than Feb 29.
        assert_eq!(results[0].active_subscriptions, 1);
        assert_eq!(results[0].monthly_recurring_revenue, dec!(50));
        assert_eq!(results[0].churned_subscriptions, 0);

        // March: both end before Mar 31; only the cancelled one is churn.
        assert_eq!(results[1].active_subscriptions, 0);
        assert_eq!(results[1].churned_subscriptions, 1);
        assert_eq!(results[1].churned_mrr, dec!(50));
    }

    #[test]
    fn new_subscriptions_count_regardless_of_status() {
        let short_lived = sub(
            BillingFrequency::Quarterly,
            dec!(90),
            date(2024, 1, 10),
            Some(date(2024, 1, 20)),
            SubscriptionStatus::Cancelled,
        );

        // Day order inside a single month does not matter; the month is still walked.
        let results = compute_mrr(date(2024, 1, 31), date(2024, 1, 1), &[short_lived]);
        assert_eq!(results.len(), 1);

        let jan = &results[0];
        assert_eq!(jan.new_subscriptions, 1);
        assert_eq!(jan.new_mrr, dec!(30));
        assert_eq!(jan.churned_subscriptions, 1);
        assert_eq!(jan.churned_mrr, dec!(30));
        assert_eq!(jan.active_subscriptions, 0);
        assert_eq!(jan.monthly_recurring_revenue, Decimal::ZERO);
        assert_eq!(jan.net_new_mrr(), Decimal::ZERO);
    }

    #[test]
    fn unknown_frequency_counts_but_contributes_nothing() {
        let odd = sub(BillingFrequency::Unknown, dec!(999), date(2024, 1, 5), None, SubscriptionStatus::Active);
        let r = &compute_mrr(date(2024, 1, 1), date(2024, 1, 1), &[odd])[0];
        assert_eq!(r.active_subscriptions, 1);
        assert_eq!(r.monthly_recurring_revenue, Decimal::ZERO);
    }

    #[test]
    fn calculator_carries_reporting_currency() {
        let calc = MrrCalculator::new(CurrencyCode::new("eur").unwrap());
        let results = calc.compute(date(2024, 1, 1), date(2024, 2, 1), &[]);
        assert!(results.iter().all(|r| r.currency.as_str() == "EUR"));
    }

    proptest! {
        /// Property: expansion and contraction stay zero and each month's
        /// counts never exceed the input size.
        #[test]
        fn placeholders_stay_zero(
            starts in prop::collection::vec((0i64..730, prop::option::of(0i64..400), any::<bool>()), 0..30),
        ) {
            let base = date(2023, 1, 1);
            let subs: Vec<_> = starts
                .iter()
                .map(|(start, len, cancelled)| {
                    let start_date = base + chrono::Duration::days(*start);
                    sub(
                        BillingFrequency::Quarterly,
                        dec!(90),
                        start_date,
                        len.map(|l| start_date + chrono::Duration::days(l)),
                        if *cancelled { SubscriptionStatus::Cancelled } else { SubscriptionStatus::Active },
                    )
                })
                .collect();

            for r in compute_mrr(date(2023, 1, 1), date(2024, 12, 31), &subs) {
                prop_assert_eq!(r.expansion_mrr, Decimal::ZERO);
                prop_assert_eq!(r.contraction_mrr, Decimal::ZERO);
                prop_assert!(r.active_subscriptions <= subs.len());
                prop_assert_eq!(r.monthly_recurring_revenue, Decimal::from(30 * r.active_subscriptions as i64));
            }
        }
    }
}
