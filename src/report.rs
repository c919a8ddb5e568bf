use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::Transaction;

/// Which billing periods a report covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodFilter {
    All,
    One(String),
}

/// Row filter for the summary and category views. `categories: None` means
/// every category.
#[derive(Debug, Clone)]
pub struct ReportFilter {
    pub period: PeriodFilter,
    pub categories: Option<BTreeSet<String>>,
}

impl ReportFilter {
    pub fn all() -> Self {
        Self {
            period: PeriodFilter::All,
            categories: None,
        }
    }

    fn accepts(&self, transaction: &Transaction) -> bool {
        let period_ok = match &self.period {
            PeriodFilter::All => true,
            PeriodFilter::One(period) => transaction.period == *period,
        };
        let category_ok = self
            .categories
            .as_ref()
            .is_none_or(|set| set.contains(&transaction.category));
        period_ok && category_ok
    }
}

/// Headline figures over a filtered view. Positive amounts are charges,
/// negative amounts are credits; `credits` keeps its negative sign, so
/// `net = charges + credits`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub charges: Decimal,
    pub credits: Decimal,
    pub net: Decimal,
}

pub fn summarize(rows: &[Transaction], filter: &ReportFilter) -> Summary {
    let mut charges = Decimal::ZERO;
    let mut credits = Decimal::ZERO;
    for transaction in rows.iter().filter(|t| filter.accepts(t)) {
        if transaction.amount > Decimal::ZERO {
            charges += transaction.amount;
        } else {
            credits += transaction.amount;
        }
    }
    Summary {
        charges,
        credits,
        net: charges + credits,
    }
}

/// Per-category charge totals (positive amounts only) over the filtered
/// view, for bar/pie reporting.
pub fn category_totals(rows: &[Transaction], filter: &ReportFilter) -> BTreeMap<String, Decimal> {
    let mut totals = BTreeMap::new();
    for transaction in rows.iter().filter(|t| filter.accepts(t)) {
        if transaction.amount > Decimal::ZERO {
            *totals.entry(transaction.category.clone()).or_insert(Decimal::ZERO) +=
                transaction.amount;
        }
    }
    totals
}

/// Net total per billing period over the whole dataset, unfiltered, so the
/// trend series stays comparable regardless of the active view.
pub fn period_net_series(rows: &[Transaction]) -> BTreeMap<String, Decimal> {
    let mut series = BTreeMap::new();
    for transaction in rows {
        *series.entry(transaction.period.clone()).or_insert(Decimal::ZERO) += transaction.amount;
    }
    series
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn transaction(period: &str, category: &str, amount: Decimal) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date"),
            description: "X".to_owned(),
            amount,
            category: category.to_owned(),
            period: period.to_owned(),
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            transaction("2025-07", "Transporte", dec!(5990)),
            transaction("2025-07", "Supermercado", dec!(45320)),
            transaction("2025-07", "Devoluciones", dec!(-12000)),
            transaction("2025-08", "Transporte", dec!(3500)),
            transaction("2025-08", "Abono", dec!(-50000)),
        ]
    }

    #[test]
    fn should_summarize_charges_credits_and_net() {
        let summary = summarize(&sample(), &ReportFilter::all());
        assert_eq!(
            Summary {
                charges: dec!(54810),
                credits: dec!(-62000),
                net: dec!(-7190),
            },
            summary
        );
    }

    #[test]
    fn should_filter_by_period() {
        let filter = ReportFilter {
            period: PeriodFilter::One("2025-07".to_owned()),
            categories: None,
        };
        let summary = summarize(&sample(), &filter);
        assert_eq!(dec!(51310), summary.charges);
        assert_eq!(dec!(-12000), summary.credits);
        assert_eq!(dec!(39310), summary.net);
    }

    #[test]
    fn should_filter_by_category_membership() {
        let filter = ReportFilter {
            period: PeriodFilter::All,
            categories: Some(
                ["Transporte".to_owned()].into_iter().collect::<BTreeSet<_>>(),
            ),
        };
        let summary = summarize(&sample(), &filter);
        assert_eq!(dec!(9490), summary.charges);
        assert_eq!(dec!(0), summary.credits);
    }

    #[test]
    fn should_total_only_charges_per_category() {
        let totals = category_totals(&sample(), &ReportFilter::all());
        assert_eq!(Some(&dec!(9490)), totals.get("Transporte"));
        assert_eq!(Some(&dec!(45320)), totals.get("Supermercado"));
        // Credit-only categories carry no charge total.
        assert_eq!(None, totals.get("Devoluciones"));
        assert_eq!(None, totals.get("Abono"));
    }

    #[test]
    fn should_build_the_period_net_series_over_the_whole_dataset() {
        let series = period_net_series(&sample());
        let expected: BTreeMap<String, Decimal> = [
            ("2025-07".to_owned(), dec!(39310)),
            ("2025-08".to_owned(), dec!(-46500)),
        ]
        .into_iter()
        .collect();
        assert_eq!(expected, series);
    }

    #[test]
    fn should_summarize_an_empty_view() {
        let summary = summarize(&[], &ReportFilter::all());
        assert_eq!(
            Summary {
                charges: dec!(0),
                credits: dec!(0),
                net: dec!(0),
            },
            summary
        );
    }
}
