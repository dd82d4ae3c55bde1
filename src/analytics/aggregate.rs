// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Period aggregation over flat expense lists.
//!
//! Everything here is total: empty input produces empty maps or zero sums,
//! and records that cannot be interpreted are dropped into the defect list
//! of a [`Ledger`] instead of failing the computation.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::analytics::category::Category;
use crate::models::{CategoryAmount, Expense, RawExpense};
use crate::utils::month_key;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DefectKind {
    InvalidAmount,
    InvalidDate,
}

/// A raw record that was skipped during conversion.
#[derive(Debug, Clone, Serialize)]
pub struct Defect {
    pub position: usize,
    pub kind: DefectKind,
    pub raw: String,
}

/// Validated expenses plus the records that had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub expenses: Vec<Expense>,
    pub defects: Vec<Defect>,
}

impl Ledger {
    pub fn from_raw(records: &[RawExpense]) -> Ledger {
        let mut ledger = Ledger::default();
        for (position, r) in records.iter().enumerate() {
            let Some(date) = r.parsed_date() else {
                ledger.defects.push(Defect {
                    position,
                    kind: DefectKind::InvalidDate,
                    raw: r.date.clone(),
                });
                continue;
            };
            let Some(amount) = r.amount() else {
                ledger.defects.push(Defect {
                    position,
                    kind: DefectKind::InvalidAmount,
                    raw: r.amount.to_string(),
                });
                continue;
            };
            ledger.expenses.push(Expense {
                date,
                expense: r.expense.clone(),
                amount,
                index: r.index,
            });
        }
        if !ledger.defects.is_empty() {
            tracing::warn!(
                skipped = ledger.defects.len(),
                kept = ledger.expenses.len(),
                "skipped expense records with unusable data"
            );
        }
        ledger
    }

    pub fn defect_count(&self) -> usize {
        self.defects.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAmount {
    pub day: NaiveDate,
    pub amount: Decimal,
}

/// Sums saturate at `Decimal::MAX` rather than overflowing.
pub fn total(expenses: &[Expense]) -> Decimal {
    expenses
        .iter()
        .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.amount))
}

fn add_into<K: Ord>(out: &mut BTreeMap<K, Decimal>, key: K, amount: Decimal) {
    let slot = out.entry(key).or_insert(Decimal::ZERO);
    *slot = slot.saturating_add(amount);
}

pub fn bucket_by_day(expenses: &[Expense]) -> BTreeMap<NaiveDate, Decimal> {
    let mut out = BTreeMap::new();
    for e in expenses {
        add_into(&mut out, e.date, e.amount);
    }
    out
}

pub fn bucket_by_month(expenses: &[Expense]) -> BTreeMap<String, Decimal> {
    let mut out = BTreeMap::new();
    for e in expenses {
        add_into(&mut out, month_key(e.date), e.amount);
    }
    out
}

pub fn bucket_by_category(expenses: &[Expense]) -> BTreeMap<Category, Decimal> {
    let mut out = BTreeMap::new();
    for e in expenses {
        add_into(&mut out, e.category(), e.amount);
    }
    out
}

/// Exactly `n` consecutive days ending at `reference`, oldest first, with
/// zero for days that have no expenses. The window never reaches past the
/// earliest representable date, so a huge `n` yields fewer entries.
pub fn last_n_days_window(expenses: &[Expense], n: usize, reference: NaiveDate) -> Vec<DayAmount> {
    let daily = bucket_by_day(expenses);
    let mut window: Vec<DayAmount> = std::iter::successors(Some(reference), |d| d.pred_opt())
        .take(n)
        .map(|day| DayAmount {
            day,
            amount: daily.get(&day).copied().unwrap_or(Decimal::ZERO),
        })
        .collect();
    window.reverse();
    window
}

/// First day of the `n`-day window ending at `reference`, clamped to the
/// earliest representable date.
pub fn window_start(n: usize, reference: NaiveDate) -> NaiveDate {
    let back = i64::try_from(n.saturating_sub(1)).unwrap_or(i64::MAX);
    Duration::try_days(back)
        .and_then(|span| reference.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN)
}

pub fn active_days(expenses: &[Expense]) -> usize {
    expenses.iter().map(|e| e.date).collect::<BTreeSet<_>>().len()
}

/// Total divided by the number of distinct days that have at least one
/// expense, not by calendar days.
pub fn daily_average(expenses: &[Expense]) -> Decimal {
    let days = active_days(expenses);
    if days == 0 {
        return Decimal::ZERO;
    }
    total(expenses) / Decimal::from(days)
}

/// Merges backend category names that differ only by case, largest first.
pub fn consolidate_categories(categories: &[CategoryAmount]) -> Vec<CategoryAmount> {
    let mut merged: HashMap<String, Decimal> = HashMap::new();
    for c in categories {
        let slot = merged.entry(c.name.to_lowercase()).or_insert(Decimal::ZERO);
        *slot = slot.saturating_add(c.amount);
    }
    let mut out: Vec<CategoryAmount> = merged
        .into_iter()
        .map(|(name, amount)| CategoryAmount { name, amount })
        .collect();
    out.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_AMOUNT;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn exp(date: NaiveDate, label: &str, amount: i64) -> Expense {
        Expense::new(date, label, Decimal::from(amount))
    }

    fn sample() -> Vec<Expense> {
        vec![
            exp(day(2024, 3, 1), "lunch", 1500),
            exp(day(2024, 3, 1), "bus fare", 300),
            exp(day(2024, 3, 2), "taxi", 800),
            exp(day(2024, 4, 5), "MTN data", 1000),
            exp(day(2024, 4, 7), "haircut", 2000),
        ]
    }

    #[test]
    fn buckets_sum_to_the_same_total() {
        let list = sample();
        let by_cat: Decimal = bucket_by_category(&list).values().copied().sum();
        let by_day: Decimal = bucket_by_day(&list).values().copied().sum();
        let by_month: Decimal = bucket_by_month(&list).values().copied().sum();
        assert_eq!(by_cat, total(&list));
        assert_eq!(by_day, total(&list));
        assert_eq!(by_month, total(&list));
        assert_eq!(total(&list), Decimal::from(5600));
    }

    #[test]
    fn buckets_leave_missing_days_absent() {
        let daily = bucket_by_day(&sample());
        assert_eq!(daily.len(), 4);
        assert_eq!(daily[&day(2024, 3, 1)], Decimal::from(1800));
        assert!(!daily.contains_key(&day(2024, 3, 3)));
        let monthly = bucket_by_month(&sample());
        assert_eq!(monthly["2024-03"], Decimal::from(2600));
        assert_eq!(monthly["2024-04"], Decimal::from(3000));
    }

    #[test]
    fn end_to_end_lunch_and_taxi() {
        let list = vec![
            exp(day(2024, 3, 1), "lunch", 1500),
            exp(day(2024, 3, 2), "taxi", 800),
        ];
        let cats = bucket_by_category(&list);
        assert_eq!(cats.len(), 2);
        assert_eq!(cats[&Category::Food], Decimal::from(1500));
        assert_eq!(cats[&Category::Transport], Decimal::from(800));
        assert_eq!(total(&list), Decimal::from(2300));
        assert_eq!(daily_average(&list), Decimal::from(1150));
    }

    #[test]
    fn window_is_zero_filled_and_ends_on_reference() {
        let list = sample();
        let w = last_n_days_window(&list, 7, day(2024, 3, 4));
        assert_eq!(w.len(), 7);
        assert_eq!(w[0].day, day(2024, 2, 27));
        assert_eq!(w[6].day, day(2024, 3, 4));
        assert!(w.windows(2).all(|p| p[0].day < p[1].day));
        assert_eq!(w[3].amount, Decimal::from(1800));
        assert_eq!(w[4].amount, Decimal::from(800));
        assert_eq!(w[6].amount, Decimal::ZERO);

        assert!(last_n_days_window(&[], 0, day(2024, 3, 4)).is_empty());
        let empty = last_n_days_window(&[], 3, day(2024, 3, 4));
        assert!(empty.iter().all(|d| d.amount.is_zero()));
    }

    #[test]
    fn empty_input_gives_zero_aggregates() {
        assert!(bucket_by_day(&[]).is_empty());
        assert!(bucket_by_category(&[]).is_empty());
        assert_eq!(total(&[]), Decimal::ZERO);
        assert_eq!(daily_average(&[]), Decimal::ZERO);
    }

    #[test]
    fn unusable_records_become_defects() {
        let raw: Vec<RawExpense> = serde_json::from_value(json!([
            {"date": "2024-03-01", "expense": "lunch", "amount": 1500.0, "index": 0},
            {"date": "2024-03-01", "expense": "rice", "amount": "250.50", "index": 1},
            {"date": "2024-03-01", "expense": "refund", "amount": -20, "index": 2},
            {"date": "2024-03-01", "expense": "??", "amount": "abc", "index": 3},
            {"date": "03/01/2024", "expense": "snacks", "amount": 100, "index": 4},
            {"date": "2024-03-02", "expense": "free sample", "amount": 0, "index": 0}
        ]))
        .unwrap();
        let ledger = Ledger::from_raw(&raw);
        assert_eq!(ledger.expenses.len(), 3);
        assert_eq!(ledger.defect_count(), 3);
        assert_eq!(ledger.defects[0].kind, DefectKind::InvalidAmount);
        assert_eq!(ledger.defects[2].kind, DefectKind::InvalidDate);
        assert_eq!(total(&ledger.expenses), "1750.50".parse::<Decimal>().unwrap());
    }

    #[test]
    fn oversized_amounts_are_defects_not_overflows() {
        let raw: Vec<RawExpense> = serde_json::from_value(json!([
            {"date": "2024-03-01", "expense": "a", "amount": "79228162514264337593543950335", "index": 0},
            {"date": "2024-03-01", "expense": "b", "amount": "79228162514264337593543950335", "index": 1},
            {"date": "2024-03-01", "expense": "lunch", "amount": 1500, "index": 2}
        ]))
        .unwrap();
        let ledger = Ledger::from_raw(&raw);
        assert_eq!(ledger.expenses.len(), 1);
        assert_eq!(ledger.defect_count(), 2);
        assert!(ledger.defects.iter().all(|d| d.kind == DefectKind::InvalidAmount));
        assert_eq!(total(&ledger.expenses), Decimal::from(1500));
        assert_eq!(MAX_AMOUNT, Decimal::from(1_000_000_000_000_000i64));

        let huge = vec![
            exp(day(2024, 3, 1), "x", 1),
            Expense::new(day(2024, 3, 1), "y", Decimal::MAX),
            Expense::new(day(2024, 3, 1), "z", Decimal::MAX),
        ];
        assert_eq!(total(&huge), Decimal::MAX);
        assert_eq!(bucket_by_day(&huge)[&day(2024, 3, 1)], Decimal::MAX);
        assert_eq!(bucket_by_month(&huge)["2024-03"], Decimal::MAX);
    }

    #[test]
    fn window_stops_at_the_earliest_date() {
        let near_min = NaiveDate::MIN.succ_opt().unwrap().succ_opt().unwrap();
        let window = last_n_days_window(&[], 10, near_min);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].day, NaiveDate::MIN);
        assert_eq!(window[2].day, near_min);
        assert!(window.iter().all(|d| d.amount.is_zero()));
        assert_eq!(window_start(100_000_000, day(2024, 3, 1)), NaiveDate::MIN);
        assert_eq!(window_start(7, day(2024, 3, 7)), day(2024, 3, 1));
        assert_eq!(window_start(0, day(2024, 3, 7)), day(2024, 3, 7));
    }

    #[test]
    fn consolidates_case_variants() {
        let merged = consolidate_categories(&[
            CategoryAmount { name: "Food".into(), amount: Decimal::from(100) },
            CategoryAmount { name: "transport".into(), amount: Decimal::from(250) },
            CategoryAmount { name: "food".into(), amount: Decimal::from(200) },
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "food");
        assert_eq!(merged[0].amount, Decimal::from(300));
        assert_eq!(merged[1].name, "transport");
    }
}
